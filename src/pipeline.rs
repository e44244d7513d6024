//! The orchestration loop: convert, combine, and optionally clean.
//!
//! One run processes every parameter set in input order; for each set the
//! external converter is driven once per acquisition and the resulting
//! artifacts are combined into one dataset. Intermediate artifacts are
//! swept only once, at the very end, and only when every parameter set
//! succeeded, so partial runs leave everything in place for inspection.
//!
//! Any failure aborts the run at the point of detection; there are no
//! retries, no default calibrations, and no partially combined outputs.

use std::path::PathBuf;

use log::info;

use crate::calibration::CalibrationSettings;
use crate::cleanup;
use crate::combine::{self, CombineError};
use crate::convert::{self, ConversionError, Converter, ConverterSettings};
use crate::naming;
use crate::params::{self, InputError, ParameterSet};

/// Errors surfaced by a pipeline run, each carrying enough context to
/// reproduce the failure.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// An input list could not be read or parsed
    #[error("Input error: {0}")]
    InputError(#[from] InputError),

    /// Conversion failed for one acquisition of one parameter set
    #[error("Conversion failed for parameter set [{params}]: {source}")]
    ConversionFailed {
        /// The parameter set being processed
        params: String,
        /// The underlying converter error (tagged with the acquisition)
        source: ConversionError,
    },

    /// Combining failed for one parameter set
    #[error("Combining failed for parameter set [{params}]: {source}")]
    CombineFailed {
        /// The parameter set being processed
        params: String,
        /// The underlying combine error
        source: CombineError,
    },

    /// Workspace cleanup failed after an otherwise successful run
    #[error("Cleanup failed: {0}")]
    CleanupFailed(#[from] std::io::Error),
}

/// Everything one run needs besides the converter itself.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Path of the parameter-set list (comma-delimited, fixed columns)
    pub param_set_list: PathBuf,
    /// Path of the acquisition list (one identifier per line)
    pub raw_file_list: PathBuf,
    /// Directory receiving intermediate artifacts and combined datasets
    pub workdir: PathBuf,
    /// Where each acquisition's calibration line lives
    pub calibration: CalibrationSettings,
    /// Name of the shared auxiliary drift-time output
    pub aux_im_file: String,
    /// Sweep intermediate artifacts after a fully successful run
    pub clean_up: bool,
}

impl RunOptions {
    /// Options with default calibration settings and no cleanup.
    pub fn new(
        param_set_list: impl Into<PathBuf>,
        raw_file_list: impl Into<PathBuf>,
        workdir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            param_set_list: param_set_list.into(),
            raw_file_list: raw_file_list.into(),
            workdir: workdir.into(),
            calibration: CalibrationSettings::default(),
            aux_im_file: ConverterSettings::default().aux_im_file,
            clean_up: false,
        }
    }
}

/// What a completed run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Parameter sets processed
    pub param_sets: usize,
    /// Converter invocations performed
    pub conversions: usize,
    /// Combined dataset paths, one per parameter set, in input order
    pub datasets_written: Vec<PathBuf>,
    /// Intermediate files removed by cleanup (empty when cleanup was off)
    pub files_cleaned: usize,
}

/// Run the full pipeline: load both input lists, then for each parameter
/// set convert every acquisition and combine the artifacts; finally sweep
/// the workspace if requested and everything succeeded.
pub fn run<C: Converter>(options: &RunOptions, converter: &C) -> Result<RunSummary, PipelineError> {
    let param_sets = params::read_param_sets(&options.param_set_list)?;
    let acquisitions = params::read_acquisitions(&options.raw_file_list)?;

    info!(
        "Loaded {} parameter sets and {} acquisitions",
        param_sets.len(),
        acquisitions.len()
    );

    let aux_im_path = options.workdir.join(&options.aux_im_file);
    let mut summary = RunSummary::default();

    for (idx, param_set) in param_sets.iter().enumerate() {
        info!(
            "Parameter set {}/{}: {}",
            idx + 1,
            param_sets.len(),
            param_set
        );

        let pairs = convert::convert_all_with_aux(
            param_set,
            &acquisitions,
            converter,
            &options.workdir,
            &aux_im_path,
        )
        .map_err(|source| PipelineError::ConversionFailed {
            params: label(param_set),
            source,
        })?;
        summary.conversions += pairs.len();

        let dataset =
            combine::combine_param_set(&pairs, param_set, &options.calibration, &options.workdir)
                .map_err(|source| PipelineError::CombineFailed {
                    params: label(param_set),
                    source,
                })?;
        summary.datasets_written.push(dataset);
        summary.param_sets += 1;
    }

    if options.clean_up {
        let removed = cleanup::clean_workspace(&options.workdir, &options.aux_im_file)?;
        summary.files_cleaned = removed.len();
    }

    Ok(summary)
}

// Short parameter-set label for error context: the window string plus the
// output name it would have produced.
fn label(params: &ParameterSet) -> String {
    format!("{} -> {}", naming::param_str(params), naming::csv_name(params))
}
