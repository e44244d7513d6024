//! External converter invocation.
//!
//! Signal extraction itself is delegated to an external executable
//! (CDCReader) that reads one raw acquisition and writes the extracted MS
//! trace as a whitespace-delimited text file. This module owns the narrow
//! interface to that executable ([`Converter`]) and the loop that runs it
//! once per acquisition for a parameter set ([`convert_all`]).
//!
//! Every invocation is synchronous; the converter must exit before the
//! next acquisition is started, and acquisitions are processed in input
//! order so that each artifact can later be paired with its own
//! calibration record.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use log::{debug, info};
use serde::Deserialize;

use crate::naming;
use crate::params::{ParameterSet, RawAcquisition};

/// Errors raised while driving the external converter
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The converter executable could not be started
    #[error("Failed to launch converter for {acquisition}: {source}")]
    Launch {
        /// Acquisition being converted
        acquisition: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The converter exited with a non-zero status
    #[error("Converter failed on {acquisition} ({status})")]
    ConverterFailed {
        /// Acquisition being converted
        acquisition: String,
        /// Exit status of the converter process
        status: ExitStatus,
    },

    /// The converter exited cleanly but produced no output artifact
    #[error("Converter produced no artifact for {acquisition}: expected {path}")]
    MissingArtifact {
        /// Acquisition being converted
        acquisition: String,
        /// Artifact path that should have been written
        path: PathBuf,
    },
}

/// Converter tuning knobs, overridable from the TOML config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConverterSettings {
    /// Binning width for the MS axis; 0 keeps raw samples unbinned
    pub ms_bin: f64,
    /// Binning width for the drift-time axis of the auxiliary output;
    /// deliberately coarse since that output is discarded
    pub im_bin: f64,
    /// Name of the auxiliary drift-time output, overwritten on every
    /// invocation so junk does not accumulate
    pub aux_im_file: String,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            ms_bin: 0.0,
            im_bin: 5.0,
            aux_im_file: "IM-data.txt".to_string(),
        }
    }
}

/// One converter invocation: source acquisition, output paths, and the
/// extraction windows.
#[derive(Debug)]
pub struct ConversionRequest<'a> {
    /// Raw acquisition to extract from
    pub raw_path: &'a Path,
    /// Where the MS artifact must be written
    pub ms_path: &'a Path,
    /// Auxiliary drift-time output path, overwritten each call
    pub im_path: &'a Path,
    /// Extraction windows
    pub params: &'a ParameterSet,
}

/// Narrow interface to the external signal-extraction tool, so the
/// orchestration loop can be exercised against a fake in tests.
pub trait Converter {
    /// Run one extraction synchronously. Success means exit status zero;
    /// artifact presence is verified by the caller.
    fn invoke(&self, request: &ConversionRequest<'_>) -> Result<(), ConversionError>;
}

/// The real CDCReader executable.
#[derive(Debug, Clone)]
pub struct CdcReader {
    exe: PathBuf,
    settings: ConverterSettings,
}

impl CdcReader {
    /// Wrap a CDCReader executable at the given path with default settings.
    pub fn new<P: Into<PathBuf>>(exe: P) -> Self {
        Self {
            exe: exe.into(),
            settings: ConverterSettings::default(),
        }
    }

    /// Replace the tuning settings.
    pub fn with_settings(mut self, settings: ConverterSettings) -> Self {
        self.settings = settings;
        self
    }

    // Command-line arguments for one invocation. Smoothing is always
    // disabled; the m/z window is passed as-is while the RT and DT windows
    // are integer scan bounds.
    fn build_args(&self, request: &ConversionRequest<'_>) -> Vec<String> {
        let p = request.params;
        vec![
            "--raw_file".into(),
            request.raw_path.to_string_lossy().into_owned(),
            "--ms_file".into(),
            request.ms_path.to_string_lossy().into_owned(),
            "--im_file".into(),
            request.im_path.to_string_lossy().into_owned(),
            "--ms_number_smooth".into(),
            "0".into(),
            "--ms_smooth_window".into(),
            "0".into(),
            "--ms_bin".into(),
            self.settings.ms_bin.to_string(),
            "--im_bin".into(),
            self.settings.im_bin.to_string(),
            "--mz_min".into(),
            p.mz_min.to_string(),
            "--mz_max".into(),
            p.mz_max.to_string(),
            "--rt_min".into(),
            (p.rt_min.trunc() as i64).to_string(),
            "--rt_max".into(),
            (p.rt_max.trunc() as i64).to_string(),
            "--dt_min".into(),
            (p.dt_min.trunc() as i64).to_string(),
            "--dt_max".into(),
            (p.dt_max.trunc() as i64).to_string(),
        ]
    }
}

impl Converter for CdcReader {
    fn invoke(&self, request: &ConversionRequest<'_>) -> Result<(), ConversionError> {
        let acquisition = request.raw_path.to_string_lossy().into_owned();
        let args = self.build_args(request);
        debug!("{} {}", self.exe.display(), args.join(" "));

        let status = Command::new(&self.exe)
            .args(&args)
            .status()
            .map_err(|source| ConversionError::Launch {
                acquisition: acquisition.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ConversionError::ConverterFailed {
                acquisition,
                status,
            });
        }

        Ok(())
    }
}

/// Convert every acquisition for one parameter set, in input order.
///
/// Each acquisition gets one synchronous converter invocation writing to
/// the deterministically named artifact in `workdir`. The returned pairs
/// preserve input order; that ordering later pairs each artifact with its
/// own acquisition's calibration record.
///
/// A non-zero converter exit or a missing artifact aborts the parameter
/// set; there is no retry and no partial result.
pub fn convert_all<'a, C: Converter>(
    params: &ParameterSet,
    acquisitions: &'a [RawAcquisition],
    converter: &C,
    workdir: &Path,
) -> Result<Vec<(PathBuf, &'a RawAcquisition)>, ConversionError> {
    let im_path = workdir.join(ConverterSettings::default().aux_im_file);
    convert_all_with_aux(params, acquisitions, converter, workdir, &im_path)
}

/// [`convert_all`] with an explicit auxiliary drift-time output path.
pub fn convert_all_with_aux<'a, C: Converter>(
    params: &ParameterSet,
    acquisitions: &'a [RawAcquisition],
    converter: &C,
    workdir: &Path,
    im_path: &Path,
) -> Result<Vec<(PathBuf, &'a RawAcquisition)>, ConversionError> {
    let mut pairs = Vec::with_capacity(acquisitions.len());

    for acquisition in acquisitions {
        let ms_path = workdir.join(naming::ms_name(params, acquisition.id()));
        info!("Converting {} -> {}", acquisition, ms_path.display());

        let request = ConversionRequest {
            raw_path: acquisition.path(),
            ms_path: &ms_path,
            im_path,
            params,
        };
        converter.invoke(&request)?;

        if !ms_path.is_file() {
            return Err(ConversionError::MissingArtifact {
                acquisition: acquisition.id().to_string(),
                path: ms_path,
            });
        }

        pairs.push((ms_path, acquisition));
    }

    Ok(pairs)
}
