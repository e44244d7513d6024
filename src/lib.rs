//! # msextract - Batch IM-MS Signal Extraction
//!
//! `msextract` drives an external signal-extraction converter (CDCReader)
//! over a list of raw mass-spectrometry acquisitions, once per extraction
//! parameter set, and merges the per-acquisition outputs into a single
//! combined table per parameter set.
//!
//! ## Pipeline
//!
//! For every parameter set in the input list:
//!
//! 1. The converter is invoked once per raw acquisition with the parameter
//!    set's m/z, retention-time, and drift-time windows, producing one
//!    intermediate text artifact per acquisition ([`convert`]).
//! 2. Each artifact's m/z row is corrected with that acquisition's own
//!    mass-calibration coefficients ([`calibration`]).
//! 3. The corrected matrices are zero-padded to a common width and stacked
//!    into one combined dataset, written as a CSV table ([`combine`]).
//!
//! After all parameter sets have been combined, the intermediate artifacts
//! can be swept from the working directory ([`cleanup`]).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use msextract::convert::CdcReader;
//! use msextract::pipeline::{self, RunOptions};
//!
//! let options = RunOptions::new(
//!     "param_sets.csv",
//!     "raw_files.txt",
//!     ".",
//! );
//! let converter = CdcReader::new("CDCReader.exe");
//! let summary = pipeline::run(&options, &converter)?;
//! println!("wrote {} combined datasets", summary.datasets_written.len());
//! # Ok::<(), msextract::pipeline::PipelineError>(())
//! ```
//!
//! ## File naming
//!
//! Artifact and output names are deterministic functions of the parameter
//! set so that repeated runs rediscover (and the cleaner can re-identify)
//! their own files:
//!
//! - intermediate: `{raw-stem}_{mzmin}-{mzmax}_{rtmin}-{rtmax}_{dtmin}-{dtmax}_MS.txt`
//! - combined:     `{pep_mz with '.' as 'p'}_{charge}.csv`
//!
//! ## Architecture
//!
//! - [`params`]: parameter-set list and acquisition list parsing
//! - [`naming`]: deterministic artifact/output name encoding
//! - [`matrix`]: delimited-text matrices and shape reconciliation
//! - [`calibration`]: per-acquisition mass-calibration correction
//! - [`convert`]: external converter invocation, one call per acquisition
//! - [`combine`]: merging corrected artifacts into one table
//! - [`cleanup`]: post-run removal of intermediate artifacts
//! - [`pipeline`]: the orchestration loop tying the above together

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod calibration;
pub mod cleanup;
pub mod combine;
pub mod convert;
pub mod matrix;
pub mod naming;
pub mod params;
pub mod pipeline;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::calibration::{CalibrationError, CalibrationRecord, CalibrationSettings};
    pub use crate::cleanup::clean_workspace;
    pub use crate::combine::{combine_param_set, CombineError};
    pub use crate::convert::{
        convert_all, CdcReader, ConversionError, ConversionRequest, Converter, ConverterSettings,
    };
    pub use crate::matrix::{reconcile, Matrix, MatrixError};
    pub use crate::params::{InputError, ParameterSet, RawAcquisition};
    pub use crate::pipeline::{run, PipelineError, RunOptions, RunSummary};
}
