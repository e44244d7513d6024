//! Per-acquisition mass-calibration correction.
//!
//! Each raw acquisition carries a metadata file at a fixed relative path
//! with a line of six polynomial coefficients describing the instrument's
//! square-root mass-calibration curve. Measured m/z values are corrected by
//! evaluating that polynomial over `sqrt(mz)` and squaring the result.
//!
//! Which line holds the coefficients varies between acquisition-software
//! versions, so the file name, line number, and marker prefix are all
//! configuration rather than constants.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::params::RawAcquisition;

/// Signed decimal number, optionally in scientific notation.
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?").expect("number pattern"));

/// Errors raised while reading a calibration record
#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    /// The metadata file could not be opened
    #[error("Cannot open calibration metadata {path}: {source}")]
    Unreadable {
        /// Metadata file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// I/O error while reading the metadata file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The metadata file has fewer lines than the configured line number
    #[error("Calibration metadata {path} has no line {line}")]
    LineOutOfRange {
        /// Metadata file path
        path: PathBuf,
        /// Configured 1-indexed line number
        line: usize,
    },

    /// The configured line does not begin with the expected marker
    #[error("Line {line} of {path} does not begin with calibration marker {marker:?}")]
    MarkerMismatch {
        /// Metadata file path
        path: PathBuf,
        /// Configured 1-indexed line number
        line: usize,
        /// Expected marker prefix
        marker: String,
    },

    /// The calibration line carries fewer than six coefficients
    #[error("Calibration line in {path} has {found} coefficients, expected 6")]
    TooFewCoefficients {
        /// Metadata file path
        path: PathBuf,
        /// Coefficients actually found
        found: usize,
    },
}

/// Where to find the calibration line beneath each acquisition.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    /// Metadata file, relative to the acquisition path
    pub file: String,
    /// 1-indexed line number holding the coefficients
    pub line: usize,
    /// Prefix the calibration line must begin with
    pub marker: String,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            file: "_extern.inf".to_string(),
            line: 2,
            marker: "Cal Function 1".to_string(),
        }
    }
}

/// Six polynomial coefficients `(c0..c5)` correcting measured m/z to true
/// m/z for one acquisition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationRecord {
    coefficients: [f64; 6],
}

impl CalibrationRecord {
    /// Build a record from explicit coefficients (ascending power order).
    pub fn new(coefficients: [f64; 6]) -> Self {
        Self { coefficients }
    }

    /// The coefficients in ascending power order.
    pub fn coefficients(&self) -> &[f64; 6] {
        &self.coefficients
    }

    /// Correct measured m/z values in place.
    ///
    /// For each value: `y = sqrt(mz)`, the 5th-degree polynomial
    /// `c0 + y*(c1 + y*(c2 + y*(c3 + y*(c4 + y*c5))))` is evaluated by
    /// Horner's method, and the result is squared. Deterministic; applying
    /// the same record to the same input always yields the same output.
    pub fn correct_mz(&self, mz_values: &mut [f64]) {
        let c = &self.coefficients;
        for mz in mz_values {
            let y = mz.sqrt();
            let p = c[0] + y * (c[1] + y * (c[2] + y * (c[3] + y * (c[4] + y * c[5]))));
            *mz = p * p;
        }
    }
}

/// Read the calibration record of one acquisition.
///
/// Opens the acquisition's metadata file, takes the configured 1-indexed
/// line, verifies it begins with the configured marker, and extracts the
/// first six signed floating-point numbers on it. A missing marker or
/// fewer than six numbers is a hard error; there is no default calibration
/// to fall back to.
pub fn read_calibration(
    acquisition: &RawAcquisition,
    settings: &CalibrationSettings,
) -> Result<CalibrationRecord, CalibrationError> {
    let path = acquisition.metadata_path(&settings.file);
    let file = File::open(&path).map_err(|source| CalibrationError::Unreadable {
        path: path.clone(),
        source,
    })?;

    let line = BufReader::new(file)
        .lines()
        .nth(settings.line.saturating_sub(1))
        .transpose()?
        .ok_or_else(|| CalibrationError::LineOutOfRange {
            path: path.clone(),
            line: settings.line,
        })?;

    parse_calibration_line(&line, settings, &path)
}

fn parse_calibration_line(
    line: &str,
    settings: &CalibrationSettings,
    path: &Path,
) -> Result<CalibrationRecord, CalibrationError> {
    if !line.starts_with(&settings.marker) {
        return Err(CalibrationError::MarkerMismatch {
            path: path.to_path_buf(),
            line: settings.line,
            marker: settings.marker.clone(),
        });
    }

    let tail = &line[settings.marker.len()..];
    let mut coefficients = [0.0; 6];
    let mut found = 0;
    for m in NUMBER_RE.find_iter(tail).take(6) {
        // The pattern only matches valid float syntax.
        coefficients[found] = m.as_str().parse().expect("matched float");
        found += 1;
    }

    if found < 6 {
        return Err(CalibrationError::TooFewCoefficients {
            path: path.to_path_buf(),
            found,
        });
    }

    Ok(CalibrationRecord::new(coefficients))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const CAL_LINE: &str =
        "Cal Function 1: -1.25e-1,1.0e0,2.5e-4,-3.0e-7,4.0e-10,-5.0e-13,T1";

    fn acquisition_with_metadata(dir: &Path, lines: &[&str]) -> RawAcquisition {
        let raw_dir = dir.join("sample01.raw");
        std::fs::create_dir(&raw_dir).unwrap();
        let mut f = File::create(raw_dir.join("_extern.inf")).unwrap();
        for line in lines {
            writeln!(f, "{line}").unwrap();
        }
        RawAcquisition::new(raw_dir.to_string_lossy().into_owned())
    }

    #[test]
    fn test_read_calibration() {
        let dir = tempdir().unwrap();
        let acq = acquisition_with_metadata(dir.path(), &["Instrument: Synapt G2", CAL_LINE]);

        let record = read_calibration(&acq, &CalibrationSettings::default()).unwrap();
        assert_eq!(
            record.coefficients(),
            &[-1.25e-1, 1.0, 2.5e-4, -3.0e-7, 4.0e-10, -5.0e-13]
        );
    }

    #[test]
    fn test_missing_marker_is_error() {
        let dir = tempdir().unwrap();
        let acq = acquisition_with_metadata(
            dir.path(),
            &["Instrument: Synapt G2", "Temperature: 25.0"],
        );

        let err = read_calibration(&acq, &CalibrationSettings::default()).unwrap_err();
        assert!(matches!(err, CalibrationError::MarkerMismatch { line: 2, .. }));
    }

    #[test]
    fn test_too_few_coefficients_is_error() {
        let dir = tempdir().unwrap();
        let acq = acquisition_with_metadata(
            dir.path(),
            &["header", "Cal Function 1: 1.0e0,2.0e0,3.0e0"],
        );

        let err = read_calibration(&acq, &CalibrationSettings::default()).unwrap_err();
        assert!(matches!(
            err,
            CalibrationError::TooFewCoefficients { found: 3, .. }
        ));
    }

    #[test]
    fn test_line_out_of_range_is_error() {
        let dir = tempdir().unwrap();
        let acq = acquisition_with_metadata(dir.path(), &[CAL_LINE]);

        let settings = CalibrationSettings {
            line: 7,
            ..CalibrationSettings::default()
        };
        let err = read_calibration(&acq, &settings).unwrap_err();
        assert!(matches!(err, CalibrationError::LineOutOfRange { line: 7, .. }));
    }

    #[test]
    fn test_configurable_line_and_marker() {
        let dir = tempdir().unwrap();
        let acq = acquisition_with_metadata(
            dir.path(),
            &["a", "b", "CAL: 1e0,2e0,3e0,4e0,5e0,6e0"],
        );

        let settings = CalibrationSettings {
            line: 3,
            marker: "CAL:".to_string(),
            ..CalibrationSettings::default()
        };
        let record = read_calibration(&acq, &settings).unwrap();
        assert_eq!(record.coefficients(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_correct_mz_identity_polynomial() {
        // c1 = 1, all others 0: p = sqrt(mz), p^2 = mz.
        let record = CalibrationRecord::new([0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        let mut mz = [100.0, 400.0, 2500.0];
        record.correct_mz(&mut mz);
        for (got, want) in mz.iter().zip([100.0, 400.0, 2500.0]) {
            assert!((got - want).abs() < 1e-9, "{got} != {want}");
        }
    }

    #[test]
    fn test_correct_mz_horner_evaluation() {
        // c0 = 1, c1 = 2 over mz = 4: y = 2, p = 1 + 2*2 = 5, result 25.
        let record = CalibrationRecord::new([1.0, 2.0, 0.0, 0.0, 0.0, 0.0]);
        let mut mz = [4.0];
        record.correct_mz(&mut mz);
        assert!((mz[0] - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_correct_mz_is_deterministic() {
        let record = CalibrationRecord::new([0.1, 0.99, 1e-4, -1e-7, 1e-10, -1e-13]);
        let input: Vec<f64> = (1..100).map(|i| 100.0 + i as f64 * 7.3).collect();

        let mut a = input.clone();
        let mut b = input;
        record.correct_mz(&mut a);
        record.correct_mz(&mut b);
        assert_eq!(a, b);
    }
}
