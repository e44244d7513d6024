//! Merging converted artifacts into one combined dataset per parameter set.
//!
//! The combine step is a fold over the ordered (artifact, acquisition)
//! pairs produced by [`crate::convert::convert_all`]: each artifact is
//! loaded, its m/z row corrected with its own acquisition's calibration
//! record, the shapes reconciled against the accumulator, and the rows
//! appended. The accumulated matrix is then written as the parameter set's
//! combined CSV table.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::calibration::{self, CalibrationError, CalibrationSettings};
use crate::matrix::{reconcile, Matrix, MatrixError};
use crate::naming;
use crate::params::{ParameterSet, RawAcquisition};

/// Errors raised while combining artifacts
#[derive(Debug, thiserror::Error)]
pub enum CombineError {
    /// No artifacts were supplied; an empty acquisition list has nothing
    /// to combine
    #[error("Nothing to combine: no artifacts supplied")]
    NothingToCombine,

    /// An artifact could not be read as a numeric matrix
    #[error("Artifact error: {0}")]
    MatrixError(#[from] MatrixError),

    /// An acquisition's calibration record could not be read
    #[error("Calibration error: {0}")]
    CalibrationError(#[from] CalibrationError),
}

/// Combine all artifacts of one parameter set into a single table and
/// write it to `out_dir` under the parameter set's deterministic CSV name.
///
/// Calibration correction is applied per artifact, with that artifact's
/// own acquisition's record, before shape reconciliation; drift varies per
/// acquisition, so a shared record would mis-correct every artifact but
/// one. A single artifact degenerates to correct-then-write.
///
/// Returns the path of the written combined dataset.
pub fn combine_param_set(
    pairs: &[(PathBuf, &RawAcquisition)],
    params: &ParameterSet,
    cal_settings: &CalibrationSettings,
    out_dir: &Path,
) -> Result<PathBuf, CombineError> {
    if pairs.is_empty() {
        return Err(CombineError::NothingToCombine);
    }

    let mut accumulator: Option<Matrix> = None;
    for (artifact, acquisition) in pairs {
        let mut matrix = Matrix::read_transposed(artifact)?;
        let record = calibration::read_calibration(acquisition, cal_settings)?;
        record.correct_mz(matrix.row_mut(0));
        debug!(
            "Merged {} ({} channels x {} samples)",
            artifact.display(),
            matrix.n_rows(),
            matrix.n_cols()
        );

        accumulator = Some(match accumulator.take() {
            None => matrix,
            Some(acc) => {
                let (mut acc, matrix) = reconcile(acc, matrix);
                acc.append_rows(matrix);
                acc
            }
        });
    }

    // Guarded by the emptiness check above.
    let combined = accumulator.expect("at least one artifact");

    let out_path = out_dir.join(naming::csv_name(params));
    combined.write_transposed_csv(&out_path)?;
    info!(
        "Combined dataset: {} ({} channels x {} samples)",
        out_path.display(),
        combined.n_rows(),
        combined.n_cols()
    );

    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    // Identity calibration: p = sqrt(mz), squared back to mz.
    const IDENTITY_CAL: &str = "Cal Function 1: 0.0e0,1.0e0,0.0e0,0.0e0,0.0e0,0.0e0,T1";

    fn test_params() -> ParameterSet {
        ParameterSet {
            pep_mz: 500.25,
            charge: 2,
            mz_min: 100.0,
            mz_max: 200.0,
            rt_min: 10.0,
            rt_max: 20.0,
            dt_min: 30.0,
            dt_max: 40.0,
        }
    }

    fn make_acquisition(dir: &Path, name: &str, cal_line: &str) -> RawAcquisition {
        let raw_dir = dir.join(name);
        fs::create_dir(&raw_dir).unwrap();
        let mut f = File::create(raw_dir.join("_extern.inf")).unwrap();
        writeln!(f, "Instrument header").unwrap();
        writeln!(f, "{cal_line}").unwrap();
        RawAcquisition::new(raw_dir.to_string_lossy().into_owned())
    }

    fn write_artifact(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_combine_two_artifacts() {
        let dir = tempdir().unwrap();
        let acq1 = make_acquisition(dir.path(), "a.raw", IDENTITY_CAL);
        let acq2 = make_acquisition(dir.path(), "b.raw", IDENTITY_CAL);

        // Three samples vs two; the second artifact is zero-padded.
        let art1 = write_artifact(dir.path(), "a_MS.txt", "100.0 10\n121.0 20\n144.0 30\n");
        let art2 = write_artifact(dir.path(), "b_MS.txt", "100.0 5\n121.0 15\n");

        let pairs = vec![(art1, &acq1), (art2, &acq2)];
        let out = combine_param_set(
            &pairs,
            &test_params(),
            &CalibrationSettings::default(),
            dir.path(),
        )
        .unwrap();

        assert_eq!(out.file_name().unwrap().to_str().unwrap(), "500p25_2.csv");
        let content = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        // 3 samples wide, 4 channels deep (2 per artifact).
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "100.000000,10.000000,100.000000,5.000000");
        assert_eq!(lines[1], "121.000000,20.000000,121.000000,15.000000");
        // Padded trailing column of the second artifact is exactly zero.
        assert_eq!(lines[2], "144.000000,30.000000,0.000000,0.000000");
    }

    #[test]
    fn test_each_artifact_uses_its_own_calibration() {
        let dir = tempdir().unwrap();
        let acq1 = make_acquisition(dir.path(), "a.raw", IDENTITY_CAL);
        // Doubled slope: p = 2*sqrt(mz), so corrected mz is 4x the input.
        let acq2 = make_acquisition(
            dir.path(),
            "b.raw",
            "Cal Function 1: 0.0e0,2.0e0,0.0e0,0.0e0,0.0e0,0.0e0,T1",
        );

        let art1 = write_artifact(dir.path(), "a_MS.txt", "100.0 1\n");
        let art2 = write_artifact(dir.path(), "b_MS.txt", "100.0 2\n");

        let pairs = vec![(art1, &acq1), (art2, &acq2)];
        let out = combine_param_set(
            &pairs,
            &test_params(),
            &CalibrationSettings::default(),
            dir.path(),
        )
        .unwrap();

        let content = fs::read_to_string(&out).unwrap();
        assert_eq!(content, "100.000000,1.000000,400.000000,2.000000\n");
    }

    #[test]
    fn test_single_artifact_corrects_then_writes() {
        let dir = tempdir().unwrap();
        let acq = make_acquisition(
            dir.path(),
            "a.raw",
            "Cal Function 1: 0.0e0,2.0e0,0.0e0,0.0e0,0.0e0,0.0e0,T1",
        );
        let art = write_artifact(dir.path(), "a_MS.txt", "25.0 7\n");

        let pairs = vec![(art, &acq)];
        let out = combine_param_set(
            &pairs,
            &test_params(),
            &CalibrationSettings::default(),
            dir.path(),
        )
        .unwrap();

        // sqrt(25)=5, doubled is 10, squared is 100.
        let content = fs::read_to_string(&out).unwrap();
        assert_eq!(content, "100.000000,7.000000\n");
    }

    #[test]
    fn test_empty_pairs_is_error() {
        let dir = tempdir().unwrap();
        let err = combine_param_set(
            &[],
            &test_params(),
            &CalibrationSettings::default(),
            dir.path(),
        )
        .unwrap_err();
        assert!(matches!(err, CombineError::NothingToCombine));
    }

    #[test]
    fn test_bad_calibration_aborts_without_output() {
        let dir = tempdir().unwrap();
        let acq = make_acquisition(dir.path(), "a.raw", "No marker here");
        let art = write_artifact(dir.path(), "a_MS.txt", "100.0 1\n");

        let pairs = vec![(art, &acq)];
        let err = combine_param_set(
            &pairs,
            &test_params(),
            &CalibrationSettings::default(),
            dir.path(),
        )
        .unwrap_err();
        assert!(matches!(err, CombineError::CalibrationError(_)));
        assert!(!dir.path().join("500p25_2.csv").exists());
    }
}
