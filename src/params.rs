//! Input list parsing: extraction parameter sets and raw acquisitions.
//!
//! Two input files drive a run: a comma-delimited list of parameter sets
//! (one row per set, fixed column order) and a plain-text list of raw
//! acquisition identifiers (one per line). Both are read once at startup
//! and never mutated afterwards.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Errors raised while reading the run's input lists
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// An input list file does not exist or could not be opened
    #[error("Input file not found: {0}")]
    MissingFile(PathBuf),

    /// I/O error while reading an input list
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV-level error in the parameter-set list
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// A parameter-set row is malformed (too few fields or a non-numeric value)
    #[error("Invalid parameter set on row {row}: {reason}")]
    InvalidParameterSet {
        /// 1-indexed row in the parameter-set list
        row: usize,
        /// What made the row unusable
        reason: String,
    },

    /// The acquisition list contains no entries
    #[error("Acquisition list is empty: {0}")]
    EmptyAcquisitionList(PathBuf),
}

/// One extraction target: an identity (peptide m/z and charge) plus the
/// m/z, retention-time, and drift-time windows to extract.
///
/// The six window bounds, truncated to integers, are the naming identity of
/// the parameter set (see [`crate::naming`]); `pep_mz` and `charge` only
/// name the combined output file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    /// Peptide m/z (identity field, names the combined output)
    pub pep_mz: f64,
    /// Charge state (identity field, names the combined output)
    pub charge: i32,
    /// Lower m/z window bound
    pub mz_min: f64,
    /// Upper m/z window bound
    pub mz_max: f64,
    /// Lower retention-time window bound (scans)
    pub rt_min: f64,
    /// Upper retention-time window bound (scans)
    pub rt_max: f64,
    /// Lower drift-time window bound (bins)
    pub dt_min: f64,
    /// Upper drift-time window bound (bins)
    pub dt_max: f64,
}

impl ParameterSet {
    /// The six window bounds in naming order:
    /// `[mz_min, mz_max, rt_min, rt_max, dt_min, dt_max]`.
    pub fn window_bounds(&self) -> [f64; 6] {
        [
            self.mz_min, self.mz_max, self.rt_min, self.rt_max, self.dt_min, self.dt_max,
        ]
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pep_mz={} charge={} mz=[{}, {}] rt=[{}, {}] dt=[{}, {}]",
            self.pep_mz,
            self.charge,
            self.mz_min,
            self.mz_max,
            self.rt_min,
            self.rt_max,
            self.dt_min,
            self.dt_max
        )
    }
}

/// A reference to one raw instrument recording, as listed in the
/// acquisition list. The identifier is kept verbatim; it usually names a
/// `.raw` directory, either bare or with a path prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAcquisition {
    id: String,
}

impl RawAcquisition {
    /// Wrap an acquisition identifier as it appeared in the input list.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The identifier exactly as listed.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The identifier as a filesystem path to the recording.
    pub fn path(&self) -> &Path {
        Path::new(&self.id)
    }

    /// Path of the per-acquisition metadata file holding the calibration
    /// line, at a fixed location beneath the recording itself.
    pub fn metadata_path(&self, relative: &str) -> PathBuf {
        self.path().join(relative)
    }
}

impl fmt::Display for RawAcquisition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Column order of the parameter-set list.
const PARAM_COLUMNS: usize = 8;

/// Read the parameter-set list: comma-delimited, no header row, columns in
/// the fixed order `pep_mz, charge, mz_min, mz_max, rt_min, rt_max,
/// dt_min, dt_max`.
pub fn read_param_sets<P: AsRef<Path>>(path: P) -> Result<Vec<ParameterSet>, InputError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|_| InputError::MissingFile(path.to_path_buf()))?;
    param_sets_from_reader(BufReader::new(file))
}

/// Parse parameter sets from any reader (comma-delimited rows).
pub fn param_sets_from_reader<R: Read>(reader: R) -> Result<Vec<ParameterSet>, InputError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut sets = Vec::new();

    for (idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = idx + 1;

        if record.len() < PARAM_COLUMNS {
            return Err(InputError::InvalidParameterSet {
                row,
                reason: format!("expected {} fields, found {}", PARAM_COLUMNS, record.len()),
            });
        }

        let field = |i: usize| -> Result<f64, InputError> {
            record[i]
                .parse::<f64>()
                .map_err(|_| InputError::InvalidParameterSet {
                    row,
                    reason: format!("field {} is not numeric: {:?}", i + 1, &record[i]),
                })
        };

        sets.push(ParameterSet {
            pep_mz: field(0)?,
            // Charge arrives as a numeric column; fractional charges are
            // meaningless, so it is truncated like the window bounds.
            charge: field(1)? as i32,
            mz_min: field(2)?,
            mz_max: field(3)?,
            rt_min: field(4)?,
            rt_max: field(5)?,
            dt_min: field(6)?,
            dt_max: field(7)?,
        });
    }

    Ok(sets)
}

/// Read the acquisition list: one identifier per line, blank lines ignored.
///
/// An empty list is an error; a run with no acquisitions has nothing to
/// convert or combine.
pub fn read_acquisitions<P: AsRef<Path>>(path: P) -> Result<Vec<RawAcquisition>, InputError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|_| InputError::MissingFile(path.to_path_buf()))?;

    let mut acquisitions = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        acquisitions.push(RawAcquisition::new(trimmed));
    }

    if acquisitions.is_empty() {
        return Err(InputError::EmptyAcquisitionList(path.to_path_buf()));
    }

    Ok(acquisitions)
}
