//! Numeric matrices read from converter output, plus shape reconciliation.
//!
//! Converter artifacts are whitespace-delimited text files with one sample
//! per line (m/z in the first column, intensity channels after it). They
//! are loaded transposed so that channels become rows: row 0 is the m/z
//! axis, remaining rows are intensity-like channels. Combined datasets are
//! written back transposed, comma-delimited, with fixed 6-decimal
//! formatting.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Errors raised while reading or writing matrices
#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    /// I/O error while reading or writing a matrix file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A value in the file could not be parsed as a number
    #[error("Non-numeric value {value:?} at line {line} of {path}")]
    NonNumericValue {
        /// File being read
        path: PathBuf,
        /// 1-indexed line number
        line: usize,
        /// Offending token
        value: String,
    },

    /// Lines of the file carry different numbers of values
    #[error("Ragged matrix in {path}: line {line} has {found} values, expected {expected}")]
    RaggedRows {
        /// File being read
        path: PathBuf,
        /// 1-indexed line number of the first mismatch
        line: usize,
        /// Values on that line
        found: usize,
        /// Values on the first line
        expected: usize,
    },

    /// The file contains no data rows
    #[error("Empty matrix file: {0}")]
    Empty(PathBuf),
}

/// A row-major numeric matrix with uniform row width.
///
/// Rows are channels, columns are samples along the acquisition axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: Vec<Vec<f64>>,
}

impl Matrix {
    /// Build a matrix from pre-validated rows. Callers must guarantee
    /// uniform row widths; readers in this module always do.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].len() == w[1].len()));
        Self { rows }
    }

    /// Load a converter artifact, transposing so that file columns become
    /// matrix rows (row 0 = m/z axis).
    pub fn read_transposed<P: AsRef<Path>>(path: P) -> Result<Self, MatrixError> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let mut records: Vec<Vec<f64>> = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut record = Vec::new();
            for token in line.split_whitespace() {
                let value =
                    token
                        .parse::<f64>()
                        .map_err(|_| MatrixError::NonNumericValue {
                            path: path.to_path_buf(),
                            line: idx + 1,
                            value: token.to_string(),
                        })?;
                record.push(value);
            }
            if let Some(first) = records.first() {
                if record.len() != first.len() {
                    return Err(MatrixError::RaggedRows {
                        path: path.to_path_buf(),
                        line: idx + 1,
                        found: record.len(),
                        expected: first.len(),
                    });
                }
            }
            records.push(record);
        }

        if records.is_empty() || records[0].is_empty() {
            return Err(MatrixError::Empty(path.to_path_buf()));
        }

        // Transpose: one matrix row per file column.
        let n_channels = records[0].len();
        let mut rows = vec![Vec::with_capacity(records.len()); n_channels];
        for record in &records {
            for (row, value) in rows.iter_mut().zip(record) {
                row.push(*value);
            }
        }

        Ok(Self { rows })
    }

    /// Number of rows (channels).
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (samples). Zero for an empty matrix.
    pub fn n_cols(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Borrow one row.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.rows[i]
    }

    /// Mutably borrow one row.
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.rows[i]
    }

    /// Right-pad every row with zeros up to `width` columns. Rows already
    /// that wide are untouched; padding is "no data", not measurement.
    pub fn pad_columns(&mut self, width: usize) {
        for row in &mut self.rows {
            if row.len() < width {
                row.resize(width, 0.0);
            }
        }
    }

    /// Append another matrix's rows below this one's. Both must have been
    /// reconciled to the same column count first.
    pub fn append_rows(&mut self, other: Matrix) {
        debug_assert_eq!(self.n_cols(), other.n_cols());
        self.rows.extend(other.rows);
    }

    /// Write the matrix transposed (one line per column), comma-delimited,
    /// every value formatted with 6 decimal places.
    pub fn write_transposed_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), MatrixError> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);

        for col in 0..self.n_cols() {
            for (i, row) in self.rows.iter().enumerate() {
                if i > 0 {
                    out.write_all(b",")?;
                }
                write!(out, "{:.6}", row[col])?;
            }
            out.write_all(b"\n")?;
        }

        out.flush()?;
        Ok(())
    }
}

/// Pad the narrower of two matrices with zero-valued columns on the right
/// until both have the same column count. Equal widths pass through
/// untouched; row counts are preserved independently.
pub fn reconcile(mut a: Matrix, mut b: Matrix) -> (Matrix, Matrix) {
    let width = a.n_cols().max(b.n_cols());
    a.pad_columns(width);
    b.pad_columns(width);
    (a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write as _;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_transposed() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "ms.txt", "100.0 10\n101.0 20\n102.0 30\n");

        let m = Matrix::read_transposed(&path).unwrap();
        assert_eq!(m.n_rows(), 2);
        assert_eq!(m.n_cols(), 3);
        assert_eq!(m.row(0), &[100.0, 101.0, 102.0]);
        assert_eq!(m.row(1), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_read_rejects_ragged_rows() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "bad.txt", "100.0 10\n101.0\n");

        let err = Matrix::read_transposed(&path).unwrap_err();
        assert!(matches!(err, MatrixError::RaggedRows { line: 2, .. }));
    }

    #[test]
    fn test_read_rejects_non_numeric() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "bad.txt", "100.0 ten\n");

        let err = Matrix::read_transposed(&path).unwrap_err();
        assert!(matches!(err, MatrixError::NonNumericValue { line: 1, .. }));
    }

    #[test]
    fn test_read_rejects_empty_file() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "empty.txt", "\n\n");

        let err = Matrix::read_transposed(&path).unwrap_err();
        assert!(matches!(err, MatrixError::Empty(_)));
    }

    #[test]
    fn test_reconcile_pads_shorter_with_zeros() {
        let a = Matrix::from_rows(vec![vec![0., 1., 2., 3., 4., 5., 6., 7., 8.]]);
        let b = Matrix::from_rows(vec![vec![6., 7., 8.]]);

        let (a, b) = reconcile(a, b);
        assert_eq!(a.n_cols(), 9);
        assert_eq!(b.n_cols(), 9);
        assert_eq!(b.row(0), &[6., 7., 8., 0., 0., 0., 0., 0., 0.]);
        // The wider matrix is unchanged.
        assert_eq!(a.row(0), &[0., 1., 2., 3., 4., 5., 6., 7., 8.]);
    }

    #[test]
    fn test_reconcile_equal_widths_untouched() {
        let a = Matrix::from_rows(vec![vec![1., 2.], vec![3., 4.]]);
        let b = Matrix::from_rows(vec![vec![5., 6.]]);

        let (a2, b2) = reconcile(a.clone(), b.clone());
        assert_eq!(a2, a);
        assert_eq!(b2, b);
    }

    #[test]
    fn test_write_transposed_csv_fixed_point() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let m = Matrix::from_rows(vec![vec![100.5, 101.25], vec![10.0, 20.0]]);
        m.write_transposed_csv(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "100.500000,10.000000\n101.250000,20.000000\n");
    }

    proptest! {
        /// Reconciled matrices always have equal column counts, equal to the
        /// wider input; row counts are preserved.
        #[test]
        fn prop_reconcile_widths(
            a_rows in 1usize..4, a_cols in 1usize..20,
            b_rows in 1usize..4, b_cols in 1usize..20,
        ) {
            let a = Matrix::from_rows(vec![vec![1.0; a_cols]; a_rows]);
            let b = Matrix::from_rows(vec![vec![2.0; b_cols]; b_rows]);
            let max = a_cols.max(b_cols);

            let (a, b) = reconcile(a, b);
            prop_assert_eq!(a.n_cols(), b.n_cols());
            prop_assert_eq!(a.n_cols(), max);
            prop_assert_eq!(a.n_rows(), a_rows);
            prop_assert_eq!(b.n_rows(), b_rows);
        }
    }
}
