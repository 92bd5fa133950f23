//! Feature table carriers.

use anyhow::{ensure, Result};

use crate::domain::Emotion;

/// A dense row-major f32 matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
}

impl FeatureMatrix {
    /// Wraps a row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer length does not match the shape.
    pub fn new(data: Vec<f32>, rows: usize, cols: usize) -> Result<Self> {
        ensure!(
            data.len() == rows * cols,
            "matrix buffer holds {} values, expected {rows}x{cols}",
            data.len()
        );
        Ok(Self { data, rows, cols })
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// One row as a slice.
    #[must_use]
    pub fn row(&self, index: usize) -> &[f32] {
        &self.data[index * self.cols..(index + 1) * self.cols]
    }

    /// The full row-major buffer.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// A new matrix holding the given rows, in the given order.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Self {
            data,
            rows: indices.len(),
            cols: self.cols,
        }
    }
}

/// The loaded feature table: column names, feature matrix, and labels.
///
/// The classifier's input width is `feature_names.len()`, taken from the
/// data rather than hard-coded.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    /// Feature column names, in file order.
    pub feature_names: Vec<String>,
    /// One row per extracted image.
    pub features: FeatureMatrix,
    /// Emotion label per row.
    pub labels: Vec<Emotion>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_shape() {
        assert!(FeatureMatrix::new(vec![0.0; 6], 2, 3).is_ok());
        assert!(FeatureMatrix::new(vec![0.0; 5], 2, 3).is_err());
    }

    #[test]
    fn test_row_access() {
        let m = FeatureMatrix::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        assert_eq!(m.row(0), &[1.0, 2.0]);
        assert_eq!(m.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_select_reorders_rows() {
        let m = FeatureMatrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2).unwrap();
        let s = m.select(&[2, 0]);

        assert_eq!(s.rows(), 2);
        assert_eq!(s.row(0), &[5.0, 6.0]);
        assert_eq!(s.row(1), &[1.0, 2.0]);
    }
}
