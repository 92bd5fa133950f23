//! Per-column feature standardization.

// Allow common numeric code patterns
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use anyhow::{ensure, Result};

use super::FeatureMatrix;

/// Standardizes features to zero mean and unit variance per column.
///
/// Fitted on the training partition only and applied unchanged to the
/// test partition; the statistics never see test rows. The scaler is a
/// training-time tool and is not persisted into the exported model.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fits per-column mean and standard deviation.
    ///
    /// Accumulates in f64 and uses population variance. Zero-variance
    /// columns get scale 1.0 so they pass through unscaled.
    #[must_use]
    pub fn fit(matrix: &FeatureMatrix) -> Self {
        let cols = matrix.cols();
        let n = matrix.rows() as f64;

        let mut means = vec![0.0f64; cols];
        for r in 0..matrix.rows() {
            for (mean, &v) in means.iter_mut().zip(matrix.row(r)) {
                *mean += f64::from(v);
            }
        }
        for mean in &mut means {
            *mean /= n.max(1.0);
        }

        let mut variances = vec![0.0f64; cols];
        for r in 0..matrix.rows() {
            for ((var, mean), &v) in variances.iter_mut().zip(&means).zip(matrix.row(r)) {
                let d = f64::from(v) - mean;
                *var += d * d;
            }
        }

        let scales = variances
            .into_iter()
            .map(|var| {
                let std_dev = (var / n.max(1.0)).sqrt();
                if std_dev > 0.0 {
                    std_dev
                } else {
                    1.0
                }
            })
            .collect();

        Self { means, scales }
    }

    /// Applies the fitted transform to a matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if the column count does not match the fit.
    pub fn transform(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix> {
        ensure!(
            matrix.cols() == self.means.len(),
            "scaler fitted on {} columns, matrix has {}",
            self.means.len(),
            matrix.cols()
        );

        let mut data = Vec::with_capacity(matrix.rows() * matrix.cols());
        for r in 0..matrix.rows() {
            for ((&v, mean), scale) in matrix.row(r).iter().zip(&self.means).zip(&self.scales) {
                data.push(((f64::from(v) - mean) / scale) as f32);
            }
        }

        FeatureMatrix::new(data, matrix.rows(), matrix.cols())
    }

    /// Fitted mean for one column.
    #[must_use]
    pub fn mean(&self, col: usize) -> f64 {
        self.means[col]
    }

    /// Fitted scale (standard deviation) for one column.
    #[must_use]
    pub fn scale(&self, col: usize) -> f64 {
        self.scales[col]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[f32]]) -> FeatureMatrix {
        let cols = rows[0].len();
        let data: Vec<f32> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        FeatureMatrix::new(data, rows.len(), cols).unwrap()
    }

    #[test]
    fn test_transformed_train_is_standard() {
        let train = matrix(&[&[1.0, 10.0], &[2.0, 20.0], &[3.0, 30.0]]);
        let scaler = StandardScaler::fit(&train);
        let scaled = scaler.transform(&train).unwrap();

        for col in 0..2 {
            let values: Vec<f64> = (0..scaled.rows())
                .map(|r| f64::from(scaled.row(r)[col]))
                .collect();
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let var =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

            assert!(mean.abs() < 1e-6, "column {col} mean should be ~0");
            assert!((var - 1.0).abs() < 1e-5, "column {col} variance should be ~1");
        }
    }

    #[test]
    fn test_transform_uses_train_statistics_only() {
        let train = matrix(&[&[0.0], &[2.0]]);
        let test = matrix(&[&[4.0]]);

        let scaler = StandardScaler::fit(&train);
        let scaled = scaler.transform(&test).unwrap();

        // mean 1, std 1 from the train partition: (4 - 1) / 1 = 3
        assert!((scaled.row(0)[0] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_order_does_not_change_coefficients() {
        let train = matrix(&[&[1.0], &[5.0], &[9.0]]);
        let a = StandardScaler::fit(&train);
        let b = StandardScaler::fit(&train);

        assert!((a.mean(0) - b.mean(0)).abs() < f64::EPSILON);
        assert!((a.scale(0) - b.scale(0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_variance_column_passes_through() {
        let train = matrix(&[&[0.5, 1.0], &[0.5, 2.0]]);
        let scaler = StandardScaler::fit(&train);

        assert!((scaler.scale(0) - 1.0).abs() < f64::EPSILON);

        let scaled = scaler.transform(&train).unwrap();
        // Constant column centers to zero but is not divided by zero.
        assert!((scaled.row(0)[0] - 0.0).abs() < 1e-6);
        assert!((scaled.row(1)[0] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_transform_rejects_column_mismatch() {
        let train = matrix(&[&[1.0, 2.0]]);
        let scaler = StandardScaler::fit(&train);
        let narrow = matrix(&[&[1.0]]);

        assert!(scaler.transform(&narrow).is_err());
    }
}
