//! Feature standardization
//!
//! Standardizes each feature column to zero mean and unit variance. The
//! scaler is always fitted on training data only; the cross-validator fits a
//! fresh scaler per fold so validation data never leaks into the statistics.

use crate::core::{EvalError, FeatureMatrix, Result};
use log::warn;

/// How to handle a feature column with zero variance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    /// Map the constant column to all zeros and log a warning (default)
    #[default]
    ClampToZero,
    /// Fail fitting with `DegenerateFeature`
    Reject,
}

/// Per-feature standardization parameters: (x - mean) / std
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

/// Below this, a column's standard deviation counts as zero.
const STD_FLOOR: f64 = 1e-12;

impl StandardScaler {
    /// Fit per-feature mean and standard deviation with the default
    /// degenerate-feature policy (clamp to zero).
    pub fn fit(x: &FeatureMatrix) -> Result<Self> {
        Self::fit_with_policy(x, DegeneratePolicy::ClampToZero)
    }

    /// Fit with an explicit degenerate-feature policy.
    ///
    /// Standard deviation is the population deviation (ddof = 0), matching
    /// the convention of sklearn's `StandardScaler`.
    pub fn fit_with_policy(x: &FeatureMatrix, policy: DegeneratePolicy) -> Result<Self> {
        if x.is_empty() {
            return Err(EvalError::EmptyDataset);
        }

        let n = x.rows() as f64;
        let d = x.cols();

        let mut mean = vec![0.0; d];
        for row in x.iter_rows() {
            for (m, &v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut var = vec![0.0; d];
        for row in x.iter_rows() {
            for (j, &v) in row.iter().enumerate() {
                let diff = v - mean[j];
                var[j] += diff * diff;
            }
        }

        let mut std = Vec::with_capacity(d);
        for (j, v) in var.iter().enumerate() {
            let s = (v / n).sqrt();
            if s < STD_FLOOR {
                match policy {
                    DegeneratePolicy::Reject => {
                        return Err(EvalError::DegenerateFeature { index: j });
                    }
                    DegeneratePolicy::ClampToZero => {
                        warn!("feature column {j} is constant; scaled output will be all zeros");
                        std.push(0.0);
                        continue;
                    }
                }
            }
            std.push(s);
        }

        Ok(Self { mean, std })
    }

    /// Standardize a matrix with the fitted parameters.
    pub fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        if x.cols() != self.mean.len() {
            return Err(EvalError::DimensionMismatch {
                expected: self.mean.len(),
                actual: x.cols(),
            });
        }

        let mut data = Vec::with_capacity(x.rows() * x.cols());
        for row in x.iter_rows() {
            for (j, &v) in row.iter().enumerate() {
                data.push(self.scale_value(v, j));
            }
        }
        FeatureMatrix::from_vec(data, x.rows(), x.cols())
    }

    /// Standardize a single row.
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.mean.len() {
            return Err(EvalError::DimensionMismatch {
                expected: self.mean.len(),
                actual: row.len(),
            });
        }
        Ok(row
            .iter()
            .enumerate()
            .map(|(j, &v)| self.scale_value(v, j))
            .collect())
    }

    fn scale_value(&self, value: f64, j: usize) -> f64 {
        if self.std[j] == 0.0 {
            // Degenerate column under the clamp policy
            0.0
        } else {
            (value - self.mean[j]) / self.std[j]
        }
    }

    /// Fitted per-feature means
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Fitted per-feature standard deviations (0.0 marks a clamped column)
    pub fn std(&self) -> &[f64] {
        &self.std
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_transform_zero_mean_unit_variance() {
        let x = FeatureMatrix::from_rows(vec![
            vec![1.0, 10.0],
            vec![2.0, 20.0],
            vec![3.0, 30.0],
            vec![4.0, 40.0],
        ])
        .unwrap();

        let scaler = StandardScaler::fit(&x).unwrap();
        let scaled = scaler.transform(&x).unwrap();

        for j in 0..2 {
            let n = scaled.rows() as f64;
            let mean: f64 = scaled.iter_rows().map(|r| r[j]).sum::<f64>() / n;
            let var: f64 = scaled.iter_rows().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / n;

            assert_relative_eq!(mean, 0.0, epsilon = 1e-12);
            assert_relative_eq!(var, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_constant_feature_clamped_to_zero() {
        let x = FeatureMatrix::from_rows(vec![vec![5.0, 1.0], vec![5.0, 2.0], vec![5.0, 3.0]])
            .unwrap();

        let scaler = StandardScaler::fit(&x).unwrap();
        let scaled = scaler.transform(&x).unwrap();

        for row in scaled.iter_rows() {
            assert_eq!(row[0], 0.0);
        }
        assert_eq!(scaler.std()[0], 0.0);
    }

    #[test]
    fn test_constant_feature_rejected_under_strict_policy() {
        let x = FeatureMatrix::from_rows(vec![vec![1.0, 5.0], vec![2.0, 5.0]]).unwrap();

        let result = StandardScaler::fit_with_policy(&x, DegeneratePolicy::Reject);
        assert!(matches!(
            result,
            Err(EvalError::DegenerateFeature { index: 1 })
        ));
    }

    #[test]
    fn test_transform_uses_training_statistics() {
        let train = FeatureMatrix::from_rows(vec![vec![0.0], vec![2.0]]).unwrap();
        let scaler = StandardScaler::fit(&train).unwrap();

        // mean 1.0, std 1.0 -> 5.0 maps to 4.0 regardless of the new data
        let other = FeatureMatrix::from_rows(vec![vec![5.0]]).unwrap();
        let scaled = scaler.transform(&other).unwrap();
        assert_relative_eq!(scaled.row(0)[0], 4.0);
    }

    #[test]
    fn test_transform_dimension_mismatch() {
        let train = FeatureMatrix::from_rows(vec![vec![0.0, 1.0], vec![2.0, 3.0]]).unwrap();
        let scaler = StandardScaler::fit(&train).unwrap();

        let result = scaler.transform_row(&[1.0]);
        assert!(matches!(
            result,
            Err(EvalError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }
}
