//! Standardization of targets and feature matrices.
//!
//! Scalers are fitted on training data only and then applied unchanged to new
//! data, so every partition of a forecaster keeps its own fitted parameters.

use crate::error::{ForecastError, Result};

/// Zero-mean, unit-variance scaling of a single variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardScaler {
    /// Mean of the fitted data
    pub center: f64,
    /// Sample standard deviation of the fitted data (1.0 for constant data)
    pub scale: f64,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::identity()
    }
}

impl StandardScaler {
    /// Scaler that leaves values unchanged.
    pub fn identity() -> Self {
        Self {
            center: 0.0,
            scale: 1.0,
        }
    }

    /// Fit on `values`.
    ///
    /// x_scaled = (x - mean) / std
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::identity();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let variance = if values.len() > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };
        let std = variance.sqrt();

        Self {
            center: mean,
            scale: if std < 1e-10 { 1.0 } else { std },
        }
    }

    pub fn transform(&self, x: f64) -> f64 {
        (x - self.center) / self.scale
    }

    pub fn inverse(&self, x: f64) -> f64 {
        x * self.scale + self.center
    }

    pub fn transform_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&x| self.transform(x)).collect()
    }
}

/// Column-wise standardization of a row-major feature matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureScaler {
    columns: Vec<StandardScaler>,
}

impl FeatureScaler {
    /// Fit one scaler per column of `rows`.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let width = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(ForecastError::DimensionMismatch {
                expected: width,
                got: bad.len(),
            });
        }
        let columns = (0..width)
            .map(|j| {
                let column: Vec<f64> = rows.iter().map(|r| r[j]).collect();
                StandardScaler::fit(&column)
            })
            .collect();
        Ok(Self { columns })
    }

    /// Number of columns the scaler was fitted on.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.columns.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(&self.columns)
            .map(|(&x, scaler)| scaler.transform(x))
            .collect())
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn standard_scaler_basic() {
        let scaler = StandardScaler::fit(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        // Mean should be 3, std should be sqrt(2.5)
        assert_relative_eq!(scaler.center, 3.0, epsilon = 1e-10);
        assert_relative_eq!(scaler.scale, 2.5_f64.sqrt(), epsilon = 1e-10);

        let scaled = scaler.transform_all(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mean: f64 = scaled.iter().sum::<f64>() / scaled.len() as f64;
        assert_relative_eq!(mean, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn standard_scaler_constant() {
        let scaler = StandardScaler::fit(&[5.0; 10]);

        assert_relative_eq!(scaler.center, 5.0, epsilon = 1e-10);
        // Scale should be 1.0 (default) since std = 0
        assert_relative_eq!(scaler.scale, 1.0, epsilon = 1e-10);
        assert_relative_eq!(scaler.transform(5.0), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn standard_scaler_single_value() {
        let scaler = StandardScaler::fit(&[7.0]);
        assert_relative_eq!(scaler.center, 7.0, epsilon = 1e-10);
        assert_relative_eq!(scaler.scale, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn standard_scaler_empty_is_identity() {
        assert_eq!(StandardScaler::fit(&[]), StandardScaler::identity());
    }

    #[test]
    fn standard_scaler_inverse() {
        let scaler = StandardScaler::fit(&[0.0, 50.0, 100.0]);
        for x in [25.0, 75.0, -10.0] {
            assert_relative_eq!(scaler.inverse(scaler.transform(x)), x, epsilon = 1e-10);
        }
    }

    #[test]
    fn feature_scaler_scales_columns_independently() {
        let rows = vec![vec![1.0, 100.0], vec![2.0, 200.0], vec![3.0, 300.0]];
        let scaler = FeatureScaler::fit(&rows).unwrap();
        assert_eq!(scaler.width(), 2);

        let scaled = scaler.transform(&rows).unwrap();
        assert_relative_eq!(scaled[0][0], -1.0, epsilon = 1e-10);
        assert_relative_eq!(scaled[0][1], -1.0, epsilon = 1e-10);
        assert_relative_eq!(scaled[2][0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(scaled[2][1], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn feature_scaler_rejects_wrong_width() {
        let scaler = FeatureScaler::fit(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert!(scaler.transform_row(&[1.0]).is_err());
        assert!(FeatureScaler::fit(&[vec![1.0, 2.0], vec![3.0]]).is_err());
    }
}
