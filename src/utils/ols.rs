//! Least-squares regression on a dense design matrix.
//!
//! Solves the (optionally ridge-penalized) normal equations with a Cholesky
//! decomposition. Used by the linear estimators in [`crate::models`].

use crate::error::{ForecastError, Result};

/// Fitted least-squares coefficients and intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct OLSResult {
    /// Regression coefficients (one per column).
    pub coefficients: Vec<f64>,
    /// Intercept term (0 when fitted without intercept).
    pub intercept: f64,
}

impl OLSResult {
    /// Predict one value per row of `rows`.
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter()
            .map(|row| {
                if row.len() != self.coefficients.len() {
                    return Err(ForecastError::DimensionMismatch {
                        expected: self.coefficients.len(),
                        got: row.len(),
                    });
                }
                Ok(self.intercept
                    + row
                        .iter()
                        .zip(&self.coefficients)
                        .map(|(x, b)| x * b)
                        .sum::<f64>())
            })
            .collect()
    }

    /// Get the number of regressors.
    pub fn num_regressors(&self) -> usize {
        self.coefficients.len()
    }
}

/// Fit `y = intercept + rows @ coefficients`.
///
/// `alpha` adds an L2 penalty to the coefficients (never to the intercept).
/// A tiny ridge term is always added to the diagonal for numerical stability.
pub fn ols_fit(rows: &[Vec<f64>], y: &[f64], fit_intercept: bool, alpha: f64) -> Result<OLSResult> {
    let n = y.len();
    if n == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    if rows.len() != n {
        return Err(ForecastError::DimensionMismatch {
            expected: n,
            got: rows.len(),
        });
    }
    let k = rows[0].len();
    if let Some(bad) = rows.iter().find(|r| r.len() != k) {
        return Err(ForecastError::DimensionMismatch {
            expected: k,
            got: bad.len(),
        });
    }

    // Design matrix columns: [1, x1, x2, ...] with intercept, [x1, x2, ...] without
    let offset = usize::from(fit_intercept);
    let num_params = k + offset;
    if num_params == 0 {
        return Ok(OLSResult {
            coefficients: Vec::new(),
            intercept: 0.0,
        });
    }

    let mut xtx = vec![vec![0.0; num_params]; num_params];
    let mut xty = vec![0.0; num_params];

    for (row, &y_obs) in rows.iter().zip(y) {
        let full = |j: usize| -> f64 {
            if fit_intercept && j == 0 {
                1.0
            } else {
                row[j - offset]
            }
        };
        for i in 0..num_params {
            let xi = full(i);
            xty[i] += xi * y_obs;
            for j in 0..=i {
                xtx[i][j] += xi * full(j);
            }
        }
    }
    for i in 0..num_params {
        for j in 0..i {
            xtx[j][i] = xtx[i][j];
        }
    }

    for i in 0..num_params {
        xtx[i][i] += 1e-8;
        if i >= offset {
            xtx[i][i] += alpha;
        }
    }

    let beta = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        ForecastError::ComputationError(
            "least squares failed: matrix not positive definite".into(),
        )
    })?;

    let intercept = if fit_intercept { beta[0] } else { 0.0 };
    Ok(OLSResult {
        intercept,
        coefficients: beta[offset..].to_vec(),
    })
}

/// Solve symmetric positive definite system using Cholesky decomposition.
///
/// Solves A @ x = b where A is symmetric positive definite.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // Cholesky decomposition A = L @ L'
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L' @ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn column(values: &[f64]) -> Vec<Vec<f64>> {
        values.iter().map(|&v| vec![v]).collect()
    }

    #[test]
    fn ols_fit_simple_linear() {
        // y = 2 + 3*x
        let y = vec![5.0, 8.0, 11.0, 14.0, 17.0];
        let x = column(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        let result = ols_fit(&x, &y, true, 0.0).unwrap();

        assert_relative_eq!(result.intercept, 2.0, epsilon = 1e-6);
        assert_eq!(result.num_regressors(), 1);
        assert_relative_eq!(result.coefficients[0], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn ols_fit_multiple_regressors() {
        // y = 1 + 2*x1 + 3*x2
        let x1 = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let x2 = [0.5, 2.5, 1.0, 3.0, 1.5, 3.5, 2.0, 4.0];
        let rows: Vec<Vec<f64>> = x1.iter().zip(&x2).map(|(a, b)| vec![*a, *b]).collect();
        let y: Vec<f64> = rows.iter().map(|r| 1.0 + 2.0 * r[0] + 3.0 * r[1]).collect();

        let result = ols_fit(&rows, &y, true, 0.0).unwrap();

        assert_relative_eq!(result.intercept, 1.0, epsilon = 1e-4);
        assert_relative_eq!(result.coefficients[0], 2.0, epsilon = 1e-4);
        assert_relative_eq!(result.coefficients[1], 3.0, epsilon = 1e-4);
    }

    #[test]
    fn ols_fit_without_intercept() {
        // y = 2*x, forced through the origin
        let x = column(&[1.0, 2.0, 3.0]);
        let y = vec![2.0, 4.0, 6.0];

        let result = ols_fit(&x, &y, false, 0.0).unwrap();

        assert_eq!(result.intercept, 0.0);
        assert_relative_eq!(result.coefficients[0], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn ridge_shrinks_coefficients() {
        let x = column(&[-2.0, -1.0, 0.0, 1.0, 2.0]);
        let y = vec![-4.0, -2.0, 0.0, 2.0, 4.0];

        let plain = ols_fit(&x, &y, true, 0.0).unwrap();
        let ridge = ols_fit(&x, &y, true, 10.0).unwrap();

        // sum(x^2) = 10, so the ridge slope is 20 / (10 + 10)
        assert_relative_eq!(plain.coefficients[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(ridge.coefficients[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(ridge.intercept, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn ols_predict() {
        let y = vec![5.0, 8.0, 11.0, 14.0, 17.0];
        let x = column(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        let result = ols_fit(&x, &y, true, 0.0).unwrap();
        let predictions = result.predict(&column(&[6.0, 7.0, 8.0])).unwrap();

        assert_eq!(predictions.len(), 3);
        assert_relative_eq!(predictions[0], 20.0, epsilon = 1e-5);
        assert_relative_eq!(predictions[1], 23.0, epsilon = 1e-5);
        assert_relative_eq!(predictions[2], 26.0, epsilon = 1e-5);
    }

    #[test]
    fn ols_fit_dimension_mismatch() {
        let y = vec![1.0, 2.0, 3.0];
        let x = column(&[1.0, 2.0]);
        assert!(ols_fit(&x, &y, true, 0.0).is_err());

        let ragged = vec![vec![1.0], vec![1.0, 2.0]];
        assert!(ols_fit(&ragged, &[1.0, 2.0], true, 0.0).is_err());
    }

    #[test]
    fn ols_predict_wrong_width() {
        let result = ols_fit(&column(&[1.0, 2.0, 3.0]), &[1.0, 2.0, 3.0], true, 0.0).unwrap();
        assert!(result.predict(&[vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn ols_with_noise() {
        let n = 100;
        let x: Vec<f64> = (0..n).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, &xi)| 2.5 + 1.7 * xi + (i as f64 * 0.13).sin() * 0.1)
            .collect();

        let result = ols_fit(&column(&x), &y, true, 0.0).unwrap();

        assert_relative_eq!(result.intercept, 2.5, epsilon = 0.1);
        assert_relative_eq!(result.coefficients[0], 1.7, epsilon = 0.1);
    }
}
