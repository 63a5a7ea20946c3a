//! Accuracy metrics for forecast evaluation.

use crate::error::{ForecastError, Result};

/// Accuracy metrics for paired observed and forecast values.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyMetrics {
    /// Number of pairs the metrics are computed from
    pub n: usize,
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean of forecast minus observed
    pub bias: f64,
    /// Squared Pearson correlation (`NaN` when either side is constant)
    pub r_squared: f64,
    /// Nash-Sutcliffe efficiency (1 is perfect, 0 is no better than the observed mean)
    pub nse: f64,
}

/// Calculate accuracy metrics between observed and predicted values.
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<AccuracyMetrics> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::InsufficientData {
            needed: 1,
            got: 0,
        });
    }

    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    let n = actual.len() as f64;

    let mae: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n;

    let mse: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n;

    let bias: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| p - a)
        .sum::<f64>()
        / n;

    let mean_actual = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
    let nse = if ss_tot == 0.0 {
        if mse == 0.0 {
            1.0
        } else {
            f64::NEG_INFINITY
        }
    } else {
        1.0 - mse * n / ss_tot
    };

    let mean_predicted = predicted.iter().sum::<f64>() / n;
    let ss_pred: f64 = predicted.iter().map(|p| (p - mean_predicted).powi(2)).sum();
    let covariance: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - mean_actual) * (p - mean_predicted))
        .sum();
    let r_squared = if ss_tot == 0.0 || ss_pred == 0.0 {
        f64::NAN
    } else {
        covariance.powi(2) / (ss_tot * ss_pred)
    };

    Ok(AccuracyMetrics {
        n: actual.len(),
        mae,
        mse,
        rmse: mse.sqrt(),
        bias,
        r_squared,
        nse,
    })
}
