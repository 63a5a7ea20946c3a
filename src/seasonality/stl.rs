//! STL (Seasonal-Trend decomposition using LOESS).
//!
//! STL decomposes a series into three components:
//! - Trend: The underlying long-term pattern
//! - Seasonal: The repeating seasonal pattern
//! - Remainder: The residual after removing trend and seasonal
//!
//! The local regressions are simplified to tricube-weighted means.

use crate::error::{ForecastError, Result};
use crate::utils::stats::variance;

/// Result of STL decomposition.
#[derive(Debug, Clone)]
pub struct STLResult {
    /// Trend component.
    pub trend: Vec<f64>,
    /// Seasonal component.
    pub seasonal: Vec<f64>,
    /// Remainder component.
    pub remainder: Vec<f64>,
}

impl STLResult {
    /// Get the seasonal strength (0 to 1).
    /// Values close to 1 indicate strong seasonality.
    pub fn seasonal_strength(&self) -> f64 {
        let seasonal_plus_remainder: Vec<f64> = self
            .seasonal
            .iter()
            .zip(&self.remainder)
            .map(|(s, r)| s + r)
            .collect();
        let var_sr = variance(&seasonal_plus_remainder);
        if var_sr.is_nan() || var_sr < 1e-10 {
            return 0.0;
        }
        (1.0 - variance(&self.remainder) / var_sr).max(0.0)
    }

    /// Seasonal component plus remainder removed from the trend, i.e. the
    /// deseasonalized series.
    pub fn deseasonalized(&self) -> Vec<f64> {
        self.trend
            .iter()
            .zip(&self.remainder)
            .map(|(t, r)| t + r)
            .collect()
    }
}

/// STL decomposition configuration and algorithm.
#[derive(Debug, Clone)]
pub struct STL {
    /// Seasonal period.
    seasonal_period: usize,
    /// Seasonal smoothing span (ns).
    seasonal_smoothness: usize,
    /// Trend smoothing span (nt).
    trend_smoothness: usize,
    /// Low-pass filter span (nl).
    low_pass_smoothness: usize,
    /// Number of inner iterations.
    inner_iterations: usize,
    /// Number of outer (robustness) iterations, 0 for non-robust fitting.
    outer_iterations: usize,
}

impl STL {
    /// Create a new STL decomposer with the given seasonal period.
    pub fn new(seasonal_period: usize) -> Self {
        // Default parameters following Cleveland et al. (1990)
        let ns = seasonal_period.max(2);
        let nt = (1.5 * ns as f64 / (1.0 - 1.5 / ns as f64)).ceil() as usize;

        Self {
            seasonal_period,
            seasonal_smoothness: ns | 1,
            trend_smoothness: nt | 1,
            low_pass_smoothness: seasonal_period | 1,
            inner_iterations: 2,
            outer_iterations: 0,
        }
    }

    /// Enable robust fitting with default iterations.
    pub fn robust(mut self) -> Self {
        self.outer_iterations = 6;
        self
    }

    /// Decompose a gap-free series.
    ///
    /// At least two full seasonal cycles are required.
    pub fn decompose(&self, series: &[f64]) -> Result<STLResult> {
        let n = series.len();
        let needed = 2 * self.seasonal_period;
        if self.seasonal_period < 2 || n < needed {
            return Err(ForecastError::InsufficientData {
                needed: needed.max(4),
                got: n,
            });
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ComputationError(
                "STL requires a gap-free series".into(),
            ));
        }

        let mut seasonal = vec![0.0; n];
        let mut trend = vec![0.0; n];
        let mut weights = vec![1.0; n];

        for outer in 0..=self.outer_iterations {
            if outer > 0 {
                let remainder = remainder_of(series, &seasonal, &trend);
                weights = robustness_weights(&remainder);
            }

            for _ in 0..self.inner_iterations {
                let detrended: Vec<f64> =
                    series.iter().zip(&trend).map(|(y, t)| y - t).collect();

                let cycle = self.smooth_cycle_subseries(&detrended, &weights);
                let low_pass = self.low_pass_filter(&cycle);
                for i in 0..n {
                    seasonal[i] = cycle[i] - low_pass[i];
                }

                let deseasonalized: Vec<f64> =
                    series.iter().zip(&seasonal).map(|(y, s)| y - s).collect();
                trend = tricube_smooth(&deseasonalized, self.trend_smoothness, &weights);
            }
        }

        let remainder = remainder_of(series, &seasonal, &trend);
        Ok(STLResult {
            trend,
            seasonal,
            remainder,
        })
    }

    /// Smooth each cycle-subseries (all values sharing a position in the cycle).
    fn smooth_cycle_subseries(&self, detrended: &[f64], weights: &[f64]) -> Vec<f64> {
        let period = self.seasonal_period;
        let mut result = vec![0.0; detrended.len()];

        for cycle_pos in 0..period {
            let indices: Vec<usize> = (cycle_pos..detrended.len()).step_by(period).collect();
            let values: Vec<f64> = indices.iter().map(|&i| detrended[i]).collect();
            let sub_weights: Vec<f64> = indices.iter().map(|&i| weights[i]).collect();

            let smoothed = tricube_smooth(&values, self.seasonal_smoothness, &sub_weights);
            for (&idx, value) in indices.iter().zip(smoothed) {
                result[idx] = value;
            }
        }

        result
    }

    /// Low-pass filter: MA(period), MA(period), MA(3), then smoothing.
    fn low_pass_filter(&self, series: &[f64]) -> Vec<f64> {
        let period = self.seasonal_period;
        let ma = moving_average(&moving_average(&moving_average(series, period), period), 3);
        tricube_smooth(&ma, self.low_pass_smoothness, &vec![1.0; series.len()])
    }
}

impl Default for STL {
    fn default() -> Self {
        Self::new(12)
    }
}

fn remainder_of(series: &[f64], seasonal: &[f64], trend: &[f64]) -> Vec<f64> {
    series
        .iter()
        .zip(seasonal)
        .zip(trend)
        .map(|((y, s), t)| y - s - t)
        .collect()
}

/// Centered moving average, truncated at the edges.
fn moving_average(series: &[f64], window: usize) -> Vec<f64> {
    let n = series.len();
    let half = window / 2;
    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(n);
            series[start..end].iter().sum::<f64>() / (end - start) as f64
        })
        .collect()
}

/// Tricube-weighted local mean over a window of `span` points.
fn tricube_smooth(values: &[f64], span: usize, weights: &[f64]) -> Vec<f64> {
    let n = values.len();
    let half_span = span / 2;
    let max_dist = half_span as f64 + 1.0;

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half_span);
            let end = (i + half_span + 1).min(n);

            let mut sum_weights = 0.0;
            let mut sum_values = 0.0;
            for j in start..end {
                let u = i.abs_diff(j) as f64 / max_dist;
                let w = (1.0 - u.powi(3)).powi(3) * weights[j];
                sum_weights += w;
                sum_values += w * values[j];
            }

            if sum_weights > 0.0 {
                sum_values / sum_weights
            } else {
                values[i]
            }
        })
        .collect()
}

/// Bisquare weights from the remainder, scaled by six times its median magnitude.
fn robustness_weights(remainder: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = remainder.iter().map(|r| r.abs()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };

    let h = 6.0 * median;
    remainder
        .iter()
        .map(|r| {
            if h < 1e-10 {
                return 1.0;
            }
            let u = r.abs() / h;
            if u < 1.0 {
                (1.0 - u * u).powi(2)
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_seasonal_series(n: usize, period: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let trend = 0.1 * i as f64;
                let seasonal = 10.0 * (2.0 * std::f64::consts::PI * i as f64 / period as f64).sin();
                trend + seasonal
            })
            .collect()
    }

    #[test]
    fn stl_components_add_up() {
        let series = generate_seasonal_series(120, 12);
        let result = STL::new(12).decompose(&series).unwrap();

        assert_eq!(result.trend.len(), series.len());
        for i in 0..series.len() {
            let reconstructed = result.trend[i] + result.seasonal[i] + result.remainder[i];
            assert!(
                (series[i] - reconstructed).abs() < 1e-10,
                "Reconstruction failed at index {}",
                i
            );
        }
        let deseasonalized = result.deseasonalized();
        for i in 0..series.len() {
            assert!((deseasonalized[i] + result.seasonal[i] - series[i]).abs() < 1e-10);
        }
    }

    #[test]
    fn stl_detects_seasonality() {
        let series = generate_seasonal_series(120, 12);
        let result = STL::new(12).decompose(&series).unwrap();
        assert!(result.seasonal_strength() > 0.5);
    }

    #[test]
    fn stl_constant_series() {
        let result = STL::new(10).decompose(&[5.0; 100]).unwrap();
        for &s in &result.seasonal {
            assert!(s.abs() < 1e-6, "Seasonal should be near zero");
        }
        assert_eq!(result.seasonal_strength(), 0.0);
    }

    #[test]
    fn stl_insufficient_data() {
        let result = STL::new(12).decompose(&[1.0; 10]);
        assert!(matches!(
            result,
            Err(ForecastError::InsufficientData { needed: 24, got: 10 })
        ));
    }

    #[test]
    fn stl_rejects_gaps() {
        let mut series = generate_seasonal_series(48, 12);
        series[5] = f64::NAN;
        assert!(STL::new(12).decompose(&series).is_err());
    }

    #[test]
    fn stl_robust_decomposition() {
        let mut series = generate_seasonal_series(120, 12);
        series[30] = 100.0;
        series[60] = -100.0;

        let result = STL::new(12).robust().decompose(&series).unwrap();
        assert!(result.seasonal_strength() > 0.1);
    }

    #[test]
    fn stl_short_periods() {
        assert!(STL::new(4).decompose(&generate_seasonal_series(40, 4)).is_ok());
        assert!(STL::new(2).decompose(&generate_seasonal_series(8, 2)).is_ok());
    }
}
