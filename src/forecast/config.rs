//! Forecaster configuration.

use crate::error::{ForecastError, Result};
use crate::models::RegressorConfig;
use serde::{Deserialize, Serialize};

/// Configuration of a [`ForecastEngine`](super::ForecastEngine).
///
/// ```
/// use hydromet_forecast::forecast::ForecasterConfig;
/// use hydromet_forecast::models::RegressorConfig;
///
/// let config = ForecasterConfig::default()
///     .with_lag(5)
///     .with_lag_lengths(vec![3, 1])
///     .with_regressor(RegressorConfig::ridge(0.1));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecasterConfig {
    /// Days between the issue date and the start of the target period.
    /// Negative values count days after the start of the preceding period.
    pub lag: i64,
    /// Number of past periods taken from each feature series. A zero skips
    /// that series; at least one length must be positive.
    pub lag_lengths: Vec<usize>,
    /// One estimator per annual index instead of a single shared one.
    pub multimodel: bool,
    /// Remove the seasonal component from the target before fitting.
    pub decompose: bool,
    /// Estimator fitted in every partition.
    pub regressor: RegressorConfig,
}

impl Default for ForecasterConfig {
    fn default() -> Self {
        Self {
            lag: 0,
            lag_lengths: vec![1],
            multimodel: true,
            decompose: false,
            regressor: RegressorConfig::default(),
        }
    }
}

impl ForecasterConfig {
    /// Set the forecast lag in days.
    pub fn with_lag(mut self, lag: i64) -> Self {
        self.lag = lag;
        self
    }

    /// Set the number of lagged periods per feature series.
    pub fn with_lag_lengths(mut self, lag_lengths: Vec<usize>) -> Self {
        self.lag_lengths = lag_lengths;
        self
    }

    pub fn with_multimodel(mut self, multimodel: bool) -> Self {
        self.multimodel = multimodel;
        self
    }

    pub fn with_decompose(mut self, decompose: bool) -> Self {
        self.decompose = decompose;
        self
    }

    pub fn with_regressor(mut self, regressor: RegressorConfig) -> Self {
        self.regressor = regressor;
        self
    }

    /// Check the configuration on its own, without any series.
    pub fn validate(&self) -> Result<()> {
        if self.lag_lengths.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "lag_lengths must name at least one feature series".into(),
            ));
        }
        if self.lag_lengths.iter().all(|&l| l == 0) {
            return Err(ForecastError::InvalidParameter(
                "lag_lengths must take at least one past period".into(),
            ));
        }
        self.regressor.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ForecasterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.lag_lengths, vec![1]);
        assert!(config.multimodel);
        assert!(!config.decompose);
    }

    #[test]
    fn zero_lag_length_skips_a_feature() {
        let config = ForecasterConfig::default().with_lag_lengths(vec![2, 0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_feature_vector_is_rejected() {
        assert!(matches!(
            ForecasterConfig::default()
                .with_lag_lengths(vec![0, 0])
                .validate(),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(ForecasterConfig::default()
            .with_lag_lengths(vec![])
            .validate()
            .is_err());
    }

    #[test]
    fn invalid_regressor_is_rejected() {
        let config = ForecasterConfig::default().with_regressor(RegressorConfig::ridge(-1.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn builders_set_fields() {
        let config = ForecasterConfig::default()
            .with_lag(-3)
            .with_multimodel(false)
            .with_decompose(true);
        assert_eq!(config.lag, -3);
        assert!(!config.multimodel);
        assert!(config.decompose);
    }
}
