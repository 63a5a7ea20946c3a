//! Typed estimator configuration.
//!
//! Each supported estimator kind carries its own parameter record, checked by
//! [`RegressorConfig::validate`] before anything is built.

use super::linear::LinearRegression;
use super::traits::BoxedRegressor;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Upper bound accepted for the ridge penalty.
pub const MAX_RIDGE_ALPHA: f64 = 1e6;

/// Estimator selection with its parameters.
///
/// ```
/// use hydromet_forecast::models::RegressorConfig;
///
/// let config = RegressorConfig::ridge(0.5);
/// config.validate().unwrap();
/// assert_eq!(config.build().unwrap().name(), "Ridge");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressorConfig {
    LinearRegression {
        #[serde(default = "default_true")]
        fit_intercept: bool,
    },
    Ridge {
        #[serde(default = "default_alpha")]
        alpha: f64,
        #[serde(default = "default_true")]
        fit_intercept: bool,
    },
}

fn default_true() -> bool {
    true
}

fn default_alpha() -> f64 {
    1.0
}

impl Default for RegressorConfig {
    fn default() -> Self {
        Self::LinearRegression {
            fit_intercept: true,
        }
    }
}

impl RegressorConfig {
    pub fn ridge(alpha: f64) -> Self {
        Self::Ridge {
            alpha,
            fit_intercept: true,
        }
    }

    pub fn kind(&self) -> RegressorKind {
        match self {
            Self::LinearRegression { .. } => RegressorKind::LinearRegression,
            Self::Ridge { .. } => RegressorKind::Ridge,
        }
    }

    /// Check every parameter against its domain.
    pub fn validate(&self) -> Result<()> {
        if let Self::Ridge { alpha, .. } = *self {
            if !(0.0..=MAX_RIDGE_ALPHA).contains(&alpha) {
                return Err(ForecastError::InvalidParameter(format!(
                    "ridge alpha must be in [0, {}], got {}",
                    MAX_RIDGE_ALPHA, alpha
                )));
            }
        }
        Ok(())
    }

    /// A fresh, unfitted estimator.
    pub fn build(&self) -> Result<BoxedRegressor> {
        self.validate()?;
        let model = match *self {
            Self::LinearRegression { fit_intercept } => {
                LinearRegression::new().with_intercept(fit_intercept)
            }
            Self::Ridge {
                alpha,
                fit_intercept,
            } => LinearRegression::ridge(alpha).with_intercept(fit_intercept),
        };
        Ok(Box::new(model))
    }
}

/// Domain of a single estimator parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterDomain {
    Flag { default: bool },
    Range { min: f64, max: f64, default: f64 },
}

/// Name and domain of an estimator parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub domain: ParameterDomain,
}

/// Supported estimator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressorKind {
    LinearRegression,
    Ridge,
}

impl RegressorKind {
    pub fn all() -> &'static [RegressorKind] {
        &[RegressorKind::LinearRegression, RegressorKind::Ridge]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LinearRegression => "LinearRegression",
            Self::Ridge => "Ridge",
        }
    }

    /// Parameters accepted by this kind.
    pub fn parameters(&self) -> Vec<ParameterSpec> {
        let intercept = ParameterSpec {
            name: "fit_intercept",
            domain: ParameterDomain::Flag { default: true },
        };
        match self {
            Self::LinearRegression => vec![intercept],
            Self::Ridge => vec![
                ParameterSpec {
                    name: "alpha",
                    domain: ParameterDomain::Range {
                        min: 0.0,
                        max: MAX_RIDGE_ALPHA,
                        default: default_alpha(),
                    },
                },
                intercept,
            ],
        }
    }

    /// Configuration of this kind with every parameter at its default.
    pub fn default_config(&self) -> RegressorConfig {
        match self {
            Self::LinearRegression => RegressorConfig::default(),
            Self::Ridge => RegressorConfig::ridge(default_alpha()),
        }
    }
}
