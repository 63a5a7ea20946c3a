//! Linear least-squares estimators.

use super::traits::{BoxedRegressor, Regressor};
use crate::error::{ForecastError, Result};
use crate::utils::ols::{ols_fit, OLSResult};

/// Ordinary least squares with an optional L2 penalty.
///
/// With `alpha == 0` this is plain linear regression, otherwise ridge
/// regression. The intercept is never penalized.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    fit_intercept: bool,
    alpha: f64,
    fitted: Option<OLSResult>,
}

impl LinearRegression {
    /// Plain linear regression with an intercept.
    pub fn new() -> Self {
        Self {
            fit_intercept: true,
            alpha: 0.0,
            fitted: None,
        }
    }

    /// Ridge regression with penalty `alpha`.
    pub fn ridge(alpha: f64) -> Self {
        Self::new().with_alpha(alpha)
    }

    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.max(0.0);
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn fit_intercept(&self) -> bool {
        self.fit_intercept
    }

    /// Fitted coefficients, one per feature.
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|r| r.coefficients.as_slice())
    }

    pub fn intercept(&self) -> Option<f64> {
        self.fitted.as_ref().map(|r| r.intercept)
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        self.fitted = Some(ols_fit(x, y, self.fit_intercept, self.alpha)?);
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        self.fitted
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .predict(x)
    }

    fn fresh(&self) -> BoxedRegressor {
        Box::new(Self {
            fit_intercept: self.fit_intercept,
            alpha: self.alpha,
            fitted: None,
        })
    }

    fn name(&self) -> &str {
        if self.alpha > 0.0 {
            "Ridge"
        } else {
            "LinearRegression"
        }
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}
