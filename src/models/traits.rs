//! Regressor trait defining the common interface for all estimators.

use crate::error::Result;
use std::fmt;

/// Common interface for the per-period estimators.
///
/// Rows of `x` are feature vectors, already standardized by the caller.
/// This trait is object-safe and can be used with `Box<dyn Regressor>`.
pub trait Regressor: fmt::Debug {
    /// Fit the estimator on feature rows `x` and targets `y`.
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()>;

    /// Predict one value per row of `x`.
    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>>;

    /// An unfitted estimator with the same configuration.
    fn fresh(&self) -> BoxedRegressor;

    /// Get the estimator name.
    fn name(&self) -> &str;

    /// Check if the estimator has been fitted.
    fn is_fitted(&self) -> bool;
}

/// Type alias for boxed regressor trait objects.
///
/// # Example
///
/// ```
/// use hydromet_forecast::models::{BoxedRegressor, LinearRegression, Regressor};
///
/// let model: BoxedRegressor = Box::new(LinearRegression::new());
/// assert_eq!(model.name(), "LinearRegression");
/// assert!(!model.fresh().is_fitted());
/// ```
pub type BoxedRegressor = Box<dyn Regressor>;
