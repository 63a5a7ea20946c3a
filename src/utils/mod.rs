//! Utility functions shared by the estimators and the evaluation code.

pub mod metrics;
pub mod ols;
pub mod stats;

pub use metrics::{calculate_metrics, AccuracyMetrics};
pub use ols::{ols_fit, OLSResult};
pub use stats::{interpolate_gaps, mean, nan_mean, std_dev, variance};
