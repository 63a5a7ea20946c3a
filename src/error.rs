//! Error types for the hydromet-forecast library.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while configuring, training or evaluating a forecaster.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Feature series given at prediction time do not match the configured ones.
    #[error("feature series mismatch: expected calendars [{expected}], got [{got}]")]
    FeatureMismatch { expected: String, got: String },

    /// Two series that must share a calendar do not.
    #[error("calendar mismatch: expected {expected}, got {got}")]
    CalendarMismatch { expected: String, got: String },

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Date-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// No usable training sample was found for a partition.
    #[error("insufficient data: no training samples for annual index {annual_index}")]
    EmptyPartition { annual_index: usize },

    /// The feature vector for a date contains missing values.
    #[error("insufficient data: feature data missing to predict {date}")]
    MissingFeatures { date: NaiveDate },

    /// Cross-validation cannot honour the requested fold count.
    #[error("insufficient data: cannot run {requested}-fold cross-validation, smallest group has {available} samples")]
    InsufficientFolds { requested: usize, available: usize },

    /// Model has not been trained yet.
    #[error("model must be trained before prediction")]
    FitRequired,

    /// The estimator of a partition failed.
    #[error("estimator failed for annual index {annual_index}: {reason}")]
    Estimator { annual_index: usize, reason: String },

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}

impl ForecastError {
    /// True for every variant that signals missing or too little data.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. }
                | Self::EmptyPartition { .. }
                | Self::MissingFeatures { .. }
                | Self::InsufficientFolds { .. }
        )
    }
}
