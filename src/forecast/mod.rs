//! Periodic forecasting engine.
//!
//! A [`ForecastEngine`] fits one estimator per annual index of the target
//! calendar (or a single shared one) on feature values read some lag before
//! each target period, then forecasts and cross-validates.

mod config;
mod cross_validation;
mod engine;
mod partition;

pub use config::ForecasterConfig;
pub use cross_validation::{fold_bounds, KFold, MAX_AUTO_FOLDS};
pub use engine::{ForecastEngine, TrainingCoverage};
pub use partition::{PartitionSlot, PartitionedModel};
