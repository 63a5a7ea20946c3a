//! # hydromet-forecast
//!
//! Periodic hydro-meteorological forecasting.
//!
//! Target and feature observations live in [`core::PeriodicSeries`] keyed by
//! the periods of a [`core::PeriodCalendar`] (monthly, decadal, pentadal,
//! daily or a seasonal window). A [`forecast::ForecastEngine`] fits one
//! regression per period of the year on lagged feature values, forecasts new
//! periods, and cross-validates itself into a per-period skill score.

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod forecast;
pub mod models;
pub mod seasonality;
pub mod transform;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{PeriodCalendar, PeriodicSeries};
    pub use crate::error::{ForecastError, Result};
    pub use crate::evaluation::SkillEvaluator;
    pub use crate::forecast::{ForecastEngine, ForecasterConfig, KFold};
    pub use crate::models::{Regressor, RegressorConfig};
    pub use crate::utils::{calculate_metrics, AccuracyMetrics};
}
