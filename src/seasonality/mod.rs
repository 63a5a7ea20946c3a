//! Seasonal decomposition.
//!
//! - STL: Seasonal-Trend decomposition using LOESS
//! - Seasonal adjustment of a periodic series with per-index offsets

mod adjust;
mod stl;

pub use adjust::{seasonal_adjustment, SeasonalAdjustment};
pub use stl::{STLResult, STL};
