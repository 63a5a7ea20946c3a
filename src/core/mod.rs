//! Core data structures: period calendars and periodic series.

mod calendar;
mod series;

pub use calendar::PeriodCalendar;
pub use series::PeriodicSeries;
