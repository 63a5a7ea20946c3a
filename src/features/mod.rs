//! Feature assembly from lagged periodic series.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use hydromet_forecast::core::PeriodCalendar;
//! use hydromet_forecast::features::aggregate_feature_dates;
//!
//! let target = NaiveDate::from_ymd_opt(2017, 10, 11).unwrap();
//! let dates = aggregate_feature_dates(
//!     &PeriodCalendar::Decadal,
//!     target,
//!     0,
//!     &[2],
//!     &[PeriodCalendar::Decadal],
//! )
//! .unwrap();
//!
//! assert_eq!(dates[0][0], NaiveDate::from_ymd_opt(2017, 10, 1).unwrap());
//! assert_eq!(dates[0][1], NaiveDate::from_ymd_opt(2017, 9, 21).unwrap());
//! ```

mod lag;

pub use lag::{aggregate_feature_dates, aggregate_feature_vector, issue_date, FeatureAggregator};
