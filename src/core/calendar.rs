//! Fixed-index period calendars.
//!
//! Every scheme splits a year into the same number of periods, and every period
//! takes the same position in every year. A period is identified by its annual
//! index in `1..=max_index` and represented by its anchor, the first day of the
//! period.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Days preceding each month in a non-leap year.
const DAYS_BEFORE_MONTH: [u32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// A periodic scheme over the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PeriodCalendar {
    /// Calendar months, 12 periods.
    Monthly,
    /// Days 1-10, 11-20 and 21-end of each month, 36 periods.
    Decadal,
    /// Days 1-5, 6-10, 11-15, 16-20, 21-25 and 26-end of each month, 72 periods.
    Pentadal,
    /// Calendar days, 365 periods. February 29 belongs to the period of February 28.
    Daily,
    /// One synthetic period per year.
    ///
    /// The period is a 12-month block starting on the 1st of `start_month`;
    /// months `start_month..=end_month` (wrapping over the new year if needed)
    /// form the active window that finer series are aggregated over. Forecasts
    /// are issued on the 1st of `forecast_month` on or before the block start.
    Season {
        start_month: u32,
        end_month: u32,
        forecast_month: u32,
    },
}

impl PeriodCalendar {
    /// Create a season window calendar issued at the start of the season.
    pub fn season(start_month: u32, end_month: u32) -> Result<Self> {
        let calendar = Self::Season {
            start_month,
            end_month,
            forecast_month: start_month,
        };
        calendar.validate()?;
        Ok(calendar)
    }

    /// Set the month in which season forecasts are issued.
    ///
    /// Has no effect on the fixed schemes.
    pub fn with_forecast_month(self, month: u32) -> Result<Self> {
        let calendar = match self {
            Self::Season {
                start_month,
                end_month,
                ..
            } => Self::Season {
                start_month,
                end_month,
                forecast_month: month,
            },
            other => other,
        };
        calendar.validate()?;
        Ok(calendar)
    }

    /// Check that season months are valid month numbers.
    pub fn validate(&self) -> Result<()> {
        if let Self::Season {
            start_month,
            end_month,
            forecast_month,
        } = *self
        {
            for (name, month) in [
                ("start_month", start_month),
                ("end_month", end_month),
                ("forecast_month", forecast_month),
            ] {
                if !(1..=12).contains(&month) {
                    return Err(ForecastError::InvalidParameter(format!(
                        "season {} must be within 1..=12, got {}",
                        name, month
                    )));
                }
            }
        }
        Ok(())
    }

    /// Number of periods per year.
    pub fn max_index(&self) -> usize {
        match self {
            Self::Monthly => 12,
            Self::Decadal => 36,
            Self::Pentadal => 72,
            Self::Daily => 365,
            Self::Season { .. } => 1,
        }
    }

    /// Annual index (1-based) of the period containing `date`.
    pub fn index_of(&self, date: NaiveDate) -> usize {
        let month = date.month() as usize;
        let day = date.day() as usize;
        match self {
            Self::Monthly => month,
            Self::Decadal => (month - 1) * 3 + ((day - 1) / 10).min(2) + 1,
            Self::Pentadal => (month - 1) * 6 + ((day - 1) / 5).min(5) + 1,
            Self::Daily => {
                let day = if month == 2 && day == 29 { 28 } else { day };
                DAYS_BEFORE_MONTH[month - 1] as usize + day
            }
            Self::Season { .. } => 1,
        }
    }

    /// Year of the period containing `date`.
    ///
    /// Equals the calendar year except for season blocks, which belong to the
    /// year they start in.
    pub fn period_year(&self, date: NaiveDate) -> i32 {
        match self {
            Self::Season { start_month, .. } if date.month() < *start_month => date.year() - 1,
            _ => date.year(),
        }
    }

    /// First day of the period with annual index `index` in period-year `year`.
    pub fn first_day(&self, year: i32, index: usize) -> Result<NaiveDate> {
        if index == 0 || index > self.max_index() {
            return Err(ForecastError::InvalidParameter(format!(
                "annual index {} outside 1..={} for calendar {}",
                index,
                self.max_index(),
                self
            )));
        }
        let (month, day) = match self {
            Self::Monthly => (index as u32, 1),
            Self::Decadal => (((index - 1) / 3 + 1) as u32, (((index - 1) % 3) * 10 + 1) as u32),
            Self::Pentadal => (((index - 1) / 6 + 1) as u32, (((index - 1) % 6) * 5 + 1) as u32),
            Self::Daily => {
                let ordinal = index as u32;
                let month = DAYS_BEFORE_MONTH
                    .iter()
                    .rposition(|&before| before < ordinal)
                    .unwrap_or(0);
                (month as u32 + 1, ordinal - DAYS_BEFORE_MONTH[month])
            }
            Self::Season { start_month, .. } => (*start_month, 1),
        };
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            ForecastError::TimestampError(format!(
                "no date for year {} month {} day {}",
                year, month, day
            ))
        })
    }

    /// Anchor of the period containing `date`.
    pub fn anchor(&self, date: NaiveDate) -> Result<NaiveDate> {
        self.first_day(self.period_year(date), self.index_of(date))
    }

    /// True if `date` is the first day of its period.
    pub fn is_anchor(&self, date: NaiveDate) -> bool {
        self.anchor(date).map(|a| a == date).unwrap_or(false)
    }

    /// Anchor of the period `steps` periods after (or before, if negative) the
    /// period containing `date`.
    pub fn shift(&self, date: NaiveDate, steps: i64) -> Result<NaiveDate> {
        let max = self.max_index() as i64;
        let ordinal = self.period_year(date) as i64 * max + (self.index_of(date) as i64 - 1);
        let shifted = ordinal.checked_add(steps).ok_or_else(|| {
            ForecastError::TimestampError(format!("cannot shift {} by {} periods", date, steps))
        })?;
        let year = i32::try_from(shifted.div_euclid(max)).map_err(|_| {
            ForecastError::TimestampError(format!("cannot shift {} by {} periods", date, steps))
        })?;
        self.first_day(year, shifted.rem_euclid(max) as usize + 1)
    }

    /// Date on which a forecast for the period anchored at `anchor` is issued
    /// when no lag is applied.
    pub fn issue_date(&self, anchor: NaiveDate) -> Result<NaiveDate> {
        match self {
            Self::Season {
                start_month,
                forecast_month,
                ..
            } => {
                let months_back = (*start_month as i32 - *forecast_month as i32).rem_euclid(12);
                anchor
                    .checked_sub_months(Months::new(months_back as u32))
                    .ok_or_else(|| {
                        ForecastError::TimestampError(format!(
                            "no forecast date before {}",
                            anchor
                        ))
                    })
            }
            _ => Ok(anchor),
        }
    }

    /// True if `date` contributes to its period when aggregating finer series.
    pub fn in_window(&self, date: NaiveDate) -> bool {
        match self {
            Self::Season {
                start_month,
                end_month,
                ..
            } => {
                let month = date.month();
                if start_month <= end_month {
                    (*start_month..=*end_month).contains(&month)
                } else {
                    month >= *start_month || month <= *end_month
                }
            }
            _ => true,
        }
    }

    /// Validate that `target` is a coarser scheme whose periods are unions of
    /// this scheme's periods, and return it.
    pub fn downsample(&self, target: PeriodCalendar) -> Result<PeriodCalendar> {
        target.validate()?;
        let nested = match (self, &target) {
            (Self::Daily, Self::Daily) => false,
            (Self::Daily, _) => true,
            (Self::Pentadal, Self::Decadal | Self::Monthly | Self::Season { .. }) => true,
            (Self::Decadal, Self::Monthly | Self::Season { .. }) => true,
            (Self::Monthly, Self::Season { .. }) => true,
            _ => false,
        };
        if nested {
            Ok(target)
        } else {
            Err(ForecastError::InvalidParameter(format!(
                "cannot downsample calendar {} to {}",
                self, target
            )))
        }
    }
}

impl fmt::Display for PeriodCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly => write!(f, "m"),
            Self::Decadal => write!(f, "d"),
            Self::Pentadal => write!(f, "p"),
            Self::Daily => write!(f, "dl"),
            Self::Season {
                start_month,
                end_month,
                forecast_month,
            } if forecast_month == start_month => write!(f, "{:02}-{:02}", start_month, end_month),
            Self::Season {
                start_month,
                end_month,
                forecast_month,
            } => write!(f, "{:02}-{:02}@{:02}", start_month, end_month, forecast_month),
        }
    }
}

impl FromStr for PeriodCalendar {
    type Err = ForecastError;

    /// Parse a mode string: `m`, `d`, `p`, `dl`, a season window `MM-MM`, or
    /// a season window with its forecast month, `MM-MM@MM`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "m" => Ok(Self::Monthly),
            "d" => Ok(Self::Decadal),
            "p" => Ok(Self::Pentadal),
            "dl" => Ok(Self::Daily),
            other => {
                let invalid =
                    || ForecastError::InvalidParameter(format!("unknown calendar mode '{}'", other));
                let month = |m: &str| m.parse::<u32>().map_err(|_| invalid());
                let (window, forecast) = match other.split_once('@') {
                    Some((window, forecast)) => (window, Some(month(forecast)?)),
                    None => (other, None),
                };
                let (start, end) = window.split_once('-').ok_or_else(invalid)?;
                let season = Self::season(month(start)?, month(end)?)?;
                match forecast {
                    Some(forecast) => season.with_forecast_month(forecast),
                    None => Ok(season),
                }
            }
        }
    }
}
