//! Periodic series: values keyed by period anchors of one calendar.

use super::calendar::PeriodCalendar;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use log::debug;
use std::collections::BTreeMap;

/// An immutable, ordered mapping from period anchor to value.
///
/// Missing periods are simply absent. A stored `NaN` is kept as-is and
/// treated as missing by the forecasting engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicSeries {
    calendar: PeriodCalendar,
    values: BTreeMap<NaiveDate, f64>,
}

impl PeriodicSeries {
    /// Build a series from `(date, value)` observations.
    ///
    /// Every date is normalized to the anchor of its period. Two observations
    /// falling into the same period are rejected, except that a daily
    /// February 29 is averaged into the February 28 period.
    pub fn new<I>(calendar: PeriodCalendar, observations: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        calendar.validate()?;
        let mut values = BTreeMap::new();
        let mut leap_days = BTreeMap::new();
        for (date, value) in observations {
            let anchor = calendar.anchor(date)?;
            let bucket = if is_folded_leap_day(calendar, date) {
                &mut leap_days
            } else {
                &mut values
            };
            if bucket.insert(anchor, value).is_some() {
                return Err(ForecastError::TimestampError(format!(
                    "duplicate observation for period starting {}",
                    anchor
                )));
            }
        }
        for (anchor, leap) in leap_days {
            let merged = match values.get(&anchor) {
                Some(&day) => nan_mean(day, leap),
                None => leap,
            };
            debug!("merged February 29 into the period starting {}", anchor);
            values.insert(anchor, merged);
        }
        Ok(Self { calendar, values })
    }

    /// Build a series of consecutive periods starting with the period of `start`.
    pub fn from_values(calendar: PeriodCalendar, start: NaiveDate, values: &[f64]) -> Result<Self> {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Ok((calendar.shift(start, i as i64)?, v)))
            .collect::<Result<Vec<_>>>()?;
        Self::new(calendar, observations)
    }

    /// Create an empty series.
    pub fn empty(calendar: PeriodCalendar) -> Self {
        Self {
            calendar,
            values: BTreeMap::new(),
        }
    }

    pub fn calendar(&self) -> PeriodCalendar {
        self.calendar
    }

    pub fn max_index(&self) -> usize {
        self.calendar.max_index()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value stored at exactly `date`, if any.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.values.get(&date).copied()
    }

    /// Value stored at exactly `date`, or `NaN` if absent.
    pub fn value_or_nan(&self, date: NaiveDate) -> f64 {
        self.get(date).unwrap_or(f64::NAN)
    }

    /// Iterate over `(anchor, value)` pairs in date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values.iter().map(|(&d, &v)| (d, v))
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.values.keys().copied().collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.values.values().copied().collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.values.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.values.keys().next_back().copied()
    }

    /// First and last period-year covered by the series.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let first = self.first_date()?;
        let last = self.last_date()?;
        Some((
            self.calendar.period_year(first),
            self.calendar.period_year(last),
        ))
    }

    /// Observations whose period has annual index `index`.
    pub fn data_by_index(&self, index: usize) -> Vec<(NaiveDate, f64)> {
        self.iter()
            .filter(|(d, _)| self.calendar.index_of(*d) == index)
            .collect()
    }

    /// New series holding only the given dates that are present in this one.
    pub fn restrict_to(&self, dates: &[NaiveDate]) -> Self {
        let values = dates
            .iter()
            .filter_map(|d| self.values.get(d).map(|&v| (*d, v)))
            .collect();
        Self {
            calendar: self.calendar,
            values,
        }
    }

    /// New series with every value replaced by `f(date, value)`.
    pub fn map_values<F>(&self, mut f: F) -> Self
    where
        F: FnMut(NaiveDate, f64) -> f64,
    {
        let values = self.iter().map(|(d, v)| (d, f(d, v))).collect();
        Self {
            calendar: self.calendar,
            values,
        }
    }

    /// Every period from the first to the last observation, `NaN` where absent.
    pub fn dense(&self) -> Result<Vec<(NaiveDate, f64)>> {
        let (Some(first), Some(last)) = (self.first_date(), self.last_date()) else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        let mut date = first;
        while date <= last {
            out.push((date, self.value_or_nan(date)));
            date = self.calendar.shift(date, 1)?;
        }
        Ok(out)
    }

    /// Aggregate into a coarser calendar by averaging.
    ///
    /// One value per coarse period: the mean of the contributing non-NaN
    /// values. Periods without any contributing value are dropped. For season
    /// calendars only periods inside the active window contribute.
    pub fn downsample(&self, target: PeriodCalendar) -> Result<Self> {
        let target = self.calendar.downsample(target)?;
        let mut sums: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for (date, value) in self.iter() {
            if value.is_nan() || !target.in_window(date) {
                continue;
            }
            let entry = sums.entry(target.anchor(date)?).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
        let values = sums
            .into_iter()
            .map(|(d, (sum, count))| (d, sum / count as f64))
            .collect();
        Ok(Self {
            calendar: target,
            values,
        })
    }

    /// Error unless `other` uses the same calendar.
    pub fn ensure_same_calendar(&self, other: &PeriodicSeries) -> Result<()> {
        if self.calendar != other.calendar {
            return Err(ForecastError::CalendarMismatch {
                expected: self.calendar.to_string(),
                got: other.calendar.to_string(),
            });
        }
        Ok(())
    }
}

fn is_folded_leap_day(calendar: PeriodCalendar, date: NaiveDate) -> bool {
    calendar == PeriodCalendar::Daily && date.month() == 2 && date.day() == 29
}

/// Mean of two values, ignoring a NaN side.
fn nan_mean(a: f64, b: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, _) => b,
        (_, true) => a,
        _ => (a + b) / 2.0,
    }
}
