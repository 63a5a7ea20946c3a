//! Lagged feature assembly.
//!
//! A forecast for a target period is issued some days before the period starts
//! (the lag). Features are the values of each feature series in the periods
//! that were complete at the issue date, most recent first.

use crate::core::{PeriodCalendar, PeriodicSeries};
use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};

/// Issue date of a forecast for the period containing `target_date`.
///
/// A negative lag first moves the target back one period, so the lag counts
/// days after the start of the preceding period instead of days before the
/// start of the target period.
pub fn issue_date(target_calendar: &PeriodCalendar, target_date: NaiveDate, lag: i64) -> Result<NaiveDate> {
    let target_date = if lag < 0 {
        target_calendar.shift(target_date, -1)?
    } else {
        target_date
    };
    let anchor = target_calendar.anchor(target_date)?;
    target_calendar
        .issue_date(anchor)?
        .checked_sub_signed(Duration::days(lag))
        .ok_or_else(|| {
            ForecastError::TimestampError(format!("cannot apply lag of {} days to {}", lag, anchor))
        })
}

/// Dates to read from every feature series for a forecast of `target_date`.
///
/// For feature `i` the result holds `lag_lengths[i]` period anchors of that
/// feature's own calendar, walking back from the issue date, most recent first.
///
/// Decadal target 11-20 October, lag 0, lag length 2 gives
/// `[1 October, 21 September]`.
pub fn aggregate_feature_dates(
    target_calendar: &PeriodCalendar,
    target_date: NaiveDate,
    lag: i64,
    lag_lengths: &[usize],
    feature_calendars: &[PeriodCalendar],
) -> Result<Vec<Vec<NaiveDate>>> {
    if lag_lengths.len() != feature_calendars.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: feature_calendars.len(),
            got: lag_lengths.len(),
        });
    }
    let issue = issue_date(target_calendar, target_date, lag)?;
    feature_calendars
        .iter()
        .zip(lag_lengths)
        .map(|(calendar, &length)| {
            (1..=length as i64)
                .map(|step| calendar.shift(issue, -step))
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}

/// Flat feature vector for the given feature dates.
///
/// Layout is feature-major, most recent first:
/// `[f0(t-1), f0(t-2), ..., f1(t-1), ...]`. A date absent from its series
/// leaves `NaN` in that slot only.
pub fn aggregate_feature_vector(
    feature_dates: &[Vec<NaiveDate>],
    feature_series: &[&PeriodicSeries],
) -> Result<Vec<f64>> {
    if feature_dates.len() != feature_series.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: feature_dates.len(),
            got: feature_series.len(),
        });
    }
    Ok(feature_dates
        .iter()
        .zip(feature_series)
        .flat_map(|(dates, series)| dates.iter().map(move |&d| series.value_or_nan(d)))
        .collect())
}

/// Feature layout of one forecasting setup.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureAggregator {
    target_calendar: PeriodCalendar,
    feature_calendars: Vec<PeriodCalendar>,
    lag: i64,
    lag_lengths: Vec<usize>,
}

impl FeatureAggregator {
    pub fn new(
        target_calendar: PeriodCalendar,
        feature_calendars: Vec<PeriodCalendar>,
        lag: i64,
        lag_lengths: Vec<usize>,
    ) -> Result<Self> {
        if feature_calendars.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "at least one feature series is required".into(),
            ));
        }
        if lag_lengths.len() != feature_calendars.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "got {} lag lengths for {} feature series",
                lag_lengths.len(),
                feature_calendars.len()
            )));
        }
        Ok(Self {
            target_calendar,
            feature_calendars,
            lag,
            lag_lengths,
        })
    }

    pub fn feature_calendars(&self) -> &[PeriodCalendar] {
        &self.feature_calendars
    }

    /// Length of every feature vector.
    pub fn feature_count(&self) -> usize {
        self.lag_lengths.iter().sum()
    }

    pub fn feature_dates(&self, target_date: NaiveDate) -> Result<Vec<Vec<NaiveDate>>> {
        aggregate_feature_dates(
            &self.target_calendar,
            target_date,
            self.lag,
            &self.lag_lengths,
            &self.feature_calendars,
        )
    }

    /// Feature vector for `target_date` read from `feature_series`.
    pub fn feature_vector(
        &self,
        target_date: NaiveDate,
        feature_series: &[&PeriodicSeries],
    ) -> Result<Vec<f64>> {
        let dates = self.feature_dates(target_date)?;
        aggregate_feature_vector(&dates, feature_series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn decadal_dates(target: NaiveDate, lag: i64, length: usize) -> Vec<NaiveDate> {
        aggregate_feature_dates(
            &PeriodCalendar::Decadal,
            target,
            lag,
            &[length],
            &[PeriodCalendar::Decadal],
        )
        .unwrap()
        .remove(0)
    }

    #[test]
    fn lag_zero_uses_preceding_periods() {
        assert_eq!(
            decadal_dates(date(2017, 10, 11), 0, 2),
            vec![date(2017, 10, 1), date(2017, 9, 21)]
        );
        assert_eq!(
            decadal_dates(date(2017, 8, 25), 0, 2),
            vec![date(2017, 8, 11), date(2017, 8, 1)]
        );
    }

    #[test]
    fn positive_lag_skips_incomplete_period() {
        // issued on 7 October, 1-10 October is not complete yet
        assert_eq!(
            decadal_dates(date(2017, 10, 11), 4, 2),
            vec![date(2017, 9, 21), date(2017, 9, 11)]
        );
    }

    #[test]
    fn negative_lag_counts_from_preceding_period() {
        // issued on 4 October
        assert_eq!(
            decadal_dates(date(2017, 10, 15), -3, 1),
            vec![date(2017, 9, 21)]
        );
        assert_eq!(
            issue_date(&PeriodCalendar::Decadal, date(2017, 10, 15), -3).unwrap(),
            date(2017, 10, 4)
        );
    }

    #[test]
    fn features_use_their_own_calendar() {
        let dates = aggregate_feature_dates(
            &PeriodCalendar::Decadal,
            date(2017, 10, 11),
            0,
            &[2, 1],
            &[PeriodCalendar::Monthly, PeriodCalendar::Decadal],
        )
        .unwrap();
        assert_eq!(dates[0], vec![date(2017, 9, 1), date(2017, 8, 1)]);
        assert_eq!(dates[1], vec![date(2017, 10, 1)]);
    }

    #[test]
    fn season_target_counts_back_from_forecast_month() {
        let season = PeriodCalendar::season(4, 9)
            .unwrap()
            .with_forecast_month(3)
            .unwrap();
        let dates = aggregate_feature_dates(
            &season,
            date(2014, 7, 1),
            0,
            &[2],
            &[PeriodCalendar::Monthly],
        )
        .unwrap();
        assert_eq!(dates[0], vec![date(2014, 2, 1), date(2014, 1, 1)]);
    }

    #[test]
    fn zero_lag_length_yields_no_dates() {
        let dates = aggregate_feature_dates(
            &PeriodCalendar::Monthly,
            date(2014, 7, 1),
            0,
            &[0, 1],
            &[PeriodCalendar::Monthly, PeriodCalendar::Monthly],
        )
        .unwrap();
        assert!(dates[0].is_empty());
        assert_eq!(dates[1], vec![date(2014, 6, 1)]);
    }

    #[test]
    fn vector_is_feature_major_most_recent_first() {
        let a = PeriodicSeries::from_values(
            PeriodCalendar::Monthly,
            date(2000, 1, 1),
            &[1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();
        let b = PeriodicSeries::from_values(
            PeriodCalendar::Monthly,
            date(2000, 1, 1),
            &[10.0, 20.0, 30.0, 40.0],
        )
        .unwrap();
        let aggregator = FeatureAggregator::new(
            PeriodCalendar::Monthly,
            vec![PeriodCalendar::Monthly, PeriodCalendar::Monthly],
            0,
            vec![3, 2],
        )
        .unwrap();
        let x = aggregator.feature_vector(date(2000, 5, 1), &[&a, &b]).unwrap();
        assert_eq!(x, vec![4.0, 3.0, 2.0, 40.0, 30.0]);
        assert_eq!(x.len(), aggregator.feature_count());
    }

    #[test]
    fn missing_date_is_nan_in_its_slot_only() {
        let a = PeriodicSeries::new(
            PeriodCalendar::Monthly,
            vec![(date(2000, 4, 1), 4.0), (date(2000, 2, 1), 2.0)],
        )
        .unwrap();
        let dates = vec![vec![date(2000, 4, 1), date(2000, 3, 1), date(2000, 2, 1)]];
        let x = aggregate_feature_vector(&dates, &[&a]).unwrap();
        assert_eq!(x[0], 4.0);
        assert!(x[1].is_nan());
        assert_eq!(x[2], 2.0);
    }

    #[test]
    fn mismatched_lengths_rejected() {
        assert!(FeatureAggregator::new(
            PeriodCalendar::Monthly,
            vec![PeriodCalendar::Monthly],
            0,
            vec![1, 2]
        )
        .is_err());
        assert!(FeatureAggregator::new(PeriodCalendar::Monthly, vec![], 0, vec![]).is_err());

        let a = PeriodicSeries::empty(PeriodCalendar::Monthly);
        let dates = vec![vec![date(2000, 1, 1)], vec![date(2000, 1, 1)]];
        assert!(matches!(
            aggregate_feature_vector(&dates, &[&a]),
            Err(ForecastError::DimensionMismatch { .. })
        ));
    }
}
