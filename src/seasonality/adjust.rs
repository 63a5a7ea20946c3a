//! Seasonal adjustment of a periodic series.

use super::stl::STL;
use crate::core::PeriodicSeries;
use crate::error::{ForecastError, Result};
use crate::utils::stats::interpolate_gaps;
use std::collections::BTreeMap;

/// A series with its seasonal component removed.
#[derive(Debug, Clone)]
pub struct SeasonalAdjustment {
    /// Trend plus remainder at every observed date. Missing values stay missing.
    pub adjusted: PeriodicSeries,
    /// Mean seasonal component per annual index, `offsets[index - 1]`.
    pub offsets: Vec<f64>,
    /// Seasonal strength of the decomposition (0 to 1).
    pub strength: f64,
}

impl SeasonalAdjustment {
    /// Seasonal offset of annual index `index`.
    pub fn offset(&self, index: usize) -> f64 {
        index
            .checked_sub(1)
            .and_then(|i| self.offsets.get(i))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Decompose `series` with one seasonal cycle per year.
///
/// The decomposition is robust, so isolated extremes such as flood peaks do
/// not leak into the seasonal component. Gaps are linearly interpolated
/// before decomposing; the offsets only average the seasonal component at
/// observed dates. A calendar with a single period per year has no seasonal
/// component and is returned unchanged.
///
/// Fails with [`ForecastError::InsufficientData`] when the series spans fewer
/// than two years.
pub fn seasonal_adjustment(series: &PeriodicSeries) -> Result<SeasonalAdjustment> {
    let calendar = series.calendar();
    let period = calendar.max_index();
    if period < 2 {
        return Ok(SeasonalAdjustment {
            adjusted: series.clone(),
            offsets: vec![0.0; period],
            strength: 0.0,
        });
    }

    let dense = series.dense()?;
    let raw: Vec<f64> = dense.iter().map(|(_, v)| *v).collect();
    let filled = interpolate_gaps(&raw).ok_or(ForecastError::InsufficientData {
        needed: 2 * period,
        got: 0,
    })?;
    let decomposition = STL::new(period).robust().decompose(&filled)?;
    let deseasonalized = decomposition.deseasonalized();

    let mut sums = vec![(0.0, 0usize); period];
    let mut adjusted_at = BTreeMap::new();
    for (i, (date, value)) in dense.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        let slot = &mut sums[calendar.index_of(*date) - 1];
        slot.0 += decomposition.seasonal[i];
        slot.1 += 1;
        adjusted_at.insert(*date, deseasonalized[i]);
    }

    let offsets = sums
        .into_iter()
        .map(|(sum, count)| if count > 0 { sum / count as f64 } else { 0.0 })
        .collect();
    let adjusted =
        series.map_values(|date, value| adjusted_at.get(&date).copied().unwrap_or(value));

    Ok(SeasonalAdjustment {
        adjusted,
        offsets,
        strength: decomposition.seasonal_strength(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PeriodCalendar;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly_seasonal(years: usize) -> PeriodicSeries {
        let values: Vec<f64> = (0..years * 12)
            .map(|i| 50.0 + 20.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
            .collect();
        PeriodicSeries::from_values(PeriodCalendar::Monthly, date(2000, 1, 1), &values).unwrap()
    }

    #[test]
    fn offsets_follow_the_seasonal_cycle() {
        let result = seasonal_adjustment(&monthly_seasonal(8)).unwrap();

        assert_eq!(result.offsets.len(), 12);
        // sin peaks in April (index 4) and bottoms out in October (index 10)
        assert!(result.offset(4) > 10.0);
        assert!(result.offset(10) < -10.0);
        assert!(result.strength > 0.5);
    }

    #[test]
    fn adjusted_series_is_flatter() {
        let series = monthly_seasonal(8);
        let result = seasonal_adjustment(&series).unwrap();

        assert_eq!(result.adjusted.len(), series.len());
        let spread = |s: &PeriodicSeries| {
            let v = s.values();
            v.iter().cloned().fold(f64::MIN, f64::max) - v.iter().cloned().fold(f64::MAX, f64::min)
        };
        assert!(spread(&result.adjusted) < spread(&series) / 2.0);
    }

    #[test]
    fn flood_peak_does_not_shift_offsets() {
        let noisy: Vec<f64> = monthly_seasonal(8)
            .values()
            .iter()
            .enumerate()
            .map(|(i, v)| v + ((i * 7) % 5) as f64 - 2.0)
            .collect();
        let build = |values: &[f64]| {
            PeriodicSeries::from_values(PeriodCalendar::Monthly, date(2000, 1, 1), values).unwrap()
        };
        let clean = seasonal_adjustment(&build(&noisy)).unwrap();

        let mut values = noisy.clone();
        values[40] += 500.0;
        let peaked = seasonal_adjustment(&build(&values)).unwrap();
        // The peak month is index 5; its offset stays near the clean one
        assert!((peaked.offset(5) - clean.offset(5)).abs() < 10.0);
        assert!(peaked.adjusted.get(date(2003, 5, 1)).unwrap() > 400.0);
    }

    #[test]
    fn missing_values_stay_missing() {
        let mut values: Vec<f64> = monthly_seasonal(4).values();
        values[7] = f64::NAN;
        let series =
            PeriodicSeries::from_values(PeriodCalendar::Monthly, date(2000, 1, 1), &values).unwrap();

        let result = seasonal_adjustment(&series).unwrap();
        assert!(result.adjusted.get(date(2000, 8, 1)).unwrap().is_nan());
        assert!(result.offsets.iter().all(|o| o.is_finite()));
    }

    #[test]
    fn single_period_calendar_is_unchanged() {
        let season = PeriodCalendar::season(4, 9).unwrap();
        let series =
            PeriodicSeries::from_values(season, date(2000, 4, 1), &[1.0, 2.0, 3.0]).unwrap();

        let result = seasonal_adjustment(&series).unwrap();
        assert_eq!(result.adjusted, series);
        assert_eq!(result.offsets, vec![0.0]);
        assert_relative_eq!(result.offset(1), 0.0);
    }

    #[test]
    fn short_series_is_insufficient() {
        let err = seasonal_adjustment(&monthly_seasonal(1)).unwrap_err();
        assert!(err.is_insufficient_data());
    }
}
