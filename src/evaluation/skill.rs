//! Forecast skill per annual index.

use crate::core::PeriodicSeries;
use crate::error::Result;
use crate::utils::metrics::{calculate_metrics, AccuracyMetrics};
use crate::utils::stats::std_dev;
use chrono::NaiveDate;

/// Fraction of the standard deviation within which a forecast counts as good
/// (the probable error of a normal distribution).
pub const PROBABLE_ERROR_FACTOR: f64 = 0.674;

/// Compares observed values with forecasts made for the same periods.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillEvaluator {
    observed: PeriodicSeries,
    predicted: PeriodicSeries,
}

impl SkillEvaluator {
    /// Both series must share one calendar.
    pub fn new(observed: PeriodicSeries, predicted: PeriodicSeries) -> Result<Self> {
        observed.ensure_same_calendar(&predicted)?;
        Ok(Self {
            observed,
            predicted,
        })
    }

    pub fn observed(&self) -> &PeriodicSeries {
        &self.observed
    }

    pub fn predicted(&self) -> &PeriodicSeries {
        &self.predicted
    }

    /// `(date, observed, predicted)` for every date where both are present and not `NaN`.
    pub fn pairs(&self) -> Vec<(NaiveDate, f64, f64)> {
        self.observed
            .iter()
            .filter_map(|(date, obs)| {
                let pred = self.predicted.get(date)?;
                (!obs.is_nan() && !pred.is_nan()).then_some((date, obs, pred))
            })
            .collect()
    }

    /// Skill of every annual index, `result[index - 1]`.
    ///
    /// The skill is the share of forecasts whose absolute error is at most
    /// [`PROBABLE_ERROR_FACTOR`] times the standard deviation of the observed
    /// values at that index. `None` where an index has no pair.
    pub fn compute_skill(&self) -> Vec<Option<f64>> {
        let calendar = self.observed.calendar();
        let mut observed_by_index = vec![Vec::new(); calendar.max_index()];
        let mut errors_by_index = vec![Vec::new(); calendar.max_index()];

        for (date, obs) in self.observed.iter() {
            if !obs.is_nan() {
                observed_by_index[calendar.index_of(date) - 1].push(obs);
            }
        }
        for (date, obs, pred) in self.pairs() {
            errors_by_index[calendar.index_of(date) - 1].push((pred - obs).abs());
        }

        observed_by_index
            .iter()
            .zip(&errors_by_index)
            .map(|(observed, errors)| {
                if errors.is_empty() {
                    return None;
                }
                let sd = if observed.len() < 2 { 0.0 } else { std_dev(observed) };
                let threshold = PROBABLE_ERROR_FACTOR * sd;
                let good = errors.iter().filter(|&&e| e <= threshold).count();
                Some(good as f64 / errors.len() as f64)
            })
            .collect()
    }

    /// Skill of a single annual index.
    pub fn skill_for(&self, annual_index: usize) -> Option<f64> {
        let index = annual_index.checked_sub(1)?;
        self.compute_skill().get(index).copied().flatten()
    }

    /// Accuracy metrics over all pairs.
    pub fn accuracy(&self) -> Result<AccuracyMetrics> {
        let (observed, predicted): (Vec<f64>, Vec<f64>) =
            self.pairs().into_iter().map(|(_, o, p)| (o, p)).unzip();
        calculate_metrics(&observed, &predicted)
    }
}
