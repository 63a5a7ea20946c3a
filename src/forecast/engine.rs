//! Training and prediction over periodic series.

use super::config::ForecasterConfig;
use super::partition::PartitionedModel;
use crate::core::{PeriodCalendar, PeriodicSeries};
use crate::error::{ForecastError, Result};
use crate::features::FeatureAggregator;
use crate::models::{BoxedRegressor, Regressor};
use crate::seasonality::seasonal_adjustment;
use chrono::NaiveDate;
use log::{debug, info};

/// Periodic forecaster: one estimator per annual index, fitted on lagged
/// feature values.
///
/// The engine borrows the target and feature series; it is *configured* after
/// construction and *trained* after a successful [`train`](Self::train).
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use hydromet_forecast::core::{PeriodCalendar, PeriodicSeries};
/// use hydromet_forecast::forecast::{ForecastEngine, ForecasterConfig};
///
/// let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
/// let values: Vec<f64> = (1..=12).map(f64::from).collect();
/// let series = PeriodicSeries::from_values(PeriodCalendar::Monthly, start, &values).unwrap();
///
/// let config = ForecasterConfig::default().with_multimodel(false);
/// let mut engine = ForecastEngine::new(config, &series, vec![&series]).unwrap();
/// engine.train().unwrap();
///
/// let june = NaiveDate::from_ymd_opt(2000, 6, 1).unwrap();
/// let forecast = engine.predict(june, &[&series]).unwrap();
/// assert!((forecast - 6.0).abs() < 1e-6);
/// ```
#[derive(Debug)]
pub struct ForecastEngine<'a> {
    config: ForecasterConfig,
    template: BoxedRegressor,
    pub(super) target: &'a PeriodicSeries,
    pub(super) features: Vec<&'a PeriodicSeries>,
    aggregator: FeatureAggregator,
    model: PartitionedModel,
    training_dates: Option<Vec<NaiveDate>>,
}

/// Where training samples were found.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingCoverage {
    /// Number of training samples.
    pub total: usize,
    /// Samples per annual index, `per_index[index - 1]`.
    pub per_index: Vec<usize>,
    /// Period-years from the first to the last training sample.
    pub years: Vec<i32>,
    /// `presence[index - 1][y]` is set when `years[y]` has a sample at `index`.
    pub presence: Vec<Vec<bool>>,
}

impl TrainingCoverage {
    pub fn is_present(&self, annual_index: usize, year: i32) -> bool {
        let Some(row) = annual_index.checked_sub(1).and_then(|i| self.presence.get(i)) else {
            return false;
        };
        self.years
            .iter()
            .position(|&y| y == year)
            .is_some_and(|col| row[col])
    }

    /// Annual indices without any training sample.
    pub fn missing_indices(&self) -> Vec<usize> {
        self.per_index
            .iter()
            .enumerate()
            .filter(|(_, n)| **n == 0)
            .map(|(i, _)| i + 1)
            .collect()
    }
}

impl<'a> ForecastEngine<'a> {
    /// Engine using the estimator named in `config.regressor`.
    pub fn new(
        config: ForecasterConfig,
        target: &'a PeriodicSeries,
        features: Vec<&'a PeriodicSeries>,
    ) -> Result<Self> {
        let template = config.regressor.build()?;
        Self::with_regressor(config, template, target, features)
    }

    /// Engine fitting copies of a caller-supplied estimator.
    ///
    /// `config.regressor` is ignored.
    pub fn with_regressor(
        config: ForecasterConfig,
        template: BoxedRegressor,
        target: &'a PeriodicSeries,
        features: Vec<&'a PeriodicSeries>,
    ) -> Result<Self> {
        config.validate()?;
        target.calendar().validate()?;
        if config.lag_lengths.len() != features.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "got {} lag lengths for {} feature series",
                config.lag_lengths.len(),
                features.len()
            )));
        }
        let aggregator = FeatureAggregator::new(
            target.calendar(),
            features.iter().map(|s| s.calendar()).collect(),
            config.lag,
            config.lag_lengths.clone(),
        )?;
        let size = partition_count(&config, target.calendar());
        let model = PartitionedModel::new(template.as_ref(), size);

        Ok(Self {
            config,
            template,
            target,
            features,
            aggregator,
            model,
            training_dates: None,
        })
    }

    /// Untrained engine with the same configuration, series and estimator kind.
    pub fn fresh(&self) -> Self {
        Self {
            config: self.config.clone(),
            template: self.template.fresh(),
            target: self.target,
            features: self.features.clone(),
            aggregator: self.aggregator.clone(),
            model: PartitionedModel::new(self.template.as_ref(), self.model.len()),
            training_dates: None,
        }
    }

    /// Train on the configured target series.
    pub fn train(&mut self) -> Result<()> {
        let target = self.target;
        self.train_on(target)
    }

    /// Train on `target`, which becomes the engine's target series.
    ///
    /// Every partition must receive at least one sample with a value and a
    /// complete feature vector. With decomposition enabled on a calendar with
    /// more than one period per year, the target must span at least two
    /// years. On failure the engine is left untrained.
    pub fn train_on(&mut self, target: &'a PeriodicSeries) -> Result<()> {
        self.target.ensure_same_calendar(target)?;
        self.target = target;
        self.training_dates = None;

        let size = self.model.len();
        let mut model = PartitionedModel::new(self.template.as_ref(), size);

        let adjusted;
        let training_target = if self.config.decompose && target.max_index() > 1 {
            let adjustment = seasonal_adjustment(target)?;
            debug!(
                "seasonal adjustment with strength {:.3}",
                adjustment.strength
            );
            model.set_seasonal_offsets(&adjustment.offsets)?;
            adjusted = adjustment.adjusted;
            &adjusted
        } else {
            target
        };

        let mut samples: Vec<(Vec<Vec<f64>>, Vec<f64>)> = vec![(Vec::new(), Vec::new()); size];
        let mut dates = Vec::new();
        for (date, value) in training_target.iter() {
            if value.is_nan() {
                continue;
            }
            let features = self.aggregator.feature_vector(date, &self.features)?;
            if features.iter().any(|v| v.is_nan()) {
                continue;
            }
            let (x, y) = &mut samples[self.partition_key(date) - 1];
            x.push(features);
            y.push(value);
            dates.push(date);
        }

        for (i, (x, y)) in samples.iter().enumerate() {
            debug!("annual index {}: {} training samples", i + 1, y.len());
            model.fit_partition(i + 1, x, y)?;
        }

        info!(
            "trained {} partition(s) of {} on {} samples",
            size,
            self.template.name(),
            dates.len()
        );
        self.model = model;
        self.training_dates = Some(dates);
        Ok(())
    }

    /// Forecast for the period containing `target_date`.
    ///
    /// `feature_series` must use the calendars the engine was configured with,
    /// in the same order.
    pub fn predict(&self, target_date: NaiveDate, feature_series: &[&PeriodicSeries]) -> Result<f64> {
        self.check_features(feature_series)?;
        if !self.is_trained() {
            return Err(ForecastError::FitRequired);
        }
        let features = self.aggregator.feature_vector(target_date, feature_series)?;
        if features.iter().any(|v| v.is_nan()) {
            return Err(ForecastError::MissingFeatures {
                date: self.target.calendar().anchor(target_date)?,
            });
        }
        let annual_index = self.target.calendar().index_of(target_date);
        self.model.predict(annual_index, &features)
    }

    /// In-sample forecasts at every training date.
    pub fn predict_training_set(&self) -> Result<PeriodicSeries> {
        let dates = self.training_dates.as_deref().ok_or(ForecastError::FitRequired)?;
        let predictions = dates
            .iter()
            .map(|&date| Ok((date, self.predict(date, &self.features)?)))
            .collect::<Result<Vec<_>>>()?;
        PeriodicSeries::new(self.target.calendar(), predictions)
    }

    /// Training samples per annual index and per year.
    pub fn training_coverage(&self) -> Result<TrainingCoverage> {
        let dates = self.training_dates.as_deref().ok_or(ForecastError::FitRequired)?;
        let calendar = self.target.calendar();
        let max_index = calendar.max_index();

        let years: Vec<i32> = match (dates.first(), dates.last()) {
            (Some(&first), Some(&last)) => {
                (calendar.period_year(first)..=calendar.period_year(last)).collect()
            }
            _ => Vec::new(),
        };
        let mut per_index = vec![0; max_index];
        let mut presence = vec![vec![false; years.len()]; max_index];
        for &date in dates {
            let index = calendar.index_of(date) - 1;
            per_index[index] += 1;
            if let Some(first) = years.first() {
                presence[index][(calendar.period_year(date) - first) as usize] = true;
            }
        }

        Ok(TrainingCoverage {
            total: dates.len(),
            per_index,
            years,
            presence,
        })
    }

    pub fn config(&self) -> &ForecasterConfig {
        &self.config
    }

    /// Dates used for training, in order. `None` until trained.
    pub fn training_dates(&self) -> Option<&[NaiveDate]> {
        self.training_dates.as_deref()
    }

    pub fn is_trained(&self) -> bool {
        self.training_dates.is_some() && self.model.is_fitted()
    }

    pub fn target(&self) -> &PeriodicSeries {
        self.target
    }

    pub fn calendar(&self) -> PeriodCalendar {
        self.target.calendar()
    }

    pub fn feature_calendars(&self) -> &[PeriodCalendar] {
        self.aggregator.feature_calendars()
    }

    /// Periods per year of the target calendar.
    pub fn max_index(&self) -> usize {
        self.target.max_index()
    }

    pub fn model(&self) -> &PartitionedModel {
        &self.model
    }

    pub fn estimator(&self) -> &dyn Regressor {
        self.template.as_ref()
    }

    /// Partition serving `date`: its annual index, or 1 with a single model.
    pub(super) fn partition_key(&self, date: NaiveDate) -> usize {
        if self.config.multimodel {
            self.target.calendar().index_of(date)
        } else {
            1
        }
    }

    fn check_features(&self, feature_series: &[&PeriodicSeries]) -> Result<()> {
        let expected = self.aggregator.feature_calendars();
        let matches = feature_series.len() == expected.len()
            && feature_series
                .iter()
                .zip(expected)
                .all(|(s, c)| s.calendar() == *c);
        if matches {
            return Ok(());
        }
        let join = |cals: Vec<String>| cals.join(", ");
        Err(ForecastError::FeatureMismatch {
            expected: join(expected.iter().map(|c| c.to_string()).collect()),
            got: join(feature_series.iter().map(|s| s.calendar().to_string()).collect()),
        })
    }
}

fn partition_count(config: &ForecasterConfig, calendar: PeriodCalendar) -> usize {
    if config.multimodel {
        calendar.max_index()
    } else {
        1
    }
}
