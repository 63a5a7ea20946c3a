//! One estimator per annual index.

use crate::error::{ForecastError, Result};
use crate::models::{BoxedRegressor, Regressor};
use crate::transform::{FeatureScaler, StandardScaler};

/// Estimator and standardizers of one partition.
#[derive(Debug)]
pub struct PartitionSlot {
    estimator: BoxedRegressor,
    feature_scaler: FeatureScaler,
    target_scaler: StandardScaler,
    samples: usize,
}

impl PartitionSlot {
    fn new(estimator: BoxedRegressor) -> Self {
        Self {
            estimator,
            feature_scaler: FeatureScaler::default(),
            target_scaler: StandardScaler::identity(),
            samples: 0,
        }
    }

    pub fn estimator(&self) -> &dyn Regressor {
        self.estimator.as_ref()
    }

    pub fn target_scaler(&self) -> StandardScaler {
        self.target_scaler
    }

    /// Number of samples the estimator was fitted on.
    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn is_fitted(&self) -> bool {
        self.estimator.is_fitted()
    }
}

/// A fixed table of partitions keyed by annual index `1..=len`.
///
/// A model built with a single partition serves every annual index.
/// Seasonal offsets are kept per annual index, independent of how many
/// partitions serve them.
#[derive(Debug)]
pub struct PartitionedModel {
    slots: Vec<PartitionSlot>,
    seasonal_offsets: Vec<f64>,
}

impl PartitionedModel {
    /// `size` partitions, each with a fresh copy of `template`.
    pub fn new(template: &dyn Regressor, size: usize) -> Self {
        Self {
            slots: (0..size.max(1))
                .map(|_| PartitionSlot::new(template.fresh()))
                .collect(),
            seasonal_offsets: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Partition serving `annual_index`.
    pub fn slot(&self, annual_index: usize) -> Result<&PartitionSlot> {
        self.slots
            .get(self.position(annual_index)?)
            .ok_or_else(|| invalid_index(annual_index, self.slots.len()))
    }

    fn position(&self, annual_index: usize) -> Result<usize> {
        if self.slots.len() == 1 && annual_index >= 1 {
            return Ok(0);
        }
        if annual_index == 0 || annual_index > self.slots.len() {
            return Err(invalid_index(annual_index, self.slots.len()));
        }
        Ok(annual_index - 1)
    }

    /// Set the seasonal offset of every annual index, `offsets[index - 1]`.
    ///
    /// With one partition per index the table must have one entry per
    /// partition; a single partition takes a table of any length.
    pub fn set_seasonal_offsets(&mut self, offsets: &[f64]) -> Result<()> {
        if self.slots.len() > 1 && offsets.len() != self.slots.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.slots.len(),
                got: offsets.len(),
            });
        }
        self.seasonal_offsets = offsets.to_vec();
        Ok(())
    }

    /// Seasonal offset added to forecasts for `annual_index`, 0 when unset.
    pub fn seasonal_offset(&self, annual_index: usize) -> f64 {
        annual_index
            .checked_sub(1)
            .and_then(|i| self.seasonal_offsets.get(i))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn seasonal_offsets(&self) -> &[f64] {
        &self.seasonal_offsets
    }

    /// Standardize `x` and `y` with scalers fitted on them and fit the partition's estimator.
    pub fn fit_partition(&mut self, annual_index: usize, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        let pos = self.position(annual_index)?;
        if x.is_empty() || y.is_empty() {
            return Err(ForecastError::EmptyPartition { annual_index });
        }
        let slot = &mut self.slots[pos];

        slot.feature_scaler = FeatureScaler::fit(x)?;
        slot.target_scaler = StandardScaler::fit(y);
        let x_scaled = slot.feature_scaler.transform(x)?;
        let y_scaled = slot.target_scaler.transform_all(y);

        slot.estimator = slot.estimator.fresh();
        slot.estimator
            .fit(&x_scaled, &y_scaled)
            .map_err(|e| ForecastError::Estimator {
                annual_index,
                reason: e.to_string(),
            })?;
        slot.samples = y.len();
        Ok(())
    }

    /// Forecast for one feature vector in original units, seasonal offset included.
    pub fn predict(&self, annual_index: usize, features: &[f64]) -> Result<f64> {
        let slot = self.slot(annual_index)?;
        if !slot.is_fitted() {
            return Err(ForecastError::FitRequired);
        }
        let row = slot.feature_scaler.transform_row(features)?;
        let scaled = slot
            .estimator
            .predict(&[row])
            .map_err(|e| ForecastError::Estimator {
                annual_index,
                reason: e.to_string(),
            })?
            .first()
            .copied()
            .ok_or_else(|| ForecastError::Estimator {
                annual_index,
                reason: "estimator returned no prediction".into(),
            })?;
        Ok(slot.target_scaler.inverse(scaled) + self.seasonal_offset(annual_index))
    }

    /// True once every partition has a fitted estimator.
    pub fn is_fitted(&self) -> bool {
        self.slots.iter().all(PartitionSlot::is_fitted)
    }

    /// Training samples per partition.
    pub fn sample_counts(&self) -> Vec<usize> {
        self.slots.iter().map(PartitionSlot::samples).collect()
    }
}

fn invalid_index(annual_index: usize, size: usize) -> ForecastError {
    ForecastError::InvalidParameter(format!(
        "annual index {} outside partitions 1..={}",
        annual_index, size
    ))
}
