//! K-fold cross-validation of a trained engine.

use super::engine::ForecastEngine;
use crate::core::PeriodicSeries;
use crate::error::{ForecastError, Result};
use crate::evaluation::SkillEvaluator;
use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// Largest fold count chosen by [`KFold::Auto`].
pub const MAX_AUTO_FOLDS: usize = 10;

/// Number of cross-validation folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KFold {
    /// As many folds as the smallest group allows, at most [`MAX_AUTO_FOLDS`].
    #[default]
    Auto,
    Fixed(usize),
}

impl KFold {
    /// Fold count for groups whose smallest has `smallest_group` samples.
    pub fn resolve(&self, smallest_group: usize) -> Result<usize> {
        let folds = match *self {
            Self::Auto => smallest_group.min(MAX_AUTO_FOLDS),
            Self::Fixed(n) => n,
        };
        if folds < 2 || smallest_group < folds {
            return Err(ForecastError::InsufficientFolds {
                requested: folds.max(2),
                available: smallest_group,
            });
        }
        Ok(folds)
    }
}

/// Contiguous fold ranges over `len` items; the first `len % folds` folds get one extra item.
pub fn fold_bounds(len: usize, folds: usize) -> Vec<Range<usize>> {
    if folds == 0 {
        return Vec::new();
    }
    let base = len / folds;
    let extra = len % folds;
    let mut start = 0;
    (0..folds)
        .map(|i| {
            let size = base + usize::from(i < extra);
            let range = start..start + size;
            start += size;
            range
        })
        .collect()
}

impl<'a> ForecastEngine<'a> {
    /// Cross-validate the trained engine.
    ///
    /// Training samples are grouped by partition and every group is split
    /// into the same number of contiguous folds. Each fold trains a fresh
    /// engine on the remaining samples of all groups and forecasts the
    /// held-out dates. Forecasts that fail are skipped.
    ///
    /// `progress` receives `(step, total)` after every fold fit and every
    /// held-out forecast.
    pub fn cross_validate<F>(&self, k_fold: KFold, mut progress: F) -> Result<SkillEvaluator>
    where
        F: FnMut(usize, usize),
    {
        let dates = self.training_dates().ok_or(ForecastError::FitRequired)?;

        let mut groups: BTreeMap<usize, Vec<NaiveDate>> = BTreeMap::new();
        for &date in dates {
            groups.entry(self.partition_key(date)).or_default().push(date);
        }
        let smallest = groups.values().map(Vec::len).min().unwrap_or(0);
        let folds = k_fold.resolve(smallest)?;

        let total = folds + dates.len();
        let mut step = 0;
        let mut skipped = 0;
        let mut predictions = Vec::with_capacity(dates.len());

        for fold in 0..folds {
            let mut train_dates = Vec::new();
            let mut test_dates = Vec::new();
            for group in groups.values() {
                for (i, range) in fold_bounds(group.len(), folds).into_iter().enumerate() {
                    if i == fold {
                        test_dates.extend_from_slice(&group[range]);
                    } else {
                        train_dates.extend_from_slice(&group[range]);
                    }
                }
            }
            train_dates.sort_unstable();

            let train_target = self.target.restrict_to(&train_dates);
            let mut engine = self.fresh();
            engine.train_on(&train_target)?;
            step += 1;
            progress(step, total);
            info!(
                "fold {}/{}: trained on {} samples, forecasting {}",
                fold + 1,
                folds,
                train_dates.len(),
                test_dates.len()
            );

            for date in test_dates {
                match engine.predict(date, &self.features) {
                    Ok(value) => predictions.push((date, value)),
                    Err(e) => {
                        skipped += 1;
                        debug!("skipping held-out forecast for {}: {}", date, e);
                    }
                }
                step += 1;
                progress(step, total);
            }
        }

        if skipped > 0 {
            info!("cross-validation skipped {} of {} forecasts", skipped, dates.len());
        }
        predictions.sort_unstable_by_key(|(date, _)| *date);
        let predicted = PeriodicSeries::new(self.calendar(), predictions)?;
        let observed = self.target.restrict_to(&predicted.dates());
        SkillEvaluator::new(observed, predicted)
    }

    /// Train, then cross-validate.
    pub fn train_and_evaluate<F>(&mut self, k_fold: KFold, progress: F) -> Result<SkillEvaluator>
    where
        F: FnMut(usize, usize),
    {
        self.train()?;
        self.cross_validate(k_fold, progress)
    }
}
