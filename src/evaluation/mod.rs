//! Forecast evaluation.

mod skill;

pub use skill::{SkillEvaluator, PROBABLE_ERROR_FACTOR};
