//! Data transformations applied before fitting estimators.

pub mod scale;

pub use scale::{FeatureScaler, StandardScaler};
