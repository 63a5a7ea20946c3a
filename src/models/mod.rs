//! Estimators fitted inside each forecasting partition.

mod config;
mod linear;
mod traits;

pub use config::{ParameterDomain, ParameterSpec, RegressorConfig, RegressorKind, MAX_RIDGE_ALPHA};
pub use linear::LinearRegression;
pub use traits::{BoxedRegressor, Regressor};
