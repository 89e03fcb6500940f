pub mod catalog;
pub mod predict_api;
pub mod types;

pub use predict_api::{ApiError, PredictApiClient};
