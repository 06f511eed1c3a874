pub mod config;
pub mod error;
pub mod estimator;
pub mod output;

pub use error::InputError;
pub use estimator::{estimate, estimate_with, EstimateInput, EstimateOutput, Preset, Profile};
