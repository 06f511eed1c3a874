pub mod engine;
pub mod profile;
pub mod rules;
pub mod types;
pub mod validation;

pub use engine::{estimate, estimate_with, experience_multiplier};
pub use profile::*;
pub use rules::{Condition, Field, RangeOp};
pub use types::*;
pub use validation::{validate_input, validate_profile};
