use thiserror::Error;

/// Boundary check failures for an estimate request.
///
/// The scoring function never produces these; callers run
/// [`validate_input`](crate::estimator::validate_input) first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("experience must be between {min} and {max} years, got {value}")]
    ExperienceOutOfRange { value: u32, min: u32, max: u32 },

    #[error("age must be between {min} and {max}, got {value}")]
    AgeOutOfRange { value: u32, min: u32, max: u32 },

    #[error("at least one programming language must be selected")]
    NoLanguages,
}
