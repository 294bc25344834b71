//! Error types for simulation operations.

use ps_controls::ControlError;
use ps_core::CoreError;
use thiserror::Error;

/// Errors encountered during transient simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Integration requested over a non-increasing interval.
    #[error("Invalid integration interval: t1 ({t1}) must be greater than t0 ({t0})")]
    InvalidInterval { t0: f64, t1: f64 },

    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error("Division by zero: {what}")]
    DivisionByZero { what: &'static str },

    #[error("Controller error: {message}")]
    Control { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<ControlError> for SimError {
    fn from(e: ControlError) -> Self {
        match e {
            ControlError::DivisionByZero { what } => SimError::DivisionByZero { what },
            other => SimError::Control {
                message: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidArg { what } => SimError::InvalidArg { what },
            other => SimError::InvalidInput {
                what: other.to_string(),
            },
        }
    }
}
