//! Error types for control system operations.

use thiserror::Error;

/// Result type for control system operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control system operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Elapsed time between controller updates was zero, leaving the
    /// derivative and integral terms undefined.
    #[error("Division by zero: {what}")]
    DivisionByZero { what: &'static str },
}
