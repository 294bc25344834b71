//! Error types for the ps-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// gives CLI and other frontends one error interface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Failed to read scenario file: {path}")]
    ScenarioFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scenario validation failed: {0}")]
    Validation(String),

    #[error("Scenario compilation failed: {0}")]
    Compile(String),

    #[error("Simulation error: {0}")]
    Simulation(#[from] ps_sim::SimError),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ps-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ps_project::ProjectError> for AppError {
    fn from(err: ps_project::ProjectError) -> Self {
        match err {
            ps_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Scenario(other.to_string()),
        }
    }
}

impl From<ps_results::ResultsError> for AppError {
    fn from(err: ps_results::ResultsError) -> Self {
        match err {
            ps_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}

impl From<ps_core::CoreError> for AppError {
    fn from(err: ps_core::CoreError) -> Self {
        AppError::Compile(err.to_string())
    }
}
