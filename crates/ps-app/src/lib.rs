//! Shared application service layer for pidsim.
//!
//! Frontends go through this crate for scenario handling, simulation
//! execution with result caching, and result querying/export.

pub mod error;
pub mod export;
pub mod progress;
pub mod query;
pub mod run_service;
pub mod scenario_service;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use export::{SeriesExport, to_csv, to_series_export};
pub use progress::{RunProgressEvent, RunStage, SimulationProgress};
pub use query::{RunSummary, extract_series, get_run_summary, step_metrics};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, RunTimingSummary, ensure_run, ensure_run_with_progress,
    list_runs, load_run, run_scenario,
};
pub use scenario_service::{
    GainOverrides, ScenarioRuntime, compile_scenario, load_scenario, save_scenario,
    validate_scenario,
};
