//! Content-based hashing for run IDs.

use ps_project::Scenario;
use sha2::{Digest, Sha256};

use crate::ResultsResult;

/// Run ID derived from everything that determines a run's output. Identical
/// scenarios simulated by the same solver version always share an ID.
pub fn compute_run_id(scenario: &Scenario, solver_version: &str) -> ResultsResult<String> {
    let mut hasher = Sha256::new();

    let scenario_json = serde_json::to_string(scenario)?;
    hasher.update(scenario_json.as_bytes());
    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}
