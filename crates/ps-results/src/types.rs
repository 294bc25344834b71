//! Result data types.

use ps_project::GainsDef;
use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario_name: String,
    /// RFC 3339 UTC time at which the run was stored.
    pub timestamp: String,
    pub solver_version: String,
    pub gains: GainsDef,
    pub points: usize,
}

/// One sample of the four plotted series plus the control signal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeseriesRecord {
    pub time_s: f64,
    pub desired: f64,
    pub actual: f64,
    pub stabilised: f64,
    pub control: f64,
}

/// Series names accepted by [`TimeseriesRecord::value`].
pub const SERIES_NAMES: [&str; 4] = ["desired", "actual", "stabilised", "control"];

impl RunManifest {
    /// Current UTC time in the manifest's timestamp format.
    pub fn now_timestamp() -> String {
        chrono::Utc::now().to_rfc3339()
    }
}

impl TimeseriesRecord {
    /// Look up a series value by name.
    pub fn value(&self, series: &str) -> Option<f64> {
        match series {
            "desired" | "setpoint" => Some(self.desired),
            "actual" | "uncontrolled" => Some(self.actual),
            "stabilised" | "stabilized" | "output" => Some(self.stabilised),
            "control" | "u" => Some(self.control),
            _ => None,
        }
    }
}
