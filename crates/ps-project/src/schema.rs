//! Scenario schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub plant: PlantDef,
    #[serde(default)]
    pub gains: GainsDef,
    #[serde(default)]
    pub grid: GridDef,
    #[serde(default)]
    pub setpoint: SetpointDef,
    #[serde(default)]
    pub initial_output: f64,
    #[serde(default)]
    pub solver: SolverDef,
}

impl Scenario {
    /// Thruster-speed step: reference plant and gains, 0..20 s at 1 ms,
    /// setpoint 0 -> 5 at 2 s.
    pub fn reference() -> Self {
        Self {
            version: crate::migrate::LATEST_VERSION,
            name: "thruster_step".to_string(),
            description: Some("Thruster speed transient response to a 0 -> 5 step at t = 2 s".to_string()),
            plant: PlantDef::default(),
            gains: GainsDef::default(),
            grid: GridDef::default(),
            setpoint: SetpointDef::default(),
            initial_output: 0.0,
            solver: SolverDef::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlantDef {
    pub gain: f64,
    pub time_constant_s: f64,
    pub dead_time_s: f64,
}

impl Default for PlantDef {
    fn default() -> Self {
        Self {
            gain: 1.0,
            time_constant_s: 0.632,
            dead_time_s: 0.001,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GainsDef {
    pub p: f64,
    pub i: f64,
    pub d: f64,
}

impl Default for GainsDef {
    fn default() -> Self {
        Self {
            p: 1.0,
            i: 1.582,
            d: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GridDef {
    pub start_s: f64,
    pub end_s: f64,
    pub step_s: f64,
}

impl Default for GridDef {
    fn default() -> Self {
        Self {
            start_s: 0.0,
            end_s: 20.0,
            step_s: 0.001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SetpointDef {
    Constant {
        value: f64,
    },
    Step {
        initial: f64,
        final_value: f64,
        at_s: f64,
    },
    Samples {
        values: Vec<f64>,
    },
}

impl Default for SetpointDef {
    fn default() -> Self {
        SetpointDef::Step {
            initial: 0.0,
            final_value: 5.0,
            at_s: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SolverDef {
    #[default]
    Exact,
    Rk4 {
        substeps: usize,
    },
}
