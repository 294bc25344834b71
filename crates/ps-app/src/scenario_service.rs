//! Scenario loading, saving, validation, and compilation into runtime
//! simulation inputs.

use std::path::Path;

use ps_controls::PidGains;
use ps_core::{SetpointProfile, TimeGrid};
use ps_project::{Scenario, SetpointDef, SolverDef};
use ps_sim::{FirstOrderPlant, PlantSolver, SimOptions};

use crate::error::{AppError, AppResult};

/// Load a scenario from YAML, or JSON when the extension is `.json`.
pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ScenarioFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let scenario = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => ps_project::parse_json(&content)?,
        _ => ps_project::parse_yaml(&content)?,
    };
    Ok(scenario)
}

/// Save a scenario as YAML, or JSON when the extension is `.json`.
pub fn save_scenario(path: &Path, scenario: &Scenario) -> AppResult<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => ps_project::save_json(path, scenario)?,
        _ => ps_project::save_yaml(path, scenario)?,
    }
    Ok(())
}

pub fn validate_scenario(scenario: &Scenario) -> AppResult<()> {
    ps_project::validate_scenario(scenario).map_err(|e| AppError::Validation(e.to_string()))
}

/// Gain values supplied outside the scenario file (e.g. CLI flags).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GainOverrides {
    pub p: Option<f64>,
    pub i: Option<f64>,
    pub d: Option<f64>,
}

impl GainOverrides {
    pub fn is_empty(&self) -> bool {
        self.p.is_none() && self.i.is_none() && self.d.is_none()
    }

    /// Copy of `scenario` with overridden gains. Only the overriding values
    /// are checked; the rest of the scenario was validated when it was loaded.
    pub fn apply(&self, scenario: &Scenario) -> AppResult<Scenario> {
        for (field, value) in [("gains.p", self.p), ("gains.i", self.i), ("gains.d", self.d)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(AppError::Validation(format!(
                        "{field} override must be finite, got {v}"
                    )));
                }
            }
        }

        let mut out = scenario.clone();
        if let Some(p) = self.p {
            out.gains.p = p;
        }
        if let Some(i) = self.i {
            out.gains.i = i;
        }
        if let Some(d) = self.d {
            out.gains.d = d;
        }
        Ok(out)
    }
}

/// Everything the simulation loop needs, built from a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioRuntime {
    pub plant: FirstOrderPlant,
    pub gains: PidGains,
    pub grid: TimeGrid,
    pub desired: Vec<f64>,
    pub options: SimOptions,
}

/// Build runtime inputs from a scenario. Loaded scenarios are already
/// validated, so this relies on the runtime constructors to reject anything
/// out of range rather than validating again.
pub fn compile_scenario(scenario: &Scenario) -> AppResult<ScenarioRuntime> {
    let plant = FirstOrderPlant::new(
        scenario.plant.gain,
        scenario.plant.time_constant_s,
        scenario.plant.dead_time_s,
    )
    .map_err(|e| AppError::Compile(e.to_string()))?;

    let gains = PidGains::new(scenario.gains.p, scenario.gains.i, scenario.gains.d);
    if !gains.is_finite() {
        return Err(AppError::Compile(format!(
            "gains must be finite (p={}, i={}, d={})",
            gains.kp, gains.ki, gains.kd
        )));
    }

    let grid = TimeGrid::uniform(
        scenario.grid.start_s,
        scenario.grid.end_s,
        scenario.grid.step_s,
    )?;

    let profile = match &scenario.setpoint {
        SetpointDef::Constant { value } => SetpointProfile::Constant { value: *value },
        SetpointDef::Step {
            initial,
            final_value,
            at_s,
        } => SetpointProfile::Step {
            initial: *initial,
            final_value: *final_value,
            at_s: *at_s,
        },
        SetpointDef::Samples { values } => SetpointProfile::Samples {
            values: values.clone(),
        },
    };
    let desired = profile.sample(&grid)?;

    let solver = match scenario.solver {
        SolverDef::Exact => PlantSolver::Exact,
        SolverDef::Rk4 { substeps } => PlantSolver::Rk4 { substeps },
    };

    Ok(ScenarioRuntime {
        plant,
        gains,
        grid,
        desired,
        options: SimOptions {
            initial_output: scenario.initial_output,
            solver,
            ..SimOptions::default()
        },
    })
}
