//! Scenario validation logic.

use crate::schema::{GridDef, Scenario, SetpointDef, SolverDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite"))
    }
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }

    if scenario.name.trim().is_empty() {
        return Err(invalid("name", &scenario.name, "must not be empty"));
    }

    let plant = &scenario.plant;
    finite("plant.gain", plant.gain)?;
    finite("plant.time_constant_s", plant.time_constant_s)?;
    finite("plant.dead_time_s", plant.dead_time_s)?;
    if plant.time_constant_s <= 0.0 {
        return Err(invalid(
            "plant.time_constant_s",
            plant.time_constant_s,
            "must be positive",
        ));
    }
    if plant.dead_time_s < 0.0 {
        return Err(invalid(
            "plant.dead_time_s",
            plant.dead_time_s,
            "must be non-negative",
        ));
    }

    finite("gains.p", scenario.gains.p)?;
    finite("gains.i", scenario.gains.i)?;
    finite("gains.d", scenario.gains.d)?;

    finite("initial_output", scenario.initial_output)?;

    let grid_len = validate_grid(&scenario.grid)?;
    validate_setpoint(&scenario.setpoint, grid_len)?;

    if let SolverDef::Rk4 { substeps: 0 } = scenario.solver {
        return Err(invalid("solver.substeps", 0, "must be at least 1"));
    }

    Ok(())
}

fn validate_grid(grid: &GridDef) -> Result<usize, ValidationError> {
    ps_core::TimeGrid::uniform_len(grid.start_s, grid.end_s, grid.step_s).map_err(|e| {
            invalid(
                "grid",
                format!("{}..{} step {}", grid.start_s, grid.end_s, grid.step_s),
                &e.to_string(),
            )
        })
}

fn validate_setpoint(setpoint: &SetpointDef, grid_len: usize) -> Result<(), ValidationError> {
    match setpoint {
        SetpointDef::Constant { value } => finite("setpoint.value", *value),
        SetpointDef::Step {
            initial,
            final_value,
            at_s,
        } => {
            finite("setpoint.initial", *initial)?;
            finite("setpoint.final_value", *final_value)?;
            finite("setpoint.at_s", *at_s)
        }
        SetpointDef::Samples { values } => {
            if values.len() != grid_len {
                return Err(invalid(
                    "setpoint.values",
                    format!("{} samples", values.len()),
                    &format!("must have one sample per grid point ({grid_len})"),
                ));
            }
            match values.iter().position(|v| !v.is_finite()) {
                Some(index) => Err(invalid(
                    &format!("setpoint.values[{index}]"),
                    values[index],
                    "must be finite",
                )),
                None => Ok(()),
            }
        }
    }
}
