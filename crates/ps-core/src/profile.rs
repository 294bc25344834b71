//! Desired-value (setpoint) profiles.

use crate::error::{CoreError, CoreResult};
use crate::grid::TimeGrid;
use crate::numeric::Real;

/// Target plant output as a function of time.
#[derive(Debug, Clone, PartialEq)]
pub enum SetpointProfile {
    /// Same target at every instant.
    Constant { value: Real },
    /// `initial` strictly before `at_s`, `final_value` at and after it.
    Step {
        initial: Real,
        final_value: Real,
        at_s: Real,
    },
    /// One explicit target per grid point.
    Samples { values: Vec<Real> },
}

impl SetpointProfile {
    /// Reference thruster-speed demand: 0 before 2 s, 5 from 2 s on.
    pub fn reference_step() -> Self {
        Self::Step {
            initial: 0.0,
            final_value: 5.0,
            at_s: 2.0,
        }
    }

    /// Target at time `t` for the analytic variants; `None` for `Samples`.
    pub fn value_at(&self, t: Real) -> Option<Real> {
        match self {
            Self::Constant { value } => Some(*value),
            Self::Step {
                initial,
                final_value,
                at_s,
            } => Some(if t >= *at_s { *final_value } else { *initial }),
            Self::Samples { .. } => None,
        }
    }

    /// Evaluate the profile at every grid point.
    ///
    /// # Errors
    ///
    /// `Samples` whose length differs from the grid's, or any non-finite
    /// target, yield [`CoreError::InvalidInput`].
    pub fn sample(&self, grid: &TimeGrid) -> CoreResult<Vec<Real>> {
        let values = match self {
            Self::Samples { values } => {
                if values.len() != grid.len() {
                    return Err(CoreError::InvalidInput {
                        what: format!(
                            "setpoint samples ({}) and time grid ({}) differ in length",
                            values.len(),
                            grid.len()
                        ),
                    });
                }
                values.clone()
            }
            _ => grid.iter().filter_map(|t| self.value_at(t)).collect(),
        };

        if let Some(index) = crate::numeric::first_non_finite(&values) {
            return Err(CoreError::InvalidInput {
                what: format!("setpoint at index {index} is not finite"),
            });
        }
        Ok(values)
    }

    /// Target reached at the end of the profile.
    pub fn final_target(&self) -> Option<Real> {
        match self {
            Self::Constant { value } => Some(*value),
            Self::Step { final_value, .. } => Some(*final_value),
            Self::Samples { values } => values.last().copied(),
        }
    }
}

impl Default for SetpointProfile {
    fn default() -> Self {
        Self::reference_step()
    }
}
