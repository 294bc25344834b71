//! First-order-lag plant with dead time.
//!
//! Dynamics, with `t` the absolute simulation time:
//!
//! ```text
//! dx/dt = 0                         for t <  dead_time
//! dx/dt = (gain * u - x) / tau      for t >= dead_time
//! ```
//!
//! The input `u` is held constant across each integration window
//! (zero-order hold), so on the active part of a window the solution is the
//! closed-form exponential approach to `gain * u`.

use crate::error::{SimError, SimResult};
use crate::integrator::{Integrator, RK4};
use crate::model::TransientModel;
use serde::{Deserialize, Serialize};

/// Plant integration method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlantSolver {
    /// Closed-form zero-order-hold update. Exact for this linear plant.
    #[default]
    Exact,
    /// Classical RK4 with `substeps` equal steps per window.
    Rk4 { substeps: usize },
}

/// First-order lag with dead time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirstOrderPlant {
    /// Static gain K.
    pub gain: f64,
    /// Time constant tau (seconds), must be positive.
    pub time_constant: f64,
    /// Dead time (seconds) before the plant responds at all.
    pub dead_time: f64,
}

impl FirstOrderPlant {
    /// Create a new plant.
    ///
    /// # Errors
    ///
    /// Returns error if any parameter is non-finite, `time_constant <= 0`,
    /// or `dead_time < 0`.
    pub fn new(gain: f64, time_constant: f64, dead_time: f64) -> SimResult<Self> {
        if !gain.is_finite() || !time_constant.is_finite() || !dead_time.is_finite() {
            return Err(SimError::InvalidArg {
                what: "plant parameters must be finite",
            });
        }
        if time_constant <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "time_constant must be positive",
            });
        }
        if dead_time < 0.0 {
            return Err(SimError::InvalidArg {
                what: "dead_time must be non-negative",
            });
        }
        Ok(Self {
            gain,
            time_constant,
            dead_time,
        })
    }

    /// Reference thruster plant: K = 1, tau = 0.632 s, dead time = 1 ms.
    pub fn reference() -> Self {
        Self {
            gain: 1.0,
            time_constant: 0.632,
            dead_time: 0.001,
        }
    }

    /// Output rate of change at time `t` under input `input`.
    pub fn rate(&self, output: f64, t: f64, input: f64) -> f64 {
        if t < self.dead_time {
            0.0
        } else {
            (1.0 / self.time_constant) * (self.gain * input - output)
        }
    }

    /// Output at `t1` starting from `initial_output` at `t0`, input held at
    /// `input`. Uses the closed-form solution.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidInterval`] unless `t1 > t0`.
    pub fn integrate(&self, initial_output: f64, t0: f64, t1: f64, input: f64) -> SimResult<f64> {
        self.integrate_with(PlantSolver::Exact, initial_output, t0, t1, input)
    }

    /// Same as [`integrate`](Self::integrate) with an explicit solver.
    pub fn integrate_with(
        &self,
        solver: PlantSolver,
        initial_output: f64,
        t0: f64,
        t1: f64,
        input: f64,
    ) -> SimResult<f64> {
        // Negated so NaN bounds are rejected too.
        if !(t1 > t0) {
            return Err(SimError::InvalidInterval { t0, t1 });
        }

        // Nothing happens before the dead time elapses.
        if t1 <= self.dead_time {
            return Ok(initial_output);
        }
        let active_start = t0.max(self.dead_time);

        match solver {
            PlantSolver::Exact => {
                let target = self.gain * input;
                let decay = (-(t1 - active_start) / self.time_constant).exp();
                Ok(target + (initial_output - target) * decay)
            }
            PlantSolver::Rk4 { substeps } => {
                if substeps == 0 {
                    return Err(SimError::InvalidArg {
                        what: "substeps must be at least 1",
                    });
                }
                let mut model = HeldInputPlant::new(self, input, initial_output);
                let h = (t1 - active_start) / substeps as f64;
                let mut x = model.initial_state();
                for k in 0..substeps {
                    let t = active_start + k as f64 * h;
                    x = RK4.step(&mut model, t, &x, h)?;
                }
                Ok(x)
            }
        }
    }

    /// Analytic open-loop response at `t` to a constant `input` applied from
    /// `t = 0` with zero initial output.
    pub fn step_response(&self, t: f64, input: f64) -> f64 {
        if t < self.dead_time {
            0.0
        } else {
            self.gain * input * (1.0 - (-(t - self.dead_time) / self.time_constant).exp())
        }
    }
}

impl Default for FirstOrderPlant {
    fn default() -> Self {
        Self::reference()
    }
}

/// The plant over one integration window, with its input frozen.
///
/// Exposes the plant to generic integrators through [`TransientModel`].
#[derive(Debug, Clone, Copy)]
pub struct HeldInputPlant<'a> {
    plant: &'a FirstOrderPlant,
    input: f64,
    initial_output: f64,
}

impl<'a> HeldInputPlant<'a> {
    pub fn new(plant: &'a FirstOrderPlant, input: f64, initial_output: f64) -> Self {
        Self {
            plant,
            input,
            initial_output,
        }
    }
}

impl TransientModel for HeldInputPlant<'_> {
    type State = f64;

    fn initial_state(&self) -> f64 {
        self.initial_output
    }

    fn rhs(&mut self, t: f64, x: &f64) -> SimResult<f64> {
        Ok(self.plant.rate(*x, t, self.input))
    }

    fn add(&self, a: &f64, b: &f64) -> f64 {
        a + b
    }

    fn scale(&self, a: &f64, scale: f64) -> f64 {
        a * scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ps_core::{Tolerances, nearly_equal};

    #[test]
    fn rate_is_gated_by_dead_time() {
        let plant = FirstOrderPlant::reference();
        assert_eq!(plant.rate(0.0, 0.0005, 1.0), 0.0);
        let rate = plant.rate(0.0, 0.001, 1.0);
        assert!(nearly_equal(rate, 1.0 / 0.632, Tolerances::STRICT));
    }

    #[test]
    fn rate_pulls_toward_gain_times_input() {
        let plant = FirstOrderPlant::new(2.0, 0.5, 0.0).unwrap();
        assert!(plant.rate(1.0, 1.0, 1.0) > 0.0);
        assert!(plant.rate(3.0, 1.0, 1.0) < 0.0);
        assert_eq!(plant.rate(2.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn invalid_parameters() {
        assert!(FirstOrderPlant::new(1.0, 0.0, 0.0).is_err());
        assert!(FirstOrderPlant::new(1.0, -1.0, 0.0).is_err());
        assert!(FirstOrderPlant::new(1.0, 1.0, -0.1).is_err());
        assert!(FirstOrderPlant::new(f64::NAN, 1.0, 0.0).is_err());
    }

    #[test]
    fn non_increasing_interval_is_rejected() {
        let plant = FirstOrderPlant::reference();
        assert_eq!(
            plant.integrate(0.0, 1.0, 1.0, 1.0),
            Err(SimError::InvalidInterval { t0: 1.0, t1: 1.0 })
        );
        assert!(matches!(
            plant.integrate(0.0, 1.0, 0.5, 1.0),
            Err(SimError::InvalidInterval { .. })
        ));
        assert!(plant.integrate(0.0, f64::NAN, 1.0, 1.0).is_err());
    }

    #[test]
    fn window_inside_dead_time_holds_output() {
        let plant = FirstOrderPlant::new(1.0, 1.0, 0.5).unwrap();
        assert_eq!(plant.integrate(0.3, 0.0, 0.4, 10.0).unwrap(), 0.3);
        assert_eq!(plant.integrate(0.3, 0.0, 0.5, 10.0).unwrap(), 0.3);
    }

    #[test]
    fn window_straddling_dead_time_integrates_active_part_only() {
        let plant = FirstOrderPlant::new(1.0, 1.0, 0.5).unwrap();
        let x = plant.integrate(0.0, 0.0, 1.0, 1.0).unwrap();
        assert!(nearly_equal(x, 1.0 - (-0.5_f64).exp(), Tolerances::STRICT));
    }

    #[test]
    fn rk4_agrees_with_exact() {
        let plant = FirstOrderPlant::reference();
        let exact = plant.integrate(0.2, 0.5, 0.6, 3.0).unwrap();
        let rk4 = plant
            .integrate_with(PlantSolver::Rk4 { substeps: 4 }, 0.2, 0.5, 0.6, 3.0)
            .unwrap();
        let rk4_tol = Tolerances { abs: 1e-7, rel: 0.0 };
        assert!(nearly_equal(exact, rk4, rk4_tol));
    }

    #[test]
    fn rk4_requires_a_substep() {
        let plant = FirstOrderPlant::reference();
        assert!(matches!(
            plant.integrate_with(PlantSolver::Rk4 { substeps: 0 }, 0.0, 0.0, 0.1, 1.0),
            Err(SimError::InvalidArg { .. })
        ));
    }

    #[test]
    fn zero_input_from_rest_stays_at_rest() {
        let plant = FirstOrderPlant::reference();
        assert_eq!(plant.integrate(0.0, 0.0, 10.0, 0.0).unwrap(), 0.0);
    }
}
