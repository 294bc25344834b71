//! PID controller block.
//!
//! Parallel-form PID evaluated once per sample:
//!
//! ```text
//! e        = sp - pv
//! P        = kp * e
//! I       += ki * e * dt
//! D        = -kd * (pv - pv_prev) / dt
//! u        = P + I + D
//! ```
//!
//! The derivative acts on the measurement rather than the error, so a setpoint
//! step produces no derivative kick. The signal is not filtered.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// Proportional, integral and derivative gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain (1/s).
    pub ki: f64,
    /// Derivative gain (s).
    pub kd: f64,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    /// All-zero gains: the controller never produces a non-zero output.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Gains tuned for the reference thruster plant (K = 1, tau = 0.632 s):
    /// `kp = K`, `ki = K / tau`, `kd = 0.1`.
    pub fn reference() -> Self {
        Self::new(1.0, 1.582, 0.1)
    }

    pub fn is_finite(&self) -> bool {
        self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()
    }
}

impl Default for PidGains {
    fn default() -> Self {
        Self::reference()
    }
}

/// PID controller state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidControllerState {
    /// Integral accumulator (already scaled by `ki`).
    pub integral: f64,
    /// Plant output seen on the previous update.
    pub previous_output: f64,
}

impl PidControllerState {
    pub fn new(initial_output: f64) -> Self {
        Self {
            integral: 0.0,
            previous_output: initial_output,
        }
    }
}

impl Default for PidControllerState {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Individual contributions of one controller update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidTerms {
    pub p: f64,
    pub i: f64,
    pub d: f64,
    pub output: f64,
}

/// PID controller owning its gains and running state.
#[derive(Debug, Clone, PartialEq)]
pub struct PidController {
    gains: PidGains,
    state: PidControllerState,
}

impl PidController {
    /// Controller starting from a plant output of zero.
    pub fn new(gains: PidGains) -> Self {
        Self::with_initial_output(gains, 0.0)
    }

    /// Controller whose derivative history starts at `initial_output`.
    pub fn with_initial_output(gains: PidGains, initial_output: f64) -> Self {
        Self {
            gains,
            state: PidControllerState::new(initial_output),
        }
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    pub fn state(&self) -> &PidControllerState {
        &self.state
    }

    pub fn integral(&self) -> f64 {
        self.state.integral
    }

    /// Discard accumulated state.
    pub fn reset(&mut self, initial_output: f64) {
        self.state = PidControllerState::new(initial_output);
    }

    /// Compute the next control signal.
    ///
    /// # Arguments
    ///
    /// * `desired` - Setpoint for this sample
    /// * `previous_actual` - Plant output at the previous sample
    /// * `current_actual` - Plant output at this sample
    /// * `dt` - Time since the previous sample (seconds)
    ///
    /// # Errors
    ///
    /// [`ControlError::DivisionByZero`] if `dt == 0`, and
    /// [`ControlError::InvalidArg`] if `dt` is negative or not finite. The
    /// state is left untouched on error.
    pub fn compute_output(
        &mut self,
        desired: f64,
        previous_actual: f64,
        current_actual: f64,
        dt: f64,
    ) -> ControlResult<f64> {
        self.compute_terms(desired, previous_actual, current_actual, dt)
            .map(|terms| terms.output)
    }

    /// Like [`compute_output`](Self::compute_output), using the plant output
    /// remembered from the previous update as `previous_actual`.
    pub fn step(&mut self, desired: f64, current_actual: f64, dt: f64) -> ControlResult<f64> {
        let previous = self.state.previous_output;
        self.compute_output(desired, previous, current_actual, dt)
    }

    /// Compute the next control signal and report each term.
    pub fn compute_terms(
        &mut self,
        desired: f64,
        previous_actual: f64,
        current_actual: f64,
        dt: f64,
    ) -> ControlResult<PidTerms> {
        if dt == 0.0 {
            return Err(ControlError::DivisionByZero {
                what: "controller update with zero elapsed time",
            });
        }
        if !dt.is_finite() || dt < 0.0 {
            return Err(ControlError::InvalidArg {
                what: "dt must be positive and finite",
            });
        }

        let error = desired - current_actual;
        let p = self.gains.kp * error;

        self.state.integral += self.gains.ki * error * dt;

        let d = -self.gains.kd * (current_actual - previous_actual) / dt;

        self.state.previous_output = current_actual;

        Ok(PidTerms {
            p,
            i: self.state.integral,
            d,
            output: p + self.state.integral + d,
        })
    }
}
