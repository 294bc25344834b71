//! Discrete-time PID control for pidsim.
//!
//! The controller runs in sampled mode: it is evaluated once per simulation
//! step with the plant output integrated up to that step, and its output is
//! held constant by the plant integrator until the next step.
//!
//! The controller deliberately has no anti-windup and no output clamping.
//! With large or oscillatory gains the integral accumulator can grow without
//! bound; callers that need saturation must apply it themselves.

pub mod controller;
pub mod error;

pub use controller::{PidController, PidControllerState, PidGains};
pub use error::{ControlError, ControlResult};
