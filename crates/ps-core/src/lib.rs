//! ps-core: shared foundation for pidsim.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - grid (validated, strictly increasing simulation time grid)
//! - profile (setpoint profiles sampled onto a grid)
//! - timing (wall-clock timers for run bookkeeping, never for simulated values)
//! - error (shared error types)

pub mod error;
pub mod grid;
pub mod numeric;
pub mod profile;
pub mod timing;

pub use error::{CoreError, CoreResult};
pub use grid::{MAX_GRID_POINTS, TimeGrid};
pub use numeric::*;
pub use profile::SetpointProfile;
