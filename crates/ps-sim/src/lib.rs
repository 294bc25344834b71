//! Closed-loop transient simulation for pidsim.
//!
//! Provides:
//! - First-order-lag plant with dead time, integrated under zero-order hold
//! - Exact closed-form plant update and a fixed-step RK4 alternative
//! - Sequential plant/controller coupling over a time grid
//! - Step-response metrics for a finished run

pub mod error;
pub mod integrator;
pub mod model;
pub mod plant;
pub mod response;
pub mod sim;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use integrator::{Integrator, RK4};
pub use model::TransientModel;
pub use plant::{FirstOrderPlant, HeldInputPlant, PlantSolver};
pub use response::{StepMetrics, analyze_step};
pub use sim::{SimOptions, SimProgress, SimRecord, run_simulation, simulate, simulate_with_progress};
