//! Closed-loop simulation runner and result recording.

use ps_controls::{PidController, PidGains};
use ps_core::TimeGrid;
use tracing::{debug, info, warn};

use crate::error::{SimError, SimResult};
use crate::plant::{FirstOrderPlant, PlantSolver};

/// Options for simulation runs.
#[derive(Clone, Debug, PartialEq)]
pub struct SimOptions {
    /// Plant output at the first grid point.
    pub initial_output: f64,
    /// Plant integration method.
    pub solver: PlantSolver,
    /// Emit a progress event every N steps (0 disables progress).
    pub progress_every: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            initial_output: 0.0,
            solver: PlantSolver::default(),
            progress_every: 1000,
        }
    }
}

/// Progress report emitted while a simulation runs.
#[derive(Clone, Debug, PartialEq)]
pub struct SimProgress {
    pub step: usize,
    pub total_steps: usize,
    pub sim_time_s: f64,
    pub t_end_s: f64,
}

impl SimProgress {
    pub fn fraction_complete(&self) -> f64 {
        if self.total_steps == 0 {
            1.0
        } else {
            self.step as f64 / self.total_steps as f64
        }
    }
}

/// Record of simulation results. All series share the grid's length.
#[derive(Clone, Debug, PartialEq)]
pub struct SimRecord {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// Setpoint at each time point
    pub desired: Vec<f64>,
    /// Uncontrolled plant output (no forcing applied)
    pub actual: Vec<f64>,
    /// Plant output under PID control
    pub stabilised: Vec<f64>,
    /// Controller output computed at each time point
    pub control: Vec<f64>,
}

impl SimRecord {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

/// Closed-loop run over explicit timestamps with the reference plant and
/// zero initial output. Returns the controlled plant output, one value per
/// timestamp.
///
/// # Errors
///
/// [`SimError::InvalidInput`] if `time` is empty, non-finite or not strictly
/// increasing, if `desired` has a different length, or if a gain is not
/// finite. Validation happens before any integration.
pub fn run_simulation(time: &[f64], desired: &[f64], gains: PidGains) -> SimResult<Vec<f64>> {
    let grid = TimeGrid::from_slice(time)?;
    let record = simulate(
        &FirstOrderPlant::reference(),
        gains,
        &grid,
        desired,
        &SimOptions::default(),
    )?;
    Ok(record.stabilised)
}

/// Run a closed-loop simulation.
pub fn simulate(
    plant: &FirstOrderPlant,
    gains: PidGains,
    grid: &TimeGrid,
    desired: &[f64],
    opts: &SimOptions,
) -> SimResult<SimRecord> {
    simulate_with_progress(plant, gains, grid, desired, opts, None)
}

/// Run a closed-loop simulation, reporting progress through `progress_cb`.
///
/// Step `i` integrates the plant from `t[i-1]` to `t[i]` under the control
/// signal computed at `i-1`, then updates the controller with the new output.
pub fn simulate_with_progress(
    plant: &FirstOrderPlant,
    gains: PidGains,
    grid: &TimeGrid,
    desired: &[f64],
    opts: &SimOptions,
    mut progress_cb: Option<&mut dyn FnMut(SimProgress)>,
) -> SimResult<SimRecord> {
    validate_inputs(gains, grid, desired, opts)?;

    let t = grid.as_slice();
    let n = t.len();
    let total_steps = n - 1;
    let x0 = opts.initial_output;

    info!(
        steps = total_steps,
        t_start = grid.start(),
        t_end = grid.end(),
        kp = gains.kp,
        ki = gains.ki,
        kd = gains.kd,
        "starting closed-loop simulation"
    );

    let mut controller = PidController::with_initial_output(gains, x0);
    let mut stabilised = Vec::with_capacity(n);
    let mut actual = Vec::with_capacity(n);
    let mut control = vec![0.0; n];
    stabilised.push(x0);
    actual.push(x0);

    let mut diverged_at = None;
    for i in 1..n {
        let (t0, t1) = (t[i - 1], t[i]);

        let x = plant.integrate_with(opts.solver, stabilised[i - 1], t0, t1, control[i - 1])?;
        stabilised.push(x);
        actual.push(plant.integrate_with(opts.solver, actual[i - 1], t0, t1, 0.0)?);

        control[i] = controller.compute_output(desired[i], stabilised[i - 1], x, t1 - t0)?;

        if diverged_at.is_none() && !(x.is_finite() && control[i].is_finite()) {
            warn!(step = i, t = t1, "plant output or control signal is no longer finite");
            diverged_at = Some(i);
        }

        if opts.progress_every > 0 && (i % opts.progress_every == 0 || i == total_steps) {
            if let Some(cb) = progress_cb.as_deref_mut() {
                cb(SimProgress {
                    step: i,
                    total_steps,
                    sim_time_s: t1,
                    t_end_s: grid.end(),
                });
            }
        }
    }

    debug!(
        final_output = stabilised[n - 1],
        final_integral = controller.integral(),
        "closed-loop simulation finished"
    );

    Ok(SimRecord {
        t: t.to_vec(),
        desired: desired.to_vec(),
        actual,
        stabilised,
        control,
    })
}

fn validate_inputs(
    gains: PidGains,
    grid: &TimeGrid,
    desired: &[f64],
    opts: &SimOptions,
) -> SimResult<()> {
    if desired.len() != grid.len() {
        return Err(SimError::InvalidInput {
            what: format!(
                "desired values ({}) and time grid ({}) differ in length",
                desired.len(),
                grid.len()
            ),
        });
    }
    if let Some(index) = ps_core::first_non_finite(desired) {
        return Err(SimError::InvalidInput {
            what: format!("desired value at index {index} is not finite"),
        });
    }
    if !gains.is_finite() {
        return Err(SimError::InvalidInput {
            what: format!(
                "gains must be finite (kp={}, ki={}, kd={})",
                gains.kp, gains.ki, gains.kd
            ),
        });
    }
    if !opts.initial_output.is_finite() {
        return Err(SimError::InvalidInput {
            what: format!("initial output {} is not finite", opts.initial_output),
        });
    }
    if let PlantSolver::Rk4 { substeps: 0 } = opts.solver {
        return Err(SimError::InvalidArg {
            what: "substeps must be at least 1",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_grid() -> TimeGrid {
        TimeGrid::uniform(0.0, 0.05, 0.01).unwrap()
    }

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.initial_output, 0.0);
        assert_eq!(opts.solver, PlantSolver::Exact);
        assert_eq!(opts.progress_every, 1000);
    }

    #[test]
    fn single_point_grid_returns_initial_output() {
        let grid = TimeGrid::new(vec![0.0]).unwrap();
        let opts = SimOptions {
            initial_output: 2.5,
            ..SimOptions::default()
        };
        let record = simulate(
            &FirstOrderPlant::reference(),
            PidGains::reference(),
            &grid,
            &[1.0],
            &opts,
        )
        .unwrap();
        assert_eq!(record.stabilised, vec![2.5]);
        assert_eq!(record.control, vec![0.0]);
    }

    #[test]
    fn length_mismatch_is_invalid_input() {
        let grid = short_grid();
        let err = simulate(
            &FirstOrderPlant::reference(),
            PidGains::reference(),
            &grid,
            &[1.0; 3],
            &SimOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SimError::InvalidInput { .. }));
    }

    #[test]
    fn non_finite_gain_is_invalid_input() {
        let grid = short_grid();
        let desired = vec![1.0; grid.len()];
        let err = simulate(
            &FirstOrderPlant::reference(),
            PidGains::new(f64::INFINITY, 0.0, 0.0),
            &grid,
            &desired,
            &SimOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SimError::InvalidInput { .. }));
    }

    #[test]
    fn control_starts_at_zero_and_all_series_align() {
        let grid = short_grid();
        let desired = vec![1.0; grid.len()];
        let record = simulate(
            &FirstOrderPlant::reference(),
            PidGains::reference(),
            &grid,
            &desired,
            &SimOptions::default(),
        )
        .unwrap();
        assert_eq!(record.control[0], 0.0);
        assert_eq!(record.len(), grid.len());
        assert_eq!(record.desired.len(), grid.len());
        assert_eq!(record.actual.len(), grid.len());
        assert_eq!(record.stabilised.len(), grid.len());
        assert_eq!(record.control.len(), grid.len());
    }

    #[test]
    fn progress_reaches_completion() {
        let grid = TimeGrid::uniform(0.0, 1.0, 0.01).unwrap();
        let desired = vec![1.0; grid.len()];
        let opts = SimOptions {
            progress_every: 10,
            ..SimOptions::default()
        };
        let mut events = Vec::new();
        let mut cb = |p: SimProgress| events.push(p);
        simulate_with_progress(
            &FirstOrderPlant::reference(),
            PidGains::reference(),
            &grid,
            &desired,
            &opts,
            Some(&mut cb),
        )
        .unwrap();

        assert!(!events.is_empty());
        let last = events.last().unwrap();
        assert_eq!(last.step, grid.len() - 1);
        assert_eq!(last.fraction_complete(), 1.0);
    }
}
