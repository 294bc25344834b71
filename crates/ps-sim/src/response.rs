//! Step-response metrics for a finished run.
//!
//! Metrics are measured against the last setpoint change in the record. If
//! the setpoint never changes, the step is taken from the initial plant
//! output to the (constant) setpoint, starting at the first sample.

use crate::sim::SimRecord;

/// Default settling band: 2% of the step size.
pub const DEFAULT_SETTLING_BAND: f64 = 0.02;

/// Summary of how the controlled output approached its final setpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct StepMetrics {
    /// Controlled output at the last sample.
    pub final_value: f64,
    /// Setpoint at the last sample.
    pub final_target: f64,
    /// `final_target - final_value`.
    pub steady_state_error: f64,
    /// Time at which the analysed step begins.
    pub step_time_s: f64,
    /// Extreme output value in the direction of the step.
    pub peak_value: f64,
    /// Overshoot past the final target, in percent of step size.
    /// `None` when the step size is zero.
    pub overshoot_pct: Option<f64>,
    /// Time from the step until the output last enters the settling band.
    /// `None` when the output is outside the band at the end of the run.
    pub settling_time_s: Option<f64>,
    /// True if any output sample is NaN or infinite.
    pub diverged: bool,
}

/// Analyse the controlled output of `record` with the given settling band
/// (fraction of step size, e.g. 0.02 for 2%).
///
/// Returns `None` for an empty record.
pub fn analyze_step(record: &SimRecord, band_fraction: f64) -> Option<StepMetrics> {
    let n = record.len();
    if n == 0 {
        return None;
    }

    let x = &record.stabilised;
    let desired = &record.desired;
    let final_value = x[n - 1];
    let final_target = desired[n - 1];
    let diverged = ps_core::first_non_finite(x).is_some();

    let step_index = (1..n)
        .rev()
        .find(|&i| desired[i] != desired[i - 1])
        .unwrap_or(0);
    let start_level = if step_index == 0 {
        x[0]
    } else {
        desired[step_index - 1]
    };
    let step_size = final_target - start_level;
    let step_time_s = record.t[step_index];
    let after = &x[step_index..];

    let direction = if step_size < 0.0 { -1.0 } else { 1.0 };
    let peak_value = after
        .iter()
        .copied()
        .fold(after[0], |best, v| if direction * v > direction * best { v } else { best });

    let overshoot_pct = if step_size != 0.0 {
        Some((direction * (peak_value - final_target) / step_size.abs() * 100.0).max(0.0))
    } else {
        None
    };

    let band = if step_size != 0.0 {
        band_fraction * step_size.abs()
    } else {
        band_fraction * final_target.abs().max(1.0)
    };
    let outside = |v: f64| !v.is_finite() || (v - final_target).abs() > band;
    let settling_time_s = match after.iter().rposition(|&v| outside(v)) {
        None => Some(0.0),
        Some(last) if last + 1 < after.len() => {
            Some(record.t[step_index + last + 1] - step_time_s)
        }
        Some(_) => None,
    };

    Some(StepMetrics {
        final_value,
        final_target,
        steady_state_error: final_target - final_value,
        step_time_s,
        peak_value,
        overshoot_pct,
        settling_time_s,
        diverged,
    })
}
