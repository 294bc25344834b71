//! Wall-clock timers for run bookkeeping.
//!
//! Only used to report how long loading, solving and saving took. Simulated
//! values never depend on anything measured here.

use std::time::Instant;

/// A simple timer that measures elapsed wall time.
#[derive(Debug)]
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Seconds since the timer was started.
    pub fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Stop the timer and return elapsed time in seconds.
    pub fn stop(self) -> f64 {
        self.elapsed_s()
    }
}

/// Per-phase wall times for one run, in seconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseTimes {
    pub load_s: f64,
    pub solve_s: f64,
    pub save_s: f64,
    pub cache_load_s: f64,
}

impl PhaseTimes {
    pub fn total_s(&self) -> f64 {
        self.load_s + self.solve_s + self.save_s + self.cache_load_s
    }
}
