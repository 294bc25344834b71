//! Simulation time grid.
//!
//! A [`TimeGrid`] is the ordered set of instants at which the plant output is
//! sampled and the controller updates. Construction is the only place the
//! ordering invariant is checked: once built, every adjacent pair satisfies
//! `t[i] > t[i-1]`, so downstream code can integrate forward without re-checking.

use crate::error::{CoreError, CoreResult};
use crate::numeric::Real;

/// Largest grid [`TimeGrid::uniform`] will build: 250 times the 20 000 point
/// reference grid. Each closed-loop run keeps five series of this length.
pub const MAX_GRID_POINTS: usize = 5_000_000;

/// Ordered, strictly increasing, non-empty sequence of timestamps in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<Real>,
}

impl TimeGrid {
    /// Build a grid from explicit timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `times` is empty, contains a
    /// non-finite value, or has any adjacent pair with `t[i] <= t[i-1]`.
    pub fn new(times: Vec<Real>) -> CoreResult<Self> {
        if times.is_empty() {
            return Err(CoreError::InvalidInput {
                what: "time grid must contain at least one timestamp".to_string(),
            });
        }
        if let Some(index) = crate::numeric::first_non_finite(&times) {
            return Err(CoreError::InvalidInput {
                what: format!("time grid entry {index} is not finite ({})", times[index]),
            });
        }
        for (i, pair) in times.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(CoreError::InvalidInput {
                    what: format!(
                        "time grid is not strictly increasing at index {}: {} -> {}",
                        i + 1,
                        pair[0],
                        pair[1]
                    ),
                });
            }
        }
        Ok(Self { times })
    }

    /// Build a grid from a borrowed slice.
    pub fn from_slice(times: &[Real]) -> CoreResult<Self> {
        Self::new(times.to_vec())
    }

    /// Half-open uniform grid `start, start + step, ...` strictly below `end`.
    ///
    /// Each entry is computed as `start + i * step` rather than by repeated
    /// addition so rounding error does not accumulate over long grids.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidArg`] for a non-positive step, an empty range, or
    /// more than [`MAX_GRID_POINTS`] points. Nothing is allocated on error.
    pub fn uniform(start: Real, end: Real, step: Real) -> CoreResult<Self> {
        let count = Self::uniform_len(start, end, step)?;
        let times: Vec<Real> = (0..count).map(|i| start + i as Real * step).collect();
        Self::new(times)
    }

    /// Number of points [`uniform`](Self::uniform) would produce, computed
    /// without building the grid.
    pub fn uniform_len(start: Real, end: Real, step: Real) -> CoreResult<usize> {
        crate::numeric::ensure_finite(start, "grid start")?;
        crate::numeric::ensure_finite(end, "grid end")?;
        crate::numeric::ensure_finite(step, "grid step")?;
        if step <= 0.0 {
            return Err(CoreError::InvalidArg {
                what: "grid step must be positive",
            });
        }
        if end <= start {
            return Err(CoreError::InvalidArg {
                what: "grid end must be greater than start",
            });
        }

        let estimate = ((end - start) / step).ceil();
        if !estimate.is_finite() || estimate > MAX_GRID_POINTS as Real {
            return Err(CoreError::InvalidArg {
                what: "grid has too many points",
            });
        }

        // `start` itself is always inside the range.
        let mut count = (estimate as usize).max(1);
        while count > 1 && start + (count - 1) as Real * step >= end {
            count -= 1;
        }
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always `false` for a constructed grid.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn as_slice(&self) -> &[Real] {
        &self.times
    }

    pub fn start(&self) -> Real {
        self.times[0]
    }

    pub fn end(&self) -> Real {
        self.times[self.times.len() - 1]
    }

    /// Consecutive `(t[i-1], t[i])` pairs, in order.
    pub fn intervals(&self) -> impl Iterator<Item = (Real, Real)> + '_ {
        self.times.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn iter(&self) -> impl Iterator<Item = Real> + '_ {
        self.times.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_increasing_grid() {
        let grid = TimeGrid::new(vec![0.0, 0.1, 0.3]).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.start(), 0.0);
        assert_eq!(grid.end(), 0.3);
        assert_eq!(grid.intervals().count(), 2);
    }

    #[test]
    fn single_point_grid_is_valid() {
        let grid = TimeGrid::new(vec![1.5]).unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.intervals().count(), 0);
    }

    #[test]
    fn rejects_empty_grid() {
        assert!(matches!(
            TimeGrid::new(vec![]),
            Err(CoreError::InvalidInput { .. })
        ));
    }

    #[test]
    fn rejects_repeated_timestamp() {
        let err = TimeGrid::new(vec![0.0, 0.1, 0.1, 0.2]).unwrap_err();
        match err {
            CoreError::InvalidInput { what } => assert!(what.contains("index 2")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_decreasing_timestamp() {
        assert!(TimeGrid::new(vec![0.0, 0.2, 0.1]).is_err());
    }

    #[test]
    fn rejects_nan_timestamp() {
        assert!(TimeGrid::new(vec![0.0, f64::NAN, 0.2]).is_err());
    }

    #[test]
    fn uniform_matches_reference_grid() {
        let grid = TimeGrid::uniform(0.0, 20.0, 0.001).unwrap();
        assert_eq!(grid.len(), 20_000);
        assert_eq!(grid.start(), 0.0);
        assert!((grid.end() - 19.999).abs() < 1e-9);
        assert!(grid.end() < 20.0);
    }

    #[test]
    fn uniform_rejects_bad_arguments() {
        assert!(TimeGrid::uniform(0.0, 1.0, 0.0).is_err());
        assert!(TimeGrid::uniform(0.0, 1.0, -0.1).is_err());
        assert!(TimeGrid::uniform(1.0, 1.0, 0.1).is_err());
        assert!(TimeGrid::uniform(0.0, f64::INFINITY, 0.1).is_err());
    }

    #[test]
    fn oversized_uniform_grid_is_rejected_before_allocating() {
        assert!(matches!(
            TimeGrid::uniform_len(0.0, 1e7, 1e-3),
            Err(CoreError::InvalidArg { .. })
        ));
        assert!(TimeGrid::uniform(0.0, 1e7, 1e-3).is_err());
        // Finite bounds whose quotient overflows.
        assert!(TimeGrid::uniform_len(-1e308, 1e308, 1e-300).is_err());
        assert_eq!(TimeGrid::uniform_len(0.0, 1.0, 1e-6).unwrap(), 1_000_000);
    }

    #[test]
    fn uniform_len_matches_built_grid() {
        for (start, end, step) in [(0.0, 20.0, 0.001), (0.0, 6.0, 0.002), (0.0, 0.3, 0.1)] {
            let len = TimeGrid::uniform_len(start, end, step).unwrap();
            assert_eq!(len, TimeGrid::uniform(start, end, step).unwrap().len());
        }
    }

    proptest! {
        #[test]
        fn uniform_grids_are_strictly_increasing(
            start in -10.0_f64..10.0,
            span in 0.01_f64..5.0,
            step in 0.0005_f64..0.5,
        ) {
            let grid = TimeGrid::uniform(start, start + span, step).unwrap();
            prop_assert!(grid.len() >= 1);
            for (t0, t1) in grid.intervals() {
                prop_assert!(t1 > t0);
            }
            prop_assert!(grid.end() < start + span);
        }

        #[test]
        fn any_non_increasing_pair_is_rejected(
            mut times in prop::collection::vec(-100.0_f64..100.0, 2..40),
            index in 1usize..40,
        ) {
            times.sort_by(|a, b| a.partial_cmp(b).unwrap());
            times.dedup();
            prop_assume!(times.len() >= 2);
            let i = index % (times.len() - 1) + 1;
            times[i] = times[i - 1];
            prop_assert!(TimeGrid::new(times).is_err());
        }
    }
}
