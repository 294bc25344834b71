use crate::CoreError;

/// Floating point type used throughout the simulator.
pub type Real = f64;

/// Absolute/relative comparison tolerance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Tolerances {
    /// Tight tolerance for comparing values that should agree to rounding.
    pub const STRICT: Self = Self {
        abs: 1e-12,
        rel: 1e-9,
    };

    /// Tolerance used when comparing a numerical solution against an analytic one.
    pub const SOLVER: Self = Self {
        abs: 1e-4,
        rel: 1e-6,
    };
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::STRICT
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Position of the first non-finite entry, if any.
pub fn first_non_finite(values: &[Real]) -> Option<usize> {
    values.iter().position(|v| !v.is_finite())
}
