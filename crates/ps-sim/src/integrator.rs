//! Fixed-step time integrators.

use crate::error::SimResult;
use crate::model::TransientModel;

/// One-step method for a [`TransientModel`].
pub trait Integrator {
    /// State at `t + dt` given state `x` at `t`.
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State>;
}

/// Classical fourth-order Runge-Kutta.
#[derive(Clone, Debug, Default)]
pub struct RK4;

impl Integrator for RK4 {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let half = 0.5 * dt;
        let k1 = model.rhs(t, x)?;
        let x2 = model.add_scaled(x, &k1, half);
        let k2 = model.rhs(t + half, &x2)?;
        let x3 = model.add_scaled(x, &k2, half);
        let k3 = model.rhs(t + half, &x3)?;
        let x4 = model.add_scaled(x, &k3, dt);
        let k4 = model.rhs(t + dt, &x4)?;

        // k1 + 2 k2 + 2 k3 + k4
        let weighted = model.add(
            &model.add_scaled(&k1, &k2, 2.0),
            &model.add_scaled(&k4, &k3, 2.0),
        );
        Ok(model.add_scaled(x, &weighted, dt / 6.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// dx/dt = -x, x(0) = 1.
    struct Decay;

    impl TransientModel for Decay {
        type State = f64;

        fn initial_state(&self) -> f64 {
            1.0
        }

        fn rhs(&mut self, _t: f64, x: &f64) -> SimResult<f64> {
            Ok(-x)
        }

        fn add(&self, a: &f64, b: &f64) -> f64 {
            a + b
        }

        fn scale(&self, a: &f64, scale: f64) -> f64 {
            a * scale
        }
    }

    #[test]
    fn rk4_tracks_exponential_decay() {
        let mut model = Decay;
        let mut x = model.initial_state();
        let dt = 0.01;
        for i in 0..100 {
            x = RK4.step(&mut model, i as f64 * dt, &x, dt).unwrap();
        }
        assert!((x - (-1.0_f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn rk4_local_error_is_fifth_order() {
        let mut model = Decay;
        let err = |dt: f64, model: &mut Decay| {
            let x = RK4.step(model, 0.0, &1.0, dt).unwrap();
            (x - (-dt).exp()).abs()
        };
        let coarse = err(0.2, &mut model);
        let fine = err(0.1, &mut model);
        // Halving dt should shrink the one-step error by roughly 2^5.
        assert!(coarse / fine > 20.0);
    }
}
