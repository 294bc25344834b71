//! Continuous-time models that generic integrators can advance.

use crate::error::SimResult;

/// A system `dx/dt = f(t, x)` with a vector-space state.
///
/// Integrators only ever touch the state through [`add`](Self::add) and
/// [`scale`](Self::scale), so a model is free to pick any state
/// representation: a bare `f64` for the first-order plant, a struct for
/// anything richer.
pub trait TransientModel {
    type State: Clone;

    /// State at the start of the integration window.
    fn initial_state(&self) -> Self::State;

    /// Time derivative of `x` at `t`. Mutable so models can keep scratch data.
    fn rhs(&mut self, t: f64, x: &Self::State) -> SimResult<Self::State>;

    /// `a + b`
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// `scale * a`
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;

    /// `x + h * k`, the stage update every explicit scheme needs.
    fn add_scaled(&self, x: &Self::State, k: &Self::State, h: f64) -> Self::State {
        self.add(x, &self.scale(k, h))
    }
}
