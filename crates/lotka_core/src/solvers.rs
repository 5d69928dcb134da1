use crate::traits::{DynamicalSystem, Scalar, Steppable};

/// Explicit (forward) Euler solver.
///
/// The derivative is taken at the start of the interval only:
/// y_next = y + dt * f(t, y)
pub struct ForwardEuler<T: Scalar> {
    k1: Vec<T>,
}

impl<T: Scalar> ForwardEuler<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            k1: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for ForwardEuler<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        let t0 = *t;

        // k1 = f(t, y), evaluated before any component is overwritten
        system.apply(t0, state, &mut self.k1);

        for i in 0..state.len() {
            state[i] = state[i] + dt * self.k1[i];
        }

        *t = t0 + dt;
    }
}
