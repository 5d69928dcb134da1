use crate::traits::{DynamicalSystem, Scalar};
use serde::{Deserialize, Serialize};

/// Rate constants of the prey-predator model.
///
/// - `a`: prey growth rate
/// - `b`: predation rate
/// - `c`: predator death rate
/// - `d`: predator growth per unit of predation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Parameters {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 2.0,
            c: 1.0,
            d: 3.0,
        }
    }
}

/// Populations (N1, N2) at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct State {
    /// N1
    pub prey: f64,
    /// N2
    pub predator: f64,
}

impl State {
    pub fn new(prey: f64, predator: f64) -> Self {
        Self { prey, predator }
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.prey, self.predator]
    }

    pub fn is_finite(&self) -> bool {
        self.prey.is_finite() && self.predator.is_finite()
    }
}

impl From<[f64; 2]> for State {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<State> for [f64; 2] {
    fn from(value: State) -> Self {
        value.to_array()
    }
}

/// Lotka-Volterra right-hand side, returning `(dN1/dt, dN2/dt)`.
///
/// `_t` is unused: the field is autonomous. Inputs are not validated, so
/// negative or non-finite populations are evaluated as given.
pub fn vector_field(_t: f64, state: State, params: &Parameters) -> (f64, f64) {
    let State { prey, predator } = state;
    let dprey = params.a * prey - params.b * prey * predator;
    let dpredator = -params.c * predator + params.d * prey * predator;
    (dprey, dpredator)
}

/// The prey-predator model as a [`DynamicalSystem`] over `[N1, N2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LotkaVolterra {
    pub params: Parameters,
}

impl LotkaVolterra {
    pub fn new(params: Parameters) -> Self {
        Self { params }
    }

    pub fn derivative_at(&self, state: State) -> State {
        let (dprey, dpredator) = vector_field(0.0, state, &self.params);
        State::new(dprey, dpredator)
    }
}

impl<T: Scalar> DynamicalSystem<T> for LotkaVolterra {
    fn dimension(&self) -> usize {
        2
    }

    fn apply(&self, _t: T, x: &[T], out: &mut [T]) {
        let cast = |v: f64| T::from_f64(v).unwrap_or_else(T::nan);
        let (a, b, c, d) = (
            cast(self.params.a),
            cast(self.params.b),
            cast(self.params.c),
            cast(self.params.d),
        );
        let (prey, predator) = (x[0], x[1]);
        out[0] = a * prey - b * prey * predator;
        out[1] = -c * predator + d * prey * predator;
    }
}
