use crate::model::{Parameters, State};
use nalgebra::{Complex, DMatrix};
use serde::{Deserialize, Serialize};

/// Relative threshold below which an eigenvalue component counts as zero.
const ZERO_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexNumber {
    pub re: f64,
    pub im: f64,
}

impl From<Complex<f64>> for ComplexNumber {
    fn from(value: Complex<f64>) -> Self {
        Self {
            re: value.re,
            im: value.im,
        }
    }
}

/// Linear stability type of a planar fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stability {
    Saddle,
    Center,
    StableNode,
    UnstableNode,
    StableFocus,
    UnstableFocus,
    Degenerate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumResult {
    pub state: State,
    /// Row-major 2x2 Jacobian.
    pub jacobian: Vec<f64>,
    pub eigenvalues: Vec<ComplexNumber>,
    pub stability: Stability,
}

/// Fixed points of the field: extinction `(0, 0)` and, when predation and
/// conversion are non-zero, coexistence `(c/d, a/b)`.
pub fn equilibria(params: &Parameters) -> Vec<State> {
    let mut points = vec![State::new(0.0, 0.0)];
    if params.b != 0.0 && params.d != 0.0 {
        points.push(State::new(params.c / params.d, params.a / params.b));
    }
    points
}

/// Row-major Jacobian of the field at `state`.
pub fn jacobian(params: &Parameters, state: State) -> [f64; 4] {
    let Parameters { a, b, c, d } = *params;
    let State { prey, predator } = state;
    [
        a - b * predator,
        -b * prey,
        d * predator,
        -c + d * prey,
    ]
}

/// Linearizes the field at `state` and classifies it.
pub fn classify(params: &Parameters, state: State) -> EquilibriumResult {
    let jacobian = jacobian(params, state);
    let matrix = DMatrix::from_row_slice(2, 2, &jacobian);
    let eigenvalues: Vec<Complex<f64>> = matrix.complex_eigenvalues().iter().copied().collect();
    let scale = jacobian.iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));

    EquilibriumResult {
        state,
        jacobian: jacobian.to_vec(),
        stability: stability_of(&eigenvalues, scale),
        eigenvalues: eigenvalues.into_iter().map(ComplexNumber::from).collect(),
    }
}

fn stability_of(eigenvalues: &[Complex<f64>], scale: f64) -> Stability {
    let tol = ZERO_TOLERANCE * scale;
    let is_zero = |v: f64| v.abs() <= tol;

    if eigenvalues.iter().any(|l| is_zero(l.re) && is_zero(l.im)) {
        return Stability::Degenerate;
    }
    if eigenvalues.iter().any(|l| !is_zero(l.im)) {
        let re = eigenvalues[0].re;
        return if is_zero(re) {
            Stability::Center
        } else if re < 0.0 {
            Stability::StableFocus
        } else {
            Stability::UnstableFocus
        };
    }

    let negative = eigenvalues.iter().filter(|l| l.re < 0.0).count();
    match negative {
        0 => Stability::UnstableNode,
        n if n == eigenvalues.len() => Stability::StableNode,
        _ => Stability::Saddle,
    }
}

/// Conserved quantity `V = d*N1 - c ln N1 + b*N2 - a ln N2` of the exact
/// flow. Undefined (`None`) unless both populations are positive.
pub fn first_integral(params: &Parameters, state: State) -> Option<f64> {
    let State { prey, predator } = state;
    if !(prey > 0.0 && predator > 0.0) || !state.is_finite() {
        return None;
    }
    let Parameters { a, b, c, d } = *params;
    Some(d * prey - c * prey.ln() + b * predator - a * predator.ln())
}
