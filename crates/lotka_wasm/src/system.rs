//! Stateful model handle for interactive stepping.

use lotka_core::equilibrium::{classify, equilibria, jacobian, EquilibriumResult};
use lotka_core::solvers::ForwardEuler;
use lotka_core::traits::Steppable;
use lotka_core::{vector_field, LotkaVolterra, Parameters, State};
use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmModel {
    system: LotkaVolterra,
    state: [f64; 2],
    t: f64,
    stepper: ForwardEuler<f64>,
}

#[wasm_bindgen]
impl WasmModel {
    #[wasm_bindgen(constructor)]
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> WasmModel {
        console_error_panic_hook::set_once();

        WasmModel {
            system: LotkaVolterra::new(Parameters::new(a, b, c, d)),
            state: [0.0; 2],
            t: 0.0,
            stepper: ForwardEuler::new(2),
        }
    }

    pub fn set_state(&mut self, state: &[f64]) -> Result<(), JsValue> {
        if state.len() != 2 {
            return Err(JsValue::from_str(&format!(
                "State dimension mismatch. Expected 2, got {}.",
                state.len()
            )));
        }
        self.state.copy_from_slice(state);
        Ok(())
    }

    pub fn get_state(&self) -> Vec<f64> {
        self.state.to_vec()
    }

    pub fn set_t(&mut self, t: f64) {
        self.t = t;
    }

    pub fn get_t(&self) -> f64 {
        self.t
    }

    /// Advances the current state by one forward Euler step.
    pub fn step(&mut self, dt: f64) {
        self.stepper
            .step(&self.system, &mut self.t, &mut self.state[..], dt);
    }

    /// dN1/dt and dN2/dt at the current state.
    pub fn vector_field(&self) -> Vec<f64> {
        let (dprey, dpredator) = vector_field(
            self.t,
            State::from(self.state),
            &self.system.params,
        );
        vec![dprey, dpredator]
    }

    /// Row-major Jacobian at the current state.
    pub fn compute_jacobian(&self) -> Vec<f64> {
        jacobian(&self.system.params, State::from(self.state)).to_vec()
    }

    pub fn equilibria(&self) -> Result<JsValue, JsValue> {
        let results: Vec<EquilibriumResult> = equilibria(&self.system.params)
            .into_iter()
            .map(|point| classify(&self.system.params, point))
            .collect();
        to_value(&results).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
