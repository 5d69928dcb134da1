//! One-shot runs of both integrators for the plotting front end.

use js_sys::{Array, Float64Array};
use lotka_core::{Comparison, Dop853Solver, Dopri5Solver, Scenario, Trajectory};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

fn parse_scenario(scenario: JsValue) -> Result<Scenario, JsValue> {
    if scenario.is_undefined() || scenario.is_null() {
        return Ok(Scenario::default());
    }
    from_value(scenario).map_err(|e| JsValue::from_str(&format!("Invalid scenario: {}", e)))
}

fn run(scenario: &Scenario, solver_name: &str) -> Result<Comparison, JsValue> {
    let result = match solver_name {
        "dop853" | "rk8" => scenario.compare_with(&Dop853Solver::default()),
        "dopri5" => scenario.compare_with(&Dopri5Solver::default()),
        _ => return Err(JsValue::from_str("Unknown solver")),
    };
    result.map_err(|e| JsValue::from_str(&format!("Integration failed: {}", e)))
}

/// The reference run's configuration.
#[wasm_bindgen]
pub fn default_scenario() -> Result<JsValue, JsValue> {
    to_value(&Scenario::default()).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Runs forward Euler and the named adaptive solver (`"dop853"` or
/// `"dopri5"`) and returns the serialized comparison together with the
/// figure title.
#[wasm_bindgen]
pub fn simulate(scenario: JsValue, solver_name: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let scenario = parse_scenario(scenario)?;
    let comparison = run(&scenario, solver_name)?;

    #[derive(serde::Serialize)]
    struct Payload<'a> {
        title: String,
        comparison: &'a Comparison,
    }

    to_value(&Payload {
        title: scenario.title(),
        comparison: &comparison,
    })
    .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn columns(trajectory: &Trajectory) -> Array {
    let out = Array::new();
    out.push(&Float64Array::from(trajectory.times()));
    out.push(&Float64Array::from(trajectory.prey()));
    out.push(&Float64Array::from(trajectory.predator()));
    out
}

/// Same run as [`simulate`], returned as typed arrays:
/// `[[t, N1, N2] (Euler), [t, N1, N2] (adaptive)]`.
#[wasm_bindgen]
pub fn simulate_columns(scenario: JsValue, solver_name: &str) -> Result<Array, JsValue> {
    console_error_panic_hook::set_once();

    let scenario = parse_scenario(scenario)?;
    let comparison = run(&scenario, solver_name)?;
    let out = Array::new();
    out.push(&columns(&comparison.fixed));
    out.push(&columns(&comparison.adaptive));
    Ok(out)
}
