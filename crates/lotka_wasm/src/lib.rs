//! WASM bridge exposing the prey-predator integrators to a browser front end,
//! which owns all plotting.

mod simulate;
mod system;

pub use simulate::{default_scenario, simulate, simulate_columns};
pub use system::WasmModel;
