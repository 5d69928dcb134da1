//! The `lotka_core` crate integrates the two-species Lotka-Volterra
//! (prey-predator) system.
//!
//! Key components:
//! - **Traits**: `Scalar` (numeric type abstraction), `DynamicalSystem` (vector fields), `Steppable` (fixed-step solvers).
//! - **Model**: the Lotka-Volterra vector field and its rate parameters.
//! - **Solvers**: the explicit forward Euler stepper.
//! - **Adaptive**: the `AdaptiveSolver` capability and its DOP853 and DOPRI5 backends.
//! - **Integrate**: drivers that turn a system and an initial state into a `Trajectory`.
//! - **Scenario**: the run configuration value object and the two-method comparison.
//! - **Equilibrium**: fixed points, linear stability and the conserved first integral.
pub mod adaptive;
pub mod equilibrium;
pub mod error;
pub mod integrate;
pub mod model;
pub mod scenario;
pub mod solvers;
pub mod trajectory;
pub mod traits;

pub use adaptive::{AdaptiveSolver, Dop853Solver, Dopri5Solver};
pub use error::{IntegrationError, Result};
pub use integrate::{integrate_adaptive, integrate_fixed_step};
pub use model::{vector_field, LotkaVolterra, Parameters, State};
pub use scenario::{Comparison, Scenario};
pub use trajectory::Trajectory;
