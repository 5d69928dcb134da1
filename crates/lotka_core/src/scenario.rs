use crate::adaptive::{AdaptiveSolver, Dop853Solver};
use crate::equilibrium::first_integral;
use crate::error::Result;
use crate::integrate::{integrate_adaptive, integrate_fixed_step};
use crate::model::{LotkaVolterra, Parameters, State};
use crate::trajectory::Trajectory;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One prey-predator run: rates, initial populations, step size and horizon.
///
/// Missing fields deserialize to the reference run
/// (`a=1, b=2, c=1, d=3`, `N1=0.3`, `N2=0.6`, `dt=0.01`, `t_final=100`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub parameters: Parameters,
    pub initial: State,
    /// Fixed-step size, and the step ceiling of the adaptive solver.
    pub dt: f64,
    pub t_final: f64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            parameters: Parameters::default(),
            initial: State::new(0.3, 0.6),
            dt: 0.01,
            t_final: 100.0,
        }
    }
}

impl Scenario {
    pub fn system(&self) -> LotkaVolterra {
        LotkaVolterra::new(self.parameters)
    }

    pub fn run_fixed_step(&self) -> Result<Trajectory> {
        integrate_fixed_step(&self.system(), self.dt, self.initial, self.t_final)
    }

    pub fn run_adaptive(&self) -> Result<Trajectory> {
        self.run_adaptive_with(&Dop853Solver::default())
    }

    pub fn run_adaptive_with<A: AdaptiveSolver>(&self, solver: &A) -> Result<Trajectory> {
        integrate_adaptive(&self.system(), self.dt, self.initial, self.t_final, solver)
    }

    /// Runs both methods. Either failure aborts the comparison.
    pub fn compare(&self) -> Result<Comparison> {
        self.compare_with(&Dop853Solver::default())
    }

    pub fn compare_with<A: AdaptiveSolver>(&self, solver: &A) -> Result<Comparison> {
        let fixed = self.run_fixed_step()?;
        let adaptive = self.run_adaptive_with(solver)?;
        info!(
            fixed_points = fixed.len(),
            adaptive_points = adaptive.len(),
            "prey-predator comparison finished"
        );
        Ok(Comparison {
            scenario: *self,
            fixed,
            adaptive,
        })
    }

    /// Figure title listing the run's values.
    pub fn title(&self) -> String {
        let Parameters { a, b, c, d } = self.parameters;
        format!(
            "N1_initial = {}; N2_initial = {}\na = {};  b = {}; c = {}; d = {}; dT = {}",
            self.initial.prey, self.initial.predator, a, b, c, d, self.dt
        )
    }
}

/// The two trajectories of one scenario, as handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub scenario: Scenario,
    pub fixed: Trajectory,
    pub adaptive: Trajectory,
}

impl Comparison {
    /// Largest absolute change of the conserved quantity along each
    /// trajectory, as `(fixed, adaptive)`.
    ///
    /// `None` when a trajectory leaves the positive quadrant, where the
    /// quantity is undefined.
    pub fn invariant_drift(&self) -> (Option<f64>, Option<f64>) {
        let params = self.scenario.parameters;
        let drift = |trajectory: &Trajectory| -> Option<f64> {
            let reference = first_integral(&params, trajectory.initial_state()?)?;
            trajectory.points().try_fold(0.0_f64, |worst, (_, state)| {
                let value = first_integral(&params, state)?;
                Some(worst.max((value - reference).abs()))
            })
        };
        (drift(&self.fixed), drift(&self.adaptive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scenario_is_reference_run() {
        let scenario = Scenario::default();
        assert_eq!(scenario.parameters, Parameters::new(1.0, 2.0, 1.0, 3.0));
        assert_eq!(scenario.initial, State::new(0.3, 0.6));
        assert_eq!(scenario.dt, 0.01);
        assert_eq!(scenario.t_final, 100.0);
    }

    #[test]
    fn title_lists_every_value() {
        let title = Scenario::default().title();
        assert_eq!(
            title,
            "N1_initial = 0.3; N2_initial = 0.6\na = 1;  b = 2; c = 1; d = 3; dT = 0.01"
        );
    }

    #[test]
    fn compare_runs_both_methods() {
        let scenario = Scenario {
            t_final: 5.0,
            ..Scenario::default()
        };
        let comparison = scenario.compare().expect("comparison should run");
        assert_eq!(comparison.fixed.len(), 501);
        assert_eq!(comparison.adaptive.times()[0], 0.0);
        assert_eq!(comparison.scenario, scenario);
    }

    #[test]
    fn adaptive_conserves_invariant_better_than_euler() {
        let comparison = Scenario::default().compare().expect("comparison should run");
        let (fixed, adaptive) = comparison.invariant_drift();
        let fixed = fixed.expect("Euler orbit stays positive at dt = 0.01");
        let adaptive = adaptive.expect("DOP853 orbit stays positive");
        assert!(adaptive < fixed, "adaptive {adaptive} vs fixed {fixed}");
    }

    #[test]
    fn invariant_drift_is_undefined_off_the_positive_quadrant() {
        let scenario = Scenario {
            initial: State::new(1.0, 2.0),
            dt: 1.0,
            t_final: 1.0,
            ..Scenario::default()
        };
        let comparison = scenario.compare().expect("comparison should run");
        assert_eq!(comparison.invariant_drift().0, None);
    }
}
