//! Adaptive-step initial value problem solvers.
//!
//! [`AdaptiveSolver`] is the capability "solve an IVP with error-controlled
//! step sizes and a step-size ceiling". Both implementations delegate to the
//! `ode_solvers` crate: [`Dop853Solver`] to its Dormand-Prince 8(5,3) method
//! and [`Dopri5Solver`] to the lower-order Dormand-Prince 5(4) pair.

use crate::error::{IntegrationError, Result};
use crate::model::State;
use crate::trajectory::Trajectory;
use crate::traits::DynamicalSystem;
use ode_solvers::dop_shared::{IntegrationError as OdeError, OutputType, Stats};
use ode_solvers::{Dop853, Dopri5, Vector2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Solves a two-species initial value problem on `t_span` with steps no
/// larger than `max_step`.
///
/// The returned trajectory starts at `(t_span.0, initial)`; later time points
/// are chosen by the solver's error controller.
pub trait AdaptiveSolver {
    fn solve<S: DynamicalSystem<f64>>(
        &self,
        system: &S,
        t_span: (f64, f64),
        initial: State,
        max_step: f64,
    ) -> Result<Trajectory>;
}

pub(crate) fn check_dimension<S: DynamicalSystem<f64>>(system: &S) -> Result<()> {
    let dim = system.dimension();
    if dim != 2 {
        return Err(IntegrationError::DimensionMismatch {
            expected: 2,
            actual: dim,
        });
    }
    Ok(())
}

fn check_problem<S: DynamicalSystem<f64>>(
    system: &S,
    t_span: (f64, f64),
    max_step: f64,
) -> Result<()> {
    check_dimension(system)?;
    if !max_step.is_finite() || max_step <= 0.0 {
        return Err(IntegrationError::InvalidStep { dt: max_step });
    }
    let (t0, t_end) = t_span;
    if !t0.is_finite() || !t_end.is_finite() || t_end < t0 {
        return Err(IntegrationError::InvalidHorizon { t_final: t_end });
    }
    Ok(())
}

fn single_point(t0: f64, initial: State) -> Trajectory {
    let mut trajectory = Trajectory::with_capacity(1);
    trajectory.push(t0, initial);
    trajectory
}

/// Explicit budget, or twice the steps needed at the ceiling plus slack.
fn step_budget(max_steps: Option<u32>, span: f64, max_step: f64) -> u32 {
    max_steps.unwrap_or_else(|| {
        let minimum = (span / max_step).ceil();
        (2.0 * minimum + 1000.0).min(u32::MAX as f64) as u32
    })
}

fn integration_failure(err: OdeError, max_steps: u32) -> IntegrationError {
    match err {
        OdeError::MaxNumStepReached { x, .. } => {
            IntegrationError::MaxStepsReached { t: x, max_steps }
        }
        OdeError::StepSizeUnderflow { x } => IntegrationError::StepSizeUnderflow { t: x },
        OdeError::StiffnessDetected { x } => IntegrationError::StiffnessDetected { t: x },
    }
}

fn finish(
    method: &str,
    outcome: std::result::Result<Stats, OdeError>,
    max_steps: u32,
) -> Result<()> {
    match outcome {
        Ok(stats) => {
            debug!(
                method,
                evaluations = stats.num_eval,
                accepted = stats.accepted_steps,
                rejected = stats.rejected_steps,
                "adaptive solver finished"
            );
            Ok(())
        }
        Err(err) => {
            debug!(method, ?err, "adaptive solver failed");
            Err(integration_failure(err, max_steps))
        }
    }
}

fn collect_output(t0: f64, initial: State, times: &[f64], states: &[Vector2<f64>]) -> Trajectory {
    let mut trajectory = Trajectory::with_capacity(times.len() + 1);
    trajectory.push(t0, initial);
    for (&t, y) in times.iter().zip(states) {
        // The solver may or may not echo the initial point.
        if t <= t0 {
            continue;
        }
        trajectory.push(t, State::new(y[0], y[1]));
    }
    trajectory
}

/// Exposes a [`DynamicalSystem`] through the `ode_solvers` system interface.
struct FieldAdapter<'a, S> {
    system: &'a S,
}

impl<S: DynamicalSystem<f64>> ode_solvers::System<f64, Vector2<f64>> for FieldAdapter<'_, S> {
    fn system(&self, t: f64, y: &Vector2<f64>, dy: &mut Vector2<f64>) {
        self.system.apply(t, y.as_slice(), dy.as_mut_slice());
    }
}

/// Dormand-Prince 8(5,3) settings.
///
/// The default tolerances are the usual `rtol = 1e-3`, `atol = 1e-6`.
/// `max_steps = None` sizes the step budget from the span and the step
/// ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dop853Solver {
    pub rtol: f64,
    pub atol: f64,
    pub max_steps: Option<u32>,
}

impl Default for Dop853Solver {
    fn default() -> Self {
        Self {
            rtol: 1e-3,
            atol: 1e-6,
            max_steps: None,
        }
    }
}

impl Dop853Solver {
    const SAFETY_FACTOR: f64 = 0.9;
    const BETA: f64 = 0.0;
    const FAC_MIN: f64 = 0.333;
    const FAC_MAX: f64 = 6.0;
    const STIFFNESS_CHECK_INTERVAL: u32 = 1000;

    pub fn with_tolerances(rtol: f64, atol: f64) -> Self {
        Self {
            rtol,
            atol,
            ..Self::default()
        }
    }
}

impl AdaptiveSolver for Dop853Solver {
    fn solve<S: DynamicalSystem<f64>>(
        &self,
        system: &S,
        t_span: (f64, f64),
        initial: State,
        max_step: f64,
    ) -> Result<Trajectory> {
        check_problem(system, t_span, max_step)?;
        let (t0, t_end) = t_span;
        if t_end == t0 {
            return Ok(single_point(t0, initial));
        }

        let max_steps = step_budget(self.max_steps, t_end - t0, max_step);
        let mut stepper = Dop853::from_param(
            FieldAdapter { system },
            t0,
            t_end,
            0.0,
            Vector2::new(initial.prey, initial.predator),
            self.rtol,
            self.atol,
            Self::SAFETY_FACTOR,
            Self::BETA,
            Self::FAC_MIN,
            Self::FAC_MAX,
            max_step,
            0.0,
            max_steps,
            Self::STIFFNESS_CHECK_INTERVAL,
            OutputType::Sparse,
        );
        finish("DOP853", stepper.integrate(), max_steps)?;
        Ok(collect_output(t0, initial, stepper.x_out(), stepper.y_out()))
    }
}

/// Dormand-Prince 5(4) settings. Same defaults as [`Dop853Solver`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dopri5Solver {
    pub rtol: f64,
    pub atol: f64,
    pub max_steps: Option<u32>,
}

impl Default for Dopri5Solver {
    fn default() -> Self {
        Self {
            rtol: 1e-3,
            atol: 1e-6,
            max_steps: None,
        }
    }
}

impl Dopri5Solver {
    const SAFETY_FACTOR: f64 = 0.9;
    const BETA: f64 = 0.04;
    const FAC_MIN: f64 = 0.2;
    const FAC_MAX: f64 = 10.0;
    const STIFFNESS_CHECK_INTERVAL: u32 = 1000;

    pub fn with_tolerances(rtol: f64, atol: f64) -> Self {
        Self {
            rtol,
            atol,
            ..Self::default()
        }
    }
}

impl AdaptiveSolver for Dopri5Solver {
    fn solve<S: DynamicalSystem<f64>>(
        &self,
        system: &S,
        t_span: (f64, f64),
        initial: State,
        max_step: f64,
    ) -> Result<Trajectory> {
        check_problem(system, t_span, max_step)?;
        let (t0, t_end) = t_span;
        if t_end == t0 {
            return Ok(single_point(t0, initial));
        }

        let max_steps = step_budget(self.max_steps, t_end - t0, max_step);
        let mut stepper = Dopri5::from_param(
            FieldAdapter { system },
            t0,
            t_end,
            0.0,
            Vector2::new(initial.prey, initial.predator),
            self.rtol,
            self.atol,
            Self::SAFETY_FACTOR,
            Self::BETA,
            Self::FAC_MIN,
            Self::FAC_MAX,
            max_step,
            0.0,
            max_steps,
            Self::STIFFNESS_CHECK_INTERVAL,
            OutputType::Sparse,
        );
        finish("DOPRI5", stepper.integrate(), max_steps)?;
        Ok(collect_output(t0, initial, stepper.x_out(), stepper.y_out()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LotkaVolterra, Parameters};

    struct Decay;

    impl DynamicalSystem<f64> for Decay {
        fn dimension(&self) -> usize {
            2
        }

        fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
            out[0] = -x[0];
            out[1] = -2.0 * x[1];
        }
    }

    struct OneDimensional;

    impl DynamicalSystem<f64> for OneDimensional {
        fn dimension(&self) -> usize {
            1
        }

        fn apply(&self, _t: f64, _x: &[f64], out: &mut [f64]) {
            out[0] = 0.0;
        }
    }

    fn assert_time_monotone(trajectory: &Trajectory, t0: f64, t_end: f64) {
        assert_eq!(trajectory.times()[0], t0);
        assert!(trajectory.times().windows(2).all(|w| w[0] <= w[1]));
        let last = trajectory.final_time().expect("non-empty trajectory");
        assert!((last - t_end).abs() < 1e-9, "ended at {last}");
    }

    #[test]
    fn dop853_tracks_exponential_decay() {
        let solver = Dop853Solver::with_tolerances(1e-10, 1e-12);
        let trajectory = solver
            .solve(&Decay, (0.0, 2.0), State::new(1.0, 1.0), 0.1)
            .expect("decay should integrate");
        assert_time_monotone(&trajectory, 0.0, 2.0);
        let end = trajectory.final_state().expect("final state");
        assert!((end.prey - (-2.0_f64).exp()).abs() < 1e-8);
        assert!((end.predator - (-4.0_f64).exp()).abs() < 1e-8);
    }

    #[test]
    fn dop853_respects_step_ceiling() {
        let trajectory = Dop853Solver::default()
            .solve(&Decay, (0.0, 1.0), State::new(1.0, 1.0), 0.05)
            .expect("decay should integrate");
        assert!(trajectory.len() >= 21);
        for window in trajectory.times().windows(2) {
            assert!(window[1] - window[0] <= 0.05 + 1e-12);
        }
    }

    #[test]
    fn dop853_reports_step_budget_exhaustion() {
        let solver = Dop853Solver {
            max_steps: Some(5),
            ..Dop853Solver::default()
        };
        let system = LotkaVolterra::new(Parameters::default());
        let err = solver
            .solve(&system, (0.0, 100.0), State::new(0.3, 0.6), 0.01)
            .expect_err("five steps cannot cover the span");
        match err {
            IntegrationError::MaxStepsReached { t, max_steps } => {
                assert_eq!(max_steps, 5);
                // Stopped where the solver gave up, well short of the horizon.
                assert!((0.0..=5.0 * 0.01 + 1e-12).contains(&t), "stopped at {t}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn solvers_reject_bad_problems() {
        let solver = Dop853Solver::default();
        let initial = State::new(1.0, 1.0);
        assert_eq!(
            solver.solve(&Decay, (0.0, 1.0), initial, 0.0).unwrap_err(),
            IntegrationError::InvalidStep { dt: 0.0 }
        );
        assert_eq!(
            solver.solve(&Decay, (0.0, -1.0), initial, 0.1).unwrap_err(),
            IntegrationError::InvalidHorizon { t_final: -1.0 }
        );
        assert_eq!(
            Dopri5Solver::default()
                .solve(&OneDimensional, (0.0, 1.0), initial, 0.1)
                .unwrap_err(),
            IntegrationError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn empty_span_returns_initial_point() {
        let initial = State::new(0.3, 0.6);
        for trajectory in [
            Dop853Solver::default()
                .solve(&Decay, (0.0, 0.0), initial, 0.1)
                .unwrap(),
            Dopri5Solver::default()
                .solve(&Decay, (0.0, 0.0), initial, 0.1)
                .unwrap(),
        ] {
            assert_eq!(trajectory.len(), 1);
            assert_eq!(trajectory.initial_state(), Some(initial));
        }
    }

    #[test]
    fn dopri5_tracks_exponential_decay() {
        let trajectory = Dopri5Solver::with_tolerances(1e-10, 1e-12)
            .solve(&Decay, (0.0, 3.0), State::new(2.0, 1.0), 0.5)
            .expect("decay should integrate");
        assert_time_monotone(&trajectory, 0.0, 3.0);
        let end = trajectory.final_state().expect("final state");
        assert!((end.prey - 2.0 * (-3.0_f64).exp()).abs() < 1e-8);
        assert!((end.predator - (-6.0_f64).exp()).abs() < 1e-8);
    }

    #[test]
    fn dopri5_and_dop853_agree_on_lotka_volterra() {
        let system = LotkaVolterra::new(Parameters::default());
        let initial = State::new(0.3, 0.6);
        let dop853 = Dop853Solver::with_tolerances(1e-10, 1e-12)
            .solve(&system, (0.0, 10.0), initial, 0.1)
            .unwrap();
        let dopri5 = Dopri5Solver::with_tolerances(1e-10, 1e-12)
            .solve(&system, (0.0, 10.0), initial, 0.1)
            .unwrap();
        let a = dop853.final_state().unwrap();
        let b = dopri5.final_state().unwrap();
        assert!((a.prey - b.prey).abs() < 1e-6);
        assert!((a.predator - b.predator).abs() < 1e-6);
    }

    #[test]
    fn dopri5_respects_step_ceiling_and_budget() {
        let trajectory = Dopri5Solver::default()
            .solve(&Decay, (0.0, 1.0), State::new(1.0, 1.0), 0.05)
            .expect("decay should integrate");
        for window in trajectory.times().windows(2) {
            assert!(window[1] - window[0] <= 0.05 + 1e-12);
        }

        let solver = Dopri5Solver {
            max_steps: Some(3),
            ..Dopri5Solver::default()
        };
        let err = solver
            .solve(&Decay, (0.0, 10.0), State::new(1.0, 1.0), 0.1)
            .unwrap_err();
        assert!(matches!(
            err,
            IntegrationError::MaxStepsReached { max_steps: 3, .. }
        ));
    }
}
