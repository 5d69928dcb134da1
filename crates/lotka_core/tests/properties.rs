use lotka_core::equilibrium::equilibria;
use lotka_core::{
    integrate_adaptive, integrate_fixed_step, Dop853Solver, Dopri5Solver, LotkaVolterra, Parameters,
    Scenario, State, Trajectory,
};

/// Value of the fixed-step trajectory at the grid point nearest to `t`.
fn fixed_at(trajectory: &Trajectory, dt: f64, t: f64) -> State {
    let index = (t / dt).round() as usize;
    trajectory
        .state_at(index.min(trajectory.len() - 1))
        .expect("index within trajectory")
}

#[test]
fn fixed_and_adaptive_agree_for_small_steps() {
    let scenario = Scenario {
        dt: 1e-4,
        t_final: 1.0,
        ..Scenario::default()
    };
    let fixed = scenario.run_fixed_step().expect("fixed step runs");
    let adaptive = scenario.run_adaptive().expect("adaptive runs");

    assert_eq!(fixed.len(), 10_001);
    for (t, state) in adaptive.points() {
        let reference = fixed_at(&fixed, scenario.dt, t);
        assert!(
            (state.prey - reference.prey).abs() < 1e-2,
            "prey differs at t = {t}"
        );
        assert!(
            (state.predator - reference.predator).abs() < 1e-2,
            "predator differs at t = {t}"
        );
    }
}

#[test]
fn prey_grows_exponentially_without_predation() {
    let params = Parameters::new(1.0, 0.0, 1.0, 3.0);
    let system = LotkaVolterra::new(params);
    let initial = State::new(0.3, 0.6);
    let (dt, t_final) = (1e-4, 2.0);

    let fixed = integrate_fixed_step(&system, dt, initial, t_final).unwrap();
    let adaptive =
        integrate_adaptive(&system, dt, initial, t_final, &Dop853Solver::default()).unwrap();

    for trajectory in [&fixed, &adaptive] {
        for (t, state) in trajectory.points() {
            let exact = initial.prey * (params.a * t).exp();
            assert!(
                ((state.prey - exact) / exact).abs() < 1e-3,
                "prey {} vs exact {exact} at t = {t}",
                state.prey
            );
        }
    }
}

#[test]
fn prey_growth_does_not_depend_on_predators_without_predation() {
    let system = LotkaVolterra::new(Parameters::new(1.0, 0.0, 1.0, 3.0));
    let few = integrate_fixed_step(&system, 0.01, State::new(0.3, 0.1), 3.0).unwrap();
    let many = integrate_fixed_step(&system, 0.01, State::new(0.3, 5.0), 3.0).unwrap();
    assert_eq!(few.prey(), many.prey());
    assert_ne!(few.predator(), many.predator());
}

#[test]
fn coexistence_point_is_fixed_for_every_integrator() {
    let params = Parameters::default();
    let system = LotkaVolterra::new(params);
    let point = equilibria(&params)[1];

    let fixed = integrate_fixed_step(&system, 0.01, point, 10.0).unwrap();
    let dop853 = integrate_adaptive(&system, 0.01, point, 10.0, &Dop853Solver::default()).unwrap();
    let dopri5 = integrate_adaptive(&system, 0.01, point, 10.0, &Dopri5Solver::default()).unwrap();

    for trajectory in [&fixed, &dop853, &dopri5] {
        for (_, state) in trajectory.points() {
            assert!((state.prey - point.prey).abs() < 1e-12);
            assert!((state.predator - point.predator).abs() < 1e-12);
        }
    }
}

#[test]
fn adaptive_output_differs_from_fixed_grid() {
    let scenario = Scenario {
        t_final: 10.0,
        dt: 0.5,
        ..Scenario::default()
    };
    let fixed = scenario.run_fixed_step().unwrap();
    let adaptive = scenario.run_adaptive().unwrap();
    assert_eq!(fixed.len(), 21);
    for window in adaptive.times().windows(2) {
        assert!(window[1] - window[0] <= 0.5 + 1e-12);
    }
    assert!((adaptive.final_time().unwrap() - 10.0).abs() < 1e-9);
}

#[test]
fn scenario_runs_are_independent() {
    let scenario = Scenario {
        t_final: 2.0,
        ..Scenario::default()
    };
    let first = scenario.run_adaptive().unwrap();
    let other = Scenario {
        parameters: Parameters::new(2.0, 1.0, 0.5, 1.0),
        ..scenario
    }
    .run_adaptive()
    .unwrap();
    let again = scenario.run_adaptive().unwrap();
    assert_eq!(first, again);
    assert_ne!(first, other);
}
