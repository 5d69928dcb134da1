use crate::adaptive::{check_dimension, AdaptiveSolver};
use crate::error::{IntegrationError, Result};
use crate::model::State;
use crate::solvers::ForwardEuler;
use crate::trajectory::Trajectory;
use crate::traits::{DynamicalSystem, Steppable};
use tracing::{debug, warn};

/// Relative slack used to decide whether `t_final` is a whole number of steps.
const GRID_SNAP_TOLERANCE: f64 = 1e-9;

/// Upper bound on the number of points of a fixed-step grid.
const MAX_GRID_POINTS: f64 = u32::MAX as f64;

fn check_horizon(t_final: f64) -> Result<()> {
    if !t_final.is_finite() || t_final < 0.0 {
        return Err(IntegrationError::InvalidHorizon { t_final });
    }
    Ok(())
}

/// Number of points of the uniform grid `0, dt, 2*dt, ...` that covers
/// `[0, t_final]` inclusively.
///
/// When `t_final` is a whole number `n` of steps the grid has `n + 1` points
/// and ends on `t_final`. Otherwise it has `floor(t_final / dt) + 2` points
/// and the last one is the first multiple of `dt` past `t_final`.
pub fn grid_len(dt: f64, t_final: f64) -> Result<usize> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(IntegrationError::InvalidStep { dt });
    }
    check_horizon(t_final)?;

    let ratio = t_final / dt;
    let nearest = ratio.round();
    let points = if (ratio - nearest).abs() <= GRID_SNAP_TOLERANCE * nearest.max(1.0) {
        nearest + 1.0
    } else {
        ratio.floor() + 2.0
    };
    if points > MAX_GRID_POINTS {
        return Err(IntegrationError::InvalidStep { dt });
    }
    Ok(points as usize)
}

/// Integrates `system` with explicit forward Euler on a uniform grid of
/// spacing `dt` from 0 to `t_final`.
///
/// Each new point uses the derivative at the previous point only:
/// `N[i] = N[i-1] + dt * f(N[i-1])`. Populations are not clamped; a
/// too-large `dt` can drive them negative or make them diverge.
pub fn integrate_fixed_step<S: DynamicalSystem<f64>>(
    system: &S,
    dt: f64,
    initial: State,
    t_final: f64,
) -> Result<Trajectory> {
    check_dimension(system)?;
    let points = grid_len(dt, t_final)?;
    debug!(dt, t_final, points, "forward Euler integration started");

    let mut trajectory = Trajectory::with_capacity(points);
    trajectory.push(0.0, initial);

    let mut stepper = ForwardEuler::<f64>::new(2);
    let mut t = 0.0;
    let mut state = initial.to_array();
    let mut warned_negative = false;

    for i in 1..points {
        stepper.step(system, &mut t, &mut state[..], dt);
        // Grid times are i*dt rather than the accumulated t to avoid drift.
        let grid_t = i as f64 * dt;
        let next = State::from(state);
        if !warned_negative && (next.prey < 0.0 || next.predator < 0.0) {
            warn!(
                t = grid_t,
                prey = next.prey,
                predator = next.predator,
                "forward Euler produced a negative population; consider a smaller dt"
            );
            warned_negative = true;
        }
        trajectory.push(grid_t, next);
    }

    debug!(
        final_time = ?trajectory.final_time(),
        "forward Euler integration finished"
    );
    Ok(trajectory)
}

/// Integrates `system` from 0 to `t_final` with an adaptive solver whose
/// step size never exceeds `dt`.
///
/// Output times are chosen by the solver. Solver failures are returned
/// unchanged.
pub fn integrate_adaptive<S, A>(
    system: &S,
    dt: f64,
    initial: State,
    t_final: f64,
    solver: &A,
) -> Result<Trajectory>
where
    S: DynamicalSystem<f64>,
    A: AdaptiveSolver,
{
    check_dimension(system)?;
    check_horizon(t_final)?;
    debug!(max_step = dt, t_final, "adaptive integration started");
    let trajectory = solver.solve(system, (0.0, t_final), initial, dt)?;
    debug!(
        points = trajectory.len(),
        "adaptive integration finished"
    );
    Ok(trajectory)
}
