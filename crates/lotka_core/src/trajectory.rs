use crate::model::State;
use serde::Serialize;

/// Time points paired with the populations at each point.
///
/// The three columns are index-aligned and the first entry is the initial
/// condition. A trajectory is built once by an integrator and is read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    times: Vec<f64>,
    prey: Vec<f64>,
    predator: Vec<f64>,
}

impl Trajectory {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            times: Vec::with_capacity(capacity),
            prey: Vec::with_capacity(capacity),
            predator: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, t: f64, state: State) {
        debug_assert!(
            self.times.last().map_or(true, |&last| last <= t),
            "trajectory times must be non-decreasing"
        );
        self.times.push(t);
        self.prey.push(state.prey);
        self.predator.push(state.predator);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// N1 column.
    pub fn prey(&self) -> &[f64] {
        &self.prey
    }

    /// N2 column.
    pub fn predator(&self) -> &[f64] {
        &self.predator
    }

    pub fn state_at(&self, index: usize) -> Option<State> {
        Some(State::new(
            *self.prey.get(index)?,
            *self.predator.get(index)?,
        ))
    }

    pub fn initial_state(&self) -> Option<State> {
        self.state_at(0)
    }

    pub fn final_state(&self) -> Option<State> {
        self.state_at(self.len().checked_sub(1)?)
    }

    pub fn final_time(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Smallest population of either species, `None` when empty.
    pub fn min_population(&self) -> Option<f64> {
        self.prey
            .iter()
            .chain(self.predator.iter())
            .copied()
            .reduce(f64::min)
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, State)> + '_ {
        self.times
            .iter()
            .zip(self.prey.iter().zip(self.predator.iter()))
            .map(|(&t, (&prey, &predator))| (t, State::new(prey, predator)))
    }

    /// Consumes the trajectory, returning `(times, prey, predator)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        (self.times, self.prey, self.predator)
    }
}
