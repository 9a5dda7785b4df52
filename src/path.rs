// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Polymer SSA Suite - Path Simulator
//
// One Gillespie trajectory of the polymer length n from t = 0 to the horizon.
// Two competing events: addition (rate pi, n -> n + 1) and removal
// (rate epsilon, n -> max(0, n - 1)). The event that would cross the horizon
// is discarded, so the reported length is the state after the last event
// strictly before T.

use serde::{Deserialize, Serialize};

use crate::params::{SimError, SimulationParams};
use crate::source::EventSource;

// ─── State ──────────────────────────────────────────────────────────────────

/// Mutable state of one trajectory. Lives for exactly one path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    /// Simulation clock, non-decreasing.
    pub t: f64,
    /// Polymer length, never negative.
    pub n: i64,
}

impl SimulationState {
    pub fn new(initial_length: i64) -> Self {
        Self { t: 0.0, n: initial_length }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolymerEvent {
    Addition,
    Removal,
}

/// Outcome of a single SSA step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// An event fired before the horizon and was applied.
    Fired { event: PolymerEvent, reflected: bool },
    /// The next event would land at or past the horizon; nothing was applied.
    Horizon,
}

/// Terminal length of one path plus its event counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathSummary {
    pub final_length: u64,
    pub additions: u64,
    pub removals: u64,
    /// Removals that fired at n = 0 and left n unchanged.
    pub reflected_removals: u64,
    /// Clock after the last applied event (0 when none fired).
    pub last_event_time: f64,
}

impl PathSummary {
    pub fn events(&self) -> u64 {
        self.additions + self.removals
    }
}

// ─── PathSimulator ──────────────────────────────────────────────────────────

/// Validated parameters ready to run any number of trajectories.
///
/// With `epsilon -> 0` no removal ever fires and n is non-decreasing along
/// a path; the zero rate itself is rejected by validation.
#[derive(Debug, Clone)]
pub struct PathSimulator {
    params: SimulationParams,
    total_rate: f64,
    addition_probability: f64,
}

impl PathSimulator {
    /// # Errors
    /// `InvalidParameter` if any precondition of `params` fails.
    pub fn new(params: SimulationParams) -> Result<Self, SimError> {
        params.validate()?;
        Ok(Self {
            params,
            total_rate: params.rates.total_rate(),
            addition_probability: params.rates.addition_probability(),
        })
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Advance `state` by one SSA step.
    ///
    /// Draws one waiting time; only if the candidate time is before the
    /// horizon is a uniform drawn and the chosen event applied.
    pub fn step<S: EventSource + ?Sized>(
        &self,
        state: &mut SimulationState,
        source: &mut S,
    ) -> Step {
        let dt = source.waiting_time(self.total_rate);
        let candidate = state.t + dt;
        if candidate >= self.params.horizon {
            return Step::Horizon;
        }
        state.t = candidate;

        if source.uniform() < self.addition_probability {
            state.n += 1;
            Step::Fired { event: PolymerEvent::Addition, reflected: false }
        } else {
            let reflected = state.n == 0;
            state.n = (state.n - 1).max(0);
            Step::Fired { event: PolymerEvent::Removal, reflected }
        }
    }

    /// Run one trajectory and return its terminal length.
    pub fn run<S: EventSource + ?Sized>(&self, source: &mut S) -> u64 {
        self.run_with_summary(source).final_length
    }

    /// Run one trajectory and keep its event counters.
    pub fn run_with_summary<S: EventSource + ?Sized>(&self, source: &mut S) -> PathSummary {
        let mut state = SimulationState::new(self.params.initial_length);
        let mut summary = PathSummary {
            final_length: 0,
            additions: 0,
            removals: 0,
            reflected_removals: 0,
            last_event_time: 0.0,
        };

        // n >= 0 is unreachable as an exit while removals clamp at zero.
        while state.t < self.params.horizon && state.n >= 0 {
            match self.step(&mut state, source) {
                Step::Horizon => break,
                Step::Fired { event: PolymerEvent::Addition, .. } => summary.additions += 1,
                Step::Fired { event: PolymerEvent::Removal, reflected } => {
                    summary.removals += 1;
                    if reflected {
                        summary.reflected_removals += 1;
                    }
                }
            }
        }

        summary.final_length = u64::try_from(state.n).unwrap_or(0);
        summary.last_event_time = state.t;
        summary
    }
}

/// Simulate one path of the reflected birth-death process.
///
/// # Errors
/// `InvalidParameter` on a bad precondition; no draws are consumed then.
pub fn simulate_path<S: EventSource + ?Sized>(
    params: &SimulationParams,
    source: &mut S,
) -> Result<u64, SimError> {
    Ok(PathSimulator::new(*params)?.run(source))
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::seeded;
    use std::collections::VecDeque;

    /// Replays fixed waiting times and uniforms; counts what was consumed.
    struct Scripted {
        waits: VecDeque<f64>,
        uniforms: VecDeque<f64>,
        waits_drawn: usize,
        uniforms_drawn: usize,
    }

    impl Scripted {
        fn new(waits: &[f64], uniforms: &[f64]) -> Self {
            Self {
                waits: waits.iter().copied().collect(),
                uniforms: uniforms.iter().copied().collect(),
                waits_drawn: 0,
                uniforms_drawn: 0,
            }
        }
    }

    impl EventSource for Scripted {
        fn waiting_time(&mut self, _total_rate: f64) -> f64 {
            self.waits_drawn += 1;
            self.waits.pop_front().expect("test: script ran out of waiting times")
        }

        fn uniform(&mut self) -> f64 {
            self.uniforms_drawn += 1;
            self.uniforms.pop_front().expect("test: script ran out of uniforms")
        }
    }

    fn sim(n0: i64, horizon: f64, pi: f64, epsilon: f64) -> PathSimulator {
        PathSimulator::new(SimulationParams::new(n0, horizon, pi, epsilon))
            .expect("test: valid params")
    }

    #[test]
    fn crossing_event_is_discarded() {
        // p(add) = 0.5. Events at t = 1, 2 are applied; the one at 10.5 is not.
        let s = sim(3, 10.0, 1.0, 1.0);
        let mut src = Scripted::new(&[1.0, 1.0, 8.5], &[0.1, 0.1]);
        let summary = s.run_with_summary(&mut src);
        assert_eq!(summary.final_length, 5);
        assert_eq!(summary.additions, 2);
        assert_eq!(summary.last_event_time, 2.0);
        assert_eq!(src.waits_drawn, 3);
        assert_eq!(src.uniforms_drawn, 2, "no uniform for the discarded event");
    }

    #[test]
    fn landing_exactly_on_horizon_is_discarded() {
        let s = sim(4, 2.0, 1.0, 1.0);
        let mut src = Scripted::new(&[2.0], &[]);
        assert_eq!(s.run(&mut src), 4);
        assert_eq!(src.uniforms_drawn, 0);
    }

    #[test]
    fn uniform_threshold_selects_event() {
        // p(add) = 0.7 / 1.1 ≈ 0.636
        let s = sim(5, 100.0, 0.7, 0.4);
        let mut state = SimulationState::new(5);
        let mut src = Scripted::new(&[0.5, 0.5], &[0.63, 0.64]);
        assert_eq!(
            s.step(&mut state, &mut src),
            Step::Fired { event: PolymerEvent::Addition, reflected: false }
        );
        assert_eq!(state.n, 6);
        assert_eq!(
            s.step(&mut state, &mut src),
            Step::Fired { event: PolymerEvent::Removal, reflected: false }
        );
        assert_eq!(state.n, 5);
        assert_eq!(state.t, 1.0);
    }

    #[test]
    fn removal_at_zero_is_reflected_but_counted() {
        let s = sim(0, 10.0, 1.0, 1.0);
        let mut src = Scripted::new(&[1.0, 1.0, 1.0, 20.0], &[0.9, 0.9, 0.1]);
        let summary = s.run_with_summary(&mut src);
        assert_eq!(summary.final_length, 1);
        assert_eq!(summary.removals, 2);
        assert_eq!(summary.reflected_removals, 2);
        assert_eq!(summary.additions, 1);
        assert_eq!(summary.events(), 3);
        assert_eq!(summary.last_event_time, 3.0);
    }

    #[test]
    fn clock_is_monotone_and_length_non_negative() {
        let s = sim(0, 50.0, 0.2, 5.0);
        let mut rng = seeded(11);
        let mut state = SimulationState::new(0);
        let mut last_t = 0.0;
        while let Step::Fired { .. } = s.step(&mut state, &mut rng) {
            assert!(state.t >= last_t);
            assert!(state.n >= 0);
            last_t = state.t;
        }
        assert!(state.t < 50.0);
    }

    #[test]
    fn tiny_horizon_returns_initial_length() {
        let mut rng = seeded(1);
        let params = SimulationParams::new(10, 1e-9, 0.7, 0.4);
        let hits = (0..1000)
            .filter(|_| simulate_path(&params, &mut rng).expect("test: valid") == 10)
            .count();
        assert!(hits >= 999, "only {hits}/1000 paths returned n0");
    }

    #[test]
    fn invalid_params_consume_no_draws() {
        let mut src = Scripted::new(&[], &[]);
        let params = SimulationParams::new(1, 0.0, 0.7, 0.4);
        let err = simulate_path(&params, &mut src).expect_err("test: zero horizon");
        assert_eq!(err.parameter(), "horizon");
        assert_eq!(src.waits_drawn, 0);
    }

    #[test]
    fn same_seed_same_path() {
        let params = SimulationParams::new(10, 200.0, 0.7, 0.4);
        let a = simulate_path(&params, &mut seeded(99)).expect("test: valid");
        let b = simulate_path(&params, &mut seeded(99)).expect("test: valid");
        assert_eq!(a, b);
    }
}
