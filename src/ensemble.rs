// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Polymer SSA Suite - Ensemble Runner
//
// Runs N independent trajectories with identical parameters and collects
// their terminal lengths in generation order. The resulting sequence is what
// the histogram, the CLI table and the browser plot consume.

use serde::{Deserialize, Serialize};

use crate::params::{SimError, SimulationParams};
use crate::path::{PathSimulator, PathSummary};
use crate::source::{path_stream, EventSource};

/// Path count of the reference run.
pub const DEFAULT_NUM_PATHS: usize = 1000;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// A reproducible ensemble: parameters, path count and base seed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    pub num_paths: usize,
    pub seed: u64,
    pub params: SimulationParams,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            num_paths: DEFAULT_NUM_PATHS,
            seed: 0,
            params: SimulationParams::default(),
        }
    }
}

impl EnsembleConfig {
    /// # Errors
    /// `InvalidParameter` for a zero path count or bad simulation parameters.
    pub fn validate(&self) -> Result<(), SimError> {
        validate_num_paths(self.num_paths)?;
        self.params.validate()
    }
}

fn validate_num_paths(num_paths: usize) -> Result<(), SimError> {
    if num_paths == 0 {
        return Err(SimError::InvalidParameter {
            name: "num_paths",
            value: 0.0,
            reason: "must be at least 1",
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// EnsembleRunner
// ---------------------------------------------------------------------------

/// Drives a [`PathSimulator`] over many independent paths.
#[derive(Debug, Clone)]
pub struct EnsembleRunner {
    simulator: PathSimulator,
    num_paths: usize,
}

impl EnsembleRunner {
    /// Validates everything up front so no path runs on bad input.
    pub fn new(num_paths: usize, params: SimulationParams) -> Result<Self, SimError> {
        validate_num_paths(num_paths)?;
        Ok(Self {
            simulator: PathSimulator::new(params)?,
            num_paths,
        })
    }

    pub fn num_paths(&self) -> usize {
        self.num_paths
    }

    pub fn params(&self) -> &SimulationParams {
        self.simulator.params()
    }

    /// Run every path against one shared source, in call order.
    pub fn run<S: EventSource + ?Sized>(&self, source: &mut S) -> Vec<u64> {
        log::debug!(
            "ensemble start: {} paths, n0={}, T={}, pi={}, eps={}",
            self.num_paths,
            self.params().initial_length,
            self.params().horizon,
            self.params().rates.pi,
            self.params().rates.epsilon,
        );
        let mut final_lengths = Vec::with_capacity(self.num_paths);
        for _ in 0..self.num_paths {
            final_lengths.push(self.simulator.run(source));
        }
        log::debug!("ensemble done: {} terminal lengths", final_lengths.len());
        final_lengths
    }

    /// Run every path on its own ChaCha stream derived from `seed`.
    ///
    /// Entry `i` depends only on `(seed, i)`, never on the other paths.
    pub fn run_streams(&self, seed: u64) -> Vec<PathSummary> {
        log::debug!("seeded ensemble start: {} paths, seed={}", self.num_paths, seed);
        let summaries: Vec<PathSummary> = (0..self.num_paths as u64)
            .map(|i| self.simulator.run_with_summary(&mut path_stream(seed, i)))
            .collect();
        let events: u64 = summaries.iter().map(PathSummary::events).sum();
        log::debug!("seeded ensemble done: {} events applied", events);
        summaries
    }

    /// Terminal lengths of a reproducible ensemble.
    pub fn run_seeded(config: &EnsembleConfig) -> Result<Vec<u64>, SimError> {
        let runner = Self::new(config.num_paths, config.params)?;
        Ok(runner
            .run_streams(config.seed)
            .iter()
            .map(|s| s.final_length)
            .collect())
    }

    /// Re-simulate path `index` of a seeded ensemble.
    ///
    /// # Errors
    /// `InvalidParameter` if `config` is invalid or `index` is out of range.
    pub fn replay_path(config: &EnsembleConfig, index: usize) -> Result<PathSummary, SimError> {
        config.validate()?;
        if index >= config.num_paths {
            return Err(SimError::InvalidParameter {
                name: "index",
                value: index as f64,
                reason: "must be below num_paths",
            });
        }
        let simulator = PathSimulator::new(config.params)?;
        Ok(simulator.run_with_summary(&mut path_stream(config.seed, index as u64)))
    }
}

/// Simulate `num_paths` independent paths drawing from one shared source.
///
/// # Errors
/// `InvalidParameter` before any path runs if `num_paths == 0` or a
/// simulation parameter is invalid.
pub fn run_ensemble<S: EventSource + ?Sized>(
    num_paths: usize,
    params: &SimulationParams,
    source: &mut S,
) -> Result<Vec<u64>, SimError> {
    Ok(EnsembleRunner::new(num_paths, *params)?.run(source))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
