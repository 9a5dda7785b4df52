// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Polymer SSA Suite - Parameters & Validation
//
// Rate constants and run parameters for the polymer birth-death process.
// Defaults reproduce the reference run: n0 = 10, T = 1000, pi = 0.7, eps = 0.4.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Monomer addition rate of the reference run.
pub const DEFAULT_ADDITION_RATE: f64 = 0.7;

/// Monomer removal rate of the reference run.
pub const DEFAULT_REMOVAL_RATE: f64 = 0.4;

/// Time horizon of the reference run.
pub const DEFAULT_HORIZON: f64 = 1000.0;

/// Initial polymer length of the reference run.
pub const DEFAULT_INITIAL_LENGTH: i64 = 10;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised before any trajectory is simulated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl SimError {
    fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        SimError::InvalidParameter { name, value, reason }
    }

    /// Name of the offending parameter.
    pub fn parameter(&self) -> &'static str {
        match self {
            SimError::InvalidParameter { name, .. } => *name,
        }
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), SimError> {
    if !value.is_finite() {
        return Err(SimError::invalid(name, value, "must be finite"));
    }
    if value <= 0.0 {
        return Err(SimError::invalid(name, value, "must be strictly positive"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rate constants
// ---------------------------------------------------------------------------

/// The two competing event rates. Both are constant for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateConstants {
    /// Addition rate (pi).
    pub pi: f64,
    /// Removal rate (epsilon).
    pub epsilon: f64,
}

impl Default for RateConstants {
    fn default() -> Self {
        Self {
            pi: DEFAULT_ADDITION_RATE,
            epsilon: DEFAULT_REMOVAL_RATE,
        }
    }
}

impl RateConstants {
    pub fn new(pi: f64, epsilon: f64) -> Self {
        Self { pi, epsilon }
    }

    /// Rate of the superposed Poisson process, pi + epsilon.
    pub fn total_rate(&self) -> f64 {
        self.pi + self.epsilon
    }

    /// Probability that a fired event is an addition.
    pub fn addition_probability(&self) -> f64 {
        self.pi / self.total_rate()
    }

    /// Drift of the unconstrained walk, pi - epsilon.
    pub fn drift(&self) -> f64 {
        self.pi - self.epsilon
    }

    pub fn validate(&self) -> Result<(), SimError> {
        require_positive("pi", self.pi)?;
        require_positive("epsilon", self.epsilon)
    }
}

// ---------------------------------------------------------------------------
// Simulation parameters
// ---------------------------------------------------------------------------

/// Everything one trajectory needs besides a random source.
///
/// `initial_length` is signed so that negative values coming from a config
/// file or from JavaScript can be represented and rejected by [`validate`](Self::validate).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub initial_length: i64,
    pub horizon: f64,
    pub rates: RateConstants,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            initial_length: DEFAULT_INITIAL_LENGTH,
            horizon: DEFAULT_HORIZON,
            rates: RateConstants::default(),
        }
    }
}

impl SimulationParams {
    pub fn new(initial_length: i64, horizon: f64, pi: f64, epsilon: f64) -> Self {
        Self {
            initial_length,
            horizon,
            rates: RateConstants::new(pi, epsilon),
        }
    }

    /// Check every precondition of a trajectory.
    ///
    /// # Errors
    /// `InvalidParameter` naming the first offending field: a negative
    /// `initial_length`, a non-positive or non-finite `horizon`, or a
    /// non-positive or non-finite rate.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.initial_length < 0 {
            return Err(SimError::invalid(
                "initial_length",
                self.initial_length as f64,
                "must be non-negative",
            ));
        }
        require_positive("horizon", self.horizon)?;
        self.rates.validate()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_run() {
        let p = SimulationParams::default();
        assert_eq!(p.initial_length, 10);
        assert_eq!(p.horizon, 1000.0);
        assert_eq!(p.rates.pi, 0.7);
        assert_eq!(p.rates.epsilon, 0.4);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn derived_rates() {
        let r = RateConstants::new(0.7, 0.4);
        assert!((r.total_rate() - 1.1).abs() < 1e-12);
        assert!((r.addition_probability() - 0.7 / 1.1).abs() < 1e-12);
        assert!((r.drift() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn rejects_negative_initial_length() {
        let err = SimulationParams::new(-1, 1.0, 0.7, 0.4)
            .validate()
            .expect_err("test: negative n0 must fail");
        assert_eq!(err.parameter(), "initial_length");
    }

    #[test]
    fn rejects_bad_horizon() {
        for horizon in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let err = SimulationParams::new(0, horizon, 0.7, 0.4)
                .validate()
                .expect_err("test: bad horizon must fail");
            assert_eq!(err.parameter(), "horizon");
        }
    }

    #[test]
    fn rejects_bad_rates() {
        let err = SimulationParams::new(0, 1.0, 0.0, 0.4).validate().unwrap_err();
        assert_eq!(err.parameter(), "pi");
        let err = SimulationParams::new(0, 1.0, 0.7, -0.1).validate().unwrap_err();
        assert_eq!(err.parameter(), "epsilon");
        let err = SimulationParams::new(0, 1.0, f64::NAN, 0.4).validate().unwrap_err();
        assert_eq!(err.parameter(), "pi");
    }

    #[test]
    fn error_message_names_parameter() {
        let err = SimulationParams::new(0, 1.0, 0.7, 0.0).validate().unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("epsilon"), "unexpected message: {msg}");
        assert!(msg.contains("strictly positive"), "unexpected message: {msg}");
    }

    #[test]
    fn params_round_trip_through_json() {
        let p = SimulationParams::new(3, 50.0, 0.2, 0.9);
        let json = serde_json::to_string(&p).expect("test: serialize");
        let back: SimulationParams = serde_json::from_str(&json).expect("test: deserialize");
        assert_eq!(p, back);
    }
}
