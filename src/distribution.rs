// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Polymer SSA Suite - Empirical Distribution
//
// Turns an ensemble of terminal lengths into an estimate of P_n(T): a
// unit-width integer histogram normalised to a density, summary statistics,
// and the closed-form stationary law used as a reference.

use serde::{Deserialize, Serialize};

use crate::ensemble::EnsembleConfig;
use crate::params::{RateConstants, SimulationParams};

// ─── Statistics ─────────────────────────────────────────────────────────────

/// Sample statistics with a normal-approximation 95% confidence interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self {
                mean: 0.0,
                variance: 0.0,
                std_dev: 0.0,
                ci_lower: 0.0,
                ci_upper: 0.0,
                min: 0.0,
                max: 0.0,
                n: 0,
            };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            variance,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }

    pub fn from_lengths(lengths: &[u64]) -> Self {
        let samples: Vec<f64> = lengths.iter().map(|&n| n as f64).collect();
        Self::from_samples(&samples)
    }

    /// Variance over mean; 1.0 for a Poisson count. Zero when the mean is zero.
    pub fn fano_factor(&self) -> f64 {
        if self.mean == 0.0 {
            return 0.0;
        }
        self.variance / self.mean
    }
}

// ─── Histogram ──────────────────────────────────────────────────────────────

/// One integer bin of the empirical distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub length: u64,
    pub count: u64,
    pub density: f64,
}

/// Counts of each terminal length over bins `0..=max`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Histogram {
    counts: Vec<u64>,
    total: u64,
}

impl Histogram {
    pub fn from_samples(samples: &[u64]) -> Self {
        let Some(&max) = samples.iter().max() else {
            return Self::default();
        };
        let mut counts = vec![0u64; max as usize + 1];
        for &n in samples {
            counts[n as usize] += 1;
        }
        Self {
            counts,
            total: samples.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of bins, `max + 1` (0 when empty).
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn max_length(&self) -> Option<u64> {
        self.counts.len().checked_sub(1).map(|m| m as u64)
    }

    pub fn count(&self, length: u64) -> u64 {
        self.counts.get(length as usize).copied().unwrap_or(0)
    }

    /// Empirical P_n: fraction of paths that ended at `length`.
    pub fn density(&self, length: u64) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(length) as f64 / self.total as f64
    }

    /// Most frequent length; the smallest one on ties.
    pub fn mode(&self) -> Option<u64> {
        let mut best: Option<(u64, u64)> = None;
        for (k, &c) in self.counts.iter().enumerate() {
            if best.map_or(true, |(_, bc)| c > bc) {
                best = Some((k as u64, c));
            }
        }
        best.map(|(k, _)| k)
    }

    pub fn bins(&self) -> Vec<HistogramBin> {
        (0..self.counts.len() as u64)
            .map(|length| HistogramBin {
                length,
                count: self.count(length),
                density: self.density(length),
            })
            .collect()
    }

    /// Total-variation distance to a reference pmf on the non-negative integers.
    ///
    /// Reference mass beyond the last bin is counted as unmatched.
    pub fn total_variation<F: Fn(u64) -> f64>(&self, reference: F) -> f64 {
        let mut covered = 0.0;
        let mut diff = 0.0;
        for k in 0..self.counts.len() as u64 {
            let p = reference(k);
            covered += p;
            diff += (self.density(k) - p).abs();
        }
        let tail = (1.0 - covered).max(0.0);
        0.5 * (diff + tail)
    }
}

// ─── Reference values ───────────────────────────────────────────────────────

/// Ratio pi / epsilon of the reflected chain.
pub fn load_ratio(rates: &RateConstants) -> f64 {
    rates.pi / rates.epsilon
}

/// Stationary probability of length `n`: `(1 - rho) * rho^n` with
/// `rho = pi / epsilon`.
///
/// `None` when `pi >= epsilon`; the chain then has no stationary law and
/// lengths drift upward without bound.
pub fn stationary_pmf(rates: &RateConstants, n: u64) -> Option<f64> {
    let rho = load_ratio(rates);
    if !(rho < 1.0) {
        return None;
    }
    let exponent = i32::try_from(n).unwrap_or(i32::MAX);
    Some((1.0 - rho) * rho.powi(exponent))
}

/// Mean of the stationary law, `rho / (1 - rho)`, when it exists.
pub fn stationary_mean(rates: &RateConstants) -> Option<f64> {
    let rho = load_ratio(rates);
    (rho < 1.0).then(|| rho / (1.0 - rho))
}

/// `n0 + (pi - epsilon) * T`, the mean if the floor were never touched.
pub fn expected_free_mean(params: &SimulationParams) -> f64 {
    params.initial_length as f64 + params.rates.drift() * params.horizon
}

// ─── Report ─────────────────────────────────────────────────────────────────

/// Everything downstream consumers need from one ensemble run.
#[derive(Debug, Clone, Serialize)]
pub struct EnsembleReport {
    pub config: EnsembleConfig,
    pub stats: Stats,
    /// Variance over mean of the terminal lengths.
    pub fano_factor: f64,
    /// Most frequent terminal length.
    pub mode: Option<u64>,
    pub free_mean: f64,
    pub stationary_mean: Option<f64>,
    /// Total-variation distance to the stationary law, when one exists.
    pub stationary_distance: Option<f64>,
    pub histogram: Vec<HistogramBin>,
    pub final_lengths: Vec<u64>,
}

impl EnsembleReport {
    pub fn new(config: EnsembleConfig, final_lengths: Vec<u64>) -> Self {
        let rates = config.params.rates;
        let histogram = Histogram::from_samples(&final_lengths);
        let stationary_distance = stationary_mean(&rates).map(|_| {
            histogram.total_variation(|k| stationary_pmf(&rates, k).unwrap_or(0.0))
        });
        let stats = Stats::from_lengths(&final_lengths);
        Self {
            fano_factor: stats.fano_factor(),
            mode: histogram.mode(),
            stats,
            free_mean: expected_free_mean(&config.params),
            stationary_mean: stationary_mean(&rates),
            stationary_distance,
            histogram: histogram.bins(),
            final_lengths,
            config,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
