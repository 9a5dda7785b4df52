// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Polymer SSA Suite - transient length distribution of a polymer under
// monomer addition/removal, estimated by exact Gillespie simulation.

pub mod params;
pub mod source;
pub mod path;
pub mod ensemble;
pub mod distribution;

pub use params::{RateConstants, SimError, SimulationParams};
pub use source::{path_stream, seeded, EventSource};
pub use path::{simulate_path, PathSimulator, PathSummary, PolymerEvent, SimulationState, Step};
pub use ensemble::{run_ensemble, EnsembleConfig, EnsembleRunner};
pub use distribution::{
    expected_free_mean, stationary_mean, stationary_pmf, EnsembleReport, Histogram,
    HistogramBin, Stats,
};

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    fn console_log(s: &str);
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Browser handle: holds the parameters, runs seeded ensembles and hands the
/// terminal lengths, histogram and stats to the plotting side.
#[wasm_bindgen]
pub struct PolymerEnsemble {
    params: SimulationParams,
}

#[wasm_bindgen]
impl PolymerEnsemble {
    #[wasm_bindgen(constructor)]
    pub fn new(initial_length: i32, horizon: f64, pi: f64, epsilon: f64) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        Self {
            params: SimulationParams::new(initial_length as i64, horizon, pi, epsilon),
        }
    }

    pub fn set_initial_length(&mut self, val: i32) { self.params.initial_length = val as i64; }
    pub fn set_horizon(&mut self, val: f64) { self.params.horizon = val; }
    pub fn set_pi(&mut self, val: f64) { self.params.rates.pi = val; }
    pub fn set_epsilon(&mut self, val: f64) { self.params.rates.epsilon = val; }

    /// Run `num_paths` paths with per-path streams derived from `seed`.
    ///
    /// Throws a string describing the bad parameter instead of running.
    pub fn run(&self, num_paths: u32, seed: u32) -> Result<JsValue, JsValue> {
        let report = self
            .summarize(num_paths as usize, seed as u64)
            .map_err(to_js_error)?;

        #[cfg(target_arch = "wasm32")]
        console_log(&format!(
            "polymer-ssa: {} paths, mean length {:.2}",
            report.stats.n, report.stats.mean
        ));

        serde_wasm_bindgen::to_value(&report).map_err(JsValue::from)
    }

    /// Terminal lengths only, as a plain typed array.
    pub fn final_lengths(&self, num_paths: u32, seed: u32) -> Result<Vec<u32>, JsValue> {
        let config = self.config(num_paths as usize, seed as u64);
        let lengths = EnsembleRunner::run_seeded(&config).map_err(to_js_error)?;
        Ok(lengths
            .into_iter()
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .collect())
    }
}

impl PolymerEnsemble {
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    fn config(&self, num_paths: usize, seed: u64) -> EnsembleConfig {
        EnsembleConfig {
            num_paths,
            seed,
            params: self.params,
        }
    }

    /// Native counterpart of `run`: the report before JS conversion.
    pub fn summarize(&self, num_paths: usize, seed: u64) -> Result<EnsembleReport, SimError> {
        let config = self.config(num_paths, seed);
        let lengths = EnsembleRunner::run_seeded(&config)?;
        Ok(EnsembleReport::new(config, lengths))
    }
}

fn to_js_error(err: SimError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
