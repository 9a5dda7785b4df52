// Run Report: console summary, histogram table and JSON file
// Structured output for downstream plotting and independent analysis

use polymer_ssa::{stationary_pmf, EnsembleReport, HistogramBin};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const BAR_WIDTH: usize = 50;

// ─── JSON Report ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub elapsed_ms: f64,
    pub paths_per_sec: f64,
    #[serde(flatten)]
    pub ensemble: EnsembleReport,
}

impl RunReport {
    pub fn new(ensemble: EnsembleReport, elapsed: Duration) -> Self {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let secs = elapsed.as_secs_f64().max(1e-6);
        Self {
            timestamp: format!("{}", ts),
            version: env!("CARGO_PKG_VERSION"),
            prng: "ChaCha8Rng",
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            paths_per_sec: ensemble.final_lengths.len() as f64 / secs,
            ensemble,
        }
    }

    /// Write `ssa-{timestamp}.json` into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, crate::CliError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("ssa-{}.json", self.timestamp));
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

// ─── Console Output ─────────────────────────────────────────────────────────

pub fn print_summary(report: &EnsembleReport) {
    let s = &report.stats;
    println!("  Final length over {} paths", s.n);
    println!("    mean     {:>10.3}  (95% CI {:.3} .. {:.3})", s.mean, s.ci_lower, s.ci_upper);
    println!("    std dev  {:>10.3}", s.std_dev);
    println!("    min/max  {:>10.0} / {:.0}", s.min, s.max);
    if let Some(mode) = report.mode {
        println!("    mode     {:>10}", mode);
    }
    println!("    fano     {:>10.3}", report.fano_factor);
    println!("    no-floor mean n0 + (pi - eps) T = {:.3}", report.free_mean);
    match (report.stationary_mean, report.stationary_distance) {
        (Some(mean), Some(tv)) => {
            println!("    stationary mean rho/(1-rho)   = {:.3}", mean);
            println!("    TV distance to stationary law = {:.4}", tv);
        }
        _ => println!("    no stationary law (pi >= epsilon)"),
    }
    println!();
}

/// Print the empirical P_n as rows of `width` consecutive lengths, skipping
/// the empty range below the smallest observed length.
pub fn print_histogram(report: &EnsembleReport, max_rows: usize) {
    let bins = &report.histogram;
    let Some(first) = bins.iter().position(|b| b.count > 0) else {
        return;
    };
    let span = bins.len() - first;
    let width = span.div_ceil(max_rows.max(1));
    let rows: Vec<(u64, u64, u64, f64)> = bins[first..]
        .chunks(width)
        .map(|chunk| {
            let lo = chunk[0].length;
            let hi = chunk[chunk.len() - 1].length;
            let count: u64 = chunk.iter().map(|b: &HistogramBin| b.count).sum();
            let density: f64 = chunk.iter().map(|b| b.density).sum();
            (lo, hi, count, density)
        })
        .collect();
    let peak = rows.iter().map(|r| r.3).fold(0.0_f64, f64::max);
    let rates = report.config.params.rates;
    let with_reference = report.stationary_mean.is_some();

    if with_reference {
        println!("  {:>13} {:>7} {:>8} {:>8}  {}", "n", "count", "P_n", "ref", "");
    } else {
        println!("  {:>13} {:>7} {:>8}  {}", "n", "count", "P_n", "");
    }
    println!("  {}", "-".repeat(40 + BAR_WIDTH));

    for (lo, hi, count, density) in rows {
        let label = if lo == hi { format!("{}", lo) } else { format!("{}-{}", lo, hi) };
        let bar_len = if peak > 0.0 {
            ((density / peak) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let bar = "#".repeat(bar_len);
        if with_reference {
            let reference: f64 = (lo..=hi).filter_map(|k| stationary_pmf(&rates, k)).sum();
            println!("  {:>13} {:>7} {:>8.4} {:>8.4}  {}", label, count, density, reference, bar);
        } else {
            println!("  {:>13} {:>7} {:>8.4}  {}", label, count, density, bar);
        }
    }
    println!();
}
