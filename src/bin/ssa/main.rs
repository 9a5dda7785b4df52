// Polymer SSA Runner: ensemble estimate of P_n(T) from the command line
// Seedable ChaCha8 streams, console histogram, JSON report per run
//
// Usage:
//   cargo run --release --bin ssa                          # n0=10, T=1000, pi=0.7, eps=0.4
//   cargo run --release --bin ssa -- --paths 10000         # Larger ensemble
//   cargo run --release --bin ssa -- --pi 0.4 --epsilon 0.7 --initial 0
//   cargo run --release --bin ssa -- --config run.json     # EnsembleConfig file, flags override
//   cargo run --release --bin ssa -- --seed 42 --no-report

mod report;

use clap::Parser;
use polymer_ssa::{EnsembleConfig, EnsembleReport, EnsembleRunner, SimError, SimulationParams};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use report::RunReport;

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "ssa")]
#[command(about = "Gillespie estimate of the polymer length distribution P_n(T)")]
#[command(long_about = None)]
struct Cli {
    /// JSON file holding an EnsembleConfig; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of independent paths
    #[arg(short = 'n', long)]
    paths: Option<usize>,

    /// Time horizon T
    #[arg(short = 't', long)]
    horizon: Option<f64>,

    /// Initial polymer length n0
    #[arg(short, long, allow_negative_numbers = true)]
    initial: Option<i64>,

    /// Monomer addition rate
    #[arg(long, allow_negative_numbers = true)]
    pi: Option<f64>,

    /// Monomer removal rate
    #[arg(long, allow_negative_numbers = true)]
    epsilon: Option<f64>,

    /// Base seed (overrides the config file; random when neither sets one)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory for the JSON report
    #[arg(short, long, default_value = "ssa-results")]
    out: PathBuf,

    /// Skip writing the JSON report
    #[arg(long, default_value_t = false)]
    no_report: bool,

    /// Maximum histogram rows printed to the console
    #[arg(long, default_value_t = 40)]
    max_rows: usize,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("report: {0}")]
    Io(#[from] std::io::Error),

    #[error("report: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk run file. Absent fields fall back to `EnsembleConfig::default`,
/// except `seed`, which stays unset so an unseeded file still gets a fresh one.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    num_paths: Option<usize>,
    seed: Option<u64>,
    params: Option<SimulationParams>,
}

impl ConfigFile {
    fn read(path: &Path) -> Result<Self, CliError> {
        let config_err = |reason: String| CliError::Config {
            path: path.to_path_buf(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| config_err(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| config_err(e.to_string()))
    }
}

/// Flag first, then file, then a random draw.
fn resolve_seed(flag: Option<u64>, file: Option<u64>) -> u64 {
    flag.or(file).unwrap_or_else(rand::random)
}

fn load_config(cli: &Cli) -> Result<EnsembleConfig, CliError> {
    let file = match &cli.config {
        Some(path) => ConfigFile::read(path)?,
        None => ConfigFile::default(),
    };

    let defaults = EnsembleConfig::default();
    let mut config = EnsembleConfig {
        num_paths: file.num_paths.unwrap_or(defaults.num_paths),
        seed: resolve_seed(cli.seed, file.seed),
        params: file.params.unwrap_or(defaults.params),
    };

    if let Some(v) = cli.paths { config.num_paths = v; }
    if let Some(v) = cli.horizon { config.params.horizon = v; }
    if let Some(v) = cli.initial { config.params.initial_length = v; }
    if let Some(v) = cli.pi { config.params.rates.pi = v; }
    if let Some(v) = cli.epsilon { config.params.rates.epsilon = v; }

    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let p = &config.params;

    println!("\n  Polymer SSA Runner v{}", env!("CARGO_PKG_VERSION"));
    println!("  PRNG: ChaCha8Rng (stream per path) | Seed: {}", config.seed);
    println!(
        "  n0 = {}  T = {}  pi = {}  epsilon = {}  paths = {}\n",
        p.initial_length, p.horizon, p.rates.pi, p.rates.epsilon, config.num_paths
    );

    let start = Instant::now();
    let lengths = EnsembleRunner::run_seeded(&config)?;
    let elapsed = start.elapsed();
    log::info!(
        "simulated {} paths in {:.1}ms",
        lengths.len(),
        elapsed.as_secs_f64() * 1000.0
    );

    let summary = EnsembleReport::new(config, lengths);
    report::print_summary(&summary);
    report::print_histogram(&summary, cli.max_rows);

    if !cli.no_report {
        let run_report = RunReport::new(summary, elapsed);
        let path = run_report.write_to(&cli.out)?;
        println!("  Results saved to: {}\n", path.display());
    }

    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("  Error: {e}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polymer_ssa::params::{DEFAULT_HORIZON, DEFAULT_INITIAL_LENGTH};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(json.as_bytes()).expect("write config");
        file
    }

    fn cli_with(file: &NamedTempFile, extra: &[&str]) -> Cli {
        let path = file.path().to_str().expect("utf-8 temp path");
        let mut args = vec!["ssa", "--config", path];
        args.extend_from_slice(extra);
        Cli::parse_from(args)
    }

    #[test]
    fn test_flags_override_file() {
        let file = config_file(
            r#"{"num_paths": 50, "seed": 3,
                "params": {"initial_length": 4, "horizon": 20.0,
                           "rates": {"pi": 0.9, "epsilon": 0.5}}}"#,
        );
        let cli = cli_with(&file, &["--pi", "0.2", "--paths", "7"]);
        let config = load_config(&cli).expect("valid config");
        assert_eq!(config.num_paths, 7);
        assert_eq!(config.params.rates.pi, 0.2);
        assert_eq!(config.params.rates.epsilon, 0.5);
        assert_eq!(config.params.initial_length, 4);
        assert_eq!(config.params.horizon, 20.0);
        assert_eq!(config.seed, 3);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let file = config_file(r#"{"params": {"rates": {"pi": 0.3}}}"#);
        let config = load_config(&cli_with(&file, &[])).expect("valid config");
        let defaults = EnsembleConfig::default();
        assert_eq!(config.num_paths, defaults.num_paths);
        assert_eq!(config.params.horizon, DEFAULT_HORIZON);
        assert_eq!(config.params.initial_length, DEFAULT_INITIAL_LENGTH);
        assert_eq!(config.params.rates.pi, 0.3);
        assert_eq!(config.params.rates.epsilon, defaults.params.rates.epsilon);
    }

    #[test]
    fn test_zero_epsilon_is_rejected() {
        let file = config_file("{}");
        let err = load_config(&cli_with(&file, &["--epsilon", "0"])).expect_err("epsilon = 0");
        assert!(
            matches!(err, CliError::Sim(SimError::InvalidParameter { name: "epsilon", .. })),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_unreadable_config_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.json");
        let cli = Cli::parse_from(["ssa", "--config", missing.to_str().expect("utf-8 path")]);
        let err = load_config(&cli).expect_err("missing file");
        assert!(matches!(err, CliError::Config { .. }), "unexpected error: {err}");

        let file = config_file("{ not json");
        let err = load_config(&cli_with(&file, &[])).expect_err("malformed file");
        assert!(matches!(err, CliError::Config { .. }), "unexpected error: {err}");
    }

    #[test]
    fn test_seed_precedence() {
        assert_eq!(resolve_seed(Some(1), Some(2)), 1);
        assert_eq!(resolve_seed(None, Some(2)), 2);

        let file = config_file(r#"{"seed": 11}"#);
        assert_eq!(load_config(&cli_with(&file, &[])).expect("valid").seed, 11);
        let config = load_config(&cli_with(&file, &["--seed", "12"])).expect("valid");
        assert_eq!(config.seed, 12);
    }
}
