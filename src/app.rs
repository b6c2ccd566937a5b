//! Command-line orchestration: resolve the configuration, lay out the output
//! folder, send logs into it, run, and persist the summary.

use anyhow::{Context, Result};
use embryoid_core::config::SimConfig;
use embryoid_core::differentiation::DifferentiationParams;
use embryoid_core::history::RunSummary;
use embryoid_core::metrics::init_logging_to;
use embryoid_core::simulation::Simulation;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

pub const LOG_FILE: &str = "simulation.log";
pub const SUMMARY_FILE: &str = "summary.json";

/// Everything one run needs from the command line.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub sim_id: String,
    pub params: [f64; DifferentiationParams::LEN],
    pub time_end: Option<f64>,
    pub config: Option<PathBuf>,
    pub seed: Option<u64>,
    pub output_root: PathBuf,
}

/// `results_<a>_<k1>_<n1>_<k2>_<n2>` under `root`.
#[must_use]
pub fn results_dir(root: &Path, params: &[f64]) -> PathBuf {
    let mut name = String::from("results");
    for p in params {
        name.push('_');
        name.push_str(&p.to_string());
    }
    root.join(name)
}

/// Loads the configuration file if one is given, then applies command-line overrides.
pub fn resolve_config(request: &RunRequest) -> Result<SimConfig> {
    let mut config = match &request.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            SimConfig::from_toml(&content)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => SimConfig::default(),
    };

    config.differentiation = DifferentiationParams::from_slice(&request.params)?;
    if let Some(end) = request.time_end {
        config.simulation.end_time = end;
    }
    config.simulation.seed = request
        .seed
        .or(config.simulation.seed)
        .or_else(|| Some(SimConfig::seed_from_label(&request.sim_id)));
    config.validate()?;
    Ok(config)
}

/// Runs one simulation and writes its log and summary into the output folder.
///
/// Returns the folder and the summary.
pub fn run(request: &RunRequest) -> Result<(PathBuf, RunSummary)> {
    let started = Instant::now();
    let config = resolve_config(request)?;

    let out_dir = results_dir(&request.output_root, &request.params).join(&request.sim_id);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let log = File::create(out_dir.join(LOG_FILE)).context("Failed to create log file")?;
    if let Err(e) = init_logging_to(log) {
        eprintln!(
            "Logging already initialised, {} will stay empty: {e}",
            out_dir.join(LOG_FILE).display()
        );
    }

    info!(
        sim_id = %request.sim_id,
        fingerprint = %config.fingerprint(),
        seed = ?config.simulation.seed,
        "Configuration resolved"
    );

    let mut sim = Simulation::seeded(&request.sim_id, config)?;
    let summary = sim.run()?;
    summary.save(out_dir.join(SUMMARY_FILE))?;

    info!(
        runtime_s = started.elapsed().as_secs_f64(),
        stop_reason = ?summary.stop_reason,
        "Total runtime"
    );
    Ok((out_dir, summary))
}
