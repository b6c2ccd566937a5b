use anyhow::Result;
use clap::Parser;
use embryoid_lib::app::{self, RunRequest};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Embryoid body differentiation simulation", long_about = None)]
struct Args {
    /// Structure / run identifier; also seeds the aggregate when no seed is given
    sim_id: String,

    /// Basal differentiation probability per step
    a: f64,

    /// Negative feedback threshold
    k1: f64,

    /// Negative feedback Hill exponent
    n1: f64,

    /// Positive feedback threshold
    k2: f64,

    /// Positive feedback Hill exponent
    n2: f64,

    /// End time in hours
    time_end: Option<f64>,

    /// Custom config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory the results folder is created in
    #[arg(short, long, default_value = ".")]
    output_root: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let request = RunRequest {
        sim_id: args.sim_id,
        params: [args.a, args.k1, args.n1, args.k2, args.n2],
        time_end: args.time_end,
        config: args.config,
        seed: args.seed,
        output_root: args.output_root,
    };

    let (out_dir, summary) = app::run(&request)?;
    if let Some(last) = summary.final_step() {
        println!(
            "{}: {} cells, {} differentiated after t={} ({:?})",
            out_dir.display(),
            last.population,
            last.differentiated,
            last.time,
            summary.stop_reason
        );
    }
    Ok(())
}
