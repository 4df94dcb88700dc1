//! Stowage Simulation Engine CLI
//!
//! Command-line interface for running batches of storage simulations

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use stowage_core::SimulationBatch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stowage_simulation_engine::{
    config::SimulationConfig,
    demand::DemandConfig,
    runner::SimulationRunner,
    summary::BatchSummary,
};

#[derive(Parser, Debug)]
#[command(name = "stowage-sim")]
#[command(about = "Simulate FIFO storage areas under random arrival and departure load", long_about = None)]
struct Args {
    /// Number of independent runs
    #[arg(short = 'n', long, default_value_t = 10)]
    simulations: usize,

    /// Periods per run
    #[arg(short, long, default_value_t = 100)]
    periods: u64,

    /// JSON configuration file (reference configuration when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start from the smaller-intensity preset with efficiency-perturbed departures
    #[arg(long, conflicts_with = "config")]
    visual: bool,

    /// Area capacities in scan order (comma-separated, e.g. 92,166,170,226)
    #[arg(long, value_delimiter = ',')]
    capacities: Option<Vec<usize>>,

    /// Mean arrivals per period
    #[arg(long, allow_negative_numbers = true)]
    arrival_rate: Option<f64>,

    /// Mean departures per period
    #[arg(long, allow_negative_numbers = true)]
    departure_rate: Option<f64>,

    /// Batch seed (random when omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output JSON file path (optional)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Everything written by `--output`
#[derive(Serialize)]
struct Report<'a> {
    seed: u64,
    policy: &'a str,
    config: &'a SimulationConfig,
    summary: &'a BatchSummary,
    batch: &'a SimulationBatch,
}

fn load_config(path: &Path) -> anyhow::Result<SimulationConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn build_config(args: &Args) -> anyhow::Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None if args.visual => SimulationConfig::visual(),
        None => SimulationConfig::default(),
    };

    if let Some(capacities) = &args.capacities {
        config = config.with_capacities(capacities.clone());
    }
    if let Some(rate) = args.arrival_rate {
        config = config.with_arrivals(DemandConfig::poisson(rate));
    }
    if let Some(rate) = args.departure_rate {
        config = config.with_departures(DemandConfig::poisson(rate));
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    Ok(config)
}

fn describe_demand(demand: &DemandConfig) -> String {
    match demand {
        DemandConfig::Poisson { rate } => format!("Poisson(λ = {})", rate),
        DemandConfig::Scripted { counts } => format!("scripted ({} periods)", counts.len()),
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stowage=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  Stowage Simulation Engine                               ║");
    println!("╚══════════════════════════════════════════════════════════╝\n");

    println!("Configuration:");
    println!("  Simulations: {}", args.simulations);
    println!("  Periods: {}", args.periods);
    println!("  Capacities: {:?}", config.capacities);
    println!("  Arrivals: {}", describe_demand(&config.arrivals));
    println!("  Departures: {}\n", describe_demand(&config.departures));

    // Configuration errors surface here, before any period runs
    let runner = SimulationRunner::new(&config)?;
    println!("  Policy: {}", runner.engine().policy_name());
    println!("  Seed: {}\n", runner.seed());

    let batch = runner.run_batch(args.simulations, args.periods);
    let summary = BatchSummary::from_batch(&batch, runner.engine().capacities());

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  Final Period Occupancy                                  ║");
    println!("╚══════════════════════════════════════════════════════════╝\n");

    println!(
        "{:<8} {:>10} {:>10} {:>8} {:>8} {:>12}",
        "Area", "Capacity", "Mean", "Min", "Max", "Saturated"
    );
    println!("{}", "-".repeat(61));

    if let Some(last) = summary.final_period() {
        for (index, stats) in last.areas.iter().enumerate() {
            println!(
                "{:<8} {:>10} {:>10.1} {:>8} {:>8} {:>11.1}%",
                index + 1,
                runner.engine().capacities()[index],
                stats.mean,
                stats.min,
                stats.max,
                stats.saturated_fraction * 100.0,
            );
        }
    }

    println!("\n{}", "-".repeat(61));
    println!("Item flow across all runs:");
    println!("  Stored:      {}", summary.stored);
    println!("  Removed:     {}", summary.removed);
    println!("  Dropped:     {} (all areas full)", summary.dropped);
    println!("  Unfulfilled: {} (nothing to remove)", summary.unfulfilled);

    // Output to JSON if requested
    if let Some(output_path) = &args.output {
        info!("Writing results to {}", output_path.display());
        let report = Report {
            seed: runner.seed(),
            policy: runner.engine().policy_name(),
            config: &config,
            summary: &summary,
            batch: &batch,
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize results")?;
        fs::write(output_path, json)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        println!("\nResults saved to {}", output_path.display());
    }

    println!("\n✅ Simulation complete!\n");
    Ok(())
}
