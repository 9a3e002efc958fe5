//! Headless Metro Epidemic Runner
//!
//! Loads a scenario file, runs the batch and prints a summary or JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use metro_epidemic::core::error::Result;
use metro_epidemic::simulation::{Scenario, SimulationOutput};

/// Metro Epidemic - SIR spread across cities and airports
#[derive(Parser, Debug)]
#[command(name = "metro_sim")]
#[command(about = "Run a metro epidemic scenario and report the outbreak")]
struct Args {
    /// Scenario file (TOML)
    scenario: PathBuf,

    /// Master seed, overriding the scenario's
    #[arg(long)]
    seed: Option<u64>,

    /// Number of runs, overriding the scenario's
    #[arg(long)]
    runs: Option<usize>,

    /// Print every run as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Per-day traveler logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let mut scenario = Scenario::load(&args.scenario)?;
    if let Some(seed) = args.seed {
        scenario.simulation.seed = seed;
    }
    if let Some(runs) = args.runs {
        scenario.runs = runs;
    }

    tracing::info!(
        "Loaded {} metros and {} routes from {}",
        scenario.metros.len(),
        scenario.routes.len(),
        args.scenario.display()
    );

    let outputs = scenario.run_batch()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    } else {
        print_summaries(&outputs);
    }
    Ok(())
}

fn print_summaries(outputs: &[SimulationOutput]) {
    for (run, output) in outputs.iter().enumerate() {
        println!("--- Run {} (seed {}) ---", run, output.statistics.seed);
        println!("{}", output.summary());
        for metro in &output.metros {
            let last = metro.aggregate.last().copied().unwrap_or_default();
            println!("  {:<16} hub {:>3}  {}", metro.name, metro.hub, last);
        }
    }
}
