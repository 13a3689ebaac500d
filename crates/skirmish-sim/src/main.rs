use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use skirmish_sim::{run, run_batch, Encounter};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Plays Skirmish encounters headlessly and prints a JSON summary
#[derive(Parser, Debug)]
#[command(name = "skirmish-sim")]
#[command(version)]
struct Args {
    /// Encounter file (JSON)
    #[arg(value_name = "ENCOUNTER")]
    encounter: PathBuf,

    /// Number of seeded runs; more than one prints a batch report
    #[arg(long, default_value_t = 1)]
    runs: u32,

    /// Seed of the first run (defaults to the encounter's config seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Include the full event stream in each run summary
    #[arg(long)]
    events: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let encounter = Encounter::load(&args.encounter)?;
    let seed = args.seed.unwrap_or(encounter.config.seed);
    info!(path = %args.encounter.display(), seed, runs = args.runs, "loaded encounter");

    let output = if args.runs <= 1 {
        serde_json::to_string_pretty(&run(&encounter, seed, args.events)?)
    } else {
        serde_json::to_string_pretty(&run_batch(&encounter, seed, args.runs, args.events)?)
    }
    .context("failed to serialize the result")?;

    println!("{output}");
    Ok(())
}
