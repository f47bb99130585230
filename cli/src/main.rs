//! proposal-inverter: run agreement scenarios from the command line.
//!
//! Loads a scenario JSON file, runs it epoch by epoch and prints the final
//! agreement snapshot as JSON on stdout. Diagnostics go to stderr.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use proposal_inverter_core_rs::{AgreementConfig, EpochResult, Orchestrator, ScenarioConfig};
use serde::Serialize;
use tracing::info;

/// Proposal inverter agreement simulator.
#[derive(Parser, Debug)]
#[command(name = "proposal-inverter", version, about = "Proposal inverter agreement simulator")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, default_value = "text", global = true)]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scenario file and print the final snapshot.
    Run(RunArgs),
    /// Print the default agreement configuration.
    Defaults,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to the scenario JSON file.
    scenario: PathBuf,

    /// Override the number of epochs in the scenario.
    #[arg(long)]
    epochs: Option<usize>,

    /// Include every epoch result in the output.
    #[arg(long)]
    per_epoch: bool,
}

#[derive(Serialize)]
struct RunOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    epochs: Option<&'a [EpochResult]>,
    total_rejections: usize,
    snapshot: proposal_inverter_core_rs::AgreementSnapshot,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Defaults => {
            println!("{}", serde_json::to_string_pretty(&AgreementConfig::default())?);
            Ok(())
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.scenario)
        .with_context(|| format!("failed to read {}", args.scenario.display()))?;
    let mut config: ScenarioConfig = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", args.scenario.display()))?;
    if let Some(epochs) = args.epochs {
        config.epochs = epochs;
    }

    let mut orchestrator = Orchestrator::new(config).context("failed to set up scenario")?;
    let results = orchestrator.run().context("scenario run failed")?;
    let snapshot = orchestrator.snapshot()?;

    info!(
        epochs = results.len(),
        rejections = orchestrator.total_rejections(),
        funds = snapshot.funds,
        "scenario finished"
    );

    let output = RunOutput {
        epochs: args.per_epoch.then_some(results.as_slice()),
        total_rejections: orchestrator.total_rejections(),
        snapshot,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// Logs go to stderr so stdout stays valid JSON.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
