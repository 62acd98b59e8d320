//! Gatework Run - Simulates one gate type from a template registry
//!
//! Loads a registry document, instantiates the requested type as the root
//! of a simulation and prints the root output after every tick.

#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use gatework_runtime::{Gate, Simulation, TemplateRegistry};
use gatework_types::{ParseError, parse_literal};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "gatework-run")]
#[command(about = "Simulate a Gatework gate type tick by tick")]
struct Cli {
    /// Path to a template registry JSON document
    registry: PathBuf,

    /// Gate type to use as the simulation root
    gate: String,

    /// Number of ticks to run
    #[arg(long, default_value = "8")]
    ticks: u64,

    /// Value literal driving the root input, e.g. `[1, 0]`
    #[arg(long)]
    input: Option<String>,

    /// Print the root circuit's interior as JSON before running
    #[arg(long)]
    describe: bool,
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid --input: {0}")]
    Input(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] gatework_runtime::Error),
}

/// Run the simulation described by `cli`, returning the lines to print.
fn run(cli: &Cli) -> Result<Vec<String>, RunError> {
    let text = std::fs::read_to_string(&cli.registry).map_err(|source| RunError::Read {
        path: cli.registry.clone(),
        source,
    })?;
    let templates = Arc::new(TemplateRegistry::from_json(&text)?);
    info!(templates = templates.len(), root = %cli.gate, "registry loaded");

    let mut lines = Vec::new();
    let root = Gate::from_template(&cli.gate, &templates)?;
    if cli.describe
        && let Some(circuit) = root.as_circuit()
    {
        lines.push(circuit.to_json()?);
    }

    let mut simulation = Simulation::new(root)?;
    if let Some(literal) = &cli.input
        && let Some(value) = parse_literal(literal)?
    {
        simulation.set_input(value)?;
    }

    for _ in 0..cli.ticks {
        let context = simulation.tick();
        let output = simulation
            .output()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        lines.push(format!("tick {}: {output}", context.tick));
        if let Some(err) = simulation.error() {
            lines.push(format!("  fault: {err}"));
        }
    }
    Ok(lines)
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatework_run=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}
