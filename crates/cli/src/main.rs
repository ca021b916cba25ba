//! Compose Sizer CLI
//!
//! Detects the CPU and memory Docker can give containers on this host and
//! scales the baseline service allocation to match.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{baseline, plan, probe};
use sizer_lib::observability::init_logging;

/// Compose Sizer CLI
#[derive(Parser)]
#[command(name = "compose-sizer")]
#[command(author, version, about = "Size Docker Compose services to this host's container resources", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output (debug logs on stderr)
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect CPU and memory available to containers
    Probe,

    /// Compute per-service limits and reservations for this host
    Plan {
        /// Total memory to allocate instead of the detected amount (e.g. 20g, 12288m)
        #[arg(long)]
        memory: Option<String>,

        /// Total CPUs to allocate instead of the detected count
        #[arg(long)]
        cpus: Option<f64>,

        /// Refuse hosts with less memory than this, in GB
        #[arg(long)]
        min_ram_gb: Option<i64>,
    },

    /// Show the baseline allocation plans are scaled from
    Baseline,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load()?;
    let directive = if cli.verbose { "debug" } else { "warn" };
    init_logging(config.log_format, directive).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Probe => probe::show_resources(&config, cli.format)?,
        Commands::Plan {
            memory,
            cpus,
            min_ram_gb,
        } => {
            let options = plan::PlanOptions {
                memory,
                cpus,
                min_ram_gb,
            };
            plan::show_plan(&config, &options, cli.format)?;
        }
        Commands::Baseline => baseline::show_baseline(cli.format)?,
    }

    Ok(())
}
