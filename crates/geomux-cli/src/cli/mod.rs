//! CLI for the geomux geocoding aggregator.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use geomux_core::config::{self, GeomuxConfig};
use geomux_core::scheduler::SchedulerKind;
use std::path::PathBuf;

use commands::{run_completions, run_geocode, run_providers, GeocodeArgs};

/// Top-level CLI for the geomux geocoding aggregator.
#[derive(Debug, Parser)]
#[command(name = "geomux")]
#[command(about = "geomux: query several geocoding providers, keep the best answer", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/geomux/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Geocode a location string.
    Geocode {
        /// Free-form location, e.g. "Karl Johans gate 1, Oslo".
        location: String,

        /// Do not read or write the result cache.
        #[arg(long)]
        no_cache: bool,

        /// Sleep until backed-off providers are eligible again instead of giving up.
        #[arg(long)]
        wait: bool,

        /// Do not call this provider (repeatable).
        #[arg(long, value_name = "NAME")]
        skip: Vec<String>,

        /// Override the scheduling policy (ordered_list, weighted_round_robin, weighted_random).
        #[arg(long, value_name = "KIND")]
        scheduler: Option<SchedulerKind>,

        /// Override the filter preset (all, min_precision:<t>, country:<name>).
        #[arg(long, value_name = "PRESET")]
        filter: Option<String>,

        /// Override the picker preset (first, max_precision, consensus:<n>:<nearness>).
        #[arg(long, value_name = "PRESET")]
        picker: Option<String>,

        /// Print the outcome as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List configured providers and their scheduling weights.
    Providers,

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<GeomuxConfig> {
    match path {
        Some(p) => config::load_from_path(p),
        None => config::load_or_init(),
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Providers => {
                let cfg = load_config(cli.config.as_ref())?;
                run_providers(&cfg)
            }
            CliCommand::Geocode {
                location,
                no_cache,
                wait,
                skip,
                scheduler,
                filter,
                picker,
                json,
            } => {
                let cfg = load_config(cli.config.as_ref())?;
                tracing::debug!("loaded config: {:?}", cfg);
                let args = GeocodeArgs {
                    location,
                    no_cache,
                    wait,
                    skip,
                    scheduler,
                    filter,
                    picker,
                    json,
                };
                run_geocode(cfg, args)
            }
        }
    }
}

#[cfg(test)]
mod tests;
