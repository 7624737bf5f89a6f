#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for exploring species occurrences by canton and
//! province.
//!
//! Each subcommand loads a tab-separated Darwin Core file, and all but
//! `species` join it against the canton boundaries. Without a subcommand
//! the tool falls back to an interactive `dialoguer` flow.
//!
//! Uses `indicatif-log-bridge` (via [`species_map_cli_utils::init_logger`])
//! so that log lines and the loading bar share the terminal cleanly.

mod commands;
mod config;
mod export;
mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use species_map_geography_models::ProvinceMode;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "species_map_cli", about = "Species occurrence explorer")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Canton boundary `GeoJSON` (overrides `[boundaries] path`)
    #[arg(long, global = true)]
    boundaries: Option<PathBuf>,
    /// Province grouping: `summed` or `per_canton`
    #[arg(long, global = true)]
    province_mode: Option<ProvinceMode>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the distinct species in an occurrence file
    Species {
        /// Tab-separated occurrence file
        file: PathBuf,
    },
    /// Print canton and province counts for one species
    Summary {
        /// Tab-separated occurrence file
        file: PathBuf,
        /// Species to select (defaults to the first in sorted order)
        #[arg(long)]
        species: Option<String>,
    },
    /// Write the record table, bar series, and map layers for one species
    Export {
        /// Tab-separated occurrence file
        file: PathBuf,
        /// Species to select (defaults to the first in sorted order)
        #[arg(long)]
        species: Option<String>,
        /// Output directory
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = species_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.boundaries {
        config.boundaries.path = path;
    }
    if let Some(mode) = cli.province_mode {
        config.aggregation.province_mode = mode;
    }

    let Some(command) = cli.command else {
        return interactive::run(&config, &multi);
    };

    match command {
        Commands::Species { file } => commands::list_species(&config, &multi, &file)?,
        Commands::Summary { file, species } => {
            let index = commands::load_boundaries(&config)?;
            let view =
                commands::run_session(&config, &index, &multi, &file, species.as_deref())?;
            match view.selection {
                Some(selection) => commands::print_summary(&selection),
                None => commands::print_no_species(&file),
            }
        }
        Commands::Export { file, species, out } => {
            let index = commands::load_boundaries(&config)?;
            let view =
                commands::run_session(&config, &index, &multi, &file, species.as_deref())?;
            match view.selection {
                Some(selection) => {
                    let written = export::write_selection(
                        &out,
                        &selection,
                        &index,
                        &config.presentation,
                    )?;
                    println!("Wrote {} files to {}", written.len(), out.display());
                }
                None => commands::print_no_species(&file),
            }
        }
    }

    Ok(())
}
