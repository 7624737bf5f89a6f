//! Menu-driven flow used when no subcommand is given.
//!
//! Prompts for an occurrence file, lets the user pick a species from the
//! sorted list, then prints a summary or exports every view.

use std::path::{Path, PathBuf};

use dialoguer::{Input, Select};
use species_map_analytics::session::Session;
use species_map_cli_utils::MultiProgress;

use crate::commands;
use crate::config::AppConfig;
use crate::export;

/// What to do with the selected species.
enum Action {
    Summary,
    Export,
}

impl Action {
    const ALL: &[Self] = &[Self::Summary, Self::Export];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Summary => "Print summary",
            Self::Export => "Export tables and map layers",
        }
    }
}

/// Runs the interactive flow.
///
/// # Errors
///
/// Returns an error if a prompt fails, the boundaries or upload cannot be
/// loaded, or an export cannot be written.
pub fn run(config: &AppConfig, multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Species Map");
    println!();

    let file: String = Input::new()
        .with_prompt("Occurrence file (tab-separated)")
        .interact_text()?;
    let file = PathBuf::from(file);

    let index = commands::load_boundaries(config)?;
    let view = commands::run_session(config, &index, multi, &file, None)?;

    if view.species.is_empty() {
        commands::print_no_species(&file);
        return Ok(());
    }

    let idx = Select::new()
        .with_prompt("Species")
        .items(&view.species)
        .default(0)
        .interact()?;
    let species = &view.species[idx];

    let selection = match view.selection {
        Some(selection) if selection.species == *species => selection,
        _ => Session::new(&index, config.session_options()?).select(&view.records, species),
    };

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
    let action = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[action] {
        Action::Summary => commands::print_summary(&selection),
        Action::Export => {
            let out: String = Input::new()
                .with_prompt("Output directory")
                .default("out".to_string())
                .interact_text()?;
            let written = export::write_selection(
                Path::new(&out),
                &selection,
                &index,
                &config.presentation,
            )?;
            println!("Wrote {} files to {out}", written.len());
        }
    }

    Ok(())
}
