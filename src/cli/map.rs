//! `srcpkg map`: inspect and extend the repository mapping log.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use super::{CliConfig, OutputFormat};
use crate::mapping::RepoMapping;
use crate::utils::resolve_path;

/// Manage package → repository name mappings.
#[derive(Args, Debug)]
pub struct MapCommand {
    #[command(subcommand)]
    action: MapAction,

    /// Repository mapping file (defaults to the configured one)
    #[arg(long, value_name = "FILE", global = true)]
    mappings: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum MapAction {
    /// List every recorded mapping.
    List {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Record that PACKAGE is built from REPOSITORY.
    Add {
        package: String,
        repository: String,
    },

    /// Print the repository name PACKAGE would be fetched from.
    Resolve {
        package: String,
    },
}

impl MapCommand {
    pub async fn execute(self, cli_config: &CliConfig) -> Result<()> {
        let path = match self.mappings {
            Some(path) => resolve_path(&path.to_string_lossy())?,
            None => cli_config.load_global().await?.mapping_file_path()?,
        };
        let mut mapping = RepoMapping::load(&path)?;

        match self.action {
            MapAction::List {
                format,
            } => print!("{}", render_list(&mapping, format)?),
            MapAction::Add {
                package,
                repository,
            } => {
                mapping.record(&package, &repository)?;
                println!("{} {} -> {}", "✓ Added mapping:".green(), package, repository);
            }
            MapAction::Resolve {
                package,
            } => println!("{}", mapping.resolve(&package)),
        }
        Ok(())
    }
}

fn render_list(mapping: &RepoMapping, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = mapping
                .entries()
                .into_iter()
                .map(|(package, repository)| {
                    serde_json::json!({"package": package, "repository": repository})
                })
                .collect();
            let mut json =
                serde_json::to_string_pretty(&entries).context("Failed to serialize mappings")?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Text if mapping.is_empty() => {
            Ok(format!("No repository mappings in {}\n", mapping.path().display()))
        }
        OutputFormat::Text => Ok(mapping
            .entries()
            .into_iter()
            .map(|(package, repository)| format!("{package} -> {repository}\n"))
            .collect()),
    }
}
