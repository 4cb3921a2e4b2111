//! `srcpkg config`: show, initialise or locate the global configuration.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::Path;

use super::CliConfig;
use crate::config::GlobalConfig;

/// Manage the global configuration file.
///
/// Without a subcommand the effective configuration is shown.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommands {
    /// Print the effective configuration as TOML.
    Show,

    /// Write a configuration file with every default spelled out.
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration file location.
    Path,
}

impl ConfigCommand {
    pub async fn execute(self, cli_config: &CliConfig) -> Result<()> {
        let path = match &cli_config.config_path {
            Some(path) => path.clone(),
            None => GlobalConfig::default_path()?,
        };

        match self.command.unwrap_or(ConfigSubcommands::Show) {
            ConfigSubcommands::Show => {
                let config = cli_config.load_global().await?;
                if !path.exists() {
                    eprintln!(
                        "{} {} (showing defaults)",
                        "No configuration file at".yellow(),
                        path.display()
                    );
                }
                print!(
                    "{}",
                    toml::to_string_pretty(&config).context("Failed to serialize global config")?
                );
            }
            ConfigSubcommands::Init {
                force,
            } => init(&path, force).await?,
            ConfigSubcommands::Path => println!("{}", path.display()),
        }
        Ok(())
    }
}

async fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at {}\n\nUse --force to overwrite it",
            path.display()
        );
    }
    GlobalConfig::default().save_to(path).await?;
    println!("{} {}", "✓ Created configuration file at".green(), path.display());
    Ok(())
}
