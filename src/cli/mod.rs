//! Command-line interface for srcpkg.
//!
//! Each subcommand lives in its own module with its own argument struct and
//! an `execute` method. Global options are parsed here and turned into a
//! [`CliConfig`] before dispatch.
//!
//! # Available Commands
//!
//! - `build` - Fetch a package, resolve and build its dependencies, build it
//! - `deps` - Print the dependency arrays of a PKGBUILD
//! - `map` - Inspect and edit the package → repository mapping log
//! - `config` - Show or initialise the global configuration
//!
//! # Example
//!
//! ```bash
//! srcpkg build foo                      # interactive source build
//! srcpkg --verbose build --noconfirm foo
//! srcpkg deps ~/custompkg/foo --format json
//! srcpkg map add libudev udev
//! ```

mod build;
mod config;
mod deps;
mod map;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::GlobalConfig;

/// Runtime configuration derived from the global options.
///
/// Kept separate from [`Cli`] so tests can run commands with an explicit
/// configuration instead of parsing arguments.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` defers to `RUST_LOG`, then `info`
    pub log_level: Option<String>,

    /// Global configuration file overriding the default location
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the tracing subscriber. Logs go to stderr so command output on
    /// stdout stays machine readable.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Load the global configuration this run should use.
    pub async fn load_global(&self) -> Result<GlobalConfig> {
        GlobalConfig::load_with_optional(self.config_path.clone()).await
    }
}

/// Build Artix/Arch packages from source, recursively resolving their dependencies.
#[derive(Parser)]
#[command(
    name = "srcpkg",
    about = "Build packages from source with recursive dependency resolution",
    version,
    long_about = "srcpkg fetches a package's PKGBUILD repository, works out which of its \
                  dependencies are missing, installs or builds each of them, and finally \
                  builds the package itself with makepkg."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the global configuration file
    #[arg(short, long, global = true, env = "SRCPKG_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, resolve and build a package and everything it depends on.
    Build(build::BuildCommand),

    /// Print the build-time and run-time dependencies of a PKGBUILD.
    Deps(deps::DepsCommand),

    /// Manage the package → repository name mappings.
    Map(map::MapCommand),

    /// Manage the global configuration file.
    Config(config::ConfigCommand),
}

/// Output format for listing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Structured JSON for scripts
    Json,
}

impl Cli {
    /// Parse-time options → [`CliConfig`], logging setup, then dispatch.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Run the selected subcommand with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            Commands::Build(cmd) => cmd.execute(&config).await,
            Commands::Deps(cmd) => cmd.execute(),
            Commands::Map(cmd) => cmd.execute(&config).await,
            Commands::Config(cmd) => cmd.execute(&config).await,
        }
    }
}
