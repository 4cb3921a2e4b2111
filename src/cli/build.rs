//! `srcpkg build`: the interactive source build.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::CliConfig;
use crate::config::GlobalConfig;
use crate::core::SrcpkgError;
use crate::git::GitFetcher;
use crate::makepkg::Makepkg;
use crate::mapping::RepoMapping;
use crate::pacman::Pacman;
use crate::prompt::{ExternalEditor, TerminalDecision};
use crate::resolver::{Collaborators, DependencyOrchestrator};
use crate::utils::{command_exists, resolve_path};

/// Programs a source build cannot run without.
const REQUIRED_PROGRAMS: &[&str] = &["git", "makepkg", "pacman"];

/// Fetch a package, satisfy its dependencies and build it.
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Package to build (asked for interactively when omitted)
    package: Option<String>,

    /// Pass --noconfirm to makepkg
    #[arg(long)]
    noconfirm: bool,

    /// Directory package repositories are fetched into
    #[arg(long, value_name = "DIR")]
    build_dir: Option<PathBuf>,

    /// Repository mapping file
    #[arg(long, value_name = "FILE")]
    mappings: Option<PathBuf>,

    /// Base URL package repositories are cloned from
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
}

/// Effective settings after merging flags over the global config.
#[derive(Debug, PartialEq, Eq)]
struct BuildSettings {
    build_dir: PathBuf,
    mapping_file: PathBuf,
    base_url: String,
    noconfirm: bool,
}

impl BuildCommand {
    fn settings(&self, config: &GlobalConfig) -> Result<BuildSettings> {
        Ok(BuildSettings {
            build_dir: match &self.build_dir {
                Some(dir) => resolve_path(&dir.to_string_lossy())?,
                None => config.build_dir_path()?,
            },
            mapping_file: match &self.mappings {
                Some(file) => resolve_path(&file.to_string_lossy())?,
                None => config.mapping_file_path()?,
            },
            base_url: self.base_url.clone().unwrap_or_else(|| config.repository_base_url.clone()),
            noconfirm: self.noconfirm || config.noconfirm,
        })
    }

    pub async fn execute(self, cli_config: &CliConfig) -> Result<()> {
        let config = cli_config.load_global().await?;
        let settings = self.settings(&config)?;
        tracing::debug!("Build settings: {:?}", settings);

        if let Some(missing) = REQUIRED_PROGRAMS.iter().find(|program| !command_exists(program)) {
            return Err(SrcpkgError::CommandNotFound {
                program: (*missing).to_string(),
            }
            .into());
        }

        let decision = TerminalDecision::stdin();
        let package = match self.package {
            Some(package) => package,
            None => decision.package_name().await?,
        };

        let mapping = RepoMapping::load(&settings.mapping_file)?;
        let collaborators = Collaborators {
            registry: Box::new(Pacman::new()),
            installer: Box::new(Pacman::new()),
            fetcher: Box::new(GitFetcher::new(settings.base_url)),
            builder: Box::new(Makepkg::new(settings.noconfirm)),
            decision: Box::new(decision),
            editor: Box::new(ExternalEditor::from_env(config.editor.as_deref())),
        };

        let mut orchestrator = DependencyOrchestrator::new(mapping, settings.build_dir, collaborators);
        let report = orchestrator.run(&package).await?;

        println!();
        println!(
            "{}",
            format!("✓ Successfully built {} ({} package(s) from source)", package, report.built.len())
                .green()
                .bold()
        );
        for built in &report.built {
            println!("  {} {}", "•".dimmed(), built);
        }
        println!("  {} {}", "checkout:".dimmed(), report.target.path.display());

        Ok(())
    }
}
