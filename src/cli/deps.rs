//! `srcpkg deps`: show what a PKGBUILD depends on.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::OutputFormat;
use crate::constants::{BUILD_DEPENDS_KEY, RUN_DEPENDS_KEY};
use crate::manifest::{self, DependencyLists, DependencySet};

/// Print the build-time and run-time dependencies of a PKGBUILD.
#[derive(Args, Debug)]
pub struct DepsCommand {
    /// A PKGBUILD, or a directory containing one
    path: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl DepsCommand {
    pub fn execute(self) -> Result<()> {
        let lists = manifest::load_file(&self.path)?;
        print!("{}", render(&lists, self.format)?);
        Ok(())
    }
}

fn render(lists: &DependencyLists, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(lists).context("Failed to serialize dependencies")?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            render_section(&mut out, BUILD_DEPENDS_KEY, &lists.build);
            render_section(&mut out, RUN_DEPENDS_KEY, &lists.run);
            Ok(out)
        }
    }
}

fn render_section(out: &mut String, title: &str, set: &DependencySet) {
    out.push_str(&format!("{}:\n", title.bold()));
    if set.is_empty() {
        out.push_str(&format!("  {}\n", "(none)".dimmed()));
    }
    for name in set.iter() {
        out.push_str(&format!("  {name}\n"));
    }
}
