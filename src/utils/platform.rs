//! Platform helpers: home directory lookup, path expansion and `PATH` checks.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Returns the current user's home directory.
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine home directory.\n\nCheck that the HOME environment variable is set"
        )
    })
}

/// Expands `~` and `$VAR` / `${VAR}` references in a configured path.
///
/// ```rust,no_run
/// use srcpkg_cli::utils::platform::resolve_path;
///
/// # fn example() -> anyhow::Result<()> {
/// let build_dir = resolve_path("~/custompkg")?;
/// let mappings = resolve_path("$XDG_CONFIG_HOME/srcpkg/repo_mappings.txt")?;
/// # Ok(())
/// # }
/// ```
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .with_context(|| format!("Failed to expand variables in path: {path}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Checks whether a command is available on `PATH`.
#[must_use]
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}
