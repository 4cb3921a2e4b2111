//! Global configuration (`~/.srcpkg/config.toml`).
//!
//! Every field is optional in the file; missing fields fall back to the
//! defaults below and a missing file is the same as an empty one.
//!
//! ```toml
//! build_dir = "~/custompkg"
//! mapping_file = "~/repo_mappings.txt"
//! repository_base_url = "https://gitea.artixlinux.org/packages"
//! editor = "vim"
//! noconfirm = false
//! ```
//!
//! Path values accept `~` and `$VAR` references, expanded when the settings
//! are resolved rather than when the file is read.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{
    CONFIG_ENV_VAR, DEFAULT_BUILD_DIR, DEFAULT_MAPPING_FILE, DEFAULT_REPOSITORY_BASE_URL,
};
use crate::core::SrcpkgError;
use crate::utils::platform::{get_home_dir, resolve_path};

/// User-wide srcpkg settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Directory package repositories are fetched into
    pub build_dir: String,

    /// Append-only package → repository mapping log
    pub mapping_file: String,

    /// Host that package repositories are cloned from
    pub repository_base_url: String,

    /// Editor for manifest customisation, used when neither `VISUAL` nor `EDITOR` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    /// Pass `--noconfirm` to makepkg
    pub noconfirm: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            build_dir: format!("~/{DEFAULT_BUILD_DIR}"),
            mapping_file: format!("~/{DEFAULT_MAPPING_FILE}"),
            repository_base_url: DEFAULT_REPOSITORY_BASE_URL.to_string(),
            editor: None,
            noconfirm: false,
        }
    }
}

impl GlobalConfig {
    /// Load from `path`, or from [`default_path`](Self::default_path) when `None`.
    ///
    /// A file that does not exist yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content).map_err(|e| {
            SrcpkgError::ConfigError {
                message: format!("{}: {}", path.display(), e.message()),
            }
            .into()
        })
    }

    /// Write the configuration as pretty TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize global config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write global config to {}", path.display()))
    }

    /// `SRCPKG_CONFIG` when set, otherwise `~/.srcpkg/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        Ok(get_home_dir()?.join(".srcpkg").join("config.toml"))
    }

    /// Expanded [`build_dir`](Self::build_dir).
    pub fn build_dir_path(&self) -> Result<PathBuf> {
        resolve_setting("build_dir", &self.build_dir)
    }

    /// Expanded [`mapping_file`](Self::mapping_file).
    pub fn mapping_file_path(&self) -> Result<PathBuf> {
        resolve_setting("mapping_file", &self.mapping_file)
    }
}

fn resolve_setting(name: &str, value: &str) -> Result<PathBuf> {
    if value.trim().is_empty() {
        return Err(SrcpkgError::ConfigError {
            message: format!("'{name}' must not be empty"),
        }
        .into());
    }
    resolve_path(value).map_err(|e| {
        SrcpkgError::ConfigError {
            message: format!("'{name}': {e:#}"),
        }
        .into()
    })
}
