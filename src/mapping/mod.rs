//! Learned package → repository name mapping
//!
//! Most packages live in a repository of the same name, so [`RepoMapping::resolve`]
//! falls back to the package name itself. The exceptions (split packages,
//! renamed libraries) are learned interactively and persisted in a plain text
//! log, one `<package> <repository>` pair per line.
//!
//! The log is append-only: [`RepoMapping::record`] never rewrites earlier lines,
//! so the file may contain superseded entries for the same package. Loading
//! replays the lines in order and the last one for a package wins.
//!
//! ```text
//! libudev udev
//! gcc-libs gcc
//! libudev systemd      # later line, supersedes `libudev udev`
//! ```

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::core::SrcpkgError;
use crate::utils::fs::ensure_dir;

/// In-memory view of the mapping log plus the path new entries are appended to.
#[derive(Debug, Clone)]
pub struct RepoMapping {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl RepoMapping {
    /// Load the mapping log at `path`, creating an empty log if it does not exist.
    ///
    /// Lines that do not consist of exactly two whitespace-separated tokens are
    /// ignored.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            tracing::info!("Creating new repository mapping file at {}", path.display());
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                ensure_dir(parent)?;
            }
            std::fs::File::create(&path).with_context(|| {
                format!("Failed to create repository mapping file: {}", path.display())
            })?;
            return Ok(Self {
                path,
                entries: HashMap::new(),
            });
        }

        let content = std::fs::read_to_string(&path).with_context(|| {
            format!("Failed to read repository mapping file: {}", path.display())
        })?;

        let mut entries = HashMap::new();
        for (lineno, line) in content.lines().enumerate() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                [package, repository] => {
                    if let Some(previous) =
                        entries.insert((*package).to_string(), (*repository).to_string())
                    {
                        tracing::trace!(
                            "Mapping for '{}' on line {} supersedes '{}'",
                            package,
                            lineno + 1,
                            previous
                        );
                    }
                }
                [] => {}
                _ => {
                    tracing::debug!(
                        "Ignoring malformed line {} in {}: {:?}",
                        lineno + 1,
                        path.display(),
                        line
                    );
                }
            }
        }

        tracing::debug!("Loaded {} repository mappings from {}", entries.len(), path.display());

        Ok(Self {
            path,
            entries,
        })
    }

    /// Repository name for `package`: the recorded mapping, or `package` itself.
    #[must_use]
    pub fn resolve<'a>(&'a self, package: &'a str) -> &'a str {
        self.lookup(package).unwrap_or(package)
    }

    /// The recorded mapping for `package`, if any.
    #[must_use]
    pub fn lookup(&self, package: &str) -> Option<&str> {
        self.entries.get(package).map(String::as_str)
    }

    /// Append `package → repository` to the log and update the in-memory table.
    ///
    /// # Errors
    ///
    /// [`SrcpkgError::InvalidMapping`] when either name is empty or contains
    /// whitespace (such a line could not be read back), or an IO error when
    /// the log cannot be written.
    pub fn record(&mut self, package: &str, repository: &str) -> Result<()> {
        validate_name("package", package)?;
        validate_name("repository", repository)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .with_context(|| {
                format!("Failed to open repository mapping file: {}", self.path.display())
            })?;
        let line = if ends_mid_line(&mut file)? {
            format!("\n{package} {repository}")
        } else {
            format!("{package} {repository}")
        };
        writeln!(file, "{line}").with_context(|| {
            format!("Failed to append to repository mapping file: {}", self.path.display())
        })?;
        file.sync_data().ok();

        tracing::info!("Recorded repository mapping: {} -> {}", package, repository);
        self.entries.insert(package.to_string(), repository.to_string());
        Ok(())
    }

    /// All current mappings, sorted by package name.
    #[must_use]
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> =
            self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        entries.sort_unstable();
        entries
    }

    /// Number of distinct packages with a recorded mapping.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no mappings are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Location of the mapping log.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Whether the last line of `file` lacks its terminating newline.
fn ends_mid_line(file: &mut File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SrcpkgError::InvalidMapping {
            reason: format!("{kind} name is empty"),
        }
        .into());
    }
    if name.chars().any(char::is_whitespace) {
        return Err(SrcpkgError::InvalidMapping {
            reason: format!("{kind} name '{name}' contains whitespace"),
        }
        .into());
    }
    Ok(())
}
