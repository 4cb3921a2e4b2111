//! Fetching package repositories with the system `git` command.
//!
//! Like Cargo, srcpkg shells out to the installed `git` binary instead of
//! linking a Git library, so the user's credential helpers and proxy settings
//! apply unchanged. Each package repository is cloned from
//! `<base_url>/<repository>.git`.

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

use crate::core::SrcpkgError;
use crate::resolver::Fetcher;
use crate::utils::ToolCommand;

/// Clones package repositories from a Gitea-style host.
#[derive(Debug, Clone)]
pub struct GitFetcher {
    base_url: String,
}

impl GitFetcher {
    /// Creates a fetcher for repositories below `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Clone URL of `repository`.
    ///
    /// ```rust
    /// use srcpkg_cli::git::GitFetcher;
    ///
    /// let fetcher = GitFetcher::new("https://gitea.artixlinux.org/packages/");
    /// assert_eq!(fetcher.url("udev"), "https://gitea.artixlinux.org/packages/udev.git");
    /// ```
    #[must_use]
    pub fn url(&self, repository: &str) -> String {
        format!("{}/{}.git", self.base_url, repository)
    }
}

#[async_trait]
impl Fetcher for GitFetcher {
    async fn fetch(&self, repository: &str, dest: &Path) -> Result<()> {
        let url = self.url(repository);
        tracing::debug!(target: "git", "Cloning {} into {}", url, dest.display());

        // Clones run without a timeout; large repositories take as long as they take
        let result = ToolCommand::new("git")
            .args(["clone", "--quiet"])
            .arg(url.as_str())
            .arg(dest.display().to_string())
            .env("GIT_TERMINAL_PROMPT", "0")
            .with_context(repository)
            .execute_success()
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(e) => match e.downcast_ref::<SrcpkgError>() {
                Some(SrcpkgError::CommandFailed {
                    stderr, ..
                }) => Err(SrcpkgError::FetchFailed {
                    repository: repository.to_string(),
                    reason: stderr.trim().to_string(),
                }
                .into()),
                _ => Err(e),
            },
        }
    }
}
