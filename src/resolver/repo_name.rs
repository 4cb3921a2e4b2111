//! Repository name resolution with interactive repair.
//!
//! A package is first fetched under its mapped repository name (or its own
//! name). When that fetch fails the user is asked for the right name, and a
//! name that works is written to the mapping log so the question is never
//! asked again for that package.

use anyhow::Result;
use std::path::{Component, Path, PathBuf};

use super::BuildTarget;
use super::traits::{Decision, Fetcher, RepairChoice};
use crate::core::SrcpkgError;
use crate::mapping::RepoMapping;
use crate::utils::fs::remove_dir_all;

/// Turns package names into fetched [`BuildTarget`]s.
pub struct RepoNameResolver<'a> {
    mapping: &'a mut RepoMapping,
    fetcher: &'a dyn Fetcher,
    decision: &'a dyn Decision,
    build_dir: &'a Path,
}

impl<'a> RepoNameResolver<'a> {
    /// Creates a resolver that fetches into `build_dir/<package>`.
    pub fn new(
        mapping: &'a mut RepoMapping,
        fetcher: &'a dyn Fetcher,
        decision: &'a dyn Decision,
        build_dir: &'a Path,
    ) -> Self {
        Self {
            mapping,
            fetcher,
            decision,
            build_dir,
        }
    }

    /// Fetch `package` into a fresh directory, repairing its repository name
    /// if needed.
    ///
    /// Any existing copy at the target path is removed before every attempt.
    ///
    /// # Errors
    ///
    /// - [`SrcpkgError::InvalidPackageName`] when `package` is not a single
    ///   path component
    /// - [`SrcpkgError::ResolutionFailed`] when the user skips the package or
    ///   declines to try another name
    /// - any non-[`SrcpkgError::FetchFailed`] error from the fetcher, unchanged
    /// - [`SrcpkgError::InvalidMapping`] when a working name cannot be recorded
    pub async fn resolve(&mut self, package: &str) -> Result<BuildTarget> {
        validate_package_name(package)?;
        let path = self.target_path(package);
        let mut repository = match self.mapping.lookup(package) {
            Some(mapped) => {
                tracing::info!("Found mapping: {} -> {}", package, mapped);
                mapped.to_string()
            }
            None => {
                tracing::debug!("No mapping for '{}', using the package name", package);
                package.to_string()
            }
        };
        let mut repaired = false;

        loop {
            if path.exists() {
                tracing::info!("Removing old copy of '{}' at {}", package, path.display());
            }
            remove_dir_all(&path)?;

            match self.fetcher.fetch(&repository, &path).await {
                Ok(()) => {
                    tracing::info!("Fetched '{}' from repository '{}'", package, repository);
                    if repaired {
                        self.mapping.record(package, &repository)?;
                    }
                    return Ok(BuildTarget {
                        package: package.to_string(),
                        repository,
                        path,
                    });
                }
                Err(e) => {
                    let Some(reason) = fetch_failure_reason(&e) else {
                        return Err(e);
                    };
                    tracing::warn!("Failed to fetch repository '{}': {}", repository, reason.trim());
                }
            }

            if repaired && !self.decision.confirm_retry(package).await? {
                return Err(resolution_failed(package));
            }

            match self.decision.repair_repository_name(package, &repository).await? {
                RepairChoice::Retry(name) => {
                    repository = name;
                    repaired = true;
                }
                RepairChoice::Skip => {
                    tracing::info!("Skipping '{}'", package);
                    return Err(resolution_failed(package));
                }
            }
        }
    }

    fn target_path(&self, package: &str) -> PathBuf {
        self.build_dir.join(package)
    }
}

/// Refuse names that would not land in their own directory under the build
/// directory: exactly one normal path component is allowed.
pub(crate) fn validate_package_name(package: &str) -> Result<()> {
    let mut components = Path::new(package).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == package => Ok(()),
        _ => Err(SrcpkgError::InvalidPackageName {
            package: package.to_string(),
        }
        .into()),
    }
}

/// The reason of a repairable fetch failure, `None` for any other error.
fn fetch_failure_reason(error: &anyhow::Error) -> Option<String> {
    match error.downcast_ref::<SrcpkgError>() {
        Some(SrcpkgError::FetchFailed {
            reason, ..
        }) => Some(reason.clone()),
        _ => None,
    }
}

fn resolution_failed(package: &str) -> anyhow::Error {
    SrcpkgError::ResolutionFailed {
        package: package.to_string(),
    }
    .into()
}
