//! Seams between the resolver and the host system.
//!
//! The orchestrator never runs a command or reads the terminal itself. Every
//! side effect goes through one of these traits so the traversal can be driven
//! by scripted collaborators in tests and by pacman, git, makepkg and the
//! terminal in production.

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

use super::BuildTarget;

/// Answers whether a package is already present on the system.
#[async_trait]
pub trait InstalledRegistry: Send + Sync {
    /// Whether `package` is installed and therefore needs no further work.
    async fn is_installed(&self, package: &str) -> Result<bool>;
}

/// Installs binary packages through the system package manager.
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Install `package`. An error is absorbed by the caller, which falls back
    /// to building from source.
    async fn install(&self, package: &str) -> Result<()>;
}

/// Materialises a package repository into a local directory.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `repository` into `dest`, which does not exist beforehand.
    ///
    /// A failure that another repository name could fix must be reported as
    /// [`SrcpkgError::FetchFailed`](crate::core::SrcpkgError::FetchFailed);
    /// any other error aborts resolution.
    async fn fetch(&self, repository: &str, dest: &Path) -> Result<()>;
}

/// Builds and installs a fetched package.
#[async_trait]
pub trait Builder: Send + Sync {
    /// Build the package in `target.path`.
    async fn build(&self, target: &BuildTarget) -> Result<()>;
}

/// Opens a manifest for interactive editing.
#[async_trait]
pub trait ManifestEditor: Send + Sync {
    /// Edit the manifest at `manifest`, returning once the editor exits.
    async fn edit(&self, manifest: &Path) -> Result<()>;
}

/// How a dependency that is not installed should be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMethod {
    /// Install the binary package from the package manager
    Repository,
    /// Fetch the package repository and build it
    Source,
}

/// Answer to a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairChoice {
    /// Try again with this repository name
    Retry(String),
    /// Give up on the dependency
    Skip,
}

/// Every question the resolver may ask the user.
#[async_trait]
pub trait Decision: Send + Sync {
    /// Choose between the package manager and a source build for `package`.
    async fn choose_install_method(&self, package: &str) -> Result<InstallMethod>;

    /// Ask for the repository name of `package` after fetching `attempted` failed.
    async fn repair_repository_name(&self, package: &str, attempted: &str)
    -> Result<RepairChoice>;

    /// After a repaired fetch also failed, ask whether to try another name.
    async fn confirm_retry(&self, package: &str) -> Result<bool>;

    /// Ask whether to edit the root package's manifest before processing it.
    async fn confirm_manifest_edit(&self, package: &str) -> Result<bool>;
}
