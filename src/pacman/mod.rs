//! The system package manager.
//!
//! `pacman -Q <pkg>` answers whether a package is installed (exit status 0)
//! and `sudo pacman -S --noconfirm <pkg>` installs a binary package. The
//! install inherits the terminal so sudo can ask for a password.

use anyhow::Result;
use async_trait::async_trait;

use crate::core::SrcpkgError;
use crate::resolver::{InstalledRegistry, PackageInstaller};
use crate::utils::ToolCommand;

/// pacman-backed registry and installer.
#[derive(Debug, Clone, Default)]
pub struct Pacman;

impl Pacman {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn query_args(package: &str) -> [&str; 2] {
        ["-Q", package]
    }

    fn install_args(package: &str) -> [&str; 4] {
        ["pacman", "-S", "--noconfirm", package]
    }
}

#[async_trait]
impl InstalledRegistry for Pacman {
    async fn is_installed(&self, package: &str) -> Result<bool> {
        let result = ToolCommand::new("pacman")
            .args(Self::query_args(package))
            .with_context(package)
            .execute_success()
            .await;

        match result {
            Ok(()) => Ok(true),
            Err(e) => match e.downcast_ref::<SrcpkgError>() {
                Some(SrcpkgError::CommandFailed {
                    ..
                }) => Ok(false),
                _ => Err(e),
            },
        }
    }
}

#[async_trait]
impl PackageInstaller for Pacman {
    async fn install(&self, package: &str) -> Result<()> {
        tracing::info!("Installing '{}' with pacman", package);
        ToolCommand::new("sudo")
            .args(Self::install_args(package))
            .inherit_stdio()
            .with_context(package)
            .execute_success()
            .await
            .map_err(|e| {
                SrcpkgError::InstallFailed {
                    package: package.to_string(),
                    reason: format!("{e:#}"),
                }
                .into()
            })
    }
}
