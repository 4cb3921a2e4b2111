//! Building packages with `makepkg -si`.
//!
//! The build runs in the package checkout with the terminal attached, since
//! makepkg calls sudo to install the result and may ask questions of its own.

use anyhow::Result;
use async_trait::async_trait;

use crate::core::SrcpkgError;
use crate::resolver::{BuildTarget, Builder};
use crate::utils::ToolCommand;

/// Builds and installs a checkout with makepkg.
#[derive(Debug, Clone, Default)]
pub struct Makepkg {
    noconfirm: bool,
}

impl Makepkg {
    /// With `noconfirm`, makepkg and pacman are told not to ask for confirmation.
    #[must_use]
    pub const fn new(noconfirm: bool) -> Self {
        Self {
            noconfirm,
        }
    }

    fn args(&self) -> Vec<&'static str> {
        let mut args = vec!["-si"];
        if self.noconfirm {
            args.push("--noconfirm");
        }
        args
    }
}

#[async_trait]
impl Builder for Makepkg {
    async fn build(&self, target: &BuildTarget) -> Result<()> {
        let result = ToolCommand::new("makepkg")
            .args(self.args())
            .current_dir(&target.path)
            .inherit_stdio()
            .with_context(target.package.as_str())
            .execute_success()
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(e) => match e.downcast_ref::<SrcpkgError>() {
                Some(SrcpkgError::CommandFailed {
                    stderr, ..
                }) => Err(SrcpkgError::BuildFailed {
                    package: target.package.clone(),
                    reason: stderr.clone(),
                }
                .into()),
                _ => Err(e),
            },
        }
    }
}
