//! A scripted package universe.
//!
//! [`FakeWorld`] plays every collaborator at once: the installed-package
//! registry, the package manager, the repository host, the build tool, the
//! editor and the user answering prompts. All of them share one state, so a
//! test can script the world up front and afterwards inspect the exact
//! sequence of [`Call`]s the resolver made.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::constants::MANIFEST_FILE;
use crate::core::SrcpkgError;
use crate::resolver::{
    BuildTarget, Builder, Collaborators, Decision, Fetcher, InstallMethod, InstalledRegistry,
    ManifestEditor, PackageInstaller, RepairChoice,
};

/// One collaborator invocation, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    IsInstalled(String),
    Install(String),
    /// Repository name that was fetched
    Fetch(String),
    Build(String),
    ChooseInstallMethod(String),
    RepairRepositoryName(String),
    ConfirmRetry(String),
    ConfirmManifestEdit(String),
    Edit(PathBuf),
}

#[derive(Default)]
struct State {
    /// repository name → PKGBUILD content
    repositories: HashMap<String, String>,
    installed: HashSet<String>,
    failing_installs: HashSet<String>,
    failing_builds: HashSet<String>,
    install_methods: HashMap<String, InstallMethod>,
    repairs: VecDeque<RepairChoice>,
    retries: VecDeque<bool>,
    edit_manifest: bool,
    fetch_unavailable: bool,
    calls: Vec<Call>,
}

/// Scriptable stand-in for the host system and the user.
///
/// Unscripted questions get conservative answers: build from source, skip on
/// repair, decline retries and manifest edits.
#[derive(Clone, Default)]
pub struct FakeWorld {
    state: Arc<Mutex<State>>,
}

impl FakeWorld {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Host a repository whose PKGBUILD contains `manifest`.
    pub fn repository(self, name: &str, manifest: &str) -> Self {
        self.state().repositories.insert(name.to_string(), manifest.to_string());
        self
    }

    /// Mark `package` as already installed.
    pub fn installed(self, package: &str) -> Self {
        self.state().installed.insert(package.to_string());
        self
    }

    /// Answer the install-method question for `package` with `method`.
    pub fn install_method(self, package: &str, method: InstallMethod) -> Self {
        self.state().install_methods.insert(package.to_string(), method);
        self
    }

    /// Make package-manager installs of `package` fail.
    pub fn failing_install(self, package: &str) -> Self {
        self.state().failing_installs.insert(package.to_string());
        self
    }

    /// Make the build of `package` fail.
    pub fn failing_build(self, package: &str) -> Self {
        self.state().failing_builds.insert(package.to_string());
        self
    }

    /// Queue an answer to the next repair prompt.
    pub fn repair(self, choice: RepairChoice) -> Self {
        self.state().repairs.push_back(choice);
        self
    }

    /// Queue an answer to the next "try another name?" prompt.
    pub fn retry(self, answer: bool) -> Self {
        self.state().retries.push_back(answer);
        self
    }

    /// Accept the manifest edit offer.
    pub fn edit_manifest(self) -> Self {
        self.state().edit_manifest = true;
        self
    }

    /// Make every fetch fail as if git were not installed.
    pub fn fetch_unavailable(self) -> Self {
        self.state().fetch_unavailable = true;
        self
    }

    /// Boxed handles onto this world for a resolver.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            registry: Box::new(self.clone()),
            installer: Box::new(self.clone()),
            fetcher: Box::new(self.clone()),
            builder: Box::new(self.clone()),
            decision: Box::new(self.clone()),
            editor: Box::new(self.clone()),
        }
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Packages built so far, in build order.
    pub fn builds(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Build(package) => Some(package),
                _ => None,
            })
            .collect()
    }

    /// Repository names fetched so far, in order.
    pub fn fetches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Fetch(repository) => Some(repository),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.state().calls.push(call);
    }
}

#[async_trait]
impl InstalledRegistry for FakeWorld {
    async fn is_installed(&self, package: &str) -> Result<bool> {
        self.record(Call::IsInstalled(package.to_string()));
        Ok(self.state().installed.contains(package))
    }
}

#[async_trait]
impl PackageInstaller for FakeWorld {
    async fn install(&self, package: &str) -> Result<()> {
        self.record(Call::Install(package.to_string()));
        let mut state = self.state();
        if state.failing_installs.contains(package) {
            return Err(SrcpkgError::InstallFailed {
                package: package.to_string(),
                reason: "target not found".to_string(),
            }
            .into());
        }
        state.installed.insert(package.to_string());
        Ok(())
    }
}

#[async_trait]
impl Fetcher for FakeWorld {
    async fn fetch(&self, repository: &str, dest: &Path) -> Result<()> {
        self.record(Call::Fetch(repository.to_string()));
        let manifest = {
            let state = self.state();
            if state.fetch_unavailable {
                return Err(SrcpkgError::CommandNotFound {
                    program: "git".to_string(),
                }
                .into());
            }
            state.repositories.get(repository).cloned()
        };

        let Some(manifest) = manifest else {
            return Err(SrcpkgError::FetchFailed {
                repository: repository.to_string(),
                reason: format!("repository '{repository}' not found"),
            }
            .into());
        };

        std::fs::create_dir_all(dest)?;
        std::fs::write(dest.join(MANIFEST_FILE), manifest)?;
        Ok(())
    }
}

#[async_trait]
impl Builder for FakeWorld {
    async fn build(&self, target: &BuildTarget) -> Result<()> {
        self.record(Call::Build(target.package.clone()));
        if self.state().failing_builds.contains(&target.package) {
            return Err(SrcpkgError::BuildFailed {
                package: target.package.clone(),
                reason: "exited with status 4".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl ManifestEditor for FakeWorld {
    async fn edit(&self, manifest: &Path) -> Result<()> {
        self.record(Call::Edit(manifest.to_path_buf()));
        Ok(())
    }
}

#[async_trait]
impl Decision for FakeWorld {
    async fn choose_install_method(&self, package: &str) -> Result<InstallMethod> {
        self.record(Call::ChooseInstallMethod(package.to_string()));
        Ok(self.state().install_methods.get(package).copied().unwrap_or(InstallMethod::Source))
    }

    async fn repair_repository_name(
        &self,
        package: &str,
        _attempted: &str,
    ) -> Result<RepairChoice> {
        self.record(Call::RepairRepositoryName(package.to_string()));
        Ok(self.state().repairs.pop_front().unwrap_or(RepairChoice::Skip))
    }

    async fn confirm_retry(&self, package: &str) -> Result<bool> {
        self.record(Call::ConfirmRetry(package.to_string()));
        Ok(self.state().retries.pop_front().unwrap_or(false))
    }

    async fn confirm_manifest_edit(&self, package: &str) -> Result<bool> {
        self.record(Call::ConfirmManifestEdit(package.to_string()));
        Ok(self.state().edit_manifest)
    }
}
