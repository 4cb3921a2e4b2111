//! Recursive dependency resolution and building
//!
//! The [`DependencyOrchestrator`] takes a root package and works out
//! everything that must exist before it can be built. Each dependency is:
//!
//! 1. skipped if it was already built during this run,
//! 2. skipped if the [`InstalledRegistry`] reports it as installed,
//! 3. optionally installed from the package manager (falling back to a source
//!    build when that fails),
//! 4. otherwise fetched via [`RepoNameResolver`], its own dependencies
//!    processed depth-first, and finally built.
//!
//! A dependency is only built after all of its own dependencies succeeded,
//! and the root only after all of its dependencies succeeded. The first
//! failure stops the whole run.
//!
//! # Traversal markers
//!
//! Every package that starts a source build is marked [`VisitState::InProgress`]
//! until it is built ([`VisitState::Done`]) or fails (marker cleared, so a
//! later reference tries again). Reaching a package that is still in progress
//! means the manifests form a cycle, which is reported as
//! [`SrcpkgError::CircularDependency`] with the chain that closed it.
//!
//! ```text
//! foo ──depends──▶ bar ──depends──▶ foo      error: foo -> bar -> foo
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use srcpkg_cli::mapping::RepoMapping;
//! use srcpkg_cli::resolver::{Collaborators, DependencyOrchestrator};
//!
//! # async fn example(collaborators: Collaborators) -> anyhow::Result<()> {
//! let mapping = RepoMapping::load("/home/me/repo_mappings.txt")?;
//! let mut orchestrator =
//!     DependencyOrchestrator::new(mapping, "/home/me/custompkg".into(), collaborators);
//! let report = orchestrator.run("foo").await?;
//! println!("built {} packages", report.built.len());
//! # Ok(())
//! # }
//! ```

pub mod repo_name;
pub mod traits;

pub use repo_name::RepoNameResolver;
pub use traits::{
    Builder, Decision, Fetcher, InstallMethod, InstalledRegistry, ManifestEditor,
    PackageInstaller, RepairChoice,
};

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::core::SrcpkgError;
use crate::manifest::{self, DependencySet};
use crate::mapping::RepoMapping;
use crate::utils::fs::ensure_dir;
use repo_name::validate_package_name;

/// A package whose repository has been fetched and is ready to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    /// Package name as it appears in manifests
    pub package: String,
    /// Repository name it was fetched from
    pub repository: String,
    /// Local checkout, `<build_dir>/<package>`
    pub path: PathBuf,
}

/// How a dependency ended up satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Fetched and built from source during this call
    Built,
    /// Already built earlier in this run
    AlreadyBuilt,
    /// Reported as installed by the registry
    AlreadyInstalled,
    /// Installed from the package manager
    InstalledFromRepository,
}

/// Traversal marker of a package during one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitState {
    /// Its own dependencies are being processed
    InProgress,
    /// Built successfully
    Done,
}

/// Result of a successful [`DependencyOrchestrator::run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The root package checkout
    pub target: BuildTarget,
    /// Every package built from source, in build order, root last
    pub built: Vec<String>,
}

/// Boxed collaborator handles owned by the orchestrator.
pub struct Collaborators {
    pub registry: Box<dyn InstalledRegistry>,
    pub installer: Box<dyn PackageInstaller>,
    pub fetcher: Box<dyn Fetcher>,
    pub builder: Box<dyn Builder>,
    pub decision: Box<dyn Decision>,
    pub editor: Box<dyn ManifestEditor>,
}

/// Drives resolution, fetching and building for one run.
pub struct DependencyOrchestrator {
    mapping: RepoMapping,
    build_dir: PathBuf,
    collaborators: Collaborators,
    markers: HashMap<String, VisitState>,
    /// Packages currently in progress, outermost first
    stack: Vec<String>,
    built: Vec<String>,
}

impl DependencyOrchestrator {
    /// Creates an orchestrator that fetches packages into `build_dir`.
    pub fn new(mapping: RepoMapping, build_dir: PathBuf, collaborators: Collaborators) -> Self {
        Self {
            mapping,
            build_dir,
            collaborators,
            markers: HashMap::new(),
            stack: Vec::new(),
            built: Vec::new(),
        }
    }

    /// Fetch `root`, offer a manifest edit, satisfy every dependency, then build it.
    ///
    /// The root is fetched without consulting the installed registry; asking
    /// for it means the user wants it built. Dependencies are processed in
    /// manifest order (build-time first) and the run stops at the first
    /// failure without building the root.
    pub async fn run(&mut self, root: &str) -> Result<RunReport> {
        let root = root.trim();
        if root.is_empty() {
            anyhow::bail!("No package name given");
        }
        validate_package_name(root)?;

        ensure_dir(&self.build_dir)?;

        let target = self.fetch(root).await?;

        let manifest_file = manifest::manifest_path(&target.path);
        if manifest_file.exists() && self.collaborators.decision.confirm_manifest_edit(root).await? {
            self.collaborators.editor.edit(&manifest_file).await?;
        }

        let dependencies = manifest::load_from_dir(&target.path)?.all();
        tracing::info!("Processing {} dependencies of '{}'", dependencies.len(), root);

        self.enter(root);
        let result = match self.process_all(root, &dependencies).await {
            Ok(()) => self.build(&target).await,
            Err(e) => Err(e),
        };
        self.leave(root, result.is_ok());
        result?;

        tracing::info!("Successfully processed all dependencies for '{}'", root);
        Ok(RunReport {
            target,
            built: self.built.clone(),
        })
    }

    /// Make sure `package` is available, building it from source if needed.
    ///
    /// # Errors
    ///
    /// - [`SrcpkgError::InvalidPackageName`] when `package` cannot name a
    ///   directory under the build directory
    /// - [`SrcpkgError::CircularDependency`] when `package` is already in progress
    /// - [`SrcpkgError::ResolutionFailed`] when no repository could be fetched
    /// - [`SrcpkgError::BuildFailed`] from the build tool, for `package` or any
    ///   of its dependencies (with context naming the chain)
    pub async fn process_dependency(&mut self, package: &str) -> Result<Outcome> {
        validate_package_name(package)?;

        match self.markers.get(package) {
            Some(VisitState::Done) => {
                tracing::debug!("'{}' was already built in this run", package);
                return Ok(Outcome::AlreadyBuilt);
            }
            Some(VisitState::InProgress) => {
                return Err(SrcpkgError::CircularDependency {
                    chain: self.cycle_chain(package),
                }
                .into());
            }
            None => {}
        }

        if self.collaborators.registry.is_installed(package).await? {
            tracing::info!("'{}' is already installed", package);
            return Ok(Outcome::AlreadyInstalled);
        }

        tracing::info!("Processing dependency: {}", package);
        if self.collaborators.decision.choose_install_method(package).await?
            == InstallMethod::Repository
        {
            match self.collaborators.installer.install(package).await {
                Ok(()) => {
                    tracing::info!("Installed '{}' from the package manager", package);
                    return Ok(Outcome::InstalledFromRepository);
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to install '{}' from the package manager, building from source: {:#}",
                        package,
                        e
                    );
                }
            }
        }

        self.enter(package);
        let result = self.build_from_source(package).await;
        self.leave(package, result.is_ok());
        result.map(|()| Outcome::Built)
    }

    async fn build_from_source(&mut self, package: &str) -> Result<()> {
        let target = self.fetch(package).await?;
        let dependencies = manifest::load_from_dir(&target.path)?;
        self.process_all(package, &dependencies.all()).await?;
        self.build(&target).await
    }

    async fn process_all(&mut self, parent: &str, dependencies: &DependencySet) -> Result<()> {
        for dependency in dependencies.iter() {
            Box::pin(self.process_dependency(dependency)).await.with_context(|| {
                format!("Failed to process dependency '{dependency}' of '{parent}'")
            })?;
        }
        Ok(())
    }

    async fn fetch(&mut self, package: &str) -> Result<BuildTarget> {
        RepoNameResolver::new(
            &mut self.mapping,
            self.collaborators.fetcher.as_ref(),
            self.collaborators.decision.as_ref(),
            &self.build_dir,
        )
        .resolve(package)
        .await
    }

    async fn build(&mut self, target: &BuildTarget) -> Result<()> {
        tracing::info!("Building '{}' in {}", target.package, target.path.display());
        self.collaborators.builder.build(target).await?;
        self.built.push(target.package.clone());
        Ok(())
    }

    fn enter(&mut self, package: &str) {
        self.markers.insert(package.to_string(), VisitState::InProgress);
        self.stack.push(package.to_string());
    }

    fn leave(&mut self, package: &str, succeeded: bool) {
        self.stack.pop();
        if succeeded {
            self.markers.insert(package.to_string(), VisitState::Done);
        } else {
            self.markers.remove(package);
        }
    }

    /// `a -> b -> a` for a package found again while still in progress.
    fn cycle_chain(&self, package: &str) -> String {
        let start = self.stack.iter().position(|p| p == package).unwrap_or(0);
        let mut chain: Vec<&str> = self.stack[start..].iter().map(String::as_str).collect();
        chain.push(package);
        chain.join(" -> ")
    }

    /// The marker of `package`, `None` when it has not been started or failed.
    #[must_use]
    pub fn state(&self, package: &str) -> Option<VisitState> {
        self.markers.get(package).copied()
    }

    /// Packages built so far, in build order.
    #[must_use]
    pub fn built(&self) -> &[String] {
        &self.built
    }

    /// The repository mapping, including names learned during this run.
    #[must_use]
    pub const fn mapping(&self) -> &RepoMapping {
        &self.mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{Call, FakeWorld};
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        orchestrator: DependencyOrchestrator,
    }

    fn orchestrator(world: &FakeWorld) -> Fixture {
        crate::test_utils::init_test_logging(None);
        let temp = TempDir::new().unwrap();
        let mapping = RepoMapping::load(temp.path().join("repo_mappings.txt")).unwrap();
        let orchestrator =
            DependencyOrchestrator::new(mapping, temp.path().join("custompkg"), world.collaborators());
        Fixture {
            temp,
            orchestrator,
        }
    }

    fn root_cause(err: &anyhow::Error) -> Option<&SrcpkgError> {
        err.chain().find_map(|e| e.downcast_ref::<SrcpkgError>())
    }

    #[tokio::test]
    async fn test_path_like_dependency_names_are_refused() {
        for bad in ["..", ".", "../escape", "sub/dir"] {
            let world = FakeWorld::new()
                .repository("foo", &format!("depends=('{bad}')"))
                .installed(bad);
            let mut fx = orchestrator(&world);
            let precious = fx.temp.path().join("precious.txt");
            std::fs::write(&precious, "data").unwrap();

            let err = fx.orchestrator.run("foo").await.unwrap_err();

            assert!(
                matches!(root_cause(&err), Some(SrcpkgError::InvalidPackageName { package }) if package == bad),
                "{bad}"
            );
            assert!(precious.exists());
            assert!(fx.temp.path().join("custompkg/foo/PKGBUILD").exists());
            assert_eq!(world.fetches(), vec!["foo"]);
            assert!(world.builds().is_empty());
        }
    }

    #[tokio::test]
    async fn test_path_like_root_is_refused() {
        let world = FakeWorld::new();
        let mut fx = orchestrator(&world);

        let err = fx.orchestrator.run("..").await.unwrap_err();

        assert!(matches!(root_cause(&err), Some(SrcpkgError::InvalidPackageName { .. })));
        assert!(world.calls().is_empty());
    }

    #[tokio::test]
    async fn test_single_dependency_scenario() {
        let world = FakeWorld::new()
            .repository("foo", "depends=('bar>=1.0')")
            .repository("bar", "pkgname=bar");
        let mut fx = orchestrator(&world);

        let report = fx.orchestrator.run("foo").await.unwrap();

        assert_eq!(report.built, vec!["bar", "foo"]);
        assert_eq!(report.target.path, fx.temp.path().join("custompkg/foo"));
        assert_eq!(fx.orchestrator.state("bar"), Some(VisitState::Done));
        assert_eq!(
            world.calls(),
            vec![
                Call::Fetch("foo".into()),
                Call::ConfirmManifestEdit("foo".into()),
                Call::IsInstalled("bar".into()),
                Call::ChooseInstallMethod("bar".into()),
                Call::Fetch("bar".into()),
                Call::Build("bar".into()),
                Call::Build("foo".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_memoized_dependency_makes_no_calls() {
        let world = FakeWorld::new().repository("bar", "");
        let mut fx = orchestrator(&world);

        assert_eq!(fx.orchestrator.process_dependency("bar").await.unwrap(), Outcome::Built);
        let calls_after_first = world.calls().len();

        assert_eq!(
            fx.orchestrator.process_dependency("bar").await.unwrap(),
            Outcome::AlreadyBuilt
        );
        assert_eq!(world.calls().len(), calls_after_first);
    }

    #[tokio::test]
    async fn test_shared_dependency_built_once() {
        let world = FakeWorld::new()
            .repository("root", "makedepends=(a) depends=(b)")
            .repository("a", "depends=(common)")
            .repository("b", "depends=(common)")
            .repository("common", "");
        let mut fx = orchestrator(&world);

        let report = fx.orchestrator.run("root").await.unwrap();

        assert_eq!(report.built, vec!["common", "a", "b", "root"]);
        assert_eq!(world.fetches().iter().filter(|r| *r == "common").count(), 1);
    }

    #[tokio::test]
    async fn test_installed_dependency_short_circuits() {
        let world = FakeWorld::new().repository("foo", "depends=(glibc)").installed("glibc");
        let mut fx = orchestrator(&world);

        let report = fx.orchestrator.run("foo").await.unwrap();

        assert_eq!(report.built, vec!["foo"]);
        assert!(!world.fetches().contains(&"glibc".to_string()));
        assert!(!world.calls().contains(&Call::ChooseInstallMethod("glibc".into())));
        // Installed packages are re-checked rather than marked
        assert_eq!(fx.orchestrator.state("glibc"), None);
    }

    #[tokio::test]
    async fn test_repository_install() {
        let world = FakeWorld::new().install_method("zlib", InstallMethod::Repository);
        let mut fx = orchestrator(&world);

        let outcome = fx.orchestrator.process_dependency("zlib").await.unwrap();

        assert_eq!(outcome, Outcome::InstalledFromRepository);
        assert!(world.fetches().is_empty());
        assert!(world.builds().is_empty());
    }

    #[tokio::test]
    async fn test_failed_repository_install_falls_back_to_source() {
        let world = FakeWorld::new()
            .repository("zlib", "")
            .install_method("zlib", InstallMethod::Repository)
            .failing_install("zlib");
        let mut fx = orchestrator(&world);

        let outcome = fx.orchestrator.process_dependency("zlib").await.unwrap();

        assert_eq!(outcome, Outcome::Built);
        assert_eq!(world.builds(), vec!["zlib"]);
    }

    #[tokio::test]
    async fn test_first_failure_stops_the_run() {
        let world = FakeWorld::new()
            .repository("r", "depends=(a b)")
            .repository("a", "")
            .repository("b", "")
            .failing_build("a");
        let mut fx = orchestrator(&world);

        let err = fx.orchestrator.run("r").await.unwrap_err();

        assert!(matches!(
            root_cause(&err),
            Some(SrcpkgError::BuildFailed { package, .. }) if package == "a"
        ));
        assert!(format!("{err:#}").contains("Failed to process dependency 'a' of 'r'"));
        assert!(!world.calls().contains(&Call::IsInstalled("b".into())));
        assert_eq!(world.builds(), vec!["a"]);
        assert_eq!(fx.orchestrator.state("a"), None);
        assert_eq!(fx.orchestrator.state("r"), None);
    }

    #[tokio::test]
    async fn test_skipped_dependency_aborts_parent() {
        let world = FakeWorld::new()
            .repository("r", "depends=(a)")
            .repository("a", "depends=(ghost)")
            .repair(RepairChoice::Skip);
        let mut fx = orchestrator(&world);

        let err = fx.orchestrator.run("r").await.unwrap_err();

        assert!(matches!(
            root_cause(&err),
            Some(SrcpkgError::ResolutionFailed { package }) if package == "ghost"
        ));
        assert!(world.builds().is_empty());
    }

    #[tokio::test]
    async fn test_cycle_is_reported() {
        let world = FakeWorld::new()
            .repository("a", "depends=(b)")
            .repository("b", "depends=(a)");
        let mut fx = orchestrator(&world);

        let err = fx.orchestrator.process_dependency("a").await.unwrap_err();

        match root_cause(&err) {
            Some(SrcpkgError::CircularDependency {
                chain,
            }) => assert_eq!(chain, "a -> b -> a"),
            other => panic!("Expected CircularDependency, got {other:?}"),
        }
        assert!(world.builds().is_empty());
        assert_eq!(fx.orchestrator.state("a"), None);
        assert_eq!(fx.orchestrator.state("b"), None);
    }

    #[tokio::test]
    async fn test_dependency_on_root_is_a_cycle() {
        let world = FakeWorld::new()
            .repository("foo", "depends=(bar)")
            .repository("bar", "depends=(foo)");
        let mut fx = orchestrator(&world);

        let err = fx.orchestrator.run("foo").await.unwrap_err();

        assert!(matches!(
            root_cause(&err),
            Some(SrcpkgError::CircularDependency { chain }) if chain == "foo -> bar -> foo"
        ));
    }

    #[tokio::test]
    async fn test_failed_package_is_retried_on_later_reference() {
        let world = FakeWorld::new().repair(RepairChoice::Skip);
        let mut fx = orchestrator(&world);

        assert!(fx.orchestrator.process_dependency("late-pkg").await.is_err());
        assert_eq!(fx.orchestrator.state("late-pkg"), None);

        let calls_after_first = world.calls().len();
        assert!(fx.orchestrator.process_dependency("late-pkg").await.is_err());
        assert!(world.calls().len() > calls_after_first);
    }

    #[tokio::test]
    async fn test_manifest_edit_offered_for_root() {
        let world = FakeWorld::new().repository("foo", "").edit_manifest();
        let mut fx = orchestrator(&world);

        fx.orchestrator.run("foo").await.unwrap();

        let manifest = fx.temp.path().join("custompkg/foo/PKGBUILD");
        assert!(world.calls().contains(&Call::Edit(manifest)));
    }

    #[tokio::test]
    async fn test_root_is_built_even_if_installed() {
        let world = FakeWorld::new().repository("foo", "").installed("foo");
        let mut fx = orchestrator(&world);

        let report = fx.orchestrator.run("foo").await.unwrap();

        assert_eq!(report.built, vec!["foo"]);
        assert!(!world.calls().contains(&Call::IsInstalled("foo".into())));
    }

    #[tokio::test]
    async fn test_learned_mapping_is_kept() {
        let world = FakeWorld::new()
            .repository("foo", "depends=(libudev)")
            .repository("udev", "")
            .repair(RepairChoice::Retry("udev".into()));
        let mut fx = orchestrator(&world);

        fx.orchestrator.run("foo").await.unwrap();

        assert_eq!(fx.orchestrator.mapping().resolve("libudev"), "udev");
        let reloaded = RepoMapping::load(fx.temp.path().join("repo_mappings.txt")).unwrap();
        assert_eq!(reloaded.resolve("libudev"), "udev");
    }

    #[tokio::test]
    async fn test_empty_root_name_rejected() {
        let world = FakeWorld::new();
        let mut fx = orchestrator(&world);

        assert!(fx.orchestrator.run("  ").await.is_err());
        assert!(world.calls().is_empty());
    }
}
