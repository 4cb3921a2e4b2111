//! End-to-end resolution against a scripted world and a real build directory.

use srcpkg_cli::core::SrcpkgError;
use srcpkg_cli::mapping::RepoMapping;
use srcpkg_cli::resolver::{DependencyOrchestrator, RepairChoice};
use srcpkg_cli::test_utils::{Call, FakeWorld};
use tempfile::TempDir;

fn orchestrator(temp: &TempDir, world: &FakeWorld) -> DependencyOrchestrator {
    let mapping = RepoMapping::load(temp.path().join("repo_mappings.txt")).unwrap();
    DependencyOrchestrator::new(mapping, temp.path().join("custompkg"), world.collaborators())
}

#[tokio::test]
async fn test_builds_dependencies_before_root() {
    let temp = TempDir::new().unwrap();
    let world = FakeWorld::new()
        .repository("foo", "pkgname=foo\nmakedepends=(bar)\ndepends=(glibc)\n")
        .repository("bar", "pkgname=bar\ndepends=(glibc)\n")
        .installed("glibc");

    let report = orchestrator(&temp, &world).run("foo").await.unwrap();

    assert_eq!(report.built, vec!["bar", "foo"]);
    assert_eq!(report.target.path, temp.path().join("custompkg/foo"));
    assert_eq!(world.builds(), vec!["bar", "foo"]);
    assert!(temp.path().join("custompkg/bar/PKGBUILD").exists());
    assert!(!world.calls().contains(&Call::Fetch("glibc".to_string())));
}

#[tokio::test]
async fn test_learned_mapping_is_reused_by_next_run() {
    let temp = TempDir::new().unwrap();
    let world = FakeWorld::new()
        .repository("foo", "depends=(gcc-libs)\n")
        .repository("gcc", "pkgname=gcc\n")
        .repair(RepairChoice::Retry("gcc".to_string()));

    orchestrator(&temp, &world).run("foo").await.unwrap();
    assert_eq!(
        std::fs::read_to_string(temp.path().join("repo_mappings.txt")).unwrap(),
        "gcc-libs gcc\n"
    );

    // A fresh run reads the log and fetches the right repository straight away
    let second = FakeWorld::new()
        .repository("foo", "depends=(gcc-libs)\n")
        .repository("gcc", "pkgname=gcc\n");
    orchestrator(&temp, &second).run("foo").await.unwrap();

    assert_eq!(second.fetches(), vec!["foo", "gcc"]);
    assert!(!second.calls().iter().any(|c| matches!(c, Call::RepairRepositoryName(_))));
}

#[tokio::test]
async fn test_failure_stops_remaining_siblings() {
    let temp = TempDir::new().unwrap();
    let world = FakeWorld::new()
        .repository("root", "depends=(a b)\n")
        .repository("a", "pkgname=a\n")
        .repository("b", "pkgname=b\n")
        .failing_build("a");

    let err = orchestrator(&temp, &world).run("root").await.unwrap_err();

    assert!(matches!(
        err.chain().find_map(|e| e.downcast_ref::<SrcpkgError>()),
        Some(SrcpkgError::BuildFailed { package, .. }) if package == "a"
    ));
    assert!(!world.calls().contains(&Call::IsInstalled("b".to_string())));
    assert_eq!(world.builds(), vec!["a"]);
}

#[tokio::test]
async fn test_cycle_is_reported() {
    let temp = TempDir::new().unwrap();
    let world = FakeWorld::new()
        .repository("a", "depends=(b)\n")
        .repository("b", "depends=(a)\n");

    let err = orchestrator(&temp, &world).run("a").await.unwrap_err();

    let chain = err.chain().find_map(|e| match e.downcast_ref::<SrcpkgError>() {
        Some(SrcpkgError::CircularDependency { chain }) => Some(chain.clone()),
        _ => None,
    });
    assert_eq!(chain.as_deref(), Some("a -> b -> a"));
    assert!(world.builds().is_empty());
}
