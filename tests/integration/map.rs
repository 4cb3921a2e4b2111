use predicates::prelude::*;

use crate::common::TestEnv;

#[test]
fn test_list_creates_empty_log() {
    let env = TestEnv::new();

    env.srcpkg()
        .args(["map", "list"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("No repository mappings"));

    assert!(env.mapping_file().exists());
}

#[test]
fn test_add_then_resolve() {
    let env = TestEnv::new();

    env.srcpkg()
        .args(["map", "add", "gcc-libs", "gcc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gcc-libs -> gcc"));

    env.srcpkg().args(["map", "resolve", "gcc-libs"]).assert().success().stdout("gcc\n");
    env.srcpkg().args(["map", "resolve", "bar"]).assert().success().stdout("bar\n");

    assert_eq!(std::fs::read_to_string(env.mapping_file()).unwrap(), "gcc-libs gcc\n");
}

#[test]
fn test_last_entry_wins_after_reload() {
    let env = TestEnv::new();
    std::fs::write(env.mapping_file(), "libudev udev\nbroken line here\n").unwrap();

    env.srcpkg().args(["map", "add", "libudev", "systemd"]).assert().success();

    env.srcpkg()
        .args(["map", "list"])
        .assert()
        .success()
        .stdout("libudev -> systemd\n");
    assert_eq!(
        std::fs::read_to_string(env.mapping_file()).unwrap(),
        "libudev udev\nbroken line here\nlibudev systemd\n"
    );
}

#[test]
fn test_list_json() {
    let env = TestEnv::new();
    std::fs::write(env.mapping_file(), "opengl-driver lib32-mesa\ngcc-libs gcc\n").unwrap();

    let output = env.srcpkg().args(["map", "list", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"package": "gcc-libs", "repository": "gcc"},
            {"package": "opengl-driver", "repository": "lib32-mesa"},
        ])
    );
}

#[test]
fn test_mappings_flag_overrides_config() {
    let env = TestEnv::new();
    let other = env.path().join("other/mappings.txt");

    env.srcpkg()
        .args(["map", "add", "libudev", "udev", "--mappings"])
        .arg(&other)
        .assert()
        .success();

    assert_eq!(std::fs::read_to_string(&other).unwrap(), "libudev udev\n");
    assert_eq!(std::fs::read_to_string(env.mapping_file()).unwrap_or_default(), "");
}

#[test]
fn test_add_rejects_whitespace() {
    let env = TestEnv::new();

    env.srcpkg()
        .args(["map", "add", "two words", "repo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid repository mapping"));
}

#[test]
fn test_mappings_flag_expands_home() {
    let env = TestEnv::new();

    env.srcpkg().args(["map", "add", "gcc-libs", "gcc", "--mappings", "~/alt/mappings.txt"]).assert().success();

    assert_eq!(
        std::fs::read_to_string(env.path().join("alt/mappings.txt")).unwrap(),
        "gcc-libs gcc\n"
    );
    assert!(!env.path().join("~").exists());
}
