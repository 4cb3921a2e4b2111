use predicates::prelude::*;

use crate::common::TestEnv;

#[test]
fn test_config_path() {
    let env = TestEnv::new();

    env.srcpkg()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".srcpkg/config.toml"));
}

#[test]
fn test_config_show_reflects_file() {
    let env = TestEnv::new();

    env.srcpkg()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("repository_base_url = \"https://gitea.artixlinux.org/packages\""))
        .stdout(predicate::str::contains(env.build_dir().display().to_string()));
}

#[test]
fn test_config_init_and_force() {
    let env = TestEnv::new();
    let path = env.path().join("fresh/config.toml");

    env.srcpkg().args(["config", "init", "--config"]).arg(&path).assert().success();
    assert!(std::fs::read_to_string(&path).unwrap().contains("noconfirm = false"));

    env.srcpkg()
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    env.srcpkg().args(["config", "init", "--force", "--config"]).arg(&path).assert().success();
}

#[test]
fn test_invalid_config_is_reported() {
    let env = TestEnv::new();
    std::fs::write(env.config_path(), "no_such_setting = 1\n").unwrap();

    env.srcpkg()
        .args(["map", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}
