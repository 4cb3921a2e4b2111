use predicates::prelude::*;

use crate::common::TestEnv;

#[test]
fn test_help_lists_commands() {
    let env = TestEnv::new();

    env.srcpkg()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("deps"))
        .stdout(predicate::str::contains("map"));
}

#[test]
fn test_unknown_command_fails() {
    let env = TestEnv::new();
    env.srcpkg().arg("install").assert().failure();
}

#[test]
fn test_build_without_input_fails_cleanly() {
    // Fails on a missing git/makepkg/pacman, or on the closed stdin when
    // asked for the package name; never hangs or builds anything
    let env = TestEnv::new();

    env.srcpkg()
        .arg("build")
        .write_stdin("")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"));

    assert!(!env.build_dir().exists());
}
