use predicates::prelude::*;

use crate::common::TestEnv;

#[test]
fn test_deps_text_output() {
    let env = TestEnv::new();
    let dir = env.write_manifest(
        "foo",
        "pkgname=foo\nmakedepends=('cmake' \"ninja>=1.10\")\ndepends=(glibc # libc\n  'zlib>=1.2')\n",
    );

    env.srcpkg()
        .arg("deps")
        .arg(&dir)
        .assert()
        .success()
        .stdout("makedepends:\n  cmake\n  ninja\ndepends:\n  glibc\n  zlib\n");
}

#[test]
fn test_deps_accepts_manifest_file() {
    let env = TestEnv::new();
    let dir = env.write_manifest("foo", "depends=('foo>=1.2' bar \"baz<=3\")\n");

    env.srcpkg()
        .arg("deps")
        .arg(dir.join("PKGBUILD"))
        .assert()
        .success()
        .stdout(predicate::str::contains("  foo\n"))
        .stdout(predicate::str::contains("  bar\n"))
        .stdout(predicate::str::contains("  baz\n"));
}

#[test]
fn test_deps_json_output() {
    let env = TestEnv::new();
    let dir = env.write_manifest("foo", "makedepends=(cmake)\ndepends=(bar baz bar)\n");

    let output = env.srcpkg().args(["deps", "--format", "json"]).arg(&dir).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json, serde_json::json!({"build": ["cmake"], "run": ["bar", "baz"]}));
}

#[test]
fn test_deps_without_arrays() {
    let env = TestEnv::new();
    let dir = env.write_manifest("plain", "pkgname=plain\npkgver=1\n");

    env.srcpkg()
        .arg("deps")
        .arg(&dir)
        .assert()
        .success()
        .stdout("makedepends:\n  (none)\ndepends:\n  (none)\n");
}

#[test]
fn test_deps_missing_manifest() {
    let env = TestEnv::new();
    std::fs::create_dir_all(env.path().join("empty")).unwrap();

    env.srcpkg()
        .arg("deps")
        .arg(env.path().join("empty"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No PKGBUILD found"));
}
