//! Shared harness for the binary tests.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An isolated home directory with its own srcpkg configuration.
pub struct TestEnv {
    temp: TempDir,
}

impl TestEnv {
    /// Creates a home directory whose config points the build directory and
    /// mapping file inside it.
    pub fn new() -> Self {
        let env = Self {
            temp: TempDir::new().unwrap(),
        };
        std::fs::create_dir_all(env.path().join(".srcpkg")).unwrap();
        std::fs::write(
            env.config_path(),
            format!(
                "build_dir = \"{}\"\nmapping_file = \"{}\"\n",
                env.build_dir().display(),
                env.mapping_file().display()
            ),
        )
        .unwrap();
        env
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join(".srcpkg/config.toml")
    }

    pub fn build_dir(&self) -> PathBuf {
        self.path().join("custompkg")
    }

    pub fn mapping_file(&self) -> PathBuf {
        self.path().join("repo_mappings.txt")
    }

    /// Write a PKGBUILD under `dir` (relative to the home directory).
    pub fn write_manifest(&self, dir: &str, content: &str) -> PathBuf {
        let dir = self.path().join(dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("PKGBUILD"), content).unwrap();
        dir
    }

    /// The `srcpkg` binary with HOME and the config pointed at this environment.
    pub fn srcpkg(&self) -> Command {
        let mut cmd = Command::cargo_bin("srcpkg").unwrap();
        cmd.env("HOME", self.path())
            .env("SRCPKG_CONFIG", self.config_path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("VISUAL")
            .env_remove("EDITOR")
            .current_dir(self.path());
        cmd
    }
}
