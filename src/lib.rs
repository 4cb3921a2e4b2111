//! srcpkg - build packages from source with recursive dependency resolution
//!
//! srcpkg automates the manual loop of building an Artix/Arch package from its
//! PKGBUILD repository: fetch the repository, read its `makedepends` and
//! `depends` arrays, satisfy each missing dependency (from the package manager
//! or, recursively, from source), then build the package itself.
//!
//! # Architecture Overview
//!
//! - [`manifest`] extracts the two dependency arrays from PKGBUILD text
//! - [`mapping`] persists learned package → repository name renames
//! - [`resolver`] walks the dependency graph depth-first, memoising built
//!   packages and reporting cycles, through injectable collaborator traits
//! - [`git`], [`pacman`], [`makepkg`] and [`prompt`] are the production
//!   collaborators: git clones, pacman queries and installs, makepkg builds,
//!   and terminal prompts
//!
//! ## Supporting Modules
//! - [`cli`] - Command-line interface
//! - [`config`] - Global configuration (`~/.srcpkg/config.toml`)
//! - [`core`] - Error types and user-facing error reporting
//! - [`utils`] - External command runner, filesystem and platform helpers
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Build a package and everything it needs
//! srcpkg build foo
//!
//! # Inspect a PKGBUILD
//! srcpkg deps ~/custompkg/foo
//!
//! # Teach srcpkg a repository name
//! srcpkg map add gcc-libs gcc
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod git;
pub mod makepkg;
pub mod manifest;
pub mod mapping;
pub mod pacman;
pub mod prompt;
pub mod resolver;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
