//! PKGBUILD dependency extraction
//!
//! srcpkg only needs two things from a package's build manifest: the
//! build-time (`makedepends`) and run-time (`depends`) dependency arrays.
//! Everything else in the PKGBUILD is the build tool's business.
//!
//! The extraction is done by a small scanner in [`parser`] rather than by
//! pattern matching, so each step (array location, comment stripping, quote
//! handling, version trimming) is explicit and testable on its own.
//!
//! # Supported syntax
//!
//! ```text
//! makedepends=('cmake' "ninja>=1.10")   # quoted, with version constraints
//! depends=(glibc
//!          'gcc-libs'  # trailing comments are ignored
//!          "$pkgbase-common"            # variable references are dropped
//!          zlib >= 1.2)                 # detached comparators are skipped
//! ```
//!
//! # Limitations
//!
//! An array ends at the first `)` after its opening `(`. A `)` inside a quoted
//! entry or a comment therefore truncates the array. Nested or balanced
//! brackets are not supported.

pub mod parser;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::constants::MANIFEST_FILE;
use crate::core::SrcpkgError;

pub use parser::parse;

/// Deduplicated set of package identifiers.
///
/// Iteration follows first-occurrence order in the manifest, which is also the
/// order dependencies are processed in. Equality is exact and case sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencySet {
    items: Vec<String>,
}

impl DependencySet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.items.push(name);
        true
    }

    /// Whether `name` is a member of the set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|item| item == name)
    }

    /// Iterates over the members in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DependencySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

impl<S: Into<String>> Extend<S> for DependencySet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name);
        }
    }
}

impl IntoIterator for DependencySet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// The two dependency arrays of one manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyLists {
    /// Build-time dependencies (`makedepends`)
    pub build: DependencySet,
    /// Run-time dependencies (`depends`)
    pub run: DependencySet,
}

impl DependencyLists {
    /// Every dependency that has to be present before the package can be built.
    ///
    /// Build-time dependencies come first, followed by run-time dependencies
    /// not already listed.
    #[must_use]
    pub fn all(&self) -> DependencySet {
        let mut all = self.build.clone();
        all.extend(self.run.iter());
        all
    }

    /// Whether the manifest declares no dependencies at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.build.is_empty() && self.run.is_empty()
    }
}

/// Path of the manifest inside a package directory.
#[must_use]
pub fn manifest_path(package_dir: &Path) -> PathBuf {
    package_dir.join(MANIFEST_FILE)
}

/// Read and parse the manifest at `path`.
///
/// `path` may name the PKGBUILD itself or the directory containing it.
///
/// # Errors
///
/// [`SrcpkgError::ManifestNotFound`] when no manifest exists there, or an IO
/// error when it cannot be read.
pub fn load_file(path: &Path) -> Result<DependencyLists> {
    let file = if path.is_dir() {
        manifest_path(path)
    } else {
        path.to_path_buf()
    };

    if !file.is_file() {
        return Err(SrcpkgError::ManifestNotFound {
            path: file.display().to_string(),
        }
        .into());
    }

    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read manifest: {}", file.display()))?;
    Ok(parse(&content))
}

/// Read the dependencies of a fetched package.
///
/// A package directory without a manifest yields no dependencies; the build
/// step will report the missing manifest itself.
pub fn load_from_dir(package_dir: &Path) -> Result<DependencyLists> {
    let file = manifest_path(package_dir);
    if !file.exists() {
        tracing::warn!("No {} in {}, assuming no dependencies", MANIFEST_FILE, package_dir.display());
        return Ok(DependencyLists::default());
    }
    load_file(&file)
}
