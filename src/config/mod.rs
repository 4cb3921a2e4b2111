//! Configuration management for srcpkg
//!
//! srcpkg has a single user-wide configuration file, read once per command:
//!
//! **Location:** `$SRCPKG_CONFIG` if set, otherwise `~/.srcpkg/config.toml`,
//! or the path given with `--config`.
//!
//! Command-line flags of `srcpkg build` take precedence over the file, which
//! takes precedence over the built-in defaults. See [`GlobalConfig`] for the
//! fields.

mod global;

pub use global::GlobalConfig;
