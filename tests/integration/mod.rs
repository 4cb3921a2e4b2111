//! Integration test suite for srcpkg
//!
//! End-to-end tests that drive the `srcpkg` binary against temporary
//! directories, plus whole-run resolution scenarios against scripted
//! collaborators from `srcpkg_cli::test_utils`.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli_config**: `srcpkg config` and configuration precedence
//! - **deps**: `srcpkg deps` output in both formats
//! - **error_scenarios**: exit status and error reporting
//! - **map**: `srcpkg map` list/add/resolve and the on-disk log
//! - **resolution**: full runs of the dependency orchestrator

mod common;

mod cli_config;
mod deps;
mod error_scenarios;
mod map;
mod resolution;
