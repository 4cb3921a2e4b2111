//! Utility modules for srcpkg
//!
//! - [`command_builder`] - fluent builder for running external tools
//! - [`fs`] - directory helpers used around fetches
//! - [`platform`] - home directory, path expansion and `PATH` lookups

pub mod command_builder;
pub mod fs;
pub mod platform;

pub use command_builder::ToolCommand;
pub use fs::{ensure_dir, remove_dir_all};
pub use platform::{command_exists, get_home_dir, resolve_path};
