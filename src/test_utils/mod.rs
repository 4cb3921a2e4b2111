//! Test utilities for srcpkg
//!
//! This module provides scripted stand-ins for every collaborator of the
//! resolver plus a logging initialiser for tests. Nothing here touches pacman,
//! git, makepkg or the terminal.
//!
//! # Example
//!
//! ```rust,no_run
//! use srcpkg_cli::test_utils::{Call, FakeWorld};
//!
//! let world = FakeWorld::new()
//!     .repository("foo", "depends=(bar)")
//!     .repository("bar", "")
//!     .installed("glibc");
//! let collaborators = world.collaborators();
//! // ... drive a DependencyOrchestrator with `collaborators` ...
//! assert!(world.calls().contains(&Call::Build("foo".into())));
//! ```

pub mod world;

pub use world::{Call, FakeWorld};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests run without a subscriber.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
