//! Core types and error handling for srcpkg
//!
//! Everything else in the crate reports failures through [`SrcpkgError`] wrapped
//! in [`anyhow::Error`], and the CLI turns those into an [`ErrorContext`] with
//! [`user_friendly_error`] before printing.

pub mod error;

pub use error::{ErrorContext, SrcpkgError, user_friendly_error};
