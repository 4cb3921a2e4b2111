//! Error handling for srcpkg
//!
//! This module provides the error types and user-friendly error reporting used
//! across srcpkg. Two layers work together:
//! 1. [`SrcpkgError`] - strongly-typed failures that code can match on
//! 2. [`ErrorContext`] - a wrapper that adds details and an actionable suggestion
//!    for display in the terminal
//!
//! # Error Categories
//!
//! - **Resolution**: [`SrcpkgError::ResolutionFailed`], [`SrcpkgError::InvalidPackageName`],
//!   [`SrcpkgError::FetchFailed`]
//! - **Building**: [`SrcpkgError::BuildFailed`], [`SrcpkgError::InstallFailed`]
//! - **Graph**: [`SrcpkgError::CircularDependency`]
//! - **External tools**: [`SrcpkgError::CommandFailed`], [`SrcpkgError::CommandNotFound`]
//! - **Configuration**: [`SrcpkgError::ConfigError`], [`SrcpkgError::InvalidMapping`],
//!   [`SrcpkgError::ManifestNotFound`]
//!
//! Fallible functions return [`anyhow::Result`] and carry a `SrcpkgError` at the
//! root of the chain. [`user_friendly_error`] downcasts it back out at the CLI
//! boundary.
//!
//! # Examples
//!
//! ```rust,no_run
//! use srcpkg_cli::core::{SrcpkgError, user_friendly_error};
//!
//! let error = SrcpkgError::BuildFailed {
//!     package: "bar".to_string(),
//!     reason: "makepkg exited with status 4".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for srcpkg operations.
///
/// Each variant names one failure mode of the resolve → fetch → build pipeline
/// or of the ambient machinery around it (configuration, external commands).
#[derive(Error, Debug, Clone)]
pub enum SrcpkgError {
    /// No usable repository name could be obtained for a package.
    ///
    /// Raised when the user answers the repair prompt with the skip sentinel
    /// (or declines to try another name). Only the current dependency's branch
    /// is abandoned.
    #[error("Could not resolve a repository for package '{package}'")]
    ResolutionFailed {
        /// Package whose repository could not be resolved
        package: String,
    },

    /// A package name that cannot be used as a directory under the build directory.
    ///
    /// Names come from fetched manifests, so `..`, `.` and anything containing
    /// a path separator are refused before any checkout is cleared.
    #[error("Invalid package name '{package}'")]
    InvalidPackageName {
        /// The rejected name
        package: String,
    },

    /// A single fetch attempt failed.
    ///
    /// Recoverable only through a human-supplied alternate repository name.
    #[error("Failed to fetch repository '{repository}'")]
    FetchFailed {
        /// Repository name that was attempted
        repository: String,
        /// Output of the failed fetch
        reason: String,
    },

    /// The build tool exited with a non-zero status.
    #[error("Failed to build package '{package}'")]
    BuildFailed {
        /// Package that failed to build
        package: String,
        /// Exit status or error output
        reason: String,
    },

    /// Installing a package through the system package manager failed.
    #[error("Failed to install package '{package}' from the package manager")]
    InstallFailed {
        /// Package that failed to install
        package: String,
        /// Exit status or error output
        reason: String,
    },

    /// A package was reached again while its own dependencies were still being processed.
    #[error("Circular dependency detected: {chain}")]
    CircularDependency {
        /// Dependency chain, e.g. `a -> b -> a`
        chain: String,
    },

    /// An external command returned a non-zero exit code.
    #[error("{program} {operation} failed")]
    CommandFailed {
        /// Program that was run (e.g. `git`, `makepkg`)
        program: String,
        /// The first argument, naming the operation
        operation: String,
        /// Captured error output (empty when stdio was inherited)
        stderr: String,
    },

    /// An external command could not be located in `PATH`.
    #[error("'{program}' is not installed or not found in PATH")]
    CommandNotFound {
        /// Program that is missing
        program: String,
    },

    /// A repository mapping could not be recorded.
    #[error("Invalid repository mapping: {reason}")]
    InvalidMapping {
        /// Why the mapping was rejected
        reason: String,
    },

    /// No manifest at the given location.
    #[error("No PKGBUILD found at {path}")]
    ManifestNotFound {
        /// Path that was searched
        path: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// Error context wrapper that provides user-friendly error information.
///
/// When displayed, errors show the main message in red, optional details in
/// yellow and an optional suggestion in green.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying srcpkg error
    pub error: SrcpkgError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: SrcpkgError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// A [`SrcpkgError`] anywhere in the chain gets tailored suggestions; the
/// surrounding `anyhow` context (which names the dependency chain) is kept in
/// the details. Other errors are shown with their full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(srcpkg_error) = error.chain().find_map(|e| e.downcast_ref::<SrcpkgError>()) {
        let ctx = create_error_context(srcpkg_error.clone());
        // Outer context frames describe where in the graph the failure happened
        let outer: Vec<String> = error
            .chain()
            .take_while(|e| e.downcast_ref::<SrcpkgError>().is_none())
            .map(std::string::ToString::to_string)
            .collect();
        if outer.is_empty() {
            return ctx;
        }
        let trail = outer.join("\n  ");
        let details = match ctx.details {
            Some(details) => format!("{details}\n  {trail}"),
            None => trail,
        };
        return ErrorContext {
            details: Some(details),
            ..ctx
        };
    }

    let chain = error_chain(&error);

    let permission_denied = error
        .downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied);
    if permission_denied {
        return ErrorContext::new(SrcpkgError::Other {
            message: chain,
        })
        .with_suggestion(
            "Check file ownership and permissions of the build directory and mapping file",
        );
    }

    ErrorContext::new(SrcpkgError::Other {
        message: chain,
    })
}

fn error_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let causes: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !causes.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in causes.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

/// Map each [`SrcpkgError`] variant to suggestions and details.
fn create_error_context(error: SrcpkgError) -> ErrorContext {
    match &error {
        SrcpkgError::ResolutionFailed { package } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Find the repository that hosts '{package}' and record it with 'srcpkg map add {package} <repository>'"
            ))
            .with_details("The repository name was skipped during the repair prompt"),

        SrcpkgError::InvalidPackageName { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Check the makedepends and depends arrays of the manifest that lists it")
            .with_details("Package names must be a single path component other than '.' or '..'"),

        SrcpkgError::FetchFailed { repository, reason } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Check that '{repository}' exists under the configured repository base URL and that the network is reachable"
            ))
            .with_details(reason.trim().to_string()),

        SrcpkgError::BuildFailed { package, reason } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Inspect the build output above. The fetched sources for '{package}' are left in the build directory"
            ))
            .with_details(reason.clone()),

        SrcpkgError::InstallFailed { reason, .. } => {
            ErrorContext::new(error.clone()).with_details(reason.clone())
        }

        SrcpkgError::CircularDependency { chain } => ErrorContext::new(error.clone())
            .with_suggestion("Install one of the packages in the cycle from the package manager first, then retry")
            .with_details(format!(
                "Dependency chain: {chain}. A package cannot be built before itself"
            )),

        SrcpkgError::CommandFailed { program, stderr, .. } => {
            let ctx = ErrorContext::new(error.clone()).with_suggestion(format!(
                "Try running the {program} command manually for more details"
            ));
            if stderr.trim().is_empty() {
                ctx
            } else {
                ctx.with_details(stderr.trim().to_string())
            }
        }

        SrcpkgError::CommandNotFound { program } => ErrorContext::new(error.clone())
            .with_suggestion(format!("Install '{program}' and make sure it is on your PATH"))
            .with_details("srcpkg drives git, makepkg and pacman as external commands"),

        SrcpkgError::InvalidMapping { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Package and repository names must be single non-empty words")
            .with_details("The mapping file stores one '<package> <repository>' pair per line"),

        SrcpkgError::ManifestNotFound { path } => ErrorContext::new(error.clone())
            .with_suggestion(format!("Check that {path} is a package directory or a PKGBUILD file")),

        SrcpkgError::ConfigError { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Check ~/.srcpkg/config.toml or the file passed with --config"),

        _ => ErrorContext::new(error),
    }
}
