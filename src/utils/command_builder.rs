//! Fluent builder for running external tools
//!
//! Every interaction with the host system (git, makepkg, pacman, the editor)
//! goes through [`ToolCommand`] so command lines are logged, missing binaries
//! are reported as [`SrcpkgError::CommandNotFound`], and non-zero exits become
//! [`SrcpkgError::CommandFailed`] with the captured error output.
//!
//! # Examples
//!
//! ```rust,no_run
//! use srcpkg_cli::utils::ToolCommand;
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Quiet query: output is captured and only logged
//! ToolCommand::new("pacman").args(["-Q", "glibc"]).execute_success().await?;
//!
//! // Interactive build: the child talks to the terminal directly
//! ToolCommand::new("makepkg")
//!     .args(["-si"])
//!     .current_dir("/home/me/custompkg/bar")
//!     .inherit_stdio()
//!     .with_context("bar")
//!     .execute_success()
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! Commands run without a timeout; fetches and builds take as long as they need.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

use crate::core::SrcpkgError;

/// Builder for constructing and executing an external command.
pub struct ToolCommand {
    /// Program to execute (looked up on `PATH`)
    program: String,

    /// Arguments passed to the program
    args: Vec<String>,

    /// Working directory for the child process
    current_dir: Option<PathBuf>,

    /// Whether to capture output (true) or inherit stdio (false)
    capture_output: bool,

    /// Extra environment variables for the child
    env_vars: Vec<(String, String)>,

    /// Identifier included in log lines (typically the package name)
    context: Option<String>,
}

impl ToolCommand {
    /// Creates a builder for `program` with output capture on.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            capture_output: true,
            env_vars: Vec::new(),
            context: None,
        }
    }

    /// Sets the working directory of the child process.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets an environment variable for the child process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Lets the child write to (and read from) the terminal directly.
    ///
    /// Needed for builds that ask for a sudo password or confirmation. The
    /// error output of a failing command is then not available in
    /// [`SrcpkgError::CommandFailed`].
    pub const fn inherit_stdio(mut self) -> Self {
        self.capture_output = false;
        self
    }

    /// Set a context for logging (e.g., package name)
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }

    fn operation(&self) -> String {
        self.args.first().cloned().unwrap_or_else(|| "run".to_string())
    }

    /// Executes the command and checks that it exited successfully.
    ///
    /// Captured output is only logged; callers act on the exit status.
    ///
    /// # Errors
    ///
    /// - [`SrcpkgError::CommandNotFound`] when the program cannot be spawned because it does not exist
    /// - [`SrcpkgError::CommandFailed`] on a non-zero exit
    pub async fn execute_success(self) -> Result<()> {
        let start = std::time::Instant::now();
        let command_line = self.command_line();
        let ctx = self.context.as_deref().unwrap_or(self.program.as_str());

        tracing::debug!(target: "process", "({}) Executing command: {}", ctx, command_line);

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.current_dir {
            // A missing working directory would otherwise surface as a missing program
            if !dir.is_dir() {
                anyhow::bail!("Working directory does not exist: {}", dir.display());
            }
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env_vars {
            tracing::trace!(target: "process", "Setting env var: {}={}", key, value);
            cmd.env(key, value);
        }

        if self.capture_output {
            cmd.stdin(Stdio::null());
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stdin(Stdio::inherit());
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        }

        let result = if self.capture_output {
            cmd.output().await.map(|o| (o.status, o.stdout, o.stderr))
        } else {
            cmd.status().await.map(|status| (status, Vec::new(), Vec::new()))
        };

        let (status, stdout, stderr) = match result {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SrcpkgError::CommandNotFound {
                    program: self.program.clone(),
                }
                .into());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to execute {command_line}"));
            }
        };

        let stdout = String::from_utf8_lossy(&stdout).to_string();
        let stderr = String::from_utf8_lossy(&stderr).to_string();

        if !status.success() {
            tracing::debug!(
                target: "process",
                "({}) Command failed with exit code: {:?}",
                ctx,
                status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "process", "({}) Error: {}", ctx, stderr.trim());
            }

            return Err(SrcpkgError::CommandFailed {
                program: self.program.clone(),
                operation: self.operation(),
                stderr: if stderr.is_empty() {
                    describe_status(status)
                } else {
                    stderr
                },
            }
            .into());
        }

        if !stdout.is_empty() {
            tracing::trace!(target: "process", "({}) {}", ctx, stdout.trim());
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::debug!(
                target: "process::perf",
                "({}) {} took {:.2}s",
                ctx,
                command_line,
                elapsed.as_secs_f64()
            );
        }

        Ok(())
    }
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exited with status {code}"),
        None => "terminated by signal".to_string(),
    }
}
