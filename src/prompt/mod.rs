//! Interactive terminal front end for the resolver's questions.
//!
//! [`TerminalDecision`] prints each question in colour and reads the answer
//! from stdin through Tokio's async I/O. Invalid answers are asked again;
//! closing stdin aborts the run instead of looping.
//!
//! [`ExternalEditor`] opens the root manifest in the user's editor.

use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

use crate::constants::{DEFAULT_EDITOR, MAPPING_EXAMPLES, SKIP_SENTINEL};
use crate::resolver::{Decision, InstallMethod, ManifestEditor, RepairChoice};
use crate::utils::ToolCommand;

/// Asks the user on the terminal.
pub struct TerminalDecision<R = BufReader<Stdin>> {
    input: Mutex<R>,
}

impl TerminalDecision {
    /// Reads answers from the process's stdin.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> TerminalDecision<R> {
    /// Reads answers from `input`.
    pub fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }

    /// Print `question` and return the trimmed answer line.
    async fn ask(&self, question: &str) -> Result<String> {
        print!("{} ", question.blue());
        std::io::stdout().flush()?;

        let mut line = String::new();
        let read = self.input.lock().await.read_line(&mut line).await?;
        if read == 0 {
            anyhow::bail!("Input closed while waiting for an answer to: {question}");
        }
        Ok(line.trim().to_string())
    }

    /// Ask for the package to build.
    pub async fn package_name(&self) -> Result<String> {
        loop {
            let answer = self.ask("Enter package name:").await?;
            if !answer.is_empty() {
                return Ok(answer);
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Decision for TerminalDecision<R> {
    async fn choose_install_method(&self, package: &str) -> Result<InstallMethod> {
        println!();
        println!("{}", format!("Processing dependency: {package}").blue());
        let question = format!(
            "Do you want to (1) install {package} from package manager or (2) build from source? (1/2):"
        );
        loop {
            match self.ask(&question).await?.as_str() {
                "1" => return Ok(InstallMethod::Repository),
                "2" => return Ok(InstallMethod::Source),
                _ => println!("{}", "Please answer 1 or 2.".yellow()),
            }
        }
    }

    async fn repair_repository_name(
        &self,
        package: &str,
        attempted: &str,
    ) -> Result<RepairChoice> {
        println!("{}", format!("Failed to clone repository '{attempted}' for {package}").red());
        println!("{}", "Examples of package -> repo name mappings:".yellow());
        for (example_package, example_repository) in MAPPING_EXAMPLES {
            println!("{}", format!("{example_package} -> {example_repository}").yellow());
        }

        let question = format!(
            "Please enter the correct repository name for {package} (or '{SKIP_SENTINEL}' to skip this dependency):"
        );
        loop {
            let answer = self.ask(&question).await?;
            if answer.eq_ignore_ascii_case(SKIP_SENTINEL) {
                return Ok(RepairChoice::Skip);
            }
            if answer.is_empty() || answer.chars().any(char::is_whitespace) {
                println!("{}", "A repository name is a single word.".yellow());
                continue;
            }
            return Ok(RepairChoice::Retry(answer));
        }
    }

    async fn confirm_retry(&self, _package: &str) -> Result<bool> {
        let answer = self.ask("Failed to clone. Try another repo name? (y/n):").await?;
        Ok(is_yes(&answer))
    }

    async fn confirm_manifest_edit(&self, _package: &str) -> Result<bool> {
        let answer = self.ask("Do you want to customize the PKGBUILD? (y/n):").await?;
        Ok(is_yes(&answer))
    }
}

/// Runs the user's editor on a manifest.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    /// Uses `command` verbatim, e.g. `"vim"` or `"code --wait"`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// `$VISUAL`, then `$EDITOR`, then `configured`, then nano.
    #[must_use]
    pub fn from_env(configured: Option<&str>) -> Self {
        let command = ["VISUAL", "EDITOR"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .chain(configured.map(str::to_string))
            .find(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
        Self::new(command)
    }

    /// The editor command line.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }
}

#[async_trait]
impl ManifestEditor for ExternalEditor {
    async fn edit(&self, manifest: &Path) -> Result<()> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().unwrap_or(DEFAULT_EDITOR);

        ToolCommand::new(program)
            .args(parts)
            .arg(manifest.display().to_string())
            .inherit_stdio()
            .execute_success()
            .await
            .with_context(|| format!("Failed to edit {}", manifest.display()))
    }
}
