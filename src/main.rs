//! srcpkg CLI entry point
//!
//! Parses the command line, runs the selected command and turns any error
//! into a user-friendly message with exit status 1.

use anyhow::Result;
use clap::Parser;
use srcpkg_cli::cli;
use srcpkg_cli::core::user_friendly_error;

// Fetches, prompts and builds run strictly one after another
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
