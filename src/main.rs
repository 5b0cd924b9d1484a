//! cppsamples CLI entry point
//!
//! Parses the command line, runs the command on a single-threaded runtime
//! and turns failures into readable messages with a non-zero exit status.

use anyhow::Result;
use clap::Parser;
use cppsamples_cli::cli;
use cppsamples_cli::core::user_friendly_error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
