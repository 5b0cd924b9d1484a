//! Command-line interface for cppsamples.
//!
//! ```bash
//! cppsamples build --output catalog.json      # build the catalog
//! cppsamples build --production --date 2024-03-06
//! cppsamples parse _samples/algorithms/sort.cpp
//! cppsamples cache clear                      # drop the identity cache
//! ```
//!
//! Global flags (`--verbose`, `--quiet`, `--config`) are turned into a
//! [`CliConfig`] before the subcommand runs, which keeps logging setup out of
//! the individual commands and lets tests inject their own configuration.

mod build;
mod cache;
mod parse;

pub use build::BuildCommand;
pub use cache::{CacheCommand, CacheSubcommand};
pub use parse::ParseCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings derived from global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Default log filter when `RUST_LOG` is unset; `None` leaves logging off.
    pub log_level: Option<String>,
    /// Configuration file given with `--config`.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over the level chosen by flags. Calling
    /// this more than once is harmless.
    pub fn init_logging(&self) {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => match &self.log_level {
                Some(level) => EnvFilter::new(level),
                None => return,
            },
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Build and inspect the C++ samples catalog.
#[derive(Parser)]
#[command(
    name = "cppsamples",
    about = "Build the C++ samples catalog from annotated sample files",
    version,
    long_about = "cppsamples parses annotated C++ sample files, groups them by language \
                  standard, attributes them to their authors and emits the catalog as JSON."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug output (same as `RUST_LOG=debug`)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file (default: ./cppsamples.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the catalog and write it as JSON
    Build(BuildCommand),

    /// Parse a single sample file and print the result as JSON
    Parse(ParseCommand),

    /// Manage the persisted identity cache
    Cache(CacheCommand),
}

impl Cli {
    /// Execute the parsed command line.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Execute with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Build(cmd) => cmd.execute(config.config_path).await,
            Commands::Parse(cmd) => cmd.execute().await,
            Commands::Cache(cmd) => cmd.execute(config.config_path).await,
        }
    }
}
