//! Fluent builder for running git commands.
//!
//! All history queries go through [`GitCommand`] so they share one way of
//! locating the repository, applying timeouts, logging and mapping failures
//! onto [`CatalogError`].

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::constants::GIT_LOG_TIMEOUT;
use crate::core::CatalogError;

fn git_program() -> &'static str {
    if cfg!(windows) {
        "git.exe"
    } else {
        "git"
    }
}

/// Builder for one git invocation.
///
/// # Examples
///
/// ```rust,no_run
/// use cppsamples_cli::git::command_builder::GitCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let log = GitCommand::new()
///     .current_dir("_samples")
///     .args(["log", "--oneline", "--", "algorithms/sort.cpp"])
///     .execute_stdout()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GitCommand {
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    timeout_duration: Option<Duration>,
    context: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            timeout_duration: Some(GIT_LOG_TIMEOUT),
            context: None,
        }
    }
}

impl GitCommand {
    /// Create an empty command with the default timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run git as if started in `dir` (passed as `-C <dir>`).
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Override the timeout; `None` waits forever.
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Label included in log messages, e.g. the file being queried.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    fn full_args(&self) -> Vec<String> {
        let mut full_args = Vec::with_capacity(self.args.len() + 2);
        if let Some(dir) = &self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.iter().cloned());
        full_args
    }

    fn operation(&self) -> String {
        self.args.first().cloned().unwrap_or_else(|| "unknown".to_string())
    }

    /// Execute the command and return its output.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::GitNotFound`] when git is not installed
    /// - [`CatalogError::GitCommandError`] on a non-zero exit or a timeout
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let start = std::time::Instant::now();
        let full_args = self.full_args();
        let context = self.context.as_deref().unwrap_or("-");

        tracing::debug!(
            target: "git",
            "[{}] {} {}",
            context,
            git_program(),
            full_args.join(" ")
        );

        let mut cmd = Command::new(git_program());
        cmd.args(&full_args).stdout(Stdio::piped()).stderr(Stdio::piped());
        let output_future = cmd.output();

        let result = match self.timeout_duration {
            Some(duration) => match timeout(duration, output_future).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        target: "git",
                        "[{}] git {} gave up after {}s",
                        context,
                        full_args.join(" "),
                        duration.as_secs()
                    );
                    return Err(CatalogError::GitCommandError {
                        operation: self.operation(),
                        stderr: format!("timed out after {} seconds", duration.as_secs()),
                    }
                    .into());
                }
            },
            None => output_future.await,
        };

        let output = match result {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CatalogError::GitNotFound.into());
            }
            Err(e) => {
                return Err(e).context(format!("Failed to execute git {}", full_args.join(" ")));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "git",
                "[{}] git exited with {:?}: {}",
                context,
                output.status.code(),
                stderr.trim()
            );
            return Err(CatalogError::GitCommandError {
                operation: self.operation(),
                stderr: stderr.trim().to_string(),
            }
            .into());
        }

        let elapsed = start.elapsed();
        if elapsed.as_millis() > 100 {
            tracing::debug!(
                target: "git::perf",
                "[{}] git {} took {}ms",
                context,
                self.operation(),
                elapsed.as_millis()
            );
        }

        Ok(GitCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Run and return trimmed stdout.
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }
}

/// Captured output of a successful git run.
#[derive(Debug)]
pub struct GitCommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl GitCommand {
    /// `git log` listing the author of every non-merge commit touching
    /// `file_name`, following renames. One `email<TAB>name` line per commit,
    /// newest first. Mailmap entries are applied.
    pub fn author_log(file_name: &str) -> Self {
        Self::new().args(["log", "--follow", "--no-merges", "--format=%aE%x09%aN", "--", file_name])
    }

    /// `git log` printing the strict ISO 8601 author date of the latest commit
    /// touching `file_name`.
    pub fn last_commit_date(file_name: &str) -> Self {
        Self::new().args(["log", "-1", "--format=%aI", "--", file_name])
    }
}
