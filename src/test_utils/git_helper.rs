//! Throwaway git repositories for history tests.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::Command;

/// A git repository in a test directory.
///
/// Every commit can be attributed to an arbitrary author so tests can build
/// the histories contributor resolution reads.
pub struct TestGit {
    repo_path: PathBuf,
}

impl TestGit {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    fn git(&self, args: &[&str], what: &str) -> Result<()> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_path)
            .args(args)
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .output()
            .with_context(|| format!("Could not run git to {what}"))?;

        if !output.status.success() {
            bail!("git failed to {what}: {}", String::from_utf8_lossy(&output.stderr).trim());
        }
        Ok(())
    }

    pub fn init(&self) -> Result<()> {
        self.git(&["init", "--quiet"], "create the repository")
    }

    /// Committer identity, and no signing.
    pub fn config_user(&self) -> Result<()> {
        for (key, value) in [
            ("user.name", "Sample Committer"),
            ("user.email", "committer@cppsamples.example"),
            ("commit.gpgsign", "false"),
        ] {
            self.git(&["config", key, value], &format!("set {key}"))?;
        }
        Ok(())
    }

    pub fn add_all(&self) -> Result<()> {
        self.git(&["add", "--all"], "stage changes")
    }

    /// Commit as the configured user.
    pub fn commit(&self, message: &str) -> Result<()> {
        self.git(&["commit", "--quiet", "-m", message], "commit")
    }

    /// Commit with `name <email>` as the author.
    pub fn commit_as(&self, name: &str, email: &str, message: &str) -> Result<()> {
        let author = format!("{name} <{email}>");
        self.git(
            &["commit", "--quiet", "--author", &author, "-m", message],
            &format!("commit as {author}"),
        )
    }

    /// Rename a tracked sample file.
    pub fn mv(&self, from: &str, to: &str) -> Result<()> {
        self.git(&["mv", from, to], &format!("rename {from}"))
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }
}
