//! Common test utilities for cppsamples integration tests
//!
//! Provides a throwaway project directory with a sample root and a helper
//! for running the `cppsamples` binary inside it.

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use cppsamples_cli::test_utils::{ManifestFixture, SampleFixture};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project: `cppsamples.toml`, manifests and `_samples/`.
pub struct TestProject {
    _temp: TempDir,
    root: PathBuf,
}

impl TestProject {
    /// Create an empty project with an `_samples` directory.
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("Failed to create temp dir")?;
        let root = temp.path().to_path_buf();
        fs::create_dir_all(root.join("_samples")).context("Failed to create _samples")?;
        Ok(Self {
            _temp: temp,
            root,
        })
    }

    /// Project with the standard samples and a YAML manifest named `manifest.yml`.
    pub fn with_standard_samples() -> Result<Self> {
        let project = Self::new()?;
        cppsamples_cli::test_utils::write_standard_samples(&project.samples_dir())?;
        ManifestFixture::basic_yaml().write_to(&project.root)?;
        Ok(project)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn samples_dir(&self) -> PathBuf {
        self.root.join("_samples")
    }

    /// Write a sample fixture under `_samples/`.
    pub fn add_sample(&self, fixture: &SampleFixture) -> Result<()> {
        fixture.write_to(&self.samples_dir())
    }

    /// Write an arbitrary file relative to the project root.
    pub fn write_file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write `cppsamples.toml`.
    pub fn write_config(&self, content: &str) -> Result<PathBuf> {
        self.write_file("cppsamples.toml", content)
    }

    /// The `cppsamples` binary, running in the project root with a clean environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("cppsamples").expect("binary is built");
        cmd.current_dir(&self.root)
            .env_remove("CPPSAMPLES_ENV")
            .env_remove("GITHUB_TOKEN")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    /// Run `build` with extra arguments and parse stdout as JSON.
    pub fn build_json(&self, args: &[&str]) -> Result<serde_json::Value> {
        let output = self.cmd().arg("build").args(args).output()?;
        anyhow::ensure!(
            output.status.success(),
            "build failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).context("build output is not JSON")
    }
}
