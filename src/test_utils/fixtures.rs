//! Test fixtures for sample trees and manifests.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Test fixture for one sample file.
#[derive(Clone, Debug)]
pub struct SampleFixture {
    /// Path relative to the sample root, e.g. `algorithms/sort.c++11.cpp`
    pub path: String,
    pub content: String,
}

impl SampleFixture {
    /// A sample with title, tags, code and intent/description.
    pub fn new(path: &str, title: &str, tags: &[&str], code: &str) -> Self {
        let mut content = format!("// {title}\n");
        if !tags.is_empty() {
            content.push_str(&format!("// {}\n", tags.join(", ")));
        }
        content.push('\n');
        content.push_str(code);
        if !code.ends_with('\n') {
            content.push('\n');
        }
        content.push_str("\n// Demonstrates [1].\n//\n// Longer explanation.\n");
        Self {
            path: path.to_string(),
            content,
        }
    }

    /// C++98 swap sample.
    pub fn swap() -> Self {
        Self::new("basics/swap.cpp", "Swap values", &[], "std::swap(a, b);\n")
    }

    /// Sort sample written against C++11.
    pub fn sort_cpp11() -> Self {
        Self::new(
            "algorithms/sort.cpp",
            "Sort a range",
            &["c++11", "algorithms"],
            "std::sort(std::begin(v), std::end(v));\n",
        )
    }

    /// Sort sample written against C++20.
    pub fn sort_cpp20() -> Self {
        Self::new(
            "algorithms/sort.c++20.cpp",
            "Sort a range",
            &["algorithms"],
            "std::ranges::sort(v);\n",
        )
    }

    /// File without a title comment.
    pub fn malformed() -> Self {
        Self {
            path: "algorithms/broken.cpp".to_string(),
            content: "int main() {}\n".to_string(),
        }
    }

    /// Write the file below `root`, creating directories as needed.
    pub fn write_to(&self, root: &Path) -> Result<()> {
        let path = root.join(&self.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, &self.content)
            .with_context(|| format!("Failed to write sample fixture {}", path.display()))
    }
}

/// Test fixture for manifest files.
#[derive(Clone, Debug)]
pub struct ManifestFixture {
    pub name: String,
    pub content: String,
}

impl ManifestFixture {
    /// Two categories covering the standard sample fixtures.
    pub fn basic_yaml() -> Self {
        Self {
            name: "manifest.yml".to_string(),
            content: r#"
categories:
  - title: Basics
    samples:
      - basics/swap
  - title: Algorithms
    samples:
      - algorithms/sort
"#
            .trim_start()
            .to_string(),
        }
    }

    /// Same catalog as [`basic_yaml`](Self::basic_yaml), in TOML.
    pub fn basic_toml() -> Self {
        Self {
            name: "manifest.toml".to_string(),
            content: r#"
[[categories]]
title = "Basics"
samples = ["basics/swap"]

[[categories]]
title = "Algorithms"
samples = ["algorithms/sort"]
"#
            .trim_start()
            .to_string(),
        }
    }

    /// A sample listed in two categories.
    pub fn duplicate_sample() -> Self {
        Self {
            name: "manifest.yml".to_string(),
            content: r#"
categories:
  - title: Basics
    samples: [basics/swap]
  - title: Again
    samples: [basics/swap]
"#
            .trim_start()
            .to_string(),
        }
    }

    /// Write the manifest into `dir`, returning its path.
    pub fn write_to(&self, dir: &Path) -> Result<std::path::PathBuf> {
        let path = dir.join(&self.name);
        fs::write(&path, &self.content)
            .with_context(|| format!("Failed to write manifest fixture {}", path.display()))?;
        Ok(path)
    }
}

/// Write the standard sample fixtures (swap and both sort variants) below `root`.
pub fn write_standard_samples(root: &Path) -> Result<()> {
    for fixture in [
        SampleFixture::swap(),
        SampleFixture::sort_cpp11(),
        SampleFixture::sort_cpp20(),
    ] {
        fixture.write_to(root)?;
    }
    Ok(())
}
