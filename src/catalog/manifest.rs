//! Catalog manifest: ordered categories and the samples they list.
//!
//! A manifest is YAML or TOML, chosen by file extension:
//!
//! ```yaml
//! categories:
//!   - title: Basics
//!     samples:
//!       - basics/swap
//!   - title: Algorithms
//!     samples:
//!       - algorithms/sort
//! ```
//!
//! Without a manifest file, categories are discovered from the sample root:
//! every subdirectory holding a `TITLE` file is a category, and each distinct
//! sample base name inside it is a sample.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::constants::CATEGORY_TITLE_FILE;
use crate::core::CatalogError;

/// One category as listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestCategory {
    pub title: String,
    #[serde(default)]
    pub samples: Vec<String>,
}

/// Ordered list of categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub categories: Vec<ManifestCategory>,
}

enum Format {
    Yaml,
    Toml,
}

impl Manifest {
    /// Read a manifest file. `.yml`/`.yaml` are YAML, `.toml` is TOML.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::ManifestParseError`] for an unsupported extension or
    ///   invalid content
    /// - [`CatalogError::ManifestValidationError`] when validation fails
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let manifest = Self::parse(&content, path)?;
        tracing::debug!(
            target: "catalog",
            "Loaded manifest {} with {} categories",
            path.display(),
            manifest.categories.len()
        );
        Ok(manifest)
    }

    /// Parse manifest text; `path` selects the format and names the file in errors.
    pub fn parse(content: &str, path: &Path) -> Result<Self, CatalogError> {
        let parse_error = |reason: String| CatalogError::ManifestParseError {
            file: path.display().to_string(),
            reason,
        };

        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yml" | "yaml") => Format::Yaml,
            Some("toml") => Format::Toml,
            other => {
                return Err(parse_error(format!(
                    "unsupported manifest extension {:?} (expected .yml, .yaml or .toml)",
                    other.unwrap_or("")
                )));
            }
        };

        let manifest: Self = match format {
            Format::Yaml => serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
            Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Reject empty titles, blank identifiers and samples listed twice.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen: HashMap<&str, &str> = HashMap::new();

        for category in &self.categories {
            if category.title.trim().is_empty() {
                return Err(CatalogError::ManifestValidationError {
                    reason: "category with an empty title".to_string(),
                });
            }
            for sample in &category.samples {
                if sample.trim().is_empty() {
                    return Err(CatalogError::ManifestValidationError {
                        reason: format!("empty sample identifier in category '{}'", category.title),
                    });
                }
                if let Some(first) = seen.insert(sample.as_str(), category.title.as_str()) {
                    return Err(CatalogError::ManifestValidationError {
                        reason: format!(
                            "sample '{}' is listed in category '{}' and again in '{}'",
                            sample, first, category.title
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Build a manifest from the directory layout under `sample_root`.
    ///
    /// Categories are sorted by directory name, samples by base name. A
    /// variant file `name.<spec>.<ext>` contributes the sample `name`.
    pub fn discover(sample_root: &Path, extension: &str) -> Result<Self> {
        let pattern = format!(
            "{}/*/{}",
            glob::Pattern::escape(&sample_root.to_string_lossy()),
            CATEGORY_TITLE_FILE
        );
        let mut title_files: Vec<_> = glob::glob(&pattern)
            .with_context(|| format!("Invalid category pattern: {pattern}"))?
            .collect::<Result<_, _>>()
            .with_context(|| format!("Failed to scan {}", sample_root.display()))?;
        title_files.sort();

        let suffix = format!(".{extension}");
        let mut categories = Vec::with_capacity(title_files.len());

        for title_file in title_files {
            let Some(dir) = title_file.parent() else {
                continue;
            };
            let dir_name = dir
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();

            let title_text = std::fs::read_to_string(&title_file)
                .with_context(|| format!("Failed to read {}", title_file.display()))?;
            let title = title_text.lines().next().unwrap_or("").trim().to_string();

            let mut names = BTreeSet::new();
            for entry in std::fs::read_dir(dir)
                .with_context(|| format!("Failed to list {}", dir.display()))?
            {
                let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
                if !entry.file_type().map(|kind| kind.is_file()).unwrap_or(false) {
                    continue;
                }
                let file_name = entry.file_name().to_string_lossy().to_string();
                if let Some(stem) = file_name.strip_suffix(&suffix) {
                    let base = stem.split_once('.').map_or(stem, |(base, _spec)| base);
                    if !base.is_empty() {
                        names.insert(base.to_string());
                    }
                }
            }

            tracing::debug!(
                target: "catalog",
                "Discovered category {} ({}) with {} samples",
                dir_name,
                title,
                names.len()
            );
            categories.push(ManifestCategory {
                title,
                samples: names.into_iter().map(|name| format!("{dir_name}/{name}")).collect(),
            });
        }

        let manifest = Self {
            categories,
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Total number of samples listed.
    pub fn sample_count(&self) -> usize {
        self.categories.iter().map(|category| category.samples.len()).sum()
    }
}
