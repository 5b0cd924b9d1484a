//! Grouping of per-dialect sample files into logical samples.
//!
//! A sample identifier such as `algorithms/sort-range` owns every file named
//! `sort-range.cpp` or `sort-range.<spec>.cpp` in the `algorithms`
//! directory of the sample root. Each file becomes one [`Variant`], keyed by
//! its [`SpecLabel`]:
//!
//! - an explicit filename suffix (`sort-range.c++17.cpp`) wins,
//! - otherwise the first tag of the file names the dialect,
//! - otherwise the earliest dialect is assumed.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

use crate::contributor::Contributor;
use crate::core::CatalogError;
use crate::sample::{self, SampleRecord};
use crate::spec::{self, SpecLabel};

/// Raw contents of one file belonging to a sample.
#[derive(Debug, Clone)]
pub struct SampleFile {
    /// Location of the file
    pub path: PathBuf,
    /// Full text of the file
    pub contents: String,
}

/// One dialect-specific rendition of a sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Dialect the variant is written against
    pub spec: SpecLabel,
    /// Parsed file contents
    #[serde(flatten)]
    pub record: SampleRecord,
    /// Authors of the file, in history order
    #[serde(default)]
    pub contributors: Vec<Contributor>,
    /// Author date of the latest commit touching the file
    #[serde(default)]
    pub last_modified: Option<DateTime<FixedOffset>>,
}

/// A logical sample with at least one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    name: String,
    path: String,
    min_spec: SpecLabel,
    primary_spec: SpecLabel,
    variants: BTreeMap<SpecLabel, Variant>,
}

impl Sample {
    fn new(name: String, variants: BTreeMap<SpecLabel, Variant>) -> Option<Self> {
        let min_spec = spec::min_spec(variants.keys().copied())?;
        let primary_spec = spec::primary_spec(variants.keys().copied())?;
        let path = canonical_path(&name);
        Some(Self {
            name,
            path,
            min_spec,
            primary_spec,
            variants,
        })
    }

    /// Identifier shared by all variants (as listed in the manifest).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical output path: the identifier with `NN-` ordering prefixes removed.
    pub fn canonical_path(&self) -> &str {
        &self.path
    }

    /// Oldest dialect the sample is available in.
    pub const fn min_spec(&self) -> SpecLabel {
        self.min_spec
    }

    /// Dialect served at the canonical path.
    pub const fn primary_spec(&self) -> SpecLabel {
        self.primary_spec
    }

    /// Variants ordered from oldest to newest dialect.
    pub fn variants(&self) -> impl Iterator<Item = &Variant> {
        self.variants.values()
    }

    /// Mutable access for attaching attribution after parsing.
    pub fn variants_mut(&mut self) -> impl Iterator<Item = &mut Variant> {
        self.variants.values_mut()
    }

    /// Variant for a given dialect.
    pub fn variant(&self, spec: SpecLabel) -> Option<&Variant> {
        self.variants.get(&spec)
    }

    /// The variant addressed by the canonical path.
    pub fn primary(&self) -> &Variant {
        // Construction guarantees the primary label is a key.
        &self.variants[&self.primary_spec]
    }

    /// Output path for a variant: canonical for the primary one, suffixed otherwise.
    pub fn output_path(&self, spec: SpecLabel) -> String {
        if spec == self.primary_spec {
            self.path.clone()
        } else {
            format!("{}.{}", self.path, spec)
        }
    }
}

/// Strip `NN-` ordering prefixes from every component of a sample identifier.
pub fn canonical_path(sample_id: &str) -> String {
    sample_id.split('/').map(strip_order_prefix).collect::<Vec<_>>().join("/")
}

fn strip_order_prefix(component: &str) -> &str {
    match component.split_once('-') {
        Some((digits, rest))
            if !digits.is_empty()
                && !rest.is_empty()
                && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            rest
        }
        _ => component,
    }
}

/// Parse every file of a sample and group them by dialect.
///
/// # Errors
///
/// - [`CatalogError::MalformedSample`] if any file fails to parse
/// - [`CatalogError::UnknownSpec`] if a suffix or first tag is not a known label
/// - [`CatalogError::DuplicateSpec`] if two files resolve to the same label
/// - [`CatalogError::SampleNotFound`] if `files` is empty
pub fn resolve_variants(sample_id: &str, files: Vec<SampleFile>) -> Result<Sample, CatalogError> {
    let base_name = sample_id.rsplit('/').next().unwrap_or(sample_id);
    let mut variants: BTreeMap<SpecLabel, Variant> = BTreeMap::new();

    for file in files {
        let record = sample::parse(&file.contents, &file.path)?;
        let spec = spec_for_file(base_name, &file.path, &record)?;

        match variants.entry(spec) {
            Entry::Occupied(existing) => {
                return Err(CatalogError::DuplicateSpec {
                    sample: sample_id.to_string(),
                    spec: spec.to_string(),
                    first: existing.get().record.file_path.display().to_string(),
                    second: file.path.display().to_string(),
                });
            }
            Entry::Vacant(slot) => {
                tracing::debug!(
                    target: "catalog",
                    "Sample {} has {} variant in {}",
                    sample_id,
                    spec,
                    file.path.display()
                );
                slot.insert(Variant {
                    spec,
                    record,
                    contributors: Vec::new(),
                    last_modified: None,
                });
            }
        }
    }

    Sample::new(sample_id.to_string(), variants).ok_or_else(|| CatalogError::SampleNotFound {
        sample: sample_id.to_string(),
        root: "(no files given)".to_string(),
    })
}

fn spec_for_file(
    base_name: &str,
    path: &Path,
    record: &SampleRecord,
) -> Result<SpecLabel, CatalogError> {
    let unknown = |label: &str| CatalogError::UnknownSpec {
        label: label.to_string(),
        path: path.display().to_string(),
    };

    if let Some(suffix) = filename_suffix(base_name, path) {
        return suffix.parse().map_err(|_| unknown(&suffix));
    }

    match record.tags.first() {
        Some(tag) => tag.parse().map_err(|_| unknown(tag)),
        None => Ok(SpecLabel::EARLIEST),
    }
}

/// The `<spec>` part of `<base>.<spec>.<ext>`, if present.
fn filename_suffix(base_name: &str, path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let rest = file_name.strip_prefix(base_name)?;
    let (middle, _ext) = rest.rsplit_once('.')?;
    let suffix = middle.strip_prefix('.')?;
    if suffix.is_empty() {
        None
    } else {
        Some(suffix.to_string())
    }
}

/// Find the files of a sample under `sample_root`, sorted by path.
///
/// # Errors
///
/// Returns [`CatalogError::SampleNotFound`] when nothing matches.
pub fn find_variant_files(
    sample_root: &Path,
    sample_id: &str,
    extension: &str,
) -> Result<Vec<PathBuf>> {
    let prefix = sample_root.join(sample_id);
    let escaped = glob::Pattern::escape(&prefix.to_string_lossy());
    let extension = glob::Pattern::escape(extension);

    let mut files = Vec::new();
    for pattern in [format!("{escaped}.{extension}"), format!("{escaped}.*.{extension}")] {
        for entry in glob::glob(&pattern)
            .with_context(|| format!("Invalid sample pattern: {pattern}"))?
        {
            let path =
                entry.with_context(|| format!("Failed to read entry for sample {sample_id}"))?;
            if path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    files.dedup();

    if files.is_empty() {
        return Err(CatalogError::SampleNotFound {
            sample: sample_id.to_string(),
            root: sample_root.display().to_string(),
        }
        .into());
    }

    Ok(files)
}

/// Read the given files.
pub async fn load_sample_files(paths: &[PathBuf]) -> Result<Vec<SampleFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read sample file {}", path.display()))?;
        files.push(SampleFile {
            path: path.clone(),
            contents,
        });
    }
    Ok(files)
}
