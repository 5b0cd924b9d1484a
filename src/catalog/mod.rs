//! Catalog tree construction.
//!
//! The builder walks the manifest in order, resolves every sample's variants
//! from the sample root, attaches contributors and modification dates from
//! git, and finally picks the featured sample of the week:
//!
//! ```text
//! Manifest ──► find_variant_files ──► resolve_variants ──► Sample
//!                                                            │
//!                         ContributorResolver (per variant) ◄┘
//! ```
//!
//! The result is a plain data structure that renderers consume; for the same
//! inputs, roster and clock the serialized catalog is byte-identical.

pub mod featured;
pub mod manifest;

pub use manifest::{Manifest, ManifestCategory};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::contributor::ContributorResolver;
use crate::variant::{self, Sample};

/// A titled group of samples, in manifest order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    pub samples: Vec<Sample>,
}

/// Position of the featured sample in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedSample {
    pub category: usize,
    pub sample: usize,
    /// Identifier of the sample, for readers of the serialized catalog
    pub name: String,
}

/// The complete catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub featured: Option<FeaturedSample>,
}

impl Catalog {
    /// The featured sample, if any.
    pub fn featured_sample(&self) -> Option<&Sample> {
        let featured = self.featured.as_ref()?;
        self.categories.get(featured.category)?.samples.get(featured.sample)
    }

    /// All samples in catalog order.
    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.categories.iter().flat_map(|category| category.samples.iter())
    }
}

/// Builds a [`Catalog`] from a manifest and a sample root.
pub struct CatalogBuilder {
    sample_root: PathBuf,
    extension: String,
    contributors: ContributorResolver,
    clock: Arc<dyn Clock>,
}

impl CatalogBuilder {
    pub fn new(
        sample_root: impl Into<PathBuf>,
        extension: impl Into<String>,
        contributors: ContributorResolver,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sample_root: sample_root.into(),
            extension: extension.into(),
            contributors,
            clock,
        }
    }

    /// The contributor resolver, e.g. to persist its identity cache after a build.
    pub fn contributors(&self) -> &ContributorResolver {
        &self.contributors
    }

    /// Build the catalog for `manifest`.
    ///
    /// Any malformed, missing or conflicting sample aborts the build; no
    /// partial catalog is returned.
    pub async fn build(&mut self, manifest: &Manifest) -> Result<Catalog> {
        manifest.validate()?;
        info!(
            target: "catalog",
            "Building catalog: {} categories, {} samples from {}",
            manifest.categories.len(),
            manifest.sample_count(),
            self.sample_root.display()
        );

        let mut categories = Vec::with_capacity(manifest.categories.len());
        for entry in &manifest.categories {
            let mut samples = Vec::with_capacity(entry.samples.len());
            for sample_id in &entry.samples {
                let sample = self
                    .build_sample(sample_id)
                    .await
                    .with_context(|| format!("Failed to build sample '{sample_id}'"))?;
                samples.push(sample);
            }
            categories.push(Category {
                title: entry.title.clone(),
                samples,
            });
        }

        let featured = self.pick_featured(&categories);
        Ok(Catalog {
            categories,
            featured,
        })
    }

    async fn build_sample(&mut self, sample_id: &str) -> Result<Sample> {
        let paths = variant::find_variant_files(&self.sample_root, sample_id, &self.extension)?;
        let files = variant::load_sample_files(&paths).await?;
        let mut sample = variant::resolve_variants(sample_id, files)?;

        for variant in sample.variants_mut() {
            let path = variant.record.file_path.clone();
            variant.contributors = self.contributors.resolve_authors(&path).await;
            variant.last_modified = self.contributors.last_modified(&path).await;
        }

        debug!(
            target: "catalog",
            "Built sample {} (min {}, primary {})",
            sample.name(),
            sample.min_spec(),
            sample.primary_spec()
        );
        Ok(sample)
    }

    fn pick_featured(&self, categories: &[Category]) -> Option<FeaturedSample> {
        let positions: Vec<(usize, usize)> = categories
            .iter()
            .enumerate()
            .flat_map(|(c, category)| (0..category.samples.len()).map(move |s| (c, s)))
            .collect();

        let seed = featured::weekly_seed(self.clock.now());
        let &(category, sample) = featured::choose(&positions, seed)?;
        let name = categories[category].samples[sample].name().to_string();
        info!(target: "catalog", "Featured sample this week: {}", name);

        Some(FeaturedSample {
            category,
            sample,
            name,
        })
    }
}
