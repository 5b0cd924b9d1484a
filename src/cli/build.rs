//! `cppsamples build`: assemble the catalog and emit it as JSON.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::{CatalogBuilder, Manifest};
use crate::clock::{Clock, FixedClock, SystemClock};
use crate::config::{CatalogConfig, Environment};
use crate::contributor::{
    ContributorResolver, DummyIdentityResolver, GithubIdentityService, IdentityCache,
    IdentityResolver, LiveIdentityResolver, Roster,
};

/// Build the catalog.
#[derive(Args, Debug, Clone)]
pub struct BuildCommand {
    /// Write the catalog to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Resolve contributors through the identity service
    #[arg(long)]
    production: bool,

    /// Build as if today were DATE (selects that week's featured sample)
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Sample root (overrides `samples_dir`)
    #[arg(long, value_name = "DIR")]
    samples_dir: Option<PathBuf>,

    /// Manifest file (overrides `manifest`)
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{value}': {e}"))
}

impl BuildCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let mut config = CatalogConfig::load_with_optional(config_path).await?;
        config.apply_env_overrides()?;
        if self.production {
            config.environment = Environment::Production;
        }
        if let Some(samples_dir) = &self.samples_dir {
            config.samples_dir = samples_dir.clone();
        }
        if let Some(manifest) = &self.manifest {
            config.manifest = Some(manifest.clone());
        }

        // `--date` only pins the featured week. Rate-limit waits always run on wall time.
        let catalog_clock: Arc<dyn Clock> = match self.date {
            Some(date) => {
                let noon = date.and_hms_opt(12, 0, 0).context("Invalid build date")?;
                Arc::new(FixedClock::new(noon.and_utc()))
            }
            None => Arc::new(SystemClock),
        };

        let manifest = match &config.manifest {
            Some(path) => Manifest::load(path).await?,
            None => {
                info!(
                    "No manifest configured, discovering categories in {}",
                    config.samples_dir.display()
                );
                Manifest::discover(&config.samples_dir, &config.extension)?
            }
        };

        let cache_path = match config.environment {
            Environment::Production => config.identity_cache_path(),
            Environment::Development => None,
        };
        let identities =
            identity_resolver(&config, cache_path.as_deref(), Arc::new(SystemClock)).await?;

        let mut builder = CatalogBuilder::new(
            &config.samples_dir,
            &config.extension,
            ContributorResolver::new(identities),
            catalog_clock,
        );
        let catalog = builder.build(&manifest).await?;

        if let (Some(cache), Some(path)) = (builder.contributors().identity_cache(), &cache_path) {
            if let Err(e) = cache.save(path, Utc::now()).await {
                warn!("Could not save identity cache: {:#}", e);
            }
        }

        let json = serde_json::to_string_pretty(&catalog).context("Failed to serialize catalog")?;
        match &self.output {
            Some(path) => {
                tokio::fs::write(path, format!("{json}\n"))
                    .await
                    .with_context(|| format!("Failed to write catalog to {}", path.display()))?;
                eprintln!(
                    "{} Wrote {} samples in {} categories to {}",
                    "✓".green(),
                    catalog.samples().count(),
                    catalog.categories.len(),
                    path.display()
                );
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}

async fn identity_resolver(
    config: &CatalogConfig,
    cache_path: Option<&std::path::Path>,
    clock: Arc<dyn Clock>,
) -> Result<Box<dyn IdentityResolver>> {
    if config.environment == Environment::Development {
        return Ok(Box::new(DummyIdentityResolver));
    }

    let cache = match cache_path {
        Some(path) => {
            match IdentityCache::load(path, config.identity.cache_max_age_secs, Utc::now()).await {
                Ok(cache) => cache,
                Err(e) => {
                    warn!("Ignoring unreadable identity cache: {:#}", e);
                    IdentityCache::new()
                }
            }
        }
        None => IdentityCache::new(),
    };

    let roster = match &config.roster {
        Some(path) => Roster::load(path).await?,
        None => Roster::default(),
    };

    let service =
        GithubIdentityService::new(&config.identity.api_base, config.identity.token.clone())?
            .with_clock(clock.clone());
    info!("Resolving contributors via {}", config.identity.api_base);

    Ok(Box::new(LiveIdentityResolver::new(
        Box::new(service),
        cache,
        roster,
        config.retry_policy(),
        clock,
    )))
}
