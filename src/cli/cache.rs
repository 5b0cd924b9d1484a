//! `cppsamples cache`: inspect or remove the persisted identity cache.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::CatalogConfig;
use crate::contributor::IdentityCache;

/// Manage the identity cache.
#[derive(Args, Debug, Clone)]
pub struct CacheCommand {
    #[command(subcommand)]
    command: CacheSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CacheSubcommand {
    /// Delete the cache file
    Clear,
    /// Show where the cache lives and how many entries it holds
    Info,
}

impl CacheCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let config = CatalogConfig::load_with_optional(config_path).await?;
        let path = config
            .identity_cache_path()
            .context(
                "No identity cache location configured and no user cache directory available",
            )?;

        match self.command {
            CacheSubcommand::Clear => {
                if IdentityCache::clear(&path).await? {
                    println!("{} Removed identity cache {}", "✓".green(), path.display());
                } else {
                    println!("No identity cache at {}", path.display());
                }
            }
            CacheSubcommand::Info => {
                let max_age = config.identity.cache_max_age_secs;
                let cache = IdentityCache::load(&path, max_age, Utc::now()).await?;
                println!("Identity cache: {}", path.display());
                println!("Entries: {}", cache.len());
            }
        }
        Ok(())
    }
}
