//! Identity cache keyed by email and by username.
//!
//! The cache lives for one run and is never evicted mid-run. It can be
//! persisted between runs as JSON:
//!
//! ```json
//! {
//!   "saved_at": "2024-05-01T08:00:00Z",
//!   "by_email": { "jane@example.com": { "avatar_url": "...", ... } },
//!   "by_username": { "janedoe": { "avatar_url": "...", ... } }
//! }
//! ```
//!
//! A persisted cache older than the configured maximum age is discarded when
//! loaded. Keys are stored lower-cased.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use super::Identity;

/// Lookup results for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityCache {
    #[serde(default)]
    by_email: BTreeMap<String, Identity>,
    #[serde(default)]
    by_username: BTreeMap<String, Identity>,
}

/// On-disk form of the cache.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedCache {
    saved_at: DateTime<Utc>,
    #[serde(flatten)]
    cache: IdentityCache,
}

fn key(value: &str) -> String {
    value.trim().to_lowercase()
}

impl IdentityCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity previously recorded for an email address.
    pub fn get_by_email(&self, email: &str) -> Option<&Identity> {
        self.by_email.get(&key(email))
    }

    /// Identity previously recorded for a username.
    pub fn get_by_username(&self, username: &str) -> Option<&Identity> {
        self.by_username.get(&key(username))
    }

    /// Record an identity for an email address.
    ///
    /// Identities that carry a username are also recorded under it, so a
    /// later lookup by username needs no request.
    pub fn insert_email(&mut self, email: &str, identity: Identity) {
        if let Some(username) = identity.username.as_deref() {
            self.by_username.insert(key(username), identity.clone());
        }
        self.by_email.insert(key(email), identity);
    }

    /// Record an identity under a username.
    pub fn insert_username(&mut self, username: &str, identity: Identity) {
        self.by_username.insert(key(username), identity);
    }

    /// Number of distinct keys held.
    pub fn len(&self) -> usize {
        self.by_email.len() + self.by_username.len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty() && self.by_username.is_empty()
    }

    /// Load a persisted cache.
    ///
    /// A missing file, or one saved more than `max_age_secs` before `now`,
    /// yields an empty cache.
    pub async fn load(path: &Path, max_age_secs: u64, now: DateTime<Utc>) -> Result<Self> {
        if !path.exists() {
            debug!(target: "identity", "No identity cache at {}", path.display());
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read identity cache: {}", path.display()))?;
        let persisted: PersistedCache = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse identity cache: {}", path.display()))?;

        let age = now - persisted.saved_at;
        if age.num_seconds() >= i64::try_from(max_age_secs).unwrap_or(i64::MAX) {
            info!(
                target: "identity",
                "Identity cache saved at {} is older than {}s, starting fresh",
                persisted.saved_at,
                max_age_secs
            );
            return Ok(Self::new());
        }

        debug!(
            target: "identity",
            "Loaded {} identity cache entries from {}",
            persisted.cache.len(),
            path.display()
        );
        Ok(persisted.cache)
    }

    /// Write the cache to `path`, stamped with `now`.
    pub async fn save(&self, path: &Path, now: DateTime<Utc>) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create cache directory: {}", parent.display())
                })?;
            }
        }

        let persisted = PersistedCache {
            saved_at: now,
            cache: self.clone(),
        };
        let content = serde_json::to_string_pretty(&persisted)
            .context("Failed to serialize identity cache")?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write identity cache: {}", path.display()))?;

        debug!(target: "identity", "Saved {} cache entries to {}", self.len(), path.display());
        Ok(())
    }

    /// Remove a persisted cache file. Returns whether a file was removed.
    pub async fn clear(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)
            .await
            .with_context(|| format!("Failed to remove identity cache: {}", path.display()))?;
        Ok(true)
    }
}
