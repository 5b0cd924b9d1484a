//! Catalog configuration.
//!
//! Settings are read from `cppsamples.toml` in the working directory (or the
//! file given with `--config`). Every field is optional:
//!
//! ```toml
//! samples_dir = "_samples"
//! manifest = "samples.yml"       # omit to discover categories from TITLE files
//! roster = "CONTRIBUTORS.md"
//! extension = "cpp"
//! environment = "development"    # or "production"
//!
//! [identity]
//! api_base = "https://api.github.com"
//! token = "ghp_..."              # or GITHUB_TOKEN
//! cache_path = ".cache/identities.json"
//! cache_max_age_secs = 604800
//! max_poll_interval_secs = 10
//! max_attempts = 3
//! ```
//!
//! Relative paths are resolved against the directory holding the file.
//! `CPPSAMPLES_ENV` overrides `environment`; `GITHUB_TOKEN` is used when no
//! token is configured.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tokio::fs;

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_API_BASE, DEFAULT_CACHE_MAX_AGE_SECS, DEFAULT_LOOKUP_ATTEMPTS,
    DEFAULT_MAX_POLL_INTERVAL, DEFAULT_SAMPLE_EXTENSION, DEFAULT_SAMPLES_DIR, ENVIRONMENT_VAR,
    GITHUB_TOKEN_VAR,
};
use crate::contributor::RetryPolicy;
use crate::core::CatalogError;

/// Run environment. Only production talks to the identity service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(CatalogError::ConfigError {
                message: format!(
                    "Unknown environment '{other}' (expected development or production)"
                ),
            }),
        }
    }
}

/// Identity service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub api_base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,
    pub cache_max_age_secs: u64,
    pub max_poll_interval_secs: u64,
    pub max_attempts: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: None,
            cache_path: None,
            cache_max_age_secs: DEFAULT_CACHE_MAX_AGE_SECS,
            max_poll_interval_secs: DEFAULT_MAX_POLL_INTERVAL.as_secs(),
            max_attempts: DEFAULT_LOOKUP_ATTEMPTS,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub samples_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roster: Option<PathBuf>,
    pub extension: String,
    pub environment: Environment,
    pub identity: IdentityConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            samples_dir: PathBuf::from(DEFAULT_SAMPLES_DIR),
            manifest: None,
            roster: None,
            extension: DEFAULT_SAMPLE_EXTENSION.to_string(),
            environment: Environment::default(),
            identity: IdentityConfig::default(),
        }
    }
}

impl CatalogConfig {
    /// Load from `path`, or from `cppsamples.toml` in the working directory.
    ///
    /// An explicitly given file must exist; a missing default file yields the
    /// defaults.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(&path).await,
            None => {
                let path = PathBuf::from(CONFIG_FILE_NAME);
                if path.exists() {
                    Self::load_from(&path).await
                } else {
                    tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load from a specific file, resolving relative paths against its directory.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        let base = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        config.resolve_paths(&base);
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.samples_dir);
        if let Some(manifest) = self.manifest.as_mut() {
            resolve(manifest);
        }
        if let Some(roster) = self.roster.as_mut() {
            resolve(roster);
        }
        if let Some(cache_path) = self.identity.cache_path.as_mut() {
            resolve(cache_path);
        }
    }

    /// Check values that would otherwise fail late.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.extension.trim().is_empty() || self.extension.starts_with('.') {
            return Err(CatalogError::ConfigError {
                message: format!(
                    "extension must be a non-empty file extension without a dot, got '{}'",
                    self.extension
                ),
            });
        }
        if self.identity.max_attempts == 0 {
            return Err(CatalogError::ConfigError {
                message: "identity.max_attempts must be at least 1".to_string(),
            });
        }
        if self.identity.max_poll_interval_secs == 0 {
            return Err(CatalogError::ConfigError {
                message: "identity.max_poll_interval_secs must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Apply `CPPSAMPLES_ENV` and `GITHUB_TOKEN` from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), CatalogError> {
        self.apply_overrides(
            std::env::var(ENVIRONMENT_VAR).ok(),
            std::env::var(GITHUB_TOKEN_VAR).ok(),
        )
    }

    /// Apply overrides from already-read environment values.
    pub fn apply_overrides(
        &mut self,
        environment: Option<String>,
        token: Option<String>,
    ) -> Result<(), CatalogError> {
        if let Some(environment) = environment.filter(|value| !value.trim().is_empty()) {
            self.environment = environment.parse()?;
        }
        if self.identity.token.is_none() {
            self.identity.token = token.filter(|value| !value.is_empty());
        }
        Ok(())
    }

    /// Waiting behavior for identity lookups.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_poll_interval: Duration::from_secs(self.identity.max_poll_interval_secs),
            max_attempts: self.identity.max_attempts,
        }
    }

    /// Where the identity cache is persisted: the configured path, else
    /// `cppsamples/identities.json` in the user cache directory.
    pub fn identity_cache_path(&self) -> Option<PathBuf> {
        self.identity
            .cache_path
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("cppsamples").join("identities.json")))
    }
}
