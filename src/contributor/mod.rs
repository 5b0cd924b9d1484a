//! Contributor resolution.
//!
//! Every variant file lists the people who wrote it. Authors come from the
//! file's git history as `(email, name)` pairs and are matched to accounts on
//! an identity service to get an avatar and a profile link:
//!
//! ```text
//! git log ──► AuthorRecord ──► IdentityResolver ──► Contributor
//!                                │
//!                                ├── IdentityCache (email / username)
//!                                ├── Roster (name or email → username)
//!                                └── IdentityService (GitHub)
//! ```
//!
//! Outside production the [`DummyIdentityResolver`] answers every author
//! with the placeholder identity without touching the network.

pub mod cache;
pub mod resolver;
pub mod retry;
pub mod roster;
pub mod service;

pub use cache::IdentityCache;
pub use resolver::{DummyIdentityResolver, IdentityResolver, LiveIdentityResolver};
pub use retry::RetryPolicy;
pub use roster::Roster;
pub use service::{GithubIdentityService, IdentityService, LookupResponse, Profile};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::constants::{AVATAR_SIZE, UNKNOWN_USER_AVATAR};
use crate::git;

/// One author as recorded in version control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRecord {
    pub email: String,
    pub display_name: String,
}

/// What the identity service knows about an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub avatar_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Identity {
    /// Placeholder for authors without a matching account.
    pub fn unknown() -> Self {
        Self {
            avatar_url: UNKNOWN_USER_AVATAR.to_string(),
            profile_url: None,
            username: None,
        }
    }

    /// Whether this is the placeholder identity.
    pub fn is_unknown(&self) -> bool {
        self.username.is_none() && self.profile_url.is_none()
    }

    /// Identity for a service profile, with the avatar size pinned.
    pub fn from_profile(profile: Profile) -> Self {
        let separator = if profile.avatar_url.contains('?') {
            '&'
        } else {
            '?'
        };
        Self {
            avatar_url: format!("{}{}size={}", profile.avatar_url, separator, AVATAR_SIZE),
            profile_url: Some(profile.profile_url),
            username: Some(profile.username),
        }
    }
}

/// A resolved author of a variant file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub display_name: String,
    pub avatar_url: String,
    #[serde(default)]
    pub profile_url: Option<String>,
}

impl Contributor {
    fn new(author: AuthorRecord, identity: Identity) -> Self {
        Self {
            display_name: author.display_name,
            avatar_url: identity.avatar_url,
            profile_url: identity.profile_url,
        }
    }
}

/// Keep the first record for each email, in order. Emails compare case-insensitively.
pub fn dedup_authors(authors: Vec<AuthorRecord>) -> Vec<AuthorRecord> {
    let mut seen = HashSet::new();
    authors.into_iter().filter(|author| seen.insert(author.email.to_lowercase())).collect()
}

/// Resolves the contributors of files from their git history.
pub struct ContributorResolver {
    identities: Box<dyn IdentityResolver>,
}

impl ContributorResolver {
    pub fn new(identities: Box<dyn IdentityResolver>) -> Self {
        Self {
            identities,
        }
    }

    /// Contributors of `file`, one per distinct author email, in history order.
    ///
    /// A file without readable history has no contributors.
    pub async fn resolve_authors(&mut self, file: &Path) -> Vec<Contributor> {
        let authors = match git::file_authors(file).await {
            Ok(authors) => dedup_authors(authors),
            Err(e) => {
                tracing::warn!(
                    target: "git",
                    "Could not read history of {}: {:#}",
                    file.display(),
                    e
                );
                return Vec::new();
            }
        };

        let mut contributors = Vec::with_capacity(authors.len());
        for author in authors {
            let identity = self.identities.resolve(&author).await;
            contributors.push(Contributor::new(author, identity));
        }
        contributors
    }

    /// Author date of the latest commit touching `file`.
    pub async fn last_modified(&self, file: &Path) -> Option<DateTime<FixedOffset>> {
        match git::last_modified(file).await {
            Ok(date) => date,
            Err(e) => {
                tracing::warn!(
                    target: "git",
                    "Could not read last modification of {}: {:#}",
                    file.display(),
                    e
                );
                None
            }
        }
    }

    /// Identity cache accumulated so far, if the resolver keeps one.
    pub fn identity_cache(&self) -> Option<&IdentityCache> {
        self.identities.cache()
    }
}
