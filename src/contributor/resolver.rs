//! Author to identity resolution.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cache::IdentityCache;
use super::retry::RetryPolicy;
use super::roster::Roster;
use super::service::{IdentityService, LookupResponse, Profile};
use super::{AuthorRecord, Identity};
use crate::clock::Clock;

/// Turns an author into an identity. Resolution never fails: authors that
/// cannot be matched get [`Identity::unknown`].
#[async_trait]
pub trait IdentityResolver: Send {
    /// Identity for `author`.
    async fn resolve(&mut self, author: &AuthorRecord) -> Identity;

    /// Cache built up during the run, for resolvers that keep one.
    fn cache(&self) -> Option<&IdentityCache> {
        None
    }
}

/// Resolver used outside production: no network, always the placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyIdentityResolver;

#[async_trait]
impl IdentityResolver for DummyIdentityResolver {
    async fn resolve(&mut self, _author: &AuthorRecord) -> Identity {
        Identity::unknown()
    }
}

enum Query<'a> {
    Email(&'a str),
    Username(&'a str),
}

enum Outcome {
    Found(Profile),
    NotFound,
}

/// Resolver that queries an [`IdentityService`], waiting out rate limits.
///
/// Lookup order for an author:
///
/// 1. cached identity for the email,
/// 2. roster username (cache first, then the service),
/// 3. search by email,
/// 4. the placeholder.
pub struct LiveIdentityResolver {
    service: Box<dyn IdentityService>,
    cache: IdentityCache,
    roster: Roster,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl LiveIdentityResolver {
    pub fn new(
        service: Box<dyn IdentityService>,
        cache: IdentityCache,
        roster: Roster,
        policy: RetryPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            service,
            cache,
            roster,
            policy,
            clock,
        }
    }

    /// Hand back the cache, e.g. to persist it.
    pub fn into_cache(self) -> IdentityCache {
        self.cache
    }

    /// Run one query to completion.
    ///
    /// Rate limits are waited out and retried without limit. Failed
    /// requests are retried with backoff up to `max_attempts`; `None` means
    /// every attempt failed.
    async fn lookup(&self, query: &Query<'_>) -> Option<Outcome> {
        let mut attempt = 0u32;
        loop {
            let response = match query {
                Query::Email(email) => self.service.search_by_email(email).await,
                Query::Username(username) => self.service.fetch_by_username(username).await,
            };

            match response {
                Ok(LookupResponse::Found(profile)) => return Some(Outcome::Found(profile)),
                Ok(LookupResponse::NotFound) => return Some(Outcome::NotFound),
                Ok(LookupResponse::RateLimited {
                    reset_at,
                }) => {
                    let reset_at = reset_at.unwrap_or_else(|| {
                        self.clock.now()
                            + chrono::Duration::from_std(self.policy.max_poll_interval)
                                .unwrap_or_else(|_| chrono::Duration::seconds(1))
                    });
                    info!(target: "identity", "Identity service rate limited until {}", reset_at);
                    self.policy.wait_until(self.clock.as_ref(), reset_at).await;
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.policy.max_attempts {
                        warn!(
                            target: "identity",
                            "Identity lookup failed after {} attempt(s): {:#}",
                            attempt,
                            e
                        );
                        return None;
                    }
                    let delay = self.policy.backoff_delay(attempt - 1);
                    debug!(
                        target: "identity",
                        "Identity lookup failed ({:#}), retrying in {:?}",
                        e,
                        delay
                    );
                    self.clock.sleep(delay).await;
                }
            }
        }
    }
}

#[async_trait]
impl IdentityResolver for LiveIdentityResolver {
    async fn resolve(&mut self, author: &AuthorRecord) -> Identity {
        if let Some(identity) = self.cache.get_by_email(&author.email) {
            debug!(target: "identity", "Cache hit for {}", author.email);
            return identity.clone();
        }

        let username = self.roster.username_for(author).map(str::to_string);
        if let Some(username) = username {
            if let Some(identity) = self.cache.get_by_username(&username).cloned() {
                debug!(target: "identity", "Cache hit for user {}", username);
                self.cache.insert_email(&author.email, identity.clone());
                return identity;
            }

            match self.lookup(&Query::Username(&username)).await {
                Some(Outcome::Found(profile)) => {
                    let identity = Identity::from_profile(profile);
                    self.cache.insert_username(&username, identity.clone());
                    self.cache.insert_email(&author.email, identity.clone());
                    return identity;
                }
                Some(Outcome::NotFound) => {
                    debug!(
                        target: "identity",
                        "Roster user {} not found, searching by email",
                        username
                    );
                }
                None => {}
            }
        }

        match self.lookup(&Query::Email(&author.email)).await {
            Some(Outcome::Found(profile)) => {
                let identity = Identity::from_profile(profile);
                self.cache.insert_email(&author.email, identity.clone());
                identity
            }
            Some(Outcome::NotFound) => {
                debug!(target: "identity", "No account found for {}", author.email);
                let identity = Identity::unknown();
                self.cache.insert_email(&author.email, identity.clone());
                identity
            }
            None => Identity::unknown(),
        }
    }

    fn cache(&self) -> Option<&IdentityCache> {
        Some(&self.cache)
    }
}
