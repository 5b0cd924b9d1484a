//! External identity service.
//!
//! [`IdentityService`] is the seam between the resolver and the network.
//! [`GithubIdentityService`] is the production implementation backed by the
//! GitHub REST API; tests substitute scripted services.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{self, HeaderMap};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::constants::{HTTP_REQUEST_TIMEOUT, USER_AGENT};

/// Profile data returned by a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    #[serde(rename = "login")]
    pub username: String,
    pub avatar_url: String,
    #[serde(rename = "html_url")]
    pub profile_url: String,
}

/// Answer of the identity service to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResponse {
    Found(Profile),
    NotFound,
    /// The service is throttling requests. `reset_at` is when the window
    /// reopens, if the service said so.
    RateLimited {
        reset_at: Option<DateTime<Utc>>,
    },
}

/// Lookup operations offered by an identity service.
///
/// An `Err` means the request could not be completed (connection failure,
/// unexpected status or body) and may be retried.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Find the account whose public email matches `email`.
    async fn search_by_email(&self, email: &str) -> Result<LookupResponse>;

    /// Fetch the account named `username`.
    async fn fetch_by_username(&self, username: &str) -> Result<LookupResponse>;
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    items: Vec<Profile>,
}

/// Identity service backed by the GitHub REST API.
pub struct GithubIdentityService {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
    clock: Arc<dyn Clock>,
}

impl GithubIdentityService {
    /// Create a client for the API at `api_base` (e.g. `https://api.github.com`).
    pub fn new(api_base: &str, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.filter(|token| !token.is_empty()),
            clock: Arc::new(SystemClock),
        })
    }

    /// Clock that relative `retry-after` delays are measured from.
    ///
    /// Should be the clock the resolver waits on.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let mut request =
            self.client.get(url).header(header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request.send().await.with_context(|| format!("Request to {url} failed"))
    }
}

#[async_trait]
impl IdentityService for GithubIdentityService {
    async fn search_by_email(&self, email: &str) -> Result<LookupResponse> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/search/users", self.api_base),
            &[("q", format!("{email} in:email")), ("per_page", "1".to_string())],
        )
        .context("Failed to build search URL")?;
        debug!(target: "identity", "Searching for {}", email);

        let response = self.get(url.as_str()).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.context("Failed to read search response")?;

        if status.is_success() {
            let results: SearchResults = serde_json::from_str(&body)
                .with_context(|| format!("Unexpected search response for {email}"))?;
            return Ok(match results.items.into_iter().next() {
                Some(profile) => LookupResponse::Found(profile),
                None => LookupResponse::NotFound,
            });
        }

        if let Some(limited) = throttled(status, &headers, self.clock.now()) {
            return Ok(limited);
        }
        match status {
            // The search query itself was rejected; retrying will not help.
            StatusCode::UNPROCESSABLE_ENTITY => Ok(LookupResponse::NotFound),
            _ => bail!("Search for {email} returned HTTP {status}"),
        }
    }

    async fn fetch_by_username(&self, username: &str) -> Result<LookupResponse> {
        let url = format!("{}/users/{}", self.api_base, username);
        debug!(target: "identity", "Fetching user {}", username);

        let response = self.get(&url).await?;
        let status = response.status();

        if let Some(limited) = throttled(status, response.headers(), self.clock.now()) {
            return Ok(limited);
        }
        match status {
            StatusCode::NOT_FOUND => Ok(LookupResponse::NotFound),
            status if status.is_success() => {
                let profile: Profile = response
                    .json()
                    .await
                    .with_context(|| format!("Unexpected user response for {username}"))?;
                Ok(LookupResponse::Found(profile))
            }
            _ => bail!("Fetching user {username} returned HTTP {status}"),
        }
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Classify a throttling response.
///
/// 429 is always a rate limit. GitHub also answers 403 for forbidden
/// resources, so a 403 only counts when the quota is exhausted
/// (`x-ratelimit-remaining: 0`) or a `retry-after` is given.
fn throttled(
    status: StatusCode,
    headers: &HeaderMap,
    now: DateTime<Utc>,
) -> Option<LookupResponse> {
    let limited = match status {
        StatusCode::TOO_MANY_REQUESTS => true,
        StatusCode::FORBIDDEN => {
            header_number(headers, "x-ratelimit-remaining") == Some(0)
                || headers.contains_key(header::RETRY_AFTER)
        }
        _ => false,
    };
    limited.then(|| LookupResponse::RateLimited {
        reset_at: reset_time(headers, now),
    })
}

/// Reset time advertised by a throttled response.
///
/// Reads `x-ratelimit-reset` (epoch seconds), then `retry-after` (seconds
/// after `now`).
fn reset_time(headers: &HeaderMap, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if let Some(epoch) = header_number(headers, "x-ratelimit-reset") {
        return DateTime::from_timestamp(epoch, 0);
    }
    header_number(headers, "retry-after").map(|secs| now + chrono::Duration::seconds(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::TimeZone;

    const SEARCH_HIT: &str = r#"{
        "total_count": 1,
        "incomplete_results": false,
        "items": [{
            "login": "janedoe",
            "id": 42,
            "avatar_url": "https://avatars.githubusercontent.com/u/42?v=4",
            "html_url": "https://github.com/janedoe"
        }]
    }"#;

    fn jane() -> Profile {
        Profile {
            username: "janedoe".to_string(),
            avatar_url: "https://avatars.githubusercontent.com/u/42?v=4".to_string(),
            profile_url: "https://github.com/janedoe".to_string(),
        }
    }

    #[tokio::test]
    async fn test_search_found() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search/users")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("q".into(), "jane@example.com in:email".into()),
                mockito::Matcher::UrlEncoded("per_page".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(SEARCH_HIT)
            .create_async()
            .await;

        let service = GithubIdentityService::new(&server.url(), None).unwrap();
        let response = service.search_by_email("jane@example.com").await.unwrap();

        mock.assert_async().await;
        assert_eq!(response, LookupResponse::Found(jane()));
    }

    #[tokio::test]
    async fn test_search_empty_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search/users")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"total_count": 0, "incomplete_results": false, "items": []}"#)
            .create_async()
            .await;

        let service = GithubIdentityService::new(&server.url(), None).unwrap();
        let response = service.search_by_email("ghost@example.com").await.unwrap();
        assert_eq!(response, LookupResponse::NotFound);
    }

    #[tokio::test]
    async fn test_search_rate_limited_reads_reset_header() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search/users")
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .with_header("x-ratelimit-remaining", "0")
            .with_header("x-ratelimit-reset", "1714550400")
            .with_body(r#"{"message": "API rate limit exceeded"}"#)
            .create_async()
            .await;

        let service = GithubIdentityService::new(&server.url(), None).unwrap();
        let response = service.search_by_email("jane@example.com").await.unwrap();
        assert_eq!(
            response,
            LookupResponse::RateLimited {
                reset_at: DateTime::from_timestamp(1_714_550_400, 0),
            }
        );
    }

    #[tokio::test]
    async fn test_search_unexpected_status_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search/users")
            .match_query(mockito::Matcher::Any)
            .with_status(502)
            .create_async()
            .await;

        let service = GithubIdentityService::new(&server.url(), None).unwrap();
        assert!(service.search_by_email("jane@example.com").await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_user_sends_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users/janedoe")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_body(
                r#"{
                    "login": "janedoe",
                    "avatar_url": "https://avatars.githubusercontent.com/u/42?v=4",
                    "html_url": "https://github.com/janedoe"
                }"#,
            )
            .create_async()
            .await;

        let service =
            GithubIdentityService::new(&server.url(), Some("secret".to_string())).unwrap();
        let response = service.fetch_by_username("janedoe").await.unwrap();

        mock.assert_async().await;
        assert_eq!(response, LookupResponse::Found(jane()));
    }

    #[tokio::test]
    async fn test_fetch_missing_user() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/users/nobody").with_status(404).create_async().await;

        let service = GithubIdentityService::new(&server.url(), None).unwrap();
        assert_eq!(service.fetch_by_username("nobody").await.unwrap(), LookupResponse::NotFound);
    }

    #[tokio::test]
    async fn test_forbidden_with_quota_left_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/janedoe")
            .with_status(403)
            .with_header("x-ratelimit-remaining", "59")
            .with_body(r#"{"message": "Resource protected by organization SAML enforcement"}"#)
            .create_async()
            .await;

        let service = GithubIdentityService::new(&server.url(), None).unwrap();
        assert!(service.fetch_by_username("janedoe").await.is_err());
    }

    #[tokio::test]
    async fn test_too_many_requests_uses_retry_after() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/janedoe")
            .with_status(429)
            .with_header("retry-after", "30")
            .create_async()
            .await;

        let service = GithubIdentityService::new(&server.url(), None)
            .unwrap()
            .with_clock(Arc::new(FixedClock::new(now)));
        assert_eq!(
            service.fetch_by_username("janedoe").await.unwrap(),
            LookupResponse::RateLimited {
                reset_at: Some(now + chrono::Duration::seconds(30)),
            }
        );
    }

    #[test]
    fn test_forbidden_classification() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(throttled(StatusCode::FORBIDDEN, &headers, now), None);

        headers.insert("x-ratelimit-remaining", "0".parse().unwrap());
        assert_eq!(
            throttled(StatusCode::FORBIDDEN, &headers, now),
            Some(LookupResponse::RateLimited {
                reset_at: None,
            })
        );
        assert_eq!(throttled(StatusCode::NOT_FOUND, &headers, now), None);
    }

    #[test]
    fn test_reset_time_without_headers() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        assert_eq!(reset_time(&HeaderMap::new(), now), None);
    }
}
