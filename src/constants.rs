//! Global constants used throughout the cppsamples codebase.
//!
//! This module contains default paths, identity service parameters, and
//! retry timings that are used across multiple modules. Defining them
//! centrally makes magic numbers discoverable.

use std::time::Duration;

/// Directory holding the sample files when no configuration overrides it.
pub const DEFAULT_SAMPLES_DIR: &str = "_samples";

/// File extension of sample files (without the leading dot).
pub const DEFAULT_SAMPLE_EXTENSION: &str = "cpp";

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "cppsamples.toml";

/// File that marks a directory as a category during manifest discovery.
///
/// The first line of the file is the category title.
pub const CATEGORY_TITLE_FILE: &str = "TITLE";

/// Environment variable selecting the run environment (`production` enables network lookups).
pub const ENVIRONMENT_VAR: &str = "CPPSAMPLES_ENV";

/// Environment variable consulted for an identity service token.
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Local image used for authors that could not be matched to a profile.
pub const UNKNOWN_USER_AVATAR: &str = "/images/unknown_user.png";

/// Page root that `[text](cpp/...)` shorthand links resolve against.
pub const CPPREFERENCE_BASE: &str = "https://en.cppreference.com/w/";

/// Avatar size requested from the identity service, in pixels.
pub const AVATAR_SIZE: u32 = 36;

/// Base URL of the GitHub REST API.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User agent sent with identity service requests (GitHub rejects requests without one).
pub const USER_AGENT: &str = concat!("cppsamples/", env!("CARGO_PKG_VERSION"));

/// Longest single sleep while waiting for a rate limit window to reset.
///
/// Waiting is done in slices of at most this length so the resolver logs
/// progress and re-checks the clock during long stalls.
pub const DEFAULT_MAX_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Shortest wait after a rate-limited response, also when its reset time has
/// already passed.
pub const MIN_RATE_LIMIT_WAIT: Duration = Duration::from_secs(1);

/// Attempts made for a lookup that fails at the transport level before
/// falling back to the placeholder identity.
pub const DEFAULT_LOOKUP_ATTEMPTS: u32 = 3;

/// Starting delay for exponential backoff between failed lookups (250ms).
pub const STARTING_BACKOFF_DELAY_MS: u64 = 250;

/// Maximum backoff delay between failed lookups (4s).
pub const MAX_BACKOFF_DELAY_MS: u64 = 4_000;

/// Timeout applied to a single identity service request.
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for git history queries.
pub const GIT_LOG_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum age of a persisted identity cache before it is ignored (one week).
pub const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

/// Offset added to the weekly seed used to pick the featured sample.
pub const FEATURED_SEED_OFFSET: u64 = 5;
