//! Test utilities for cppsamples
//!
//! Compiled for unit tests and, through the `test-utils` feature, for the
//! integration suite.
//!
//! - [`ManualClock`] lets rate-limit waits finish instantly while recording them
//! - [`ScriptedIdentityService`] answers identity lookups from a queue
//! - [`TestGit`] builds repositories with chosen authors
//! - [`SampleFixture`] and [`ManifestFixture`] write sample trees and manifests

pub mod clock;
pub mod fixtures;
pub mod git_helper;
pub mod identity;

pub use clock::ManualClock;
pub use fixtures::{ManifestFixture, SampleFixture, write_standard_samples};
pub use git_helper::TestGit;
pub use identity::{RecordedCall, ScriptedIdentityService, ServiceCall};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Route `tracing` output through the test harness.
///
/// With no `level` and no `RUST_LOG`, nothing is installed and tests stay
/// quiet. Later calls are no-ops.
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = match level {
            Some(level) => EnvFilter::new(level.to_string()),
            None if std::env::var_os("RUST_LOG").is_some() => EnvFilter::from_default_env(),
            None => return,
        };

        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}
