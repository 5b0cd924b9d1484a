//! Integration test suite for cppsamples
//!
//! End-to-end tests that run the `cppsamples` binary against temporary
//! sample trees.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **build**: catalog building, manifests and discovery
//! - **contributors**: git attribution and identity lookups
//! - **determinism**: stable output and featured sample selection
//! - **error_scenarios**: failures and their messages
//! - **parse**: the single-file `parse` command

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod build;
mod contributors;
mod determinism;
mod error_scenarios;
mod parse;
