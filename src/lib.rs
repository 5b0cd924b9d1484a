//! cppsamples - catalog builder for annotated C++ samples
//!
//! Turns a directory of annotated C++ sample files into a categorized,
//! serializable catalog that a static site renders. Each sample may exist in
//! several language-standard variants, and every variant is attributed to the
//! people who wrote it.
//!
//! # Architecture Overview
//!
//! ```text
//! Manifest ──► CatalogBuilder ──► Catalog (JSON)
//!                   │
//!                   ├── variant::resolve_variants ──► sample::parse (per file)
//!                   └── ContributorResolver ──► git log + IdentityResolver
//! ```
//!
//! # Core Modules
//!
//! - [`sample`] - sample file parser and line reference translation
//! - [`spec`] - the ordered set of language standard labels
//! - [`variant`] - grouping of per-standard files into samples
//! - [`contributor`] - authors to identities, with cache, roster and rate-limit waiting
//! - [`git`] - git history queries
//! - [`catalog`] - manifest handling, tree building and the weekly featured sample
//!
//! ## Supporting Modules
//! - [`cli`] - command-line interface
//! - [`clock`] - time source shared by rate-limit waits and featured selection
//! - [`config`] - `cppsamples.toml` configuration
//! - [`constants`] - defaults and timings
//! - [`core`] - error types and user-facing error reporting
//!
//! # Sample File Format
//!
//! ```cpp
//! // Sort a range
//! // c++11, algorithms
//!
//! #include <algorithm>
//! #include <vector>
//!
//! int main()
//! {
//!   std::vector<int> v = {5, 1, 4};
//!   std::sort(std::begin(v), std::end(v));
//! }
//!
//! // Sort the elements of a container with [!9].
//! //
//! // `std::sort` uses `operator<` unless a comparator is given.
//! ```
//!
//! The first comment is the title, an optional second comment lists tags
//! (the first tag may name the standard), and the trailing comment block holds
//! the intent and the description. Variants for other standards live next to
//! it as `sort.c++20.cpp`.
//!
//! # Example
//!
//! ```rust,no_run
//! use cppsamples_cli::catalog::{CatalogBuilder, Manifest};
//! use cppsamples_cli::clock::SystemClock;
//! use cppsamples_cli::contributor::{ContributorResolver, DummyIdentityResolver};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let manifest = Manifest::discover(Path::new("_samples"), "cpp")?;
//! let mut builder = CatalogBuilder::new(
//!     "_samples",
//!     "cpp",
//!     ContributorResolver::new(Box::new(DummyIdentityResolver)),
//!     Arc::new(SystemClock),
//! );
//! let catalog = builder.build(&manifest).await?;
//! println!("{}", serde_json::to_string_pretty(&catalog)?);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod cli;
pub mod clock;
pub mod config;
pub mod constants;
pub mod contributor;
pub mod core;
pub mod git;
pub mod sample;
pub mod spec;
pub mod variant;

// Test utilities (only compiled for tests)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
