//! Core types for cppsamples
//!
//! This module holds the error handling shared by every stage of the
//! catalog build:
//! - [`CatalogError`] - enumerated failures that abort a build
//! - [`ErrorContext`] - user-facing wrapper with details and suggestions
//! - [`user_friendly_error`] - converts any `anyhow::Error` for display

pub mod error;

pub use error::{CatalogError, ErrorContext, user_friendly_error};
