//! Error handling for cppsamples
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`CatalogError`]) for the failures the catalog
//!    build must stop on, so callers can match on them
//! 2. **User-friendly messages** ([`ErrorContext`]) with details and suggestions
//!    for the command line
//!
//! # Error Categories
//!
//! - **Content**: [`CatalogError::MalformedSample`] - a sample file has no usable header
//! - **Configuration**: [`CatalogError::DuplicateSpec`], [`CatalogError::UnknownSpec`],
//!   [`CatalogError::SampleNotFound`], [`CatalogError::ManifestParseError`],
//!   [`CatalogError::ManifestValidationError`], [`CatalogError::ConfigError`]
//! - **Git**: [`CatalogError::GitNotFound`], [`CatalogError::GitCommandError`]
//!
//! Identity lookups never produce errors that reach the user: they degrade to a
//! placeholder identity inside the contributor resolver.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cppsamples_cli::core::{CatalogError, user_friendly_error};
//!
//! let error = CatalogError::MalformedSample {
//!     path: "_samples/algorithms/sort.cpp".to_string(),
//!     reason: "first line is not a comment".to_string(),
//! };
//!
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // colored error, details and suggestion on stderr
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for catalog operations.
///
/// Every variant that refers to content carries the offending file path or
/// sample identifier, so the message alone is enough to locate the problem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A sample file does not start with a title comment.
    ///
    /// This is a content-authoring bug. The sample is never added to the
    /// catalog and the whole build is aborted.
    #[error("Malformed sample {path}: {reason}")]
    MalformedSample {
        /// Path of the sample file
        path: String,
        /// What is wrong with the header
        reason: String,
    },

    /// Two files of one sample resolved to the same spec label.
    #[error("Sample '{sample}' has more than one variant for {spec}: {first} and {second}")]
    DuplicateSpec {
        /// Sample identifier
        sample: String,
        /// The label both files resolved to
        spec: String,
        /// First file claiming the label
        first: String,
        /// Second file claiming the label
        second: String,
    },

    /// A filename suffix or tag names a dialect outside the known enumeration.
    #[error("Unknown spec label '{label}' in {path}")]
    UnknownSpec {
        /// The unrecognized label
        label: String,
        /// File the label came from
        path: String,
    },

    /// No file matched a sample identifier listed in the manifest.
    #[error("Sample '{sample}' not found under {root}")]
    SampleNotFound {
        /// Sample identifier
        sample: String,
        /// Sample root that was searched
        root: String,
    },

    /// The manifest could not be parsed.
    #[error("Invalid manifest syntax in {file}")]
    ManifestParseError {
        /// Path to the manifest file
        file: String,
        /// Parser message
        reason: String,
    },

    /// The manifest parsed but its content is inconsistent.
    #[error("Manifest validation failed: {reason}")]
    ManifestValidationError {
        /// Why validation failed
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Git executable not found in PATH
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// Git operation failed during execution
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git operation that failed (e.g., "log")
        operation: String,
        /// The error output from the git command
        stderr: String,
    },

    /// Generic error for cases not covered by specific variants
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Error wrapper adding details and a suggestion for display on the CLI.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: CatalogError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: CatalogError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] for display.
///
/// Known [`CatalogError`] variants get tailored suggestions. Other errors are
/// wrapped in [`CatalogError::Other`] with the full `anyhow` context chain as
/// the message.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(ctx) = error.downcast_ref::<ErrorContext>() {
        return ErrorContext {
            error: ctx.error.clone(),
            suggestion: ctx.suggestion.clone(),
            details: ctx.details.clone(),
        };
    }

    // A CatalogError below `.context()` layers keeps the layers as details.
    for (depth, cause) in error.chain().enumerate() {
        if let Some(catalog_error) = cause.downcast_ref::<CatalogError>() {
            let ctx = create_error_context(catalog_error.clone());
            return if depth == 0 {
                ctx
            } else {
                ctx.with_details(format!("{error:#}"))
            };
        }
    }

    let not_found = error
        .downcast_ref::<std::io::Error>()
        .is_some_and(|io_error| io_error.kind() == std::io::ErrorKind::NotFound);
    if not_found {
        return ErrorContext::new(CatalogError::Other {
            message: format!("{error:#}"),
        })
        .with_suggestion("Check that the file or directory exists and the path is correct");
    }

    ErrorContext::new(CatalogError::Other {
        message: format!("{error:#}"),
    })
}

fn create_error_context(error: CatalogError) -> ErrorContext {
    match &error {
        CatalogError::MalformedSample { .. } => ErrorContext::new(error)
            .with_suggestion("Start the sample with a title comment such as '// Sort a range'")
            .with_details(
                "Every sample file needs a '//' title line, optionally followed by a '//' tag line",
            ),

        CatalogError::DuplicateSpec { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Rename one file with an explicit suffix such as 'name.c++17.cpp', \
                 or change its first tag",
            )
            .with_details("Each dialect may appear at most once per sample"),

        CatalogError::UnknownSpec { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Use one of: c++98, c++03, c++11, c++14, c++17, c++20, c++23, experimental",
            )
            .with_details(
                "The spec label comes from the filename suffix, \
                 or from the first tag when there is no suffix",
            ),

        CatalogError::SampleNotFound { sample, .. } => {
            let suggestion = format!(
                "Create '{sample}.cpp' or remove '{sample}' from the manifest"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        CatalogError::ManifestParseError { reason, .. } => {
            let details = reason.clone();
            ErrorContext::new(error)
                .with_suggestion(
                    "The manifest needs a 'categories' list whose entries have \
                     'title' and 'samples'",
                )
                .with_details(details)
        }

        CatalogError::ManifestValidationError { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Each sample identifier may be listed only once across all categories",
            ),

        CatalogError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Check cppsamples.toml or the file passed with --config"),

        CatalogError::GitNotFound => ErrorContext::new(error)
            .with_suggestion("Install git from https://git-scm.com/ or your package manager")
            .with_details("Contributor attribution reads the history of each sample file"),

        CatalogError::GitCommandError { stderr, .. } => {
            let details = stderr.clone();
            ErrorContext::new(error).with_details(details)
        }

        CatalogError::Other { .. } => ErrorContext::new(error),
    }
}
