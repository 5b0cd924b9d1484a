//! Static roster mapping authors to identity service usernames.
//!
//! The roster is a line-oriented text file, one contributor per line:
//!
//! ```text
//! # Contributors
//!
//! - Joseph Mansfield <sftrabbit@gmail.com> (sftrabbit)
//! - Jane Doe (janedoe)
//! - Someone Else <someone@example.com>
//! ```
//!
//! Lines that do not start with `- ` are ignored.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use super::AuthorRecord;

static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*-\s+(?P<name>[^<(]*?)",
        r"\s*(?:<(?P<email>[^>]*)>)?",
        r"\s*(?:\((?P<user>[^)]*)\))?\s*$",
    ))
    .expect("roster entry pattern is valid")
});

/// One roster line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub display_name: String,
    pub email: Option<String>,
    pub username: Option<String>,
}

/// Parsed roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    /// Parse roster text. Malformed lines are skipped.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| {
                let caps = ENTRY_RE.captures(line)?;
                let display_name = caps.name("name")?.as_str().trim().to_string();
                if display_name.is_empty() {
                    return None;
                }
                let field = |name: &str| {
                    caps.name(name)
                        .map(|m| m.as_str().trim().to_string())
                        .filter(|value| !value.is_empty())
                };
                Some(RosterEntry {
                    display_name,
                    email: field("email"),
                    username: field("user"),
                })
            })
            .collect();

        Self {
            entries,
        }
    }

    /// Read and parse a roster file.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read roster file: {}", path.display()))?;
        let roster = Self::parse(&text);
        tracing::debug!(
            target: "identity",
            "Loaded {} roster entries from {}",
            roster.entries.len(),
            path.display()
        );
        Ok(roster)
    }

    /// All parsed entries in file order.
    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    /// Username for an author, matched by email first and display name second.
    ///
    /// Email comparison ignores case.
    pub fn username_for(&self, author: &AuthorRecord) -> Option<&str> {
        let by_email = self.entries.iter().find(|entry| {
            entry.email.as_deref().is_some_and(|email| email.eq_ignore_ascii_case(&author.email))
        });
        let entry = by_email.or_else(|| {
            self.entries.iter().find(|entry| entry.display_name == author.display_name)
        })?;
        entry.username.as_deref()
    }
}
