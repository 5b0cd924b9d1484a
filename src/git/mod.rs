//! Version control history of sample files.
//!
//! Samples live in a git repository. For every variant file the catalog
//! records who wrote it and when it last changed; both come from `git log`
//! run in the file's directory, so the sample root may be a nested
//! repository or a subdirectory of a larger one.

pub mod command_builder;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use std::path::Path;

use crate::contributor::AuthorRecord;
use command_builder::GitCommand;

/// Split a path into the directory git runs in and the name it is queried by.
fn locate(file: &Path) -> Result<(&Path, String)> {
    let name = file
        .file_name()
        .with_context(|| format!("Not a file path: {}", file.display()))?
        .to_string_lossy()
        .to_string();
    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((dir, name))
}

/// Authors of every non-merge commit touching `file`, newest first.
///
/// Duplicates are kept; callers deduplicate.
pub async fn file_authors(file: &Path) -> Result<Vec<AuthorRecord>> {
    let (dir, name) = locate(file)?;
    let output = GitCommand::author_log(&name)
        .current_dir(dir)
        .with_context(file.display().to_string())
        .execute()
        .await?;
    Ok(parse_author_log(&output.stdout))
}

/// Parse `email<TAB>name` lines. Lines without an email are skipped.
pub fn parse_author_log(output: &str) -> Vec<AuthorRecord> {
    output
        .lines()
        .filter_map(|line| {
            let (email, name) = line.split_once('\t').unwrap_or((line, ""));
            let email = email.trim();
            if email.is_empty() {
                return None;
            }
            Some(AuthorRecord {
                email: email.to_string(),
                display_name: name.trim().to_string(),
            })
        })
        .collect()
}

/// Author date of the latest commit touching `file`, or `None` if the file
/// has no history.
pub async fn last_modified(file: &Path) -> Result<Option<DateTime<FixedOffset>>> {
    let (dir, name) = locate(file)?;
    let output = GitCommand::last_commit_date(&name)
        .current_dir(dir)
        .with_context(file.display().to_string())
        .execute_stdout()
        .await?;

    if output.is_empty() {
        return Ok(None);
    }
    let date = DateTime::parse_from_rfc3339(&output)
        .with_context(|| format!("Unexpected date from git log: {output}"))?;
    Ok(Some(date))
}
