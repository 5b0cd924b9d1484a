//! Line-oriented parser for sample files.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use super::SampleRecord;
use crate::core::CatalogError;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^//\s*(.*)$").expect("comment pattern is valid"));

/// Text of a single-line comment with the marker and surrounding whitespace
/// removed, or `None` when the line is not a comment.
///
/// An empty comment (`//`) yields `Some("")`.
pub fn comment_text(line: &str) -> Option<&str> {
    COMMENT_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end())
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Parse one sample file.
///
/// # Errors
///
/// Returns [`CatalogError::MalformedSample`] when the file is empty or its
/// first non-blank line is not a non-empty `//` comment.
pub fn parse(contents: &str, file_path: &Path) -> Result<SampleRecord, CatalogError> {
    let all: Vec<&str> = contents.lines().collect();

    let Some(first) = all.iter().position(|line| !is_blank(line)) else {
        return Err(malformed(file_path, "file is empty"));
    };
    let last = all.iter().rposition(|line| !is_blank(line)).unwrap_or(first);
    let lines = &all[first..=last];

    let title = match comment_text(lines[0]) {
        Some(title) if !title.is_empty() => title.to_string(),
        Some(_) => return Err(malformed(file_path, "title comment is empty")),
        None => return Err(malformed(file_path, "first line is not a '//' title comment")),
    };

    let (tags, code_start) = match lines.get(1).and_then(|line| comment_text(line)) {
        Some(text) if !text.is_empty() => (parse_tags(text), 2),
        _ => (Vec::new(), 1),
    };

    let body_start = trailing_body_start(lines, code_start);
    let body: Vec<&str> =
        lines[body_start..].iter().map(|line| comment_text(line).unwrap_or("")).collect();
    let (intent, description) = split_body(&body);

    let code_region = &lines[code_start..body_start];
    let (code, code_offset) = match code_region.iter().position(|line| !is_blank(line)) {
        Some(lead) => {
            let trail = code_region.iter().rposition(|line| !is_blank(line)).unwrap_or(lead);
            (join_lines(&code_region[lead..=trail]), code_start + lead)
        }
        None => (String::new(), code_start),
    };

    tracing::trace!(
        target: "sample",
        "Parsed {}: title={:?}, {} tag(s), code at line {}",
        file_path.display(),
        title,
        tags.len(),
        code_offset
    );

    Ok(SampleRecord {
        title,
        tags,
        code,
        code_offset,
        intent,
        description,
        file_path: file_path.to_path_buf(),
    })
}

fn malformed(path: &Path, reason: &str) -> CatalogError {
    CatalogError::MalformedSample {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Index of the first line of the trailing comment block.
///
/// Walks backward over comment and blank lines but never below `floor`, then
/// moves forward to the first comment with text so the block always opens
/// with its intent. Returns `lines.len()` when there is no trailing block.
fn trailing_body_start(lines: &[&str], floor: usize) -> usize {
    let mut start = lines.len();
    while start > floor {
        let line = lines[start - 1];
        if is_blank(line) || comment_text(line).is_some() {
            start -= 1;
        } else {
            break;
        }
    }

    while start < lines.len() && comment_text(lines[start]).is_none_or(str::is_empty) {
        start += 1;
    }

    start
}

fn split_body(body: &[&str]) -> (String, String) {
    match body.iter().position(|line| is_blank(line)) {
        Some(split) => {
            let rest = &body[split + 1..];
            let description = match rest.iter().position(|line| !is_blank(line)) {
                Some(lead) => {
                    let trail = rest.iter().rposition(|line| !is_blank(line)).unwrap_or(lead);
                    join_lines(&rest[lead..=trail])
                }
                None => String::new(),
            };
            (join_lines(&body[..split]), description)
        }
        None => (join_lines(body), String::new()),
    }
}

fn join_lines(lines: &[&str]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}
