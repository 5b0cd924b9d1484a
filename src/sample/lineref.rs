//! Line references inside intent and description text.
//!
//! Authors point at code with `[N]`, `[!N]` (capitalized when rendered, for
//! the start of a sentence), `[N-M]` and `[!N-M]`, where the numbers count
//! lines of the sample file. Renderers number the emitted code block from 1,
//! so each reference is shifted by the record's `code_offset`.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static LINE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(!)?(\d+)(?:-(\d+))?\]").expect("line reference pattern is valid")
});

/// One line reference found in a block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRef {
    /// Byte range of the whole reference (brackets included) in the source text.
    pub span: Range<usize>,
    /// Whether the reference was written with `!`.
    pub capitalize: bool,
    /// First referenced line, relative to the code block.
    pub start: usize,
    /// Last referenced line for range references.
    pub end: Option<usize>,
}

/// Find every line reference in `text`, translated by `code_offset`.
///
/// References that point into the header end up as 0 and are logged.
pub fn line_refs(text: &str, code_offset: usize) -> Vec<LineRef> {
    LINE_REF_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let start = caps.get(2)?.as_str().parse::<usize>().ok()?;
            let end = match caps.get(3) {
                Some(m) => Some(m.as_str().parse::<usize>().ok()?),
                None => None,
            };

            Some(LineRef {
                span: whole.range(),
                capitalize: caps.get(1).is_some(),
                start: shift(start, code_offset),
                end: end.map(|end| shift(end, code_offset)),
            })
        })
        .collect()
}

fn shift(line: usize, code_offset: usize) -> usize {
    if line <= code_offset {
        tracing::warn!(
            target: "sample",
            "Line reference [{}] points before the code block (offset {})",
            line,
            code_offset
        );
    }
    line.saturating_sub(code_offset)
}

/// Rewrite every line reference in `text` with translated line numbers.
pub fn translate_line_refs(text: &str, code_offset: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for line_ref in line_refs(text, code_offset) {
        out.push_str(&text[cursor..line_ref.span.start]);
        out.push('[');
        if line_ref.capitalize {
            out.push('!');
        }
        out.push_str(&line_ref.start.to_string());
        if let Some(end) = line_ref.end {
            out.push('-');
            out.push_str(&end.to_string());
        }
        out.push(']');
        cursor = line_ref.span.end;
    }

    out.push_str(&text[cursor..]);
    out
}
