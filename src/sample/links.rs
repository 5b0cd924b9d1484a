//! Shorthand links to the C++ reference.
//!
//! Intent and description text may link with `[std::sort](cpp/algorithm/sort)`
//! (or a `c/...` path for the C library). The target is a page path on
//! cppreference.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::constants::CPPREFERENCE_BASE;

static REFERENCE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(.+?)\]\((c(?:pp)?/.+?)\)").expect("reference link pattern is valid")
});

/// One shorthand reference link found in a block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceLink {
    /// Byte range of the whole link in the source text.
    pub span: Range<usize>,
    /// Link text between the brackets.
    pub text: String,
    /// Page path, e.g. `cpp/algorithm/sort`.
    pub page: String,
}

impl ReferenceLink {
    /// Absolute URL of the referenced page.
    pub fn url(&self) -> String {
        format!("{CPPREFERENCE_BASE}{}", self.page)
    }
}

/// Find every `[text](cpp/...)` or `[text](c/...)` link in `text`.
pub fn reference_links(text: &str) -> Vec<ReferenceLink> {
    REFERENCE_LINK_RE
        .captures_iter(text)
        .filter_map(|caps| {
            Some(ReferenceLink {
                span: caps.get(0)?.range(),
                text: caps.get(1)?.as_str().to_string(),
                page: caps.get(2)?.as_str().to_string(),
            })
        })
        .collect()
}

/// Rewrite shorthand links as markdown links with absolute URLs.
pub fn expand_reference_links(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for link in reference_links(text) {
        out.push_str(&text[cursor..link.span.start]);
        out.push_str(&format!("[{}]({})", link.text, link.url()));
        cursor = link.span.end;
    }

    out.push_str(&text[cursor..]);
    out
}
