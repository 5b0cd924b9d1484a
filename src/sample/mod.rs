//! Sample file parsing.
//!
//! A sample file is plain C++ wrapped in line comments:
//!
//! ```text
//! // Sort a range                      <- title
//! // algorithms, ranges                <- optional tag line
//!
//! #include <algorithm>                 <- code
//! ...
//!
//! // Use std::sort to sort [5-6].      <- intent
//! //
//! // The comparison defaults to ...    <- description
//! ```
//!
//! [`parse`] turns one file into a [`SampleRecord`]. Parsing is pure and
//! stateless, so files can be parsed in any order.

mod lineref;
mod links;
mod parser;

pub use lineref::{LineRef, line_refs, translate_line_refs};
pub use links::{ReferenceLink, expand_reference_links, reference_links};
pub use parser::{comment_text, parse};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Structured metadata and code extracted from one sample file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Text of the header comment, trailing whitespace trimmed.
    pub title: String,
    /// Lower-cased tags from the optional second comment line, in file order.
    pub tags: Vec<String>,
    /// The code block, blank lines stripped at both edges, every line newline-terminated.
    pub code: String,
    /// 0-based index of the first code line within the edge-stripped file.
    pub code_offset: usize,
    /// First paragraph of the trailing comment block.
    pub intent: String,
    /// Remaining paragraphs of the trailing comment block.
    pub description: String,
    /// Path the record was parsed from.
    pub file_path: PathBuf,
}

impl SampleRecord {
    /// Number of lines in the code block.
    pub fn code_line_count(&self) -> usize {
        self.code.lines().count()
    }

    /// Intent with line references translated into code block coordinates.
    pub fn intent_text(&self) -> String {
        translate_line_refs(&self.intent, self.code_offset)
    }

    /// Description with line references translated into code block coordinates.
    pub fn description_text(&self) -> String {
        translate_line_refs(&self.description, self.code_offset)
    }
}
