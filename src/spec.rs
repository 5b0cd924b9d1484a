//! Language revision labels attached to sample variants.
//!
//! The enumeration is closed and totally ordered from oldest to newest
//! revision, ending in the `experimental` tier. Labels outside it are
//! rejected when parsed so a new dialect can never be silently mis-ordered.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A dialect a sample variant is written against.
///
/// The derived `Ord` follows declaration order, which is the release order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpecLabel {
    /// C++98
    #[serde(rename = "c++98")]
    Cpp98,
    /// C++03
    #[serde(rename = "c++03")]
    Cpp03,
    /// C++11
    #[serde(rename = "c++11")]
    Cpp11,
    /// C++14
    #[serde(rename = "c++14")]
    Cpp14,
    /// C++17
    #[serde(rename = "c++17")]
    Cpp17,
    /// C++20
    #[serde(rename = "c++20")]
    Cpp20,
    /// C++23
    #[serde(rename = "c++23")]
    Cpp23,
    /// Proposals and technical specifications not yet in a published standard.
    #[serde(rename = "experimental")]
    Experimental,
}

impl SpecLabel {
    /// Every label, oldest first.
    pub const ALL: [SpecLabel; 8] = [
        SpecLabel::Cpp98,
        SpecLabel::Cpp03,
        SpecLabel::Cpp11,
        SpecLabel::Cpp14,
        SpecLabel::Cpp17,
        SpecLabel::Cpp20,
        SpecLabel::Cpp23,
        SpecLabel::Experimental,
    ];

    /// The oldest dialect, used when a sample gives no hint at all.
    pub const EARLIEST: SpecLabel = SpecLabel::Cpp98;

    /// Canonical label text as used in filenames and tags.
    pub const fn as_str(self) -> &'static str {
        match self {
            SpecLabel::Cpp98 => "c++98",
            SpecLabel::Cpp03 => "c++03",
            SpecLabel::Cpp11 => "c++11",
            SpecLabel::Cpp14 => "c++14",
            SpecLabel::Cpp17 => "c++17",
            SpecLabel::Cpp20 => "c++20",
            SpecLabel::Cpp23 => "c++23",
            SpecLabel::Experimental => "experimental",
        }
    }

    /// Whether the label denotes a published (non-experimental) dialect.
    pub const fn is_stable(self) -> bool {
        !matches!(self, SpecLabel::Experimental)
    }
}

impl fmt::Display for SpecLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for text that is not a known label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown spec label '{0}'")]
pub struct UnknownSpecLabel(pub String);

impl FromStr for SpecLabel {
    type Err = UnknownSpecLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        SpecLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == normalized)
            .ok_or_else(|| UnknownSpecLabel(s.to_string()))
    }
}

/// Smallest label under the fixed order.
pub fn min_spec<I>(labels: I) -> Option<SpecLabel>
where
    I: IntoIterator<Item = SpecLabel>,
{
    labels.into_iter().min()
}

/// Latest stable label, or the latest overall when none is stable.
pub fn primary_spec<I>(labels: I) -> Option<SpecLabel>
where
    I: IntoIterator<Item = SpecLabel>,
{
    let labels: Vec<SpecLabel> = labels.into_iter().collect();
    labels
        .iter()
        .copied()
        .filter(|label| label.is_stable())
        .max()
        .or_else(|| labels.iter().copied().max())
}
