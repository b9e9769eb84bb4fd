//! The structured outline written for each document.

use serde::{Deserialize, Serialize};

/// Heading depth in the emitted outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Map a zero-based nesting depth to a level, if it fits in three.
    pub fn from_depth(depth: u8) -> Option<Self> {
        match depth {
            0 => Some(HeadingLevel::H1),
            1 => Some(HeadingLevel::H2),
            2 => Some(HeadingLevel::H3),
            _ => None,
        }
    }
}

impl std::fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        };
        f.write_str(s)
    }
}

/// One outline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
    /// 1-based page number
    pub page: u32,
}

/// Document title plus its headings in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub outline: Vec<Heading>,
}

impl Outline {
    /// Title used when a document has no text at all.
    pub const EMPTY_TITLE: &'static str = "Empty Document";

    /// Title used when the first page has no text.
    pub const UNTITLED: &'static str = "Untitled Document";

    /// An outline with a title and no headings.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            outline: Vec::new(),
        }
    }

    /// The outline of a document without any text.
    pub fn empty_document() -> Self {
        Self::titled(Self::EMPTY_TITLE)
    }

    /// Number of headings at `level`.
    pub fn count(&self, level: HeadingLevel) -> usize {
        self.outline.iter().filter(|h| h.level == level).count()
    }
}
