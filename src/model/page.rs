//! Page-level types.

use serde::{Deserialize, Serialize};

use super::TextLine;

/// A single page in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Text lines in reading order
    pub lines: Vec<TextLine>,
}

impl Page {
    /// Create a new page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            lines: Vec::new(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Add a line to the page.
    pub fn add_line(&mut self, line: TextLine) {
        self.lines.push(line);
    }

    /// Check if the page has no text.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
