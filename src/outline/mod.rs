//! Outline extraction.
//!
//! The default strategy infers headings from font styles. Documents that
//! ship a bookmark tree can use it instead, or let [`OutlineStrategy::Auto`]
//! pick whichever is available.

mod detector;

pub use detector::{analyze, detect_headings, OutlineAnalysis};

use std::path::Path;

use crate::error::Result;
use crate::model::{Document, Heading, HeadingLevel, Outline};
use crate::parser::{ParseOptions, PdfParser};

/// Where headings come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlineStrategy {
    /// Infer headings from line styles
    #[default]
    Heuristic,
    /// Use the embedded bookmark tree (top three levels)
    Bookmarks,
    /// Bookmarks when the document has any, styles otherwise
    Auto,
}

/// Options for outline extraction.
#[derive(Debug, Clone, Default)]
pub struct OutlineOptions {
    /// Heading source
    pub strategy: OutlineStrategy,
    /// Parser settings
    pub parse: ParseOptions,
}

impl OutlineOptions {
    /// Create new outline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heading source.
    pub fn with_strategy(mut self, strategy: OutlineStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set parser options.
    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    /// Parser options with bookmark reading switched on when the strategy needs it.
    fn effective_parse_options(&self) -> ParseOptions {
        let wants_bookmarks = self.strategy != OutlineStrategy::Heuristic;
        self.parse
            .clone()
            .with_bookmarks(self.parse.read_bookmarks || wants_bookmarks)
    }
}

/// Extract the outline of an already parsed document.
pub fn extract_outline(doc: &Document, strategy: OutlineStrategy) -> Outline {
    match strategy {
        OutlineStrategy::Heuristic => detect_headings(doc),
        OutlineStrategy::Bookmarks => outline_from_bookmarks(doc),
        OutlineStrategy::Auto => {
            let from_bookmarks = outline_from_bookmarks(doc);
            if from_bookmarks.outline.is_empty() {
                detect_headings(doc)
            } else {
                from_bookmarks
            }
        }
    }
}

/// Parse a PDF file and extract its outline.
pub fn extract_outline_from_file<P: AsRef<Path>>(path: P, options: &OutlineOptions) -> Result<Outline> {
    let parser = PdfParser::open_with_options(path, options.effective_parse_options())?;
    let doc = parser.parse()?;
    Ok(extract_outline(&doc, options.strategy))
}

/// Parse PDF bytes and extract the outline.
pub fn extract_outline_from_bytes(data: &[u8], options: &OutlineOptions) -> Result<Outline> {
    let parser = PdfParser::from_bytes_with_options(data, options.effective_parse_options())?;
    let doc = parser.parse()?;
    Ok(extract_outline(&doc, options.strategy))
}

/// Headings from bookmarks that point at a page and sit in the top three levels.
///
/// The title still comes from style analysis so both strategies agree on it.
fn outline_from_bookmarks(doc: &Document) -> Outline {
    let title = detect_headings(doc).title;
    let outline = doc
        .flat_bookmarks()
        .into_iter()
        .filter(|b| !b.title.is_empty())
        .filter_map(|b| {
            Some(Heading {
                level: HeadingLevel::from_depth(b.level)?,
                text: b.title.clone(),
                page: b.page?,
            })
        })
        .collect();

    Outline { title, outline }
}
