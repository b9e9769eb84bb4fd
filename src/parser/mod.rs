//! PDF parsing module.

mod layout;
mod options;
mod pdf_parser;

pub use layout::{decode_text_simple, group_spans_into_lines, LayoutAnalyzer};
pub use options::{ErrorMode, PageSelection, ParseOptions};
pub use pdf_parser::PdfParser;
