//! # pdfoutline
//!
//! Document outline extraction for PDF files.
//!
//! This library reads the text layout of a PDF, infers its title and H1–H3
//! headings from font styles, and writes the result as JSON. It also ranks
//! the sections of a document collection by relevance to a persona.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{outline_file, render};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let outline = outline_file("document.pdf")?;
//!     println!("{}", render::to_json(&outline, render::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! Every PDF of a directory can be processed at once:
//!
//! ```no_run
//! use pdfoutline::{batch, BatchConfig};
//!
//! let report = batch::process_directory(&BatchConfig::from_env())?;
//! println!("{} of {} files written", report.processed.len(), report.total());
//! # Ok::<(), pdfoutline::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Style-based headings**: the most common line style is body text, numbered lines anchor H1
//! - **Bookmarks**: embedded outlines can replace or back up the heuristic
//! - **CJK support**: no spurious spaces between Chinese, Japanese or Korean glyphs
//! - **Parallel processing**: Rayon spreads a batch across cores
//! - **Persona ranking**: sections scored against a role and task

pub mod batch;
pub mod config;
pub mod detect;
pub mod error;
pub mod model;
pub mod outline;
pub mod parser;
pub mod persona;
pub mod render;

// Re-export commonly used types
pub use batch::{process_directory, BatchEvent, BatchReport};
pub use config::BatchConfig;
pub use detect::{has_pdf_extension, is_pdf_bytes, PdfHeader};
pub use error::{Error, Result};
pub use model::{
    Bookmark, Document, Heading, HeadingLevel, Metadata, Outline, Page, Style, TextLine, TextSpan,
};
pub use outline::{extract_outline, OutlineOptions, OutlineStrategy};
pub use parser::{ErrorMode, PageSelection, ParseOptions, PdfParser};
pub use render::JsonFormat;

use std::io::Read;
use std::path::Path;

/// Parse a PDF file and return its text layout.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::parse_file;
///
/// let doc = parse_file("document.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let parser = PdfParser::open(path)?;
    parser.parse()
}

/// Parse a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{parse_file_with_options, PageSelection, ParseOptions};
///
/// let options = ParseOptions::new()
///     .lenient()
///     .with_pages(PageSelection::Range(1..=3));
/// let doc = parse_file_with_options("document.pdf", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    let parser = PdfParser::open_with_options(path, options)?;
    parser.parse()
}

/// Parse a PDF from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    let parser = PdfParser::from_bytes(data)?;
    parser.parse()
}

/// Parse a PDF from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    let parser = PdfParser::from_reader(reader)?;
    parser.parse()
}

/// Extract the outline of a PDF file with the heuristic strategy.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::outline_file;
///
/// let outline = outline_file("document.pdf").unwrap();
/// for heading in &outline.outline {
///     println!("{} {} (p. {})", heading.level, heading.text, heading.page);
/// }
/// ```
pub fn outline_file<P: AsRef<Path>>(path: P) -> Result<Outline> {
    outline::extract_outline_from_file(path, &OutlineOptions::default())
}

/// Extract the outline of a PDF file with custom options.
pub fn outline_file_with_options<P: AsRef<Path>>(
    path: P,
    options: &OutlineOptions,
) -> Result<Outline> {
    outline::extract_outline_from_file(path, options)
}

/// Extract the outline of a PDF file as a JSON string.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let outline = outline_file(path)?;
    render::to_json(&outline, format)
}
