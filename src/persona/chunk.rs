//! Splitting documents into section-tagged chunks.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{round_size, Document, Tally};
use crate::parser::{ParseOptions, PdfParser};

/// Points above the most common size at which a line starts a new section.
const SECTION_SIZE_MARGIN: i32 = 2;

/// Section title given to plain-text paragraphs.
pub const TEXT_SECTION_TITLE: &str = "Content";

/// A line or paragraph of text with the section it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// File name of the source document
    pub document: String,
    /// 1-based page number
    pub page_number: u32,
    /// Title of the enclosing section
    pub section_title: String,
    /// The chunk text
    pub text: String,
    /// Relevance score, filled in by ranking
    #[serde(default)]
    pub score: f32,
}

impl Chunk {
    /// Create an unscored chunk.
    pub fn new(
        document: impl Into<String>,
        page_number: u32,
        section_title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            document: document.into(),
            page_number,
            section_title: section_title.into(),
            text: text.into(),
            score: 0.0,
        }
    }
}

/// Kinds of documents that can be chunked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Text,
}

impl SourceKind {
    /// Classify a file by its extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "pdf" => Some(SourceKind::Pdf),
            "txt" => Some(SourceKind::Text),
            _ => None,
        }
    }
}

/// Chunk a file by its kind.
pub fn chunk_file(path: &Path, kind: SourceKind) -> Result<Vec<Chunk>> {
    match kind {
        SourceKind::Pdf => chunk_pdf(path),
        SourceKind::Text => chunk_text(path),
    }
}

/// Chunk a PDF file line by line.
pub fn chunk_pdf(path: &Path) -> Result<Vec<Chunk>> {
    let parser = PdfParser::open_with_options(path, ParseOptions::new().lenient())?;
    let doc = parser.parse()?;
    Ok(chunk_document(&doc, &file_name(path)))
}

/// Chunk a parsed document.
///
/// The most common rounded span size is body text. Any line holding a span
/// at least two points larger opens a new section titled by that line; the
/// section before the first such line is named after the document.
pub fn chunk_document(doc: &Document, name: &str) -> Vec<Chunk> {
    let sizes: Tally<i32> = doc
        .pages
        .iter()
        .flat_map(|p| &p.lines)
        .flat_map(|l| &l.spans)
        .map(|s| round_size(s.font_size))
        .collect();

    let Some(&normal_size) = sizes.most_common() else {
        return Vec::new();
    };
    let threshold = normal_size + SECTION_SIZE_MARGIN;

    let mut chunks = Vec::new();
    let mut section = name.to_string();

    for page in &doc.pages {
        for line in &page.lines {
            let text = line.text().trim().to_string();
            if text.is_empty() {
                continue;
            }
            if line.spans.iter().any(|s| round_size(s.font_size) >= threshold) {
                section = text.clone();
            }
            chunks.push(Chunk::new(name, page.number, section.clone(), text));
        }
    }

    chunks
}

/// Chunk a UTF-8 text file into blank-line separated paragraphs.
pub fn chunk_text(path: &Path) -> Result<Vec<Chunk>> {
    let content = fs::read_to_string(path)?;
    Ok(chunk_paragraphs(&content, &file_name(path)))
}

/// Split text on blank lines; every paragraph lands on page 1.
pub fn chunk_paragraphs(content: &str, name: &str) -> Vec<Chunk> {
    content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| Chunk::new(name, 1, TEXT_SECTION_TITLE, p))
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Page, TextLine, TextSpan};

    fn line(text: &str, y: f32, size: f32) -> TextLine {
        TextLine::from_spans(vec![TextSpan::new(text, 72.0, y, size, "Helvetica")], 792.0)
    }

    #[test]
    fn test_chunk_document_tracks_sections() {
        let mut doc = Document::new();
        let mut page1 = Page::letter(1);
        page1.add_line(line("Preface text", 740.0, 10.0));
        page1.add_line(line("Beaches", 700.0, 14.0));
        page1.add_line(line("Sand and sun", 680.0, 10.0));
        doc.add_page(page1);
        let mut page2 = Page::letter(2);
        page2.add_line(line("   ", 740.0, 10.0));
        page2.add_line(line("More sand", 720.0, 10.5));
        doc.add_page(page2);

        let chunks = chunk_document(&doc, "trip.pdf");
        let got: Vec<_> = chunks
            .iter()
            .map(|c| (c.page_number, c.section_title.as_str(), c.text.as_str()))
            .collect();
        assert_eq!(
            got,
            [
                (1, "trip.pdf", "Preface text"),
                (1, "Beaches", "Beaches"),
                (1, "Beaches", "Sand and sun"),
                (2, "Beaches", "More sand"),
            ]
        );
    }

    #[test]
    fn test_chunk_document_keeps_word_breaks_between_spans() {
        let mut doc = Document::new();
        let mut page = Page::letter(1);
        page.add_line(TextLine::from_spans(
            vec![
                TextSpan::new("Beach", 72.0, 700.0, 14.0, "Helvetica"),
                TextSpan::new("activities", 115.0, 700.0, 14.0, "Helvetica"),
            ],
            792.0,
        ));
        page.add_line(TextLine::from_spans(
            vec![
                TextSpan::new("Swim", 72.0, 680.0, 10.0, "Helvetica"),
                TextSpan::new("daily", 100.0, 680.0, 10.0, "Helvetica"),
            ],
            792.0,
        ));
        page.add_line(line("Body", 660.0, 10.0));
        doc.add_page(page);

        let chunks = chunk_document(&doc, "trip.pdf");
        assert_eq!(chunks[0].section_title, "Beach activities");
        assert_eq!(chunks[1].text, "Swim daily");
    }

    #[test]
    fn test_chunk_document_without_text() {
        let mut doc = Document::new();
        doc.add_page(Page::letter(1));
        assert!(chunk_document(&doc, "blank.pdf").is_empty());
    }

    #[test]
    fn test_chunk_paragraphs() {
        let chunks = chunk_paragraphs("First para\nstill first\n\n\n\n  Second  \n\n", "notes.txt");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "First para\nstill first");
        assert_eq!(chunks[1].text, "Second");
        assert!(chunks.iter().all(|c| c.page_number == 1 && c.section_title == "Content"));
    }

    #[test]
    fn test_source_kind() {
        assert_eq!(SourceKind::from_path(Path::new("a.PDF")), Some(SourceKind::Pdf));
        assert_eq!(SourceKind::from_path(Path::new("a.txt")), Some(SourceKind::Text));
        assert_eq!(SourceKind::from_path(Path::new("a.docx")), None);
        assert_eq!(SourceKind::from_path(Path::new("README")), None);
    }
}
