//! PDF document parser using lopdf.

use std::io::Read;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::detect::{parse_header, read_header};
use crate::error::{Error, Result};
use crate::model::{Bookmark, Document, Metadata, Page};

use super::layout::{decode_text_simple, LayoutAnalyzer};
use super::options::{ErrorMode, ParseOptions};

/// Letter size, used when a page declares no usable MediaBox.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Guards against cyclic `/Next` chains in malformed bookmark trees.
const MAX_BOOKMARKS: usize = 10_000;

/// Recursion limit for `/Kids` chains in name trees.
const MAX_NAME_TREE_DEPTH: usize = 32;

/// PDF document parser.
pub struct PdfParser {
    doc: LopdfDocument,
    options: ParseOptions,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        read_header(path)?;
        let doc = LopdfDocument::load(path)?;
        Ok(Self { doc, options })
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        parse_header(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self { doc, options })
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Parse the document into pages of styled lines.
    pub fn parse(&self) -> Result<Document> {
        let mut document = Document::new();
        document.metadata = self.extract_metadata();

        let page_count = self.page_count();
        if let Some(last) = self.options.pages.last_page().filter(|&p| p > page_count) {
            if self.options.error_mode == ErrorMode::Strict {
                return Err(Error::PageOutOfRange(last, page_count));
            }
            log::warn!("page {} requested but document has {} pages", last, page_count);
        }

        let analyzer = LayoutAnalyzer::new(&self.doc);
        for (page_num, page_id) in self.doc.get_pages() {
            if !self.options.pages.includes(page_num) {
                continue;
            }

            let (width, height) = self.page_dimensions(page_id);
            let mut page = Page::new(page_num, width, height);

            match analyzer.extract_page_lines(page_id, height) {
                Ok(lines) => page.lines = lines,
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Failed to extract text from page {}: {}", page_num, e);
                }
                Err(e) => {
                    return Err(Error::TextExtract(format!("Page {}: {}", page_num, e)));
                }
            }

            log::debug!("page {}: {} lines", page_num, page.lines.len());
            document.add_page(page);
        }

        if self.options.read_bookmarks {
            document.bookmarks = self.extract_bookmarks();
        }

        Ok(document)
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    fn extract_metadata(&self) -> Metadata {
        let mut metadata = Metadata::with_version(self.doc.version.to_string());
        metadata.page_count = self.page_count();
        metadata.encrypted = self.doc.is_encrypted();

        let info = self
            .doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|o| self.resolve_dict(o));
        if let Some(info) = info {
            metadata.title = get_string_from_dict(info, b"Title");
            metadata.author = get_string_from_dict(info, b"Author");
            metadata.subject = get_string_from_dict(info, b"Subject");
            metadata.producer = get_string_from_dict(info, b"Producer");
            metadata.created =
                get_string_from_dict(info, b"CreationDate").and_then(|d| parse_pdf_date(&d));
        }

        metadata
    }

    /// Page size from the MediaBox, inherited through `/Parent` when absent.
    fn page_dimensions(&self, page_id: ObjectId) -> (f32, f32) {
        let mut current = self.doc.get_dictionary(page_id).ok();
        let mut depth = 0;

        while let Some(dict) = current {
            if let Ok(Object::Array(rect)) = dict.get(b"MediaBox").and_then(|o| self.doc.dereference(o).map(|(_, o)| o)) {
                let n: Vec<f32> = rect.iter().filter_map(|o| o.as_float().ok()).collect();
                if let [x0, y0, x1, y1] = n.as_slice() {
                    return ((x1 - x0).abs(), (y1 - y0).abs());
                }
            }
            depth += 1;
            if depth > 32 {
                break;
            }
            current = dict
                .get(b"Parent")
                .ok()
                .and_then(|p| p.as_reference().ok())
                .and_then(|id| self.doc.get_dictionary(id).ok());
        }

        DEFAULT_PAGE_SIZE
    }

    /// Read the catalog's `/Outlines` tree.
    fn extract_bookmarks(&self) -> Vec<Bookmark> {
        let first = self
            .doc
            .catalog()
            .ok()
            .and_then(|catalog| catalog.get(b"Outlines").ok())
            .and_then(|o| self.resolve_dict(o))
            .and_then(|outlines| outlines.get(b"First").ok())
            .and_then(|f| f.as_reference().ok());

        let mut items = Vec::new();
        let mut budget = MAX_BOOKMARKS;
        if let Some(first) = first {
            self.collect_bookmarks(first, 0, &mut items, &mut budget);
        }
        items
    }

    fn collect_bookmarks(
        &self,
        first: ObjectId,
        level: u8,
        items: &mut Vec<Bookmark>,
        budget: &mut usize,
    ) {
        let mut next = Some(first);

        while let Some(item_ref) = next.take() {
            if *budget == 0 {
                log::warn!("bookmark tree truncated after {} entries", MAX_BOOKMARKS);
                return;
            }
            *budget -= 1;

            let Ok(item) = self.doc.get_dictionary(item_ref) else {
                return;
            };
            let title = get_string_from_dict(item, b"Title").unwrap_or_default();
            let mut bookmark = Bookmark::new(title.trim(), self.bookmark_page(item), level);

            if let Ok(child) = item.get(b"First").and_then(|c| c.as_reference()) {
                self.collect_bookmarks(child, level.saturating_add(1), &mut bookmark.children, budget);
            }
            items.push(bookmark);

            next = item.get(b"Next").and_then(|n| n.as_reference()).ok();
        }
    }

    /// Target page of a bookmark, via `/Dest` or a GoTo action's `/D`.
    fn bookmark_page(&self, item: &Dictionary) -> Option<u32> {
        let dest = item.get(b"Dest").ok().or_else(|| {
            item.get(b"A")
                .ok()
                .and_then(|a| self.resolve_dict(a))
                .and_then(|action| action.get(b"D").ok())
        })?;

        let target = self.destination_page(dest)?;

        self.doc
            .get_pages()
            .into_iter()
            .find(|(_, id)| *id == target)
            .map(|(num, _)| num)
    }

    /// Page reference of an explicit or named destination.
    fn destination_page(&self, dest: &Object) -> Option<ObjectId> {
        let (_, dest) = self.doc.dereference(dest).ok()?;
        let dest = match dest {
            Object::Name(name) | Object::String(name, _) => self.named_destination(name)?,
            explicit => explicit,
        };

        let (_, dest) = self.doc.dereference(dest).ok()?;
        let array = match dest {
            // Named destinations may wrap the array as `<< /D [...] >>`
            Object::Dictionary(d) => {
                let (_, inner) = self.doc.dereference(d.get(b"D").ok()?).ok()?;
                inner.as_array().ok()?
            }
            other => other.as_array().ok()?,
        };
        array.first()?.as_reference().ok()
    }

    /// Look a destination name up in the catalog `/Dests` dictionary, then
    /// in the `/Names /Dests` name tree.
    fn named_destination(&self, name: &[u8]) -> Option<&Object> {
        let catalog = self
            .doc
            .trailer
            .get(b"Root")
            .ok()
            .and_then(|r| self.resolve_dict(r))?;

        let legacy = catalog
            .get(b"Dests")
            .ok()
            .and_then(|d| self.resolve_dict(d))
            .and_then(|d| d.get(name).ok());

        legacy.or_else(|| {
            let names = catalog.get(b"Names").ok().and_then(|n| self.resolve_dict(n))?;
            let root = names.get(b"Dests").ok().and_then(|d| self.resolve_dict(d))?;
            self.name_tree_lookup(root, name, 0)
        })
    }

    fn name_tree_lookup<'a>(
        &'a self,
        node: &'a Dictionary,
        name: &[u8],
        depth: usize,
    ) -> Option<&'a Object> {
        if depth > MAX_NAME_TREE_DEPTH {
            log::warn!("name tree deeper than {} levels", MAX_NAME_TREE_DEPTH);
            return None;
        }

        let leaves = node
            .get(b"Names")
            .and_then(|n| self.doc.dereference(n))
            .and_then(|(_, n)| n.as_array());
        if let Ok(pairs) = leaves {
            let found = pairs.chunks_exact(2).find_map(|pair| match &pair[0] {
                Object::String(key, _) if key.as_slice() == name => Some(&pair[1]),
                _ => None,
            });
            if found.is_some() {
                return found;
            }
        }

        let kids = node
            .get(b"Kids")
            .and_then(|k| self.doc.dereference(k))
            .and_then(|(_, k)| k.as_array())
            .ok()?;
        kids.iter()
            .filter_map(|kid| self.resolve_dict(kid))
            .find_map(|kid| self.name_tree_lookup(kid, name, depth + 1))
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match obj {
            Object::Reference(id) => self.doc.get_dictionary(*id).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }
}

/// Helper to get a text string from a PDF dictionary.
fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSS...).
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let field = |range: std::ops::Range<usize>, default: u32| {
        s.get(range).and_then(|v| v.parse().ok()).unwrap_or(default)
    };

    chrono::NaiveDate::from_ymd_opt(year, field(4..6, 1), field(6..8, 1))
        .and_then(|date| date.and_hms_opt(field(8..10, 0), field(10..12, 0), field(12..14, 0)))
        .map(|dt| chrono::DateTime::from_naive_utc_and_offset(dt, chrono::Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_pdf_date() {
        let date = parse_pdf_date("D:20240115103045+01'00'").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
        assert_eq!(date.hour(), 10);
    }

    #[test]
    fn test_parse_pdf_date_minimal() {
        let date = parse_pdf_date("D:2024").unwrap();
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 1);
        assert!(parse_pdf_date("D:20").is_none());
    }

    #[test]
    fn test_from_bytes_rejects_non_pdf() {
        assert!(matches!(
            PdfParser::from_bytes(b"<html></html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(PdfParser::from_bytes(b"").is_err());
    }

    #[test]
    fn test_get_string_from_dict() {
        let mut dict = Dictionary::new();
        dict.set("Title", Object::string_literal("Annual Report"));
        dict.set("Kind", Object::Name(b"Report".to_vec()));
        assert_eq!(get_string_from_dict(&dict, b"Title").as_deref(), Some("Annual Report"));
        assert_eq!(get_string_from_dict(&dict, b"Kind").as_deref(), Some("Report"));
        assert_eq!(get_string_from_dict(&dict, b"Missing"), None);
    }
}
