//! Synthetic PDF fixtures built with lopdf.

#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const TOP_MARGIN: i64 = 740;
const LEFT_MARGIN: i64 = 72;

/// One line of text: content, font size and weight.
#[derive(Debug, Clone)]
pub struct Line {
    pub text: String,
    pub size: i64,
    pub bold: bool,
}

pub fn body(text: &str) -> Line {
    Line {
        text: text.to_string(),
        size: 10,
        bold: false,
    }
}

pub fn heading(text: &str, size: i64) -> Line {
    Line {
        text: text.to_string(),
        size,
        bold: true,
    }
}

/// How bookmarks point at their pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DestStyle {
    /// `/Dest [page /Fit]`
    #[default]
    Explicit,
    /// `/Dest /pageN`, resolved through the catalog `/Dests` dictionary
    Dests,
    /// `/Dest (pageN)`, resolved through the `/Names /Dests` name tree
    NameTree,
}

/// Builds a PDF page by page, one line per text object, top to bottom.
#[derive(Debug, Default)]
pub struct PdfBuilder {
    pages: Vec<Vec<Line>>,
    bookmarks: Vec<(String, usize, Vec<(String, usize)>)>,
    title: Option<String>,
    dest_style: DestStyle,
    raw_pages: Vec<Vec<u8>>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, lines: Vec<Line>) -> Self {
        self.pages.push(lines);
        self
    }

    /// Add a top-level bookmark pointing at `page` (1-based) with optional children.
    pub fn bookmark(mut self, title: &str, page: usize, children: &[(&str, usize)]) -> Self {
        let children = children
            .iter()
            .map(|(t, p)| (t.to_string(), *p))
            .collect();
        self.bookmarks.push((title.to_string(), page, children));
        self
    }

    /// Add a page whose content stream is taken as-is.
    pub fn raw_page(mut self, content: &[u8]) -> Self {
        self.raw_pages.push(content.to_vec());
        self
    }

    pub fn dest_style(mut self, style: DestStyle) -> Self {
        self.dest_style = style;
        self
    }

    pub fn info_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn build(&self) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular,
                "F2" => bold,
            },
        });

        let mut page_ids: Vec<ObjectId> = Vec::new();
        let contents = self
            .pages
            .iter()
            .map(|lines| page_content(lines))
            .chain(self.raw_pages.iter().cloned());
        for content in contents {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            page_ids.push(page_id);
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => page_ids.len() as i64,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if !self.bookmarks.is_empty() {
            let outlines_id = self.add_bookmarks(&mut doc, &page_ids);
            catalog.set("Outlines", outlines_id);
        }
        match self.dest_style {
            DestStyle::Explicit => {}
            DestStyle::Dests => {
                let mut dests = lopdf::Dictionary::new();
                for (i, id) in page_ids.iter().enumerate() {
                    dests.set(dest_name(i + 1), fit(*id));
                }
                let dests_id = doc.add_object(dests);
                catalog.set("Dests", dests_id);
            }
            DestStyle::NameTree => {
                let names: Vec<Object> = page_ids
                    .iter()
                    .enumerate()
                    .flat_map(|(i, id)| {
                        [Object::string_literal(dest_name(i + 1)), fit(*id)]
                    })
                    .collect();
                let leaf_id = doc.add_object(dictionary! { "Names" => names });
                catalog.set(
                    "Names",
                    dictionary! {
                        "Dests" => dictionary! { "Kids" => vec![Object::Reference(leaf_id)] },
                    },
                );
            }
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        if let Some(title) = &self.title {
            let info_id = doc.add_object(dictionary! {
                "Title" => Object::string_literal(title.as_str()),
                "Producer" => Object::string_literal("fixture"),
            });
            doc.trailer.set("Info", info_id);
        }

        doc
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut doc = self.build();
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    pub fn save(&self, path: &Path) {
        std::fs::write(path, self.to_bytes()).unwrap();
    }

    fn add_bookmarks(&self, doc: &mut Document, page_ids: &[ObjectId]) -> ObjectId {
        let outlines_id = doc.new_object_id();
        let top = self
            .bookmarks
            .iter()
            .map(|(title, page, children)| {
                let item_id = doc.new_object_id();
                let kids: Vec<ObjectId> = children
                    .iter()
                    .map(|(t, p)| {
                        let dest = self.destination(page_ids, *p);
                        outline_item(doc, t, dest, item_id)
                    })
                    .collect();
                let mut item = dictionary! {
                    "Title" => Object::string_literal(title.as_str()),
                    "Parent" => outlines_id,
                    "Dest" => self.destination(page_ids, *page),
                };
                link_siblings(doc, &kids);
                if let (Some(first), Some(last)) = (kids.first(), kids.last()) {
                    item.set("First", *first);
                    item.set("Last", *last);
                    item.set("Count", kids.len() as i64);
                }
                doc.objects.insert(item_id, Object::Dictionary(item));
                item_id
            })
            .collect::<Vec<_>>();
        link_siblings(doc, &top);

        let outlines = dictionary! {
            "Type" => "Outlines",
            "First" => top[0],
            "Last" => top[top.len() - 1],
            "Count" => top.len() as i64,
        };
        doc.objects.insert(outlines_id, Object::Dictionary(outlines));
        outlines_id
    }

    /// Bookmark destination for a 1-based page number.
    fn destination(&self, page_ids: &[ObjectId], page: usize) -> Object {
        match self.dest_style {
            DestStyle::Explicit => fit(page_ids[page - 1]),
            DestStyle::Dests => Object::Name(dest_name(page).into_bytes()),
            DestStyle::NameTree => Object::string_literal(dest_name(page)),
        }
    }
}

fn dest_name(page: usize) -> String {
    format!("page{}", page)
}

fn fit(page: ObjectId) -> Object {
    Object::Array(vec![Object::Reference(page), "Fit".into()])
}

fn outline_item(doc: &mut Document, title: &str, dest: Object, parent: ObjectId) -> ObjectId {
    doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Parent" => parent,
        "Dest" => dest,
    })
}

fn link_siblings(doc: &mut Document, ids: &[ObjectId]) {
    for pair in ids.windows(2) {
        if let Ok(dict) = doc.get_dictionary_mut(pair[0]) {
            dict.set("Next", pair[1]);
        }
        if let Ok(dict) = doc.get_dictionary_mut(pair[1]) {
            dict.set("Prev", pair[0]);
        }
    }
}

fn page_content(lines: &[Line]) -> Vec<u8> {
    let mut operations = Vec::new();
    let mut y = TOP_MARGIN;
    for line in lines {
        let font = if line.bold { "F2" } else { "F1" };
        operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.into(), line.size.into()]),
            Operation::new("Td", vec![LEFT_MARGIN.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(line.text.as_str())]),
            Operation::new("ET", vec![]),
        ]);
        y -= line.size + 8;
    }
    Content { operations }.encode().unwrap()
}

/// A two-page report with numbered headings and a subsection.
pub fn report_pdf() -> PdfBuilder {
    PdfBuilder::new()
        .info_title("Annual Report 2024")
        .page(vec![
            heading("Annual Report", 24),
            body("Prepared for the board of directors"),
            heading("1. Introduction", 16),
            body("This report summarises the year."),
            body("Revenue grew in every region."),
            body("Costs were held flat."),
        ])
        .page(vec![
            heading("1.1 Background", 13),
            body("The company was founded in 1998."),
            body("It operates in twelve countries."),
            heading("2. Results", 16),
            body("Net income doubled."),
            heading("Summary of findings.", 13),
            body("See the appendix for details."),
        ])
}
