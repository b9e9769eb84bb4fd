//! Dominant-style heading detection.
//!
//! Every line is reduced to its dominant style. The most frequent style is
//! body text; everything else is a heading candidate. The H1 style is
//! anchored on numbered headings ("1. Introduction") when the document has
//! them, and the remaining candidate styles are ranked below it by size.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::{Document, Heading, HeadingLevel, Outline, Style, Tally};

/// Lines with this many words or more are prose, not headings.
const MAX_HEADING_WORDS: usize = 40;

fn numbered_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.[\sA-Z]").expect("valid regex"))
}

fn numbered_subheading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+").expect("valid regex"))
}

/// A non-empty line reduced to what heading detection looks at.
#[derive(Debug, Clone)]
struct StyledLine {
    text: String,
    style: Style,
    page: u32,
    top: f32,
}

/// Outline plus the style decisions that produced it.
#[derive(Debug, Clone)]
pub struct OutlineAnalysis {
    /// The detected outline
    pub outline: Outline,
    /// Most frequent line style
    pub body_style: Option<Style>,
    /// Style anchoring the H1 level
    pub h1_style: Option<Style>,
    /// Candidate styles that received a level, in first-seen order
    pub level_styles: Vec<(Style, HeadingLevel)>,
    /// Number of non-empty lines considered
    pub line_count: usize,
}

impl OutlineAnalysis {
    fn without_headings(outline: Outline, body_style: Option<Style>, line_count: usize) -> Self {
        Self {
            outline,
            body_style,
            h1_style: None,
            level_styles: Vec::new(),
            line_count,
        }
    }
}

/// Detect the title and H1–H3 headings of a document from its line styles.
pub fn detect_headings(doc: &Document) -> Outline {
    analyze(doc).outline
}

/// Run heading detection and keep the intermediate style decisions.
pub fn analyze(doc: &Document) -> OutlineAnalysis {
    let lines = collect_lines(doc);
    if lines.is_empty() {
        return OutlineAnalysis::without_headings(Outline::empty_document(), None, 0);
    }

    let style_counts: Tally<Style> = lines.iter().map(|l| l.style).collect();
    let body_style = style_counts.most_common().copied();
    let title = find_title(&lines);

    let candidates: Vec<&StyledLine> = lines
        .iter()
        .filter(|l| Some(l.style) != body_style && l.text != title)
        .collect();

    let Some(h1_style) = pick_h1_style(&candidates) else {
        return OutlineAnalysis::without_headings(Outline::titled(title), body_style, lines.len());
    };
    log::debug!("body style {:?}, h1 style {:?}", body_style, h1_style);

    // Group plausible heading lines by style, keeping first-seen order
    let mut group_index: HashMap<Style, usize> = HashMap::new();
    let mut groups: Vec<(Style, Vec<&StyledLine>)> = Vec::new();
    for line in candidates.iter().copied().filter(|l| looks_like_heading(&l.text)) {
        let i = *group_index.entry(line.style).or_insert_with(|| {
            groups.push((line.style, Vec::new()));
            groups.len() - 1
        });
        groups[i].1.push(line);
    }

    let level_styles = assign_levels(groups.iter().map(|(s, _)| *s), h1_style.size);

    let mut entries: Vec<(HeadingLevel, &StyledLine)> = Vec::new();
    for (style, members) in &groups {
        if let Some((_, level)) = level_styles.iter().find(|(s, _)| s == style) {
            entries.extend(members.iter().map(|line| (*level, *line)));
        }
    }
    entries.sort_by(|(_, a), (_, b)| {
        a.page
            .cmp(&b.page)
            .then(a.top.partial_cmp(&b.top).unwrap_or(std::cmp::Ordering::Equal))
    });

    let outline = Outline {
        title,
        outline: entries
            .into_iter()
            .map(|(level, line)| Heading {
                level,
                text: line.text.clone(),
                page: line.page,
            })
            .collect(),
    };

    OutlineAnalysis {
        outline,
        body_style,
        h1_style: Some(h1_style),
        level_styles,
        line_count: lines.len(),
    }
}

fn collect_lines(doc: &Document) -> Vec<StyledLine> {
    let mut lines = Vec::new();
    for page in &doc.pages {
        for line in &page.lines {
            let Some(style) = line.dominant_style() else {
                continue;
            };
            let text = line.text().trim().to_string();
            if text.is_empty() {
                continue;
            }
            lines.push(StyledLine {
                text,
                style,
                page: page.number,
                top: line.bbox.top,
            });
        }
    }
    lines
}

/// The largest line on page one; the earliest wins among equals.
fn find_title(lines: &[StyledLine]) -> String {
    let mut best: Option<&StyledLine> = None;
    for line in lines.iter().filter(|l| l.page == 1) {
        if best.map_or(true, |b| line.style.size > b.style.size) {
            best = Some(line);
        }
    }
    best.map_or_else(|| Outline::UNTITLED.to_string(), |l| l.text.clone())
}

/// Prefer the style of numbered top-level headings; otherwise the most common candidate style.
fn pick_h1_style(candidates: &[&StyledLine]) -> Option<Style> {
    let numbered: Tally<Style> = candidates
        .iter()
        .filter(|l| numbered_heading().is_match(&l.text) && !numbered_subheading().is_match(&l.text))
        .map(|l| l.style)
        .collect();

    if let Some(style) = numbered.most_common() {
        return Some(*style);
    }

    let all: Tally<Style> = candidates.iter().map(|l| l.style).collect();
    all.most_common().copied()
}

fn looks_like_heading(text: &str) -> bool {
    text.split_whitespace().count() < MAX_HEADING_WORDS && !text.ends_with(['.', ':'])
}

/// Styles at least as large as H1 become H1; the two largest smaller sizes become H2 and H3.
fn assign_levels(
    styles: impl Iterator<Item = Style> + Clone,
    h1_size: i32,
) -> Vec<(Style, HeadingLevel)> {
    let mut levels: Vec<(Style, HeadingLevel)> = styles
        .clone()
        .filter(|s| s.size >= h1_size)
        .map(|s| (s, HeadingLevel::H1))
        .collect();

    let mut smaller: Vec<Style> = styles.filter(|s| s.size < h1_size).collect();
    smaller.sort_by(|a, b| b.size.cmp(&a.size));
    levels.extend(smaller.into_iter().zip([HeadingLevel::H2, HeadingLevel::H3]));

    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Page, TextLine, TextSpan};

    /// Build a document from `(page, text, size, bold)` rows laid out top-down.
    fn doc(rows: &[(u32, &str, f32, bool)]) -> Document {
        let mut doc = Document::new();
        let mut y = 760.0;
        for &(page_num, text, size, bold) in rows {
            if doc.get_page(page_num).is_none() {
                doc.add_page(Page::letter(page_num));
                y = 760.0;
            }
            let font = if bold { "Helvetica-Bold" } else { "Helvetica" };
            let line = TextLine::from_spans(vec![TextSpan::new(text, 72.0, y, size, font)], 792.0);
            y -= size * 1.6;
            doc.pages.last_mut().unwrap().add_line(line);
        }
        doc
    }

    const BODY: &str = "Body text that runs along for a while without ending";

    #[test]
    fn test_empty_document() {
        let outline = detect_headings(&Document::new());
        assert_eq!(outline, Outline::empty_document());
    }

    #[test]
    fn test_title_is_largest_page_one_line() {
        let d = doc(&[
            (1, "Small intro", 10.0, false),
            (1, "The Real Title", 24.0, true),
            (1, BODY, 10.0, false),
            (1, BODY, 10.0, false),
        ]);
        let outline = detect_headings(&d);
        assert_eq!(outline.title, "The Real Title");
    }

    #[test]
    fn test_untitled_when_page_one_is_blank() {
        let mut d = doc(&[(2, "Heading", 18.0, true), (2, BODY, 10.0, false), (2, BODY, 10.0, false)]);
        d.pages.insert(0, Page::letter(1));
        let outline = detect_headings(&d);
        assert_eq!(outline.title, "Untitled Document");
    }

    #[test]
    fn test_numbered_headings_anchor_h1() {
        let d = doc(&[
            (1, "Guide", 24.0, true),
            (1, "1. Introduction", 16.0, true),
            (1, BODY, 10.0, false),
            (1, "1.1 Background", 13.0, true),
            (1, BODY, 10.0, false),
            (1, BODY, 10.0, false),
            (2, "2. Method", 16.0, true),
            (2, "Details", 12.0, true),
            (2, BODY, 10.0, false),
            (2, BODY, 10.0, false),
        ]);
        let outline = detect_headings(&d);

        assert_eq!(outline.title, "Guide");
        let got: Vec<_> = outline
            .outline
            .iter()
            .map(|h| (h.level, h.text.as_str(), h.page))
            .collect();
        assert_eq!(
            got,
            [
                (HeadingLevel::H1, "1. Introduction", 1),
                (HeadingLevel::H2, "1.1 Background", 1),
                (HeadingLevel::H1, "2. Method", 2),
                (HeadingLevel::H3, "Details", 2),
            ]
        );
    }

    #[test]
    fn test_prose_and_colon_lines_are_not_headings() {
        let d = doc(&[
            (1, "Title", 20.0, true),
            (1, "Summary", 14.0, true),
            (1, "A sentence in bold that ends with a period.", 14.0, true),
            (1, "Note:", 14.0, true),
            (1, BODY, 10.0, false),
            (1, BODY, 10.0, false),
            (1, BODY, 10.0, false),
        ]);
        let outline = detect_headings(&d);
        let texts: Vec<_> = outline.outline.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, ["Summary"]);
        assert_eq!(outline.outline[0].level, HeadingLevel::H1);
    }

    #[test]
    fn test_no_candidates_yields_title_only() {
        let d = doc(&[(1, "Only line", 10.0, false), (1, BODY, 10.0, false)]);
        let analysis = analyze(&d);
        assert_eq!(analysis.outline.title, "Only line");
        assert!(analysis.outline.outline.is_empty());
        assert!(analysis.h1_style.is_none());
        assert_eq!(analysis.line_count, 2);
    }

    #[test]
    fn test_assign_levels_keeps_two_smaller_sizes() {
        let styles = [
            Style::new(12, true, 0),
            Style::new(18, true, 0),
            Style::new(14, true, 0),
            Style::new(11, true, 0),
            Style::new(20, false, 0),
        ];
        let levels = assign_levels(styles.iter().copied(), 18);
        assert_eq!(
            levels,
            [
                (Style::new(18, true, 0), HeadingLevel::H1),
                (Style::new(20, false, 0), HeadingLevel::H1),
                (Style::new(14, true, 0), HeadingLevel::H2),
                (Style::new(12, true, 0), HeadingLevel::H3),
            ]
        );
    }

    #[test]
    fn test_looks_like_heading() {
        assert!(looks_like_heading("Overview"));
        assert!(!looks_like_heading("Ends with a period."));
        assert!(!looks_like_heading("Label:"));
        assert!(!looks_like_heading(&"word ".repeat(40)));
    }
}
