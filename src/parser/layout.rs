//! Content stream interpretation.
//!
//! Walks a page's content stream, tracking enough graphics and text state to
//! place each shown string with its font, size and fill colour, then groups
//! the resulting spans into lines.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{estimate_width, is_spaceless_script_char, TextLine, TextSpan};

/// `TJ` adjustments larger than this (in thousandths of an em) read as a word break.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Spans on one baseline further apart than this many font sizes start a new line.
const LINE_SPLIT_GAP_EMS: f32 = 3.0;

/// Extracts styled text from the pages of a loaded document.
pub struct LayoutAnalyzer<'a> {
    doc: &'a LopdfDocument,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create a new layout analyzer.
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self { doc }
    }

    /// Extract text spans from a page with position, font and colour.
    pub fn extract_page_spans(&self, page_id: ObjectId) -> Result<Vec<TextSpan>> {
        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        let content = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        self.interpret(&content, &fonts)
    }

    /// Extract the lines of a page in top-to-bottom reading order.
    pub fn extract_page_lines(&self, page_id: ObjectId, page_height: f32) -> Result<Vec<TextLine>> {
        let spans = self.extract_page_spans(page_id)?;
        Ok(group_spans_into_lines(spans, page_height))
    }

    fn interpret(
        &self,
        content: &[u8],
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    ) -> Result<Vec<TextSpan>> {
        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut spans = Vec::new();
        let mut state = GraphicsState::default();
        let mut saved: Vec<GraphicsState> = Vec::new();
        let mut text = TextState::default();
        let mut in_text_block = false;

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => saved.push(state.clone()),
                "Q" => {
                    if let Some(previous) = saved.pop() {
                        state = previous;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        state.ctm = m.concat(&state.ctm);
                    }
                }
                "g" | "rg" | "k" | "sc" | "scn" => {
                    if let Some(color) = fill_color(operands) {
                        state.fill_color = color;
                    }
                }
                "BT" => {
                    in_text_block = true;
                    text = TextState::default();
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    if operands.len() >= 2 {
                        if let Object::Name(name) = &operands[0] {
                            state.font_base = fonts
                                .get(name.as_slice())
                                .and_then(|f| f.get(b"BaseFont").ok())
                                .and_then(|o| o.as_name().ok())
                                .map(|n| String::from_utf8_lossy(n).to_string())
                                .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
                            state.font_name = name.clone();
                        }
                        state.font_size = get_number(&operands[1]).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(get_number) {
                        state.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if operands.len() >= 2 {
                        let tx = get_number(&operands[0]).unwrap_or(0.0);
                        let ty = get_number(&operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            state.leading = -ty;
                        }
                        text.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        text.set(m);
                    }
                }
                "T*" => text.move_line(0.0, -state.leading),
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "'" || op.operator == "\"" {
                        text.move_line(0.0, -state.leading);
                    }
                    if !in_text_block {
                        continue;
                    }
                    let shown = match op.operator.as_str() {
                        "TJ" => match operands.first() {
                            Some(Object::Array(items)) => self.show_array(items, fonts, &state),
                            _ => continue,
                        },
                        "\"" => match operands.get(2) {
                            Some(Object::String(bytes, _)) => self.show_string(bytes, fonts, &state),
                            _ => continue,
                        },
                        _ => match operands.first() {
                            Some(Object::String(bytes, _)) => self.show_string(bytes, fonts, &state),
                            _ => continue,
                        },
                    };

                    let rendering = text.matrix.concat(&state.ctm);
                    if !shown.text.trim().is_empty() {
                        let (x, y) = (rendering.e, rendering.f);
                        let size = state.font_size * rendering.vertical_scale();
                        let mut span =
                            TextSpan::new(shown.text, x, y, size, state.font_base.clone())
                                .with_color(state.fill_color);
                        span.width = shown.advance * rendering.horizontal_scale();
                        spans.push(span);
                    }
                    text.advance(shown.advance);
                }
                _ => {}
            }
        }

        Ok(spans)
    }

    /// Decode a `Tj` operand.
    fn show_string(
        &self,
        bytes: &[u8],
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        state: &GraphicsState,
    ) -> Shown {
        let text = self.decode(fonts, &state.font_name, bytes);
        let advance = estimate_width(&text, state.font_size);
        Shown { text, advance }
    }

    /// Decode a `TJ` array, turning wide negative kerns into spaces.
    fn show_array(
        &self,
        items: &[Object],
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        state: &GraphicsState,
    ) -> Shown {
        let mut combined = String::new();
        let mut advance = 0.0;

        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let decoded = self.decode(fonts, &state.font_name, bytes);
                    advance += estimate_width(&decoded, state.font_size);
                    combined.push_str(&decoded);
                }
                Object::Integer(_) | Object::Real(_) => {
                    let adjustment = -get_number(item).unwrap_or(0.0);
                    advance += adjustment / 1000.0 * state.font_size;
                    let breaks_word = adjustment > TJ_SPACE_THRESHOLD
                        && !combined.ends_with([' ', '\u{00A0}'])
                        && combined
                            .chars()
                            .last()
                            .is_some_and(|c| !is_spaceless_script_char(c));
                    if breaks_word {
                        combined.push(' ');
                    }
                }
                _ => {}
            }
        }

        Shown {
            text: combined,
            advance,
        }
    }

    /// Decode string bytes with the font's encoding, falling back to heuristics.
    fn decode(&self, fonts: &BTreeMap<Vec<u8>, &Dictionary>, font: &[u8], bytes: &[u8]) -> String {
        fonts
            .get(font)
            .and_then(|f| f.get_font_encoding(self.doc).ok())
            .and_then(|enc| LopdfDocument::decode_text(&enc, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    }
}

/// Text produced by one show operator and its advance in unscaled text space.
struct Shown {
    text: String,
    advance: f32,
}

/// The part of the graphics state that affects where and how text lands.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    fill_color: u32,
    font_name: Vec<u8>,
    font_base: String,
    font_size: f32,
    leading: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            fill_color: 0,
            font_name: Vec::new(),
            font_base: String::new(),
            font_size: 12.0,
            leading: 0.0,
        }
    }
}

/// Text matrix and text line matrix.
#[derive(Debug, Clone, Default)]
struct TextState {
    matrix: Matrix,
    line: Matrix,
}

impl TextState {
    fn set(&mut self, m: Matrix) {
        self.matrix = m;
        self.line = m;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line = Matrix::translate(tx, ty).concat(&self.line);
        self.matrix = self.line;
    }

    fn advance(&mut self, tx: f32) {
        self.matrix = Matrix::translate(tx, 0.0).concat(&self.matrix);
    }
}

/// A PDF transformation matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translate(tx: f32, ty: f32) -> Self {
        Matrix {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let n: Vec<f32> = operands[..6].iter().map(get_number).collect::<Option<_>>()?;
        Some(Matrix {
            a: n[0],
            b: n[1],
            c: n[2],
            d: n[3],
            e: n[4],
            f: n[5],
        })
    }

    /// `self × other`, i.e. apply `self` first.
    fn concat(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Group spans into lines by baseline, top of the page first.
///
/// Spans within 30% of their font size vertically share a baseline. A
/// baseline is split wherever consecutive spans are more than three font
/// sizes apart, so side-by-side columns do not merge into one line.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>, page_height: f32) -> Vec<TextLine> {
    // PDF Y grows upward, so higher Y reads first
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut rows: Vec<Vec<TextSpan>> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * 0.3;
        match (current_y, rows.last_mut()) {
            (Some(y), Some(row)) if (span.y - y).abs() <= tolerance => row.push(span),
            _ => {
                current_y = Some(span.y);
                rows.push(vec![span]);
            }
        }
    }

    let mut lines = Vec::new();
    for mut row in rows {
        row.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

        let mut current: Vec<TextSpan> = Vec::new();
        for span in row {
            if let Some(prev) = current.last() {
                let gap = span.x - prev.right();
                if gap > LINE_SPLIT_GAP_EMS * prev.font_size.max(span.font_size) {
                    log::debug!("splitting line at x={:.1} (gap {:.1})", span.x, gap);
                    lines.push(TextLine::from_spans(std::mem::take(&mut current), page_height));
                }
            }
            current.push(span);
        }
        if !current.is_empty() {
            lines.push(TextLine::from_spans(current, page_height));
        }
    }

    lines
}

/// Pack fill colour operands into 0xRRGGBB: one operand is gray, three RGB, four CMYK.
fn fill_color(operands: &[Object]) -> Option<u32> {
    let values: Vec<f32> = operands.iter().filter_map(get_number).collect();
    let (r, g, b) = match values.as_slice() {
        [gray] => (*gray, *gray, *gray),
        [r, g, b] => (*r, *g, *b),
        [c, m, y, k] => ((1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k)),
        _ => return None,
    };
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
    Some(channel(r) << 16 | channel(g) << 8 | channel(b))
}

/// Helper to extract number from PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with byte order mark
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let utf16: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
