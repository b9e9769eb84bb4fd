//! Styled text spans and lines.

use serde::{Deserialize, Serialize};

use super::Tally;

/// The visual style a heading detector compares lines by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    /// Font size rounded to whole points (half-to-even)
    pub size: i32,
    /// Whether the font appears to be bold
    pub bold: bool,
    /// Fill colour packed as 0xRRGGBB
    pub color: u32,
}

impl Style {
    /// Create a style from its components.
    pub fn new(size: i32, bold: bool, color: u32) -> Self {
        Self { size, bold, color }
    }
}

/// Round a font size to whole points, ties to even.
pub fn round_size(size: f32) -> i32 {
    size.round_ties_even() as i32
}

/// A rectangle in top-down page coordinates (origin at the top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub top: f32,
    pub x1: f32,
    pub bottom: f32,
}

/// A run of text drawn with a single font, size and colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline, PDF user space)
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font appears to be bold
    pub is_bold: bool,
    /// Whether the font appears to be italic
    pub is_italic: bool,
    /// Fill colour packed as 0xRRGGBB
    pub color: u32,
}

impl TextSpan {
    /// Create a new black text span; bold and italic are inferred from the font name.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32, font_name: impl Into<String>) -> Self {
        let text = text.into();
        let font_name = font_name.into();
        let lower = font_name.to_lowercase();
        let is_bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let is_italic = lower.contains("italic") || lower.contains("oblique");
        let width = estimate_width(&text, font_size);

        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
            is_bold,
            is_italic,
            color: 0,
        }
    }

    /// Set the fill colour.
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// The span's style key.
    pub fn style(&self) -> Style {
        Style::new(round_size(self.font_size), self.is_bold, self.color)
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the top Y coordinate (approximate, based on font size).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8
    }

    /// Get the bottom Y coordinate (approximate, based on font size).
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2
    }
}

/// Advance width estimate: half an em per character.
pub fn estimate_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.5
}

/// A line of spans sharing one baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Bounding box in top-down page coordinates
    pub bbox: BBox,
}

impl TextLine {
    /// Build a line from spans; `page_height` flips the bounding box to top-down.
    pub fn from_spans(mut spans: Vec<TextSpan>, page_height: f32) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

        let bbox = if spans.is_empty() {
            BBox::default()
        } else {
            let x0 = spans.iter().map(|s| s.x).fold(f32::INFINITY, f32::min);
            let x1 = spans.iter().map(|s| s.right()).fold(f32::NEG_INFINITY, f32::max);
            let top = spans.iter().map(|s| s.top()).fold(f32::NEG_INFINITY, f32::max);
            let bottom = spans.iter().map(|s| s.bottom()).fold(f32::INFINITY, f32::min);
            BBox {
                x0,
                top: page_height - top,
                x1,
                bottom: page_height - bottom,
            }
        };

        Self { spans, bbox }
    }

    /// Baseline of the first span.
    pub fn baseline(&self) -> f32 {
        self.spans.first().map_or(0.0, |s| s.y)
    }

    /// Combined text with spaces inserted where spans are visibly apart.
    ///
    /// No space is inserted between adjacent CJK characters.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = span.x - prev.right();
                let avg_char_width = match span.text.chars().count() {
                    0 => span.font_size * 0.5,
                    n => span.width / n as f32,
                };

                let spaced = gap > avg_char_width * 0.2
                    && !(prev.text.chars().last().is_some_and(is_spaceless_script_char)
                        && span.text.chars().next().is_some_and(is_spaceless_script_char));
                let has_space = prev.text.ends_with([' ', '\u{00A0}'])
                    || span.text.starts_with([' ', '\u{00A0}']);

                if spaced && !has_space {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }

        result
    }

    /// The most common span style, weighted by character count.
    pub fn dominant_style(&self) -> Option<Style> {
        let mut styles = Tally::new();
        for span in &self.spans {
            styles.add(span.style(), span.text.chars().count());
        }
        styles.most_common().copied()
    }
}

/// Check if character is from a script that doesn't use word spaces.
///
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions A-F
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana and Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, size: f32, font: &str) -> TextSpan {
        TextSpan::new(text, x, 700.0, size, font)
    }

    #[test]
    fn test_text_span_bold_detection() {
        let bold = span("Test", 0.0, 12.0, "Helvetica-Bold");
        assert!(bold.is_bold);
        assert!(!bold.is_italic);

        let oblique = span("Test", 0.0, 12.0, "Helvetica-Oblique");
        assert!(!oblique.is_bold);
        assert!(oblique.is_italic);
    }

    #[test]
    fn test_round_size_ties_to_even() {
        assert_eq!(round_size(10.5), 10);
        assert_eq!(round_size(11.5), 12);
        assert_eq!(round_size(13.96), 14);
    }

    #[test]
    fn test_line_text_inserts_spaces_at_gaps() {
        let line = TextLine::from_spans(
            vec![span("World", 60.0, 10.0, "Helvetica"), span("Hello", 0.0, 10.0, "Helvetica")],
            792.0,
        );
        assert_eq!(line.text(), "Hello World");
    }

    #[test]
    fn test_line_text_cjk_has_no_spaces() {
        let line = TextLine::from_spans(
            vec![span("日本", 0.0, 10.0, "MS-Gothic"), span("語", 40.0, 10.0, "MS-Gothic")],
            792.0,
        );
        assert_eq!(line.text(), "日本語");
    }

    #[test]
    fn test_dominant_style_weighted_by_characters() {
        let line = TextLine::from_spans(
            vec![
                span("Important", 0.0, 12.0, "Helvetica-Bold"),
                span("and the rest of a long sentence", 60.0, 12.0, "Helvetica"),
            ],
            792.0,
        );
        assert_eq!(line.dominant_style(), Some(Style::new(12, false, 0)));
    }

    #[test]
    fn test_bbox_is_top_down() {
        let line = TextLine::from_spans(vec![span("Title", 72.0, 20.0, "Helvetica")], 792.0);
        assert!((line.bbox.top - (792.0 - 716.0)).abs() < 0.01);
        assert!(line.bbox.bottom > line.bbox.top);
        assert!((line.bbox.x0 - 72.0).abs() < 0.01);
    }
}
