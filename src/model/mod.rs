//! Document model types.
//!
//! [`Document`] is what the parser produces: pages of styled lines plus
//! metadata and bookmarks. [`Outline`] is what heading detection produces
//! and what gets written to disk.

mod document;
mod line;
mod outline;
mod page;
mod tally;

pub use document::{Bookmark, Document, Metadata};
pub use line::{estimate_width, is_spaceless_script_char, round_size, BBox, Style, TextLine, TextSpan};
pub use outline::{Heading, HeadingLevel, Outline};
pub use page::Page;
pub use tally::Tally;
