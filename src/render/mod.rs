//! Rendering of outlines and reports to their on-disk form.

mod json;

pub use json::{to_json, write_json, JsonFormat};
