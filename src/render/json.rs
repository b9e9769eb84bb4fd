//! JSON rendering for outlines and reports.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with two-space indentation
    #[default]
    Pretty,
    /// Pretty-printed JSON with the given number of spaces per level
    Indented(usize),
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a value to a JSON string. Non-ASCII text is written as-is.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let bytes = match format {
        JsonFormat::Compact => serde_json::to_vec(value),
        JsonFormat::Pretty => serde_json::to_vec_pretty(value),
        JsonFormat::Indented(width) => {
            let indent = vec![b' '; width];
            let mut out = Vec::new();
            let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
            value.serialize(&mut ser).map(|_| out)
        }
    }
    .map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))?;

    String::from_utf8(bytes).map_err(|e| Error::Render(e.to_string()))
}

/// Serialize a value and write it to `path`.
pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(
    path: P,
    value: &T,
    format: JsonFormat,
) -> Result<()> {
    let json = to_json(value, format)?;
    fs::write(path, json)?;
    Ok(())
}
