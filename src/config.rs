//! Batch configuration.
//!
//! The container entrypoint runs without arguments, so the input and output
//! directories come from `INPUT_DIR` and `OUTPUT_DIR`.

use std::env;
use std::path::PathBuf;

use crate::outline::{OutlineOptions, OutlineStrategy};
use crate::parser::ErrorMode;
use crate::render::JsonFormat;

/// Environment variable naming the directory PDFs are read from.
pub const INPUT_DIR_ENV: &str = "INPUT_DIR";

/// Environment variable naming the directory JSON outlines are written to.
pub const OUTPUT_DIR_ENV: &str = "OUTPUT_DIR";

/// Input directory used when `INPUT_DIR` is unset.
pub const DEFAULT_INPUT_DIR: &str = "input";

/// Output directory used when `OUTPUT_DIR` is unset.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Settings for processing a directory of PDFs.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory scanned for `.pdf` files
    pub input_dir: PathBuf,

    /// Directory receiving one `.json` per input file
    pub output_dir: PathBuf,

    /// Outline extraction settings
    pub outline: OutlineOptions,

    /// Output JSON layout
    pub json_format: JsonFormat,

    /// Whether to process files on the rayon pool (needs the `parallel` feature)
    pub parallel: bool,
}

impl BatchConfig {
    /// Create a configuration for the given directories.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            outline: OutlineOptions::default(),
            json_format: JsonFormat::Pretty,
            parallel: cfg!(feature = "parallel"),
        }
    }

    /// Read the directories from `INPUT_DIR` / `OUTPUT_DIR`, falling back to `input` / `output`.
    pub fn from_env() -> Self {
        let dir = |key: &str, default: &str| {
            env::var_os(key)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };
        Self::new(
            dir(INPUT_DIR_ENV, DEFAULT_INPUT_DIR),
            dir(OUTPUT_DIR_ENV, DEFAULT_OUTPUT_DIR),
        )
    }

    /// Set the heading source.
    pub fn with_strategy(mut self, strategy: OutlineStrategy) -> Self {
        self.outline = self.outline.with_strategy(strategy);
        self
    }

    /// Set the per-file error mode of the parser.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.outline.parse = self.outline.parse.with_error_mode(mode);
        self
    }

    /// Set the output JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Process files one at a time.
    pub fn sequential(self) -> Self {
        self.with_parallel(false)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR)
    }
}
