//! Environment-driven configuration.
//!
//! Kept in its own test binary so setting process-wide variables cannot race
//! with other tests.

use std::env;
use std::path::PathBuf;

use pdfoutline::config::{BatchConfig, INPUT_DIR_ENV, OUTPUT_DIR_ENV};

#[test]
fn test_from_env() {
    env::remove_var(INPUT_DIR_ENV);
    env::remove_var(OUTPUT_DIR_ENV);
    let config = BatchConfig::from_env();
    assert_eq!(config.input_dir, PathBuf::from("input"));
    assert_eq!(config.output_dir, PathBuf::from("output"));

    env::set_var(INPUT_DIR_ENV, "/app/input");
    env::set_var(OUTPUT_DIR_ENV, "/app/output");
    let config = BatchConfig::from_env();
    assert_eq!(config.input_dir, PathBuf::from("/app/input"));
    assert_eq!(config.output_dir, PathBuf::from("/app/output"));

    // Empty values fall back to the defaults
    env::set_var(INPUT_DIR_ENV, "");
    let config = BatchConfig::from_env();
    assert_eq!(config.input_dir, PathBuf::from("input"));

    env::remove_var(INPUT_DIR_ENV);
    env::remove_var(OUTPUT_DIR_ENV);
}
