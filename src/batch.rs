//! Directory-level processing.
//!
//! Every `.pdf` in the input directory becomes a `.json` outline in the
//! output directory. A file that fails is reported and skipped; it never
//! stops the rest of the batch.

use std::fs;
use std::path::{Path, PathBuf};

use crossbeam_channel::Sender;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::BatchConfig;
use crate::detect::has_pdf_extension;
use crate::error::Result;
use crate::model::Outline;
use crate::outline::extract_outline_from_file;
use crate::render::write_json;

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// Work on a file has begun
    Started { input: PathBuf },
    /// A file was written successfully
    Finished {
        input: PathBuf,
        output: PathBuf,
        headings: usize,
    },
    /// A file could not be processed
    Failed { input: PathBuf, error: String },
}

/// A file that produced an outline.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    pub title: String,
    pub headings: usize,
}

/// A file that was skipped because of an error.
#[derive(Debug, Clone)]
pub struct FailedFile {
    pub input: PathBuf,
    pub error: String,
}

/// Outcome of a directory run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Files written, in input name order
    pub processed: Vec<ProcessedFile>,
    /// Files that failed, in input name order
    pub failed: Vec<FailedFile>,
}

impl BatchReport {
    /// Total number of PDFs seen.
    pub fn total(&self) -> usize {
        self.processed.len() + self.failed.len()
    }

    /// Whether every PDF was processed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// List the PDF files of a directory, sorted by name.
pub fn discover_pdfs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        // Follows symlinks into mounted volumes
        if path.is_file() && has_pdf_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Output path for an input file: the name up to its last dot, plus `.json`.
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.rsplit_once('.').map_or(name.as_str(), |(stem, _)| stem);
    output_dir.join(format!("{}.json", stem))
}

/// Extract one file's outline and write it next to the others.
pub fn process_file(input: &Path, output: &Path, config: &BatchConfig) -> Result<Outline> {
    let outline = extract_outline_from_file(input, &config.outline)?;
    write_json(output, &outline, config.json_format)?;
    Ok(outline)
}

/// Process every PDF in `config.input_dir`.
pub fn process_directory(config: &BatchConfig) -> Result<BatchReport> {
    process_directory_with_events(config, None)
}

/// Process every PDF in `config.input_dir`, reporting progress on `events`.
///
/// Only directory-level failures (unreadable input directory, uncreatable
/// output directory) are returned as errors.
pub fn process_directory_with_events(
    config: &BatchConfig,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchReport> {
    fs::create_dir_all(&config.output_dir)?;
    let files = discover_pdfs(&config.input_dir)?;
    log::info!(
        "found {} PDF files in {}",
        files.len(),
        config.input_dir.display()
    );

    let notify = |event: BatchEvent| {
        if let Some(tx) = &events {
            // A dropped receiver only means nobody is watching
            let _ = tx.send(event);
        }
    };

    let run = |input: &PathBuf| -> std::result::Result<ProcessedFile, FailedFile> {
        let output = output_path_for(input, &config.output_dir);
        log::info!("Processing: {}", input.display());
        notify(BatchEvent::Started {
            input: input.clone(),
        });

        match process_file(input, &output, config) {
            Ok(outline) => {
                log::info!("Successfully created: {}", output.display());
                notify(BatchEvent::Finished {
                    input: input.clone(),
                    output: output.clone(),
                    headings: outline.outline.len(),
                });
                Ok(ProcessedFile {
                    input: input.clone(),
                    output,
                    headings: outline.outline.len(),
                    title: outline.title,
                })
            }
            Err(e) => {
                log::error!("An error occurred while processing {}: {}", input.display(), e);
                notify(BatchEvent::Failed {
                    input: input.clone(),
                    error: e.to_string(),
                });
                Err(FailedFile {
                    input: input.clone(),
                    error: e.to_string(),
                })
            }
        }
    };

    #[cfg(feature = "parallel")]
    let outcomes: Vec<_> = if config.parallel {
        files.par_iter().map(run).collect()
    } else {
        files.iter().map(run).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<_> = files.iter().map(run).collect();

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(done) => report.processed.push(done),
            Err(failed) => report.failed.push(failed),
        }
    }
    Ok(report)
}
