//! Relevance ranking of chunks and sections.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::chunk::{chunk_file, Chunk, SourceKind};
use super::embed::{cosine_similarity, Embedder};
use super::request::PersonaRequest;
use crate::error::{Error, Result};
use crate::render::{write_json, JsonFormat};

/// Number of sections and subsections kept in a report.
pub const TOP_K: usize = 5;

/// Timestamp layout of `processing_timestamp`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Ranked sections of a document collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaReport {
    /// Request echo and processing time
    pub metadata: ReportMetadata,

    /// Best sections, most relevant first
    pub extracted_sections: Vec<ExtractedSection>,

    /// Best individual chunks, most relevant first
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

/// Report header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Every document named by the request, found or not
    pub input_documents: Vec<String>,

    /// Persona role
    pub persona: String,

    /// Task text
    pub job_to_be_done: String,

    /// UTC, `YYYY-MM-DDTHH:MM:SS`
    pub processing_timestamp: String,
}

/// A ranked section, represented by its best chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    /// Source file name
    pub document: String,

    /// Title of the section the chunk falls under
    pub section_title: String,

    /// 1 is the most relevant
    pub importance_rank: usize,

    /// Page of the section's best chunk (1-indexed)
    pub page_number: u32,
}

/// A top-ranked chunk with its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    /// Source file name
    pub document: String,

    /// Chunk text
    pub refined_text: String,

    /// Page the chunk came from (1-indexed)
    pub page_number: u32,
}

impl PersonaReport {
    /// Write the report as JSON indented by four spaces.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        write_json(path, self, JsonFormat::Indented(4))
    }
}

/// Chunk, embed and rank the documents of a request.
///
/// Documents are looked up in `docs_dir`. Missing files are skipped with a
/// warning and files that are neither `.pdf` nor `.txt` are ignored.
pub fn analyze<E: Embedder + ?Sized>(
    request: &PersonaRequest,
    docs_dir: &Path,
    embedder: &E,
) -> Result<PersonaReport> {
    let filenames = request.filenames();
    log::info!(
        "Processing {} documents from '{}'",
        filenames.len(),
        docs_dir.display()
    );

    let mut chunks = collect_chunks(&filenames, docs_dir)?;
    if chunks.is_empty() {
        return Err(Error::NoContent);
    }

    let query = request.query();
    log::debug!("query: {}", query);
    score_chunks(&mut chunks, &query, embedder);

    Ok(build_report(request, filenames, &chunks))
}

fn collect_chunks(filenames: &[String], docs_dir: &Path) -> Result<Vec<Chunk>> {
    let mut chunks = Vec::new();
    for name in filenames {
        let path = docs_dir.join(name);
        if !path.exists() {
            log::warn!(
                "Document '{}' not found in '{}'. Skipping.",
                name,
                docs_dir.display()
            );
            continue;
        }
        let Some(kind) = SourceKind::from_path(&path) else {
            log::debug!("ignoring unsupported document {}", name);
            continue;
        };
        chunks.extend(chunk_file(&path, kind)?);
    }
    Ok(chunks)
}

/// Set every chunk's score to its cosine similarity with `query`.
pub fn score_chunks<E: Embedder + ?Sized>(chunks: &mut [Chunk], query: &str, embedder: &E) {
    let query_vec = embedder.embed(query);
    let score = |chunk: &mut Chunk| {
        chunk.score = cosine_similarity(&query_vec, &embedder.embed(&chunk.text));
    };

    #[cfg(feature = "parallel")]
    chunks.par_iter_mut().for_each(score);
    #[cfg(not(feature = "parallel"))]
    chunks.iter_mut().for_each(score);
}

/// Chunks by descending score; equal scores keep document order.
pub fn rank_chunks(chunks: &[Chunk]) -> Vec<&Chunk> {
    let mut ranked: Vec<&Chunk> = chunks.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// The best-scoring chunk of each `(document, section_title)`, ranked.
///
/// A later chunk replaces the current best only when it scores strictly
/// higher. Equally scored sections keep the order they first appear in.
pub fn rank_sections(chunks: &[Chunk]) -> Vec<&Chunk> {
    let mut order: Vec<&Chunk> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();

    for chunk in chunks {
        let key = (chunk.document.as_str(), chunk.section_title.as_str());
        match index.get(&key) {
            Some(&i) => {
                if chunk.score > order[i].score {
                    order[i] = chunk;
                }
            }
            None => {
                index.insert(key, order.len());
                order.push(chunk);
            }
        }
    }

    order.sort_by(|a, b| b.score.total_cmp(&a.score));
    order
}

fn build_report(
    request: &PersonaRequest,
    input_documents: Vec<String>,
    chunks: &[Chunk],
) -> PersonaReport {
    let extracted_sections = rank_sections(chunks)
        .into_iter()
        .take(TOP_K)
        .enumerate()
        .map(|(i, c)| ExtractedSection {
            document: c.document.clone(),
            section_title: c.section_title.clone(),
            importance_rank: i + 1,
            page_number: c.page_number,
        })
        .collect();

    let subsection_analysis = rank_chunks(chunks)
        .into_iter()
        .take(TOP_K)
        .map(|c| SubsectionAnalysis {
            document: c.document.clone(),
            refined_text: c.text.clone(),
            page_number: c.page_number,
        })
        .collect();

    PersonaReport {
        metadata: ReportMetadata {
            input_documents,
            persona: request.persona.role.clone(),
            job_to_be_done: request.job_to_be_done.task.clone(),
            processing_timestamp: Utc::now().format(TIMESTAMP_FORMAT).to_string(),
        },
        extracted_sections,
        subsection_analysis,
    }
}
