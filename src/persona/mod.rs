//! Persona-driven section ranking.
//!
//! Given a persona, a job to be done and a set of documents, every document
//! is split into section-tagged chunks, each chunk is scored by its
//! similarity to the persona's query, and the five best sections and chunks
//! are reported.
//!
//! ```no_run
//! use std::path::Path;
//! use pdfoutline::persona::{analyze, HashedNgramEmbedder, PersonaRequest};
//!
//! let request = PersonaRequest::from_path("challenge.json")?;
//! let report = analyze(&request, Path::new("docs"), &HashedNgramEmbedder::default())?;
//! report.write("output/challenge_output.json")?;
//! # Ok::<(), pdfoutline::Error>(())
//! ```

mod chunk;
mod embed;
mod rank;
mod request;

pub use chunk::{
    chunk_document, chunk_file, chunk_paragraphs, chunk_pdf, chunk_text, Chunk, SourceKind,
    TEXT_SECTION_TITLE,
};
pub use embed::{cosine_similarity, Embedder, HashedNgramEmbedder, DEFAULT_DIMENSIONS};
pub use rank::{
    analyze, rank_chunks, rank_sections, score_chunks, ExtractedSection, PersonaReport,
    ReportMetadata, SubsectionAnalysis, TOP_K,
};
pub use request::{DocumentRef, JobToBeDone, Persona, PersonaRequest};
