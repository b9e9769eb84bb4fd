//! Persona analysis input.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A request to rank the sections of a document collection.
///
/// ```json
/// {
///   "persona": { "role": "Travel Planner" },
///   "job_to_be_done": { "task": "Plan a trip of 4 days" },
///   "documents": [ { "filename": "guide.pdf", "title": "Guide" } ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaRequest {
    /// Who the ranking is for
    #[serde(default)]
    pub persona: Persona,

    /// What they are trying to get done
    #[serde(default)]
    pub job_to_be_done: JobToBeDone,

    /// Documents to rank, in request order
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
}

/// The reader the sections are ranked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    /// Role name, e.g. "Travel Planner" (defaults to "User")
    #[serde(default = "default_role")]
    pub role: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            role: default_role(),
        }
    }
}

fn default_role() -> String {
    "User".to_string()
}

/// The task behind the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobToBeDone {
    /// Task description, phrased to follow "I need to"
    #[serde(default)]
    pub task: String,
}

/// One document named by the request, resolved against the documents directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// File name relative to the documents directory
    pub filename: String,

    /// Display title; not used for ranking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl PersonaRequest {
    /// Parse a request from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a request file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The retrieval query phrased from the persona's point of view.
    pub fn query(&self) -> String {
        format!(
            "As a {}, I need to {}.",
            self.persona.role, self.job_to_be_done.task
        )
    }

    /// Document file names in request order.
    pub fn filenames(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.filename.clone()).collect()
    }
}
