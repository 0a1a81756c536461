//! Retrieval collaborator boundary
//!
//! The pipeline never performs I/O itself. A [`DocumentSource`] turns a managed
//! page path into the page's current markup; everything after that point is
//! synchronous and pure. Network-backed sources live with the application, the
//! local ones here are used for offline runs and tests.

use crate::error::RetrievalError;
use crate::types::SourceDocument;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Success payload of a retrieval. A missing `text` means an empty document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    #[serde(default)]
    pub text: Option<String>,
}

impl RetrievedDocument {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn into_source(self) -> SourceDocument {
        self.text.map(SourceDocument::new).unwrap_or_else(SourceDocument::empty)
    }

    /// Decode a success body.
    pub fn from_json(body: &str) -> Result<Self, RetrievalError> {
        serde_json::from_str(body).map_err(|e| RetrievalError::Decode(e.to_string()))
    }
}

/// Source of page markup, keyed by managed-page path.
pub trait DocumentSource {
    fn fetch(&self, path: &str) -> Result<RetrievedDocument, RetrievalError>;

    /// Source name for logging
    fn name(&self) -> &str;
}

#[derive(Deserialize)]
struct FailureBody {
    error: Option<serde_json::Value>,
    message: Option<serde_json::Value>,
}

/// User-facing text for a non-success response.
///
/// Prefers the JSON `error` field, then `message`. A body that is not JSON (or
/// has neither field) degrades to its raw text, and an empty body to the
/// status code.
pub fn failure_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<FailureBody>(body) {
        let field = parsed
            .error
            .as_ref()
            .and_then(value_text)
            .or_else(|| parsed.message.as_ref().and_then(value_text));
        if let Some(text) = field {
            return text;
        }
    }
    let raw = body.trim();
    if raw.is_empty() {
        format!("Request failed with status {status}")
    } else {
        raw.to_string()
    }
}

fn value_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Build the error for a non-success response.
pub fn status_error(status: u16, body: &str) -> RetrievalError {
    RetrievalError::Status {
        status,
        message: failure_message(status, body),
    }
}

// ===== LOCAL SOURCES =====

/// Reads page markup from files under a root directory.
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, RetrievalError> {
        let relative = Path::new(path.trim_start_matches('/'));
        // Page paths must stay inside the root
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(RetrievalError::NotFound(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl DocumentSource for FileSource {
    fn fetch(&self, path: &str) -> Result<RetrievedDocument, RetrievalError> {
        let file = self.resolve(path)?;
        if !file.is_file() {
            return Err(RetrievalError::NotFound(path.to_string()));
        }
        Ok(RetrievedDocument::from_text(fs::read_to_string(file)?))
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// In-memory source with scripted responses.
#[derive(Default)]
pub struct MemorySource {
    responses: HashMap<String, Result<RetrievedDocument, (u16, String)>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, path: &str, text: &str) -> Self {
        self.responses
            .insert(path.to_string(), Ok(RetrievedDocument::from_text(text)));
        self
    }

    /// A page that answers with no `text` field.
    pub fn with_blank_page(mut self, path: &str) -> Self {
        self.responses
            .insert(path.to_string(), Ok(RetrievedDocument::default()));
        self
    }

    /// A page that answers with a non-success status and raw body.
    pub fn with_failure(mut self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(path.to_string(), Err((status, body.to_string())));
        self
    }
}

impl DocumentSource for MemorySource {
    fn fetch(&self, path: &str) -> Result<RetrievedDocument, RetrievalError> {
        match self.responses.get(path) {
            Some(Ok(doc)) => Ok(doc.clone()),
            Some(Err((status, body))) => Err(status_error(*status, body)),
            None => Err(status_error(404, "")),
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}
