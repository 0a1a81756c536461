use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ===== SOURCE DOCUMENT =====

/// The latest known server-side markup of a page.
///
/// Owned by the caller and never mutated by the pipeline. Every load builds a
/// fresh `SourceDocument`; nothing is carried over between loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    text: String,
}

impl SourceDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// A document with no markup, used when retrieval returned no `text`.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// SHA-256 hex digest of the markup, used to label stage dumps.
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.text.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl From<&str> for SourceDocument {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for SourceDocument {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

// ===== REGIONS =====

/// A named, marker-delimited span of a [`SourceDocument`].
///
/// When `found` is false the offsets are meaningless and `inner_markup` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub found: bool,
    /// Trimmed markup strictly between the two markers
    pub inner_markup: String,
    /// Character offset of the first character of the start marker
    pub start_offset: usize,
    /// Character offset one past the last character of the end marker
    pub end_offset: usize,
}

impl Region {
    pub fn missing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            found: false,
            inner_markup: String::new(),
            start_offset: 0,
            end_offset: 0,
        }
    }
}

// ===== CONTENT BLOCKS =====

/// Result of running one structural node through the recognizer chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub type_tag: String,
    pub summary: String,
}

impl Classification {
    pub fn new(type_tag: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            summary: summary.into(),
        }
    }
}

/// One top-level structural node of the `main` region, classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Zero-based position within the region, stable for unchanged markup
    pub ordinal: usize,
    pub type_tag: String,
    /// Display-only description, never authoritative
    pub summary: String,
    /// The node serialized back to HTML, not parsed further
    pub raw_markup: String,
}

// ===== WARNINGS =====

/// Soft problems found while loading a page. None of these abort a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadWarning {
    /// One or more named regions had no well-ordered marker pair
    MissingRegions(Vec<String>),
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::MissingRegions(names) => {
                let quoted: Vec<String> = names.iter().map(|n| format!("\"{n}\"")).collect();
                let noun = if names.len() == 1 { "region" } else { "regions" };
                write!(
                    f,
                    "Missing {noun} {}: markers not found or out of order",
                    quoted.join(", ")
                )
            }
        }
    }
}

// ===== MANAGED PAGES =====

/// One entry of the managed-page list. `path` goes to the retrieval
/// collaborator, `label` is display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedPage {
    pub label: String,
    pub path: String,
}

impl ManagedPage {
    pub fn new(label: &str, path: &str) -> Self {
        Self {
            label: label.to_string(),
            path: path.to_string(),
        }
    }
}

// ===== LOAD SESSION =====

/// Everything one load produced. Built once, replaced wholesale by the next
/// successful load and never patched in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSession {
    pub id: Uuid,
    pub generation: u64,
    pub page: ManagedPage,
    /// The document this session was built from
    pub source: SourceDocument,
    pub fingerprint: String,
    pub hero: Region,
    pub main: Region,
    pub blocks: Vec<ContentBlock>,
    pub warning: Option<LoadWarning>,
    pub preview: String,
    pub loaded_at: DateTime<Utc>,
}

/// Serialization-ready block list for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockListing {
    pub page: ManagedPage,
    pub generation: u64,
    pub warning: Option<String>,
    pub blocks: Vec<BlockSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSummary {
    pub ordinal: usize,
    pub type_tag: String,
    pub summary: String,
}

impl LoadSession {
    pub fn listing(&self) -> BlockListing {
        BlockListing {
            page: self.page.clone(),
            generation: self.generation,
            warning: self.warning.as_ref().map(|w| w.to_string()),
            blocks: self
                .blocks
                .iter()
                .map(|b| BlockSummary {
                    ordinal: b.ordinal,
                    type_tag: b.type_tag.clone(),
                    summary: b.summary.clone(),
                })
                .collect(),
        }
    }
}
