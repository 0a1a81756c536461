// Regionkit Core Library
//
// Extracts marker-delimited regions from a page, splits the managed region
// into classified content blocks and composes a sandboxed preview document.

pub mod types;
pub mod error;
pub mod extractor;
pub mod node;
pub mod decomposer;
pub mod classifier;
pub mod preview;
pub mod source;
pub mod session;
pub mod processor;
pub mod config;
pub mod stages;

// Re-export main types and functions for easy use
pub use types::*;
pub use error::{ConfigError, RetrievalError};
pub use extractor::{extract_region, extract_region_with, extract_regions, MarkerConvention, RegionSet};
pub use node::{NodeChild, StructuralNode};
pub use decomposer::decompose;
pub use classifier::{classify, BlockClassifier, ClassifierConfig, Recognizer, RecognizerConfig};
pub use preview::{compose_preview, compose_preview_with, frame_preview, PreviewAssets, SandboxPolicy};
pub use source::{DocumentSource, FileSource, MemorySource, RetrievedDocument};
pub use session::{LoadOutcome, LoadTicket, Workspace};
pub use processor::PageProcessor;
pub use config::EditorConfig;
pub use stages::dump_stages;
