//! Block Classifier
//!
//! Maps a structural node to a `(type_tag, summary)` pair by running an ordered
//! chain of recognizers. The first recognizer whose predicate holds decides the
//! result; when none match, the structural fallback (lowercased tag name plus
//! truncated text) applies. Classification looks only at the node's own
//! attributes and its descendants, never at siblings or ancestors, and it
//! never fails: missing attributes degrade to literal default summaries.

use crate::error::ConfigError;
use crate::node::StructuralNode;
use crate::types::Classification;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static HEADING_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^h[1-6]$").unwrap());

// Attribute vocabulary of the managed markup
const IMG_STUB_ATTR: &str = "img-stub";
const IMAGE_REF_ATTRS: &[&str] = &["src", "data-src"];
const CAPTION_ATTR: &str = "caption";
const SUBTYPE_ATTR: &str = "data-type";
const IMAGE_POSITION_ATTR: &str = "data-img-pos";

const DEFAULT_SECTION_SUMMARY: &str = "Untitled section";
const DEFAULT_CONTAINER_SUMMARY: &str = "Container";
const DEFAULT_IMAGE_SUMMARY: &str = "Image";
const DEFAULT_FALLBACK_SUMMARY: &str = "(empty)";

fn default_true() -> bool {
    true
}

fn default_summary_max_chars() -> usize {
    60
}

/// One attribute-based recognition rule. Variants are listed in their default
/// evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recognizer {
    InlinePolaroid,
    TwoColumn,
    FiftyFiftySplit,
    SmallImageLargeText,
    Section,
    StandardContainer,
    StandardImage,
    GridWrapper,
}

impl Recognizer {
    pub const ALL: [Recognizer; 8] = [
        Recognizer::InlinePolaroid,
        Recognizer::TwoColumn,
        Recognizer::FiftyFiftySplit,
        Recognizer::SmallImageLargeText,
        Recognizer::Section,
        Recognizer::StandardContainer,
        Recognizer::StandardImage,
        Recognizer::GridWrapper,
    ];

    /// Stable name used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Recognizer::InlinePolaroid => "inline-polaroid",
            Recognizer::TwoColumn => "two-col",
            Recognizer::FiftyFiftySplit => "50-50-split",
            Recognizer::SmallImageLargeText => "small-img-lrg-txt",
            Recognizer::Section => "section",
            Recognizer::StandardContainer => "std-container",
            Recognizer::StandardImage => "std-image",
            Recognizer::GridWrapper => "grid-wrapper",
        }
    }

    pub fn from_name(name: &str) -> Option<Recognizer> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    pub fn matches(&self, node: &StructuralNode) -> bool {
        match self {
            Recognizer::InlinePolaroid => {
                node.has_attr(IMG_STUB_ATTR) && image_reference(node).is_some()
            }
            Recognizer::TwoColumn => section_subtype(node) == Some("twoCol"),
            Recognizer::FiftyFiftySplit => section_subtype(node) == Some("split50"),
            Recognizer::SmallImageLargeText => section_subtype(node) == Some("imgText"),
            Recognizer::Section => node.has_class("section"),
            Recognizer::StandardContainer => node.has_class("div-wrapper"),
            Recognizer::StandardImage => node.has_class("img-text-div-img"),
            Recognizer::GridWrapper => node.has_class("grid-wrapper"),
        }
    }

    /// Classify a node this recognizer matched. The summary is not yet
    /// truncated.
    fn apply(&self, node: &StructuralNode) -> Classification {
        match self {
            Recognizer::InlinePolaroid => {
                let summary = node
                    .non_empty_attr(CAPTION_ATTR)
                    .or_else(|| image_reference(node))
                    .unwrap_or(DEFAULT_IMAGE_SUMMARY);
                Classification::new("inline-polaroid", summary)
            }
            Recognizer::TwoColumn => Classification::new(
                "two-col",
                first_heading_text(node).unwrap_or_else(|| DEFAULT_SECTION_SUMMARY.to_string()),
            ),
            Recognizer::FiftyFiftySplit => {
                Classification::new("50-50-split", heading_with_position(node))
            }
            Recognizer::SmallImageLargeText => {
                Classification::new("small-img-lrg-txt", heading_with_position(node))
            }
            Recognizer::Section => {
                let subtype = node.non_empty_attr(SUBTYPE_ATTR).unwrap_or("unknown");
                Classification::new(
                    format!("section:{subtype}"),
                    first_heading_text(node)
                        .unwrap_or_else(|| DEFAULT_SECTION_SUMMARY.to_string()),
                )
            }
            Recognizer::StandardContainer => Classification::new(
                "std-container",
                first_heading_text(node).unwrap_or_else(|| DEFAULT_CONTAINER_SUMMARY.to_string()),
            ),
            Recognizer::StandardImage => {
                let summary = node
                    .first_descendant(|n| n.tag == "img")
                    .and_then(image_reference)
                    .unwrap_or(DEFAULT_IMAGE_SUMMARY);
                Classification::new("std-image", summary)
            }
            Recognizer::GridWrapper => {
                let count = node.count_descendants("img");
                let noun = if count == 1 { "image" } else { "images" };
                Classification::new("grid-wrapper", format!("{count} {noun}"))
            }
        }
    }
}

/// Structural fallback for nodes no recognizer claimed.
fn fallback(node: &StructuralNode) -> Classification {
    let text = node.text_content();
    let summary = if text.is_empty() {
        DEFAULT_FALLBACK_SUMMARY.to_string()
    } else {
        text
    };
    Classification::new(node.tag.to_lowercase(), summary)
}

fn section_subtype(node: &StructuralNode) -> Option<&str> {
    if node.has_class("section") {
        node.non_empty_attr(SUBTYPE_ATTR)
    } else {
        None
    }
}

fn image_reference(node: &StructuralNode) -> Option<&str> {
    IMAGE_REF_ATTRS
        .iter()
        .find_map(|attr| node.non_empty_attr(attr))
}

fn first_heading_text(node: &StructuralNode) -> Option<String> {
    node.first_descendant(|n| HEADING_TAG.is_match(&n.tag))
        .map(|heading| heading.text_content())
        .filter(|text| !text.is_empty())
}

fn heading_with_position(node: &StructuralNode) -> String {
    let heading = first_heading_text(node).unwrap_or_else(|| DEFAULT_SECTION_SUMMARY.to_string());
    match node.non_empty_attr(IMAGE_POSITION_ATTR) {
        Some(position) => format!("{heading} (image {position})"),
        None => heading,
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate_summary(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let kept: String = text.chars().take(max_chars - 1).collect();
    format!("{}…", kept.trim_end())
}

// ===== CONFIGURATION =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Recognizer name, e.g. "grid-wrapper"
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Recognizers to evaluate, in order. The structural fallback always runs
    /// last and is not listed here.
    pub recognizers: Vec<RecognizerConfig>,
    pub summary_max_chars: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            recognizers: Recognizer::ALL
                .iter()
                .map(|r| RecognizerConfig {
                    name: r.name().to_string(),
                    enabled: true,
                })
                .collect(),
            summary_max_chars: default_summary_max_chars(),
        }
    }
}

// ===== CLASSIFIER =====

/// An ordered recognizer chain with a terminal structural fallback.
#[derive(Debug, Clone)]
pub struct BlockClassifier {
    chain: Vec<Recognizer>,
    summary_max_chars: usize,
}

impl Default for BlockClassifier {
    fn default() -> Self {
        Self {
            chain: Recognizer::ALL.to_vec(),
            summary_max_chars: default_summary_max_chars(),
        }
    }
}

impl BlockClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self, ConfigError> {
        let mut chain = Vec::with_capacity(config.recognizers.len());
        for entry in &config.recognizers {
            let recognizer = Recognizer::from_name(&entry.name)
                .ok_or_else(|| ConfigError::UnknownRecognizer(entry.name.clone()))?;
            if entry.enabled {
                chain.push(recognizer);
            }
        }
        Ok(Self {
            chain,
            summary_max_chars: config.summary_max_chars,
        })
    }

    pub fn chain(&self) -> &[Recognizer] {
        &self.chain
    }

    pub fn classify(&self, node: &StructuralNode) -> Classification {
        let mut result = self
            .chain
            .iter()
            .find(|recognizer| recognizer.matches(node))
            .map(|recognizer| recognizer.apply(node))
            .unwrap_or_else(|| fallback(node));
        result.summary = truncate_summary(&result.summary, self.summary_max_chars);
        result
    }
}

/// Classify with the default recognizer chain.
pub fn classify(node: &StructuralNode) -> Classification {
    BlockClassifier::default().classify(node)
}
