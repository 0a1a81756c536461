use crate::classifier::BlockClassifier;
use crate::config::{EditorConfig, RegionNames};
use crate::decomposer::decompose;
use crate::error::ConfigError;
use crate::extractor::{extract_regions, MarkerConvention};
use crate::preview::{compose_preview_with, PreviewAssets};
use crate::session::{LoadOutcome, Workspace};
use crate::source::DocumentSource;
use crate::types::*;
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Runs the full pipeline for one page:
///
/// ```text
/// SourceDocument
///     ↓  Region Extractor (hero, main)
/// Regions ───────────────┐
///     ↓  Block Decomposer (main)      ↓  Preview Composer
/// StructuralNodes                     composed preview
///     ↓  Block Classifier
/// ContentBlocks
/// ```
pub struct PageProcessor {
    classifier: BlockClassifier,
    regions: RegionNames,
    markers: MarkerConvention,
    preview: PreviewAssets,
}

impl Default for PageProcessor {
    fn default() -> Self {
        Self {
            classifier: BlockClassifier::default(),
            regions: RegionNames::default(),
            markers: MarkerConvention::default(),
            preview: PreviewAssets::default(),
        }
    }
}

impl PageProcessor {
    pub fn new(config: &EditorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            classifier: BlockClassifier::new(&config.classifier)?,
            regions: config.regions.clone(),
            markers: config.markers.clone(),
            preview: config.preview.clone(),
        })
    }

    /// Decompose and classify a region's inner markup.
    pub fn classify_blocks(&self, inner_markup: &str) -> Vec<ContentBlock> {
        decompose(inner_markup)
            .iter()
            .enumerate()
            .map(|(ordinal, node)| {
                let classification = self.classifier.classify(node);
                ContentBlock {
                    ordinal,
                    type_tag: classification.type_tag,
                    summary: classification.summary,
                    raw_markup: node.raw_markup.clone(),
                }
            })
            .collect()
    }

    /// Pure pipeline: document in, session out. Never fails; missing regions
    /// are reported through the session's warning.
    pub fn process_document(
        &self,
        generation: u64,
        page: &ManagedPage,
        document: &SourceDocument,
    ) -> LoadSession {
        let start_time = Instant::now();
        let names = [self.regions.hero.as_str(), self.regions.main.as_str()];
        let set = extract_regions(document, &names, &self.markers);
        let warning = set.warning();
        if let Some(warning) = &warning {
            warn!(page = %page.path, "{warning}");
        }

        let mut regions = set.into_regions().into_iter();
        let hero = regions
            .next()
            .unwrap_or_else(|| Region::missing(&self.regions.hero));
        let main = regions
            .next()
            .unwrap_or_else(|| Region::missing(&self.regions.main));

        let blocks = self.classify_blocks(&main.inner_markup);
        let preview = compose_preview_with(
            &self.preview,
            &self.markers,
            &self.regions,
            &hero.inner_markup,
            &main.inner_markup,
        );

        debug!(
            page = %page.path,
            blocks = blocks.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "processed document"
        );

        LoadSession {
            id: Uuid::new_v4(),
            generation,
            page: page.clone(),
            source: document.clone(),
            fingerprint: document.fingerprint(),
            hero,
            main,
            blocks,
            warning,
            preview,
            loaded_at: Utc::now(),
        }
    }

    /// Retrieve `page` from `source`, run the pipeline and hand the result to
    /// the workspace. Only a retrieval failure aborts the load.
    pub fn load(
        &self,
        workspace: &mut Workspace,
        page: &ManagedPage,
        source: &dyn DocumentSource,
    ) -> LoadOutcome {
        let ticket = workspace.begin_load();
        info!(
            generation = ticket.generation(),
            page = %page.path,
            source = source.name(),
            "loading page"
        );

        let result = source
            .fetch(&page.path)
            .map(|retrieved| {
                let document = retrieved.into_source();
                self.process_document(ticket.generation(), page, &document)
            })
            .map_err(|e| e.user_message());

        workspace.complete(ticket, result)
    }
}
