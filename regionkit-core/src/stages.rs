//! Stage dumps and listing output
//!
//! `dump_stages` writes every intermediate of one load to a directory so a
//! run can be inspected (or turned into a test fixture) without re-fetching.

use crate::types::{BlockListing, LoadSession};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write the source, regions, blocks, preview and a summary into `dir`.
/// Returns the written paths in write order.
pub fn dump_stages(session: &LoadSession, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let source = &session.source;
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create stages directory {}", dir.display()))?;

    let mut written = Vec::new();

    // Stage 0: source document as retrieved
    written.push(write_stage(dir, "source.html", source.as_str())?);

    // Stage 1: regions
    let regions = serde_json::to_string_pretty(&[&session.hero, &session.main])?;
    written.push(write_stage(dir, "regions.json", &regions)?);

    // Stage 2: classified blocks, raw markup included
    let blocks = serde_json::to_string_pretty(&session.blocks)?;
    written.push(write_stage(dir, "blocks.json", &blocks)?);

    // Stage 3: composed preview
    written.push(write_stage(dir, "preview.html", &session.preview)?);

    let summary = serde_json::json!({
        "page": session.page,
        "session_id": session.id,
        "generation": session.generation,
        "fingerprint": source.fingerprint(),
        "loaded_at": session.loaded_at.to_rfc3339(),
        "captured_at": chrono::Utc::now().to_rfc3339(),
        "warning": session.warning.as_ref().map(|w| w.to_string()),
        "stage_counts": {
            "source_bytes": source.len(),
            "hero_found": session.hero.found,
            "main_found": session.main.found,
            "blocks": session.blocks.len(),
            "preview_bytes": session.preview.len(),
        }
    });
    written.push(write_stage(
        dir,
        "summary.json",
        &serde_json::to_string_pretty(&summary)?,
    )?);

    debug!(dir = %dir.display(), files = written.len(), "dumped pipeline stages");
    Ok(written)
}

fn write_stage(dir: &Path, file: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(file);
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

impl BlockListing {
    /// Plain text table: one row per block, warning line first if any.
    pub fn to_text_table(&self) -> String {
        let mut out = String::new();
        if let Some(warning) = &self.warning {
            out.push_str(&format!("warning: {warning}\n"));
        }
        if self.blocks.is_empty() {
            out.push_str("(no blocks)\n");
            return out;
        }

        let tag_width = self
            .blocks
            .iter()
            .map(|b| b.type_tag.chars().count())
            .max()
            .unwrap_or(0)
            .max("TYPE".len());

        out.push_str(&format!("{:>3}  {:<tag_width$}  SUMMARY\n", "#", "TYPE"));
        for block in &self.blocks {
            out.push_str(&format!(
                "{:>3}  {:<tag_width$}  {}\n",
                block.ordinal, block.type_tag, block.summary
            ));
        }
        out
    }
}
