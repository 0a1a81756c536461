//! Pipeline boundary tests over saved pages.
//!
//! Each fixture under `test_fixtures/pages/` is a full page as the page API
//! would return it. The tests run the whole pipeline (extraction,
//! decomposition, classification, preview) and assert on the JSON block
//! listing, the shape the presentation layer consumes.

use regionkit_core::{
    extract_region, EditorConfig, FileSource, LoadOutcome, ManagedPage, MemorySource,
    PageProcessor, SourceDocument, Workspace,
};
use serde_json::Value;
use std::path::PathBuf;

// ============================================================================
// Fixture helpers
// ============================================================================

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_fixtures/pages")
}

fn load_page(file: &str) -> SourceDocument {
    let path = fixtures_dir().join(file);
    let contents = std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Missing fixture: {}", path.display()));
    SourceDocument::new(contents)
}

/// Run the pipeline on a fixture and return the JSON block listing.
fn listing_json(file: &str) -> Value {
    let page = ManagedPage::new(file, file);
    let session = PageProcessor::default().process_document(1, &page, &load_page(file));
    serde_json::to_value(session.listing()).expect("listing serializes")
}

fn block_pairs(listing: &Value) -> Vec<(String, String)> {
    listing["blocks"]
        .as_array()
        .expect("blocks array")
        .iter()
        .map(|b| {
            (
                b["type_tag"].as_str().unwrap().to_string(),
                b["summary"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

// ============================================================================
// Extraction boundary
// ============================================================================

mod extraction {
    use super::*;

    #[test]
    fn home_hero_is_trimmed_inner_markup() {
        let hero = extract_region(&load_page("home.html"), "hero");
        assert!(hero.found);
        assert_eq!(hero.inner_markup, "X");
    }

    #[test]
    fn missing_main_is_reported_not_fatal() {
        let listing = listing_json("no_main.html");
        assert!(listing["blocks"].as_array().unwrap().is_empty());
        let warning = listing["warning"].as_str().expect("warning present");
        assert!(warning.contains("\"main\""));
        assert!(!warning.contains("\"hero\""));
    }

    #[test]
    fn out_of_order_markers_are_not_found() {
        let doc = load_page("out_of_order.html");
        assert!(!extract_region(&doc, "hero").found);
        assert!(extract_region(&doc, "main").found);

        let listing = listing_json("out_of_order.html");
        assert!(listing["warning"].as_str().unwrap().contains("\"hero\""));
        assert_eq!(
            block_pairs(&listing),
            vec![("two-col".to_string(), "Find us".to_string())]
        );
    }
}

// ============================================================================
// Classification boundary
// ============================================================================

mod classification {
    use super::*;

    #[test]
    fn home_has_single_standard_container() {
        let listing = listing_json("home.html");
        assert!(listing["warning"].is_null());
        assert_eq!(listing["blocks"][0]["ordinal"], 0);
        assert_eq!(
            block_pairs(&listing),
            vec![("std-container".to_string(), "Title".to_string())]
        );
    }

    #[test]
    fn gallery_blocks_in_document_order() {
        let listing = listing_json("gallery.html");
        let expected = vec![
            ("grid-wrapper", "3 images"),
            ("inline-polaroid", "Our chef at work"),
            ("50-50-split", "From the kitchen (image left)"),
            ("small-img-lrg-txt", "Wine list"),
            ("std-image", "/images/lazy-terrace.jpg"),
            ("p", "Photos by Sam Lee 2024"),
        ];
        let expected: Vec<(String, String)> = expected
            .into_iter()
            .map(|(t, s)| (t.to_string(), s.to_string()))
            .collect();
        assert_eq!(block_pairs(&listing), expected);

        let ordinals: Vec<u64> = listing["blocks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["ordinal"].as_u64().unwrap())
            .collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn reprocessing_unchanged_markup_is_stable() {
        assert_eq!(
            block_pairs(&listing_json("gallery.html")),
            block_pairs(&listing_json("gallery.html"))
        );
    }

    #[test]
    fn disabling_a_recognizer_falls_through_the_chain() {
        let config = EditorConfig::from_yaml(
            r#"
classifier:
  recognizers:
    - name: grid-wrapper
      enabled: false
"#,
        )
        .unwrap();
        let processor = PageProcessor::new(&config).unwrap();
        let page = ManagedPage::new("Gallery", "gallery.html");
        let session = processor.process_document(1, &page, &load_page("gallery.html"));

        // Only the listed recognizer remains configured, and it is disabled
        assert_eq!(session.blocks[0].type_tag, "div");
        assert_eq!(session.blocks[1].type_tag, "div");
    }
}

// ============================================================================
// Preview boundary
// ============================================================================

mod preview {
    use super::*;

    #[test]
    fn preview_round_trips_both_regions() {
        let page = ManagedPage::new("Gallery", "gallery.html");
        let session =
            PageProcessor::default().process_document(1, &page, &load_page("gallery.html"));
        let composed = SourceDocument::new(session.preview.clone());

        assert_eq!(
            extract_region(&composed, "hero").inner_markup,
            session.hero.inner_markup
        );
        assert_eq!(
            extract_region(&composed, "main").inner_markup,
            session.main.inner_markup
        );
    }

    #[test]
    fn hero_precedes_main_in_preview() {
        let page = ManagedPage::new("Home", "home.html");
        let session = PageProcessor::default().process_document(1, &page, &load_page("home.html"));
        let hero_at = session.preview.find("<!--START hero-->").unwrap();
        let main_at = session.preview.find("<!--START main-->").unwrap();
        assert!(hero_at < main_at);
    }
}

// ============================================================================
// Load lifecycle
// ============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn file_source_load_installs_session() {
        let processor = PageProcessor::default();
        let mut workspace = Workspace::new();
        let page = ManagedPage::new("Home", "home.html");

        let outcome = processor.load(&mut workspace, &page, &FileSource::new(fixtures_dir()));
        assert!(outcome.is_installed());

        let session = workspace.current().unwrap();
        assert_eq!(session.page.path, "home.html");
        assert_eq!(session.fingerprint, load_page("home.html").fingerprint());
    }

    #[test]
    fn not_found_response_surfaces_error_field_verbatim() {
        let processor = PageProcessor::default();
        let mut workspace = Workspace::new();
        let page = ManagedPage::new("Menu", "menu.html");
        let source = MemorySource::new().with_failure("menu.html", 404, r#"{"error":"not found"}"#);

        match processor.load(&mut workspace, &page, &source) {
            LoadOutcome::Failed { message } => assert_eq!(message, "not found"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn failed_reload_keeps_previous_session() {
        let processor = PageProcessor::default();
        let mut workspace = Workspace::new();
        let page = ManagedPage::new("Home", "home.html");

        let files = FileSource::new(fixtures_dir());
        assert!(processor.load(&mut workspace, &page, &files).is_installed());
        let first_id = workspace.current().unwrap().id;

        let failing = MemorySource::new().with_failure("home.html", 500, "upstream timeout");
        let outcome = processor.load(&mut workspace, &page, &failing);
        assert!(matches!(outcome, LoadOutcome::Failed { ref message } if message == "upstream timeout"));
        assert_eq!(workspace.current().unwrap().id, first_id);
    }

    #[test]
    fn overlapping_loads_keep_only_the_latest() {
        let processor = PageProcessor::default();
        let mut workspace = Workspace::new();
        let home = ManagedPage::new("Home", "home.html");
        let gallery = ManagedPage::new("Gallery", "gallery.html");

        // Two loads in flight; the older one resolves last
        let older = workspace.begin_load();
        let newer = workspace.begin_load();
        let gallery_session =
            processor.process_document(newer.generation(), &gallery, &load_page("gallery.html"));
        let home_session =
            processor.process_document(older.generation(), &home, &load_page("home.html"));

        assert!(workspace.complete(newer, Ok(gallery_session)).is_installed());
        assert!(matches!(
            workspace.complete(older, Ok(home_session)),
            LoadOutcome::Stale { .. }
        ));
        assert_eq!(workspace.current().unwrap().page.path, "gallery.html");
    }
}
