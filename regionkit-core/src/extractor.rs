//! Region Extractor
//!
//! Finds marker-delimited regions in raw page markup. The markers are literal
//! tokens parameterized only by the region name, e.g.
//!
//! ```text
//! <!--START main--> ... <!--END main-->
//! ```
//!
//! A region whose markers are missing or out of order is reported as not found;
//! that is a soft signal for the caller, never an error.

use crate::types::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

const NAME_PLACEHOLDER: &str = "{name}";

/// Start/end marker templates. `{name}` is replaced by the region name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerConvention {
    pub start: String,
    pub end: String,
}

impl Default for MarkerConvention {
    fn default() -> Self {
        Self {
            start: "<!--START {name}-->".to_string(),
            end: "<!--END {name}-->".to_string(),
        }
    }
}

impl MarkerConvention {
    pub fn start_marker(&self, name: &str) -> String {
        self.start.replace(NAME_PLACEHOLDER, name)
    }

    pub fn end_marker(&self, name: &str) -> String {
        self.end.replace(NAME_PLACEHOLDER, name)
    }

    /// Wrap a fragment in this convention's markers.
    pub fn wrap(&self, name: &str, inner: &str) -> String {
        format!(
            "{}\n{}\n{}",
            self.start_marker(name),
            inner,
            self.end_marker(name)
        )
    }
}

/// Extract `name` using the default `<!--START name-->` convention.
pub fn extract_region(document: &SourceDocument, name: &str) -> Region {
    extract_region_with(document, name, &MarkerConvention::default())
}

/// Extract `name` using an explicit marker convention.
///
/// Binds to the first start marker and the first end marker in the document.
/// If the end marker does not begin strictly after the start marker ends, the
/// region is reported as missing. Offsets count characters, not bytes. Later marker pairs with the same name are
/// never consulted.
pub fn extract_region_with(
    document: &SourceDocument,
    name: &str,
    convention: &MarkerConvention,
) -> Region {
    let text = document.as_str();
    let start_marker = convention.start_marker(name);
    let end_marker = convention.end_marker(name);

    let (Some(start), Some(end)) = (text.find(&start_marker), text.find(&end_marker)) else {
        debug!(region = name, "region markers not present");
        return Region::missing(name);
    };

    let inner_start = start + start_marker.len();
    if end <= inner_start {
        debug!(region = name, start, end, "region end marker precedes start");
        return Region::missing(name);
    }

    Region {
        name: name.to_string(),
        found: true,
        inner_markup: text[inner_start..end].trim().to_string(),
        start_offset: char_offset(text, start),
        end_offset: char_offset(text, end + end_marker.len()),
    }
}

fn char_offset(text: &str, byte_index: usize) -> usize {
    text[..byte_index].chars().count()
}

/// Several regions extracted from one document, in request order.
#[derive(Debug, Clone)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    pub fn get(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Names of regions that were not found, in request order.
    pub fn missing(&self) -> Vec<String> {
        self.regions
            .iter()
            .filter(|r| !r.found)
            .map(|r| r.name.clone())
            .collect()
    }

    /// Composite warning covering every missing region, if any.
    pub fn warning(&self) -> Option<LoadWarning> {
        let missing = self.missing();
        if missing.is_empty() {
            None
        } else {
            Some(LoadWarning::MissingRegions(missing))
        }
    }

    pub fn into_regions(self) -> Vec<Region> {
        self.regions
    }
}

pub fn extract_regions(
    document: &SourceDocument,
    names: &[&str],
    convention: &MarkerConvention,
) -> RegionSet {
    RegionSet {
        regions: names
            .iter()
            .map(|name| extract_region_with(document, name, convention))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_trimmed_inner_markup() {
        let doc = SourceDocument::new("a<!--START hero-->  X \n<!--END hero-->b");
        let region = extract_region(&doc, "hero");
        assert!(region.found);
        assert_eq!(region.inner_markup, "X");
        assert_eq!(region.start_offset, 1);
        assert_eq!(region.end_offset, doc.len() - 1);
    }

    #[test]
    fn missing_start_marker_is_not_found() {
        let doc = SourceDocument::new("<p>x</p><!--END main-->");
        let region = extract_region(&doc, "main");
        assert!(!region.found);
        assert!(region.inner_markup.is_empty());
    }

    #[test]
    fn missing_end_marker_is_not_found() {
        let doc = SourceDocument::new("<!--START main--><p>x</p>");
        assert!(!extract_region(&doc, "main").found);
    }

    #[test]
    fn end_before_start_is_not_found() {
        let doc = SourceDocument::new("<!--END main--><p>x</p><!--START main-->");
        let region = extract_region(&doc, "main");
        assert!(!region.found);
        assert!(region.inner_markup.is_empty());
    }

    #[test]
    fn adjacent_markers_yield_empty_found_region() {
        let doc = SourceDocument::new("<!--START main--> <!--END main-->");
        let region = extract_region(&doc, "main");
        assert!(region.found);
        assert!(region.inner_markup.is_empty());
    }

    #[test]
    fn back_to_back_markers_are_not_strictly_ordered() {
        let doc = SourceDocument::new("<!--START main--><!--END main-->");
        assert!(!extract_region(&doc, "main").found);
    }

    #[test]
    fn offsets_count_characters() {
        let doc = SourceDocument::new("Café → <!--START hero-->Crème<!--END hero-->ü");
        let region = extract_region(&doc, "hero");
        assert!(region.found);
        assert_eq!(region.start_offset, 7);
        assert_eq!(region.end_offset, doc.as_str().chars().count() - 1);
        assert_eq!(region.inner_markup, "Crème");
    }

    #[test]
    fn repeated_names_bind_to_first_pair() {
        let doc = SourceDocument::new(
            "<!--START main-->one<!--END main--><!--START main-->two<!--END main-->",
        );
        assert_eq!(extract_region(&doc, "main").inner_markup, "one");
    }

    #[test]
    fn name_is_matched_exactly() {
        let doc = SourceDocument::new("<!--START main-nav-->x<!--END main-nav-->");
        assert!(!extract_region(&doc, "main").found);
        assert!(extract_region(&doc, "main-nav").found);
    }

    #[test]
    fn custom_convention() {
        let convention = MarkerConvention {
            start: "<!-- region:{name} -->".to_string(),
            end: "<!-- /region:{name} -->".to_string(),
        };
        let doc = SourceDocument::new("<!-- region:hero -->H<!-- /region:hero -->");
        let region = extract_region_with(&doc, "hero", &convention);
        assert_eq!(region.inner_markup, "H");
    }

    #[test]
    fn region_set_reports_missing_names_in_order() {
        let doc = SourceDocument::new("<!--START hero-->X<!--END hero-->");
        let set = extract_regions(&doc, &["main", "hero", "footer"], &MarkerConvention::default());
        assert_eq!(set.missing(), vec!["main".to_string(), "footer".to_string()]);
        assert!(set.get("hero").unwrap().found);
        let warning = set.warning().unwrap().to_string();
        assert!(warning.contains("main"));
        assert!(warning.contains("footer"));
    }
}
