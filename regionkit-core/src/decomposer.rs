//! Block Decomposer
//!
//! Parses a region's inner markup as an HTML fragment and returns the
//! immediate element children of the fragment container, in source order.
//! Decomposition is one level deep: nested blocks stay inside their parent's
//! subtree.
//!
//! Parsing is html5ever's fragment algorithm (through `scraper`) with a `body`
//! context, so malformed input is repaired exactly the way a browser would:
//! implied end tags, void elements, raw-text elements, stray end tags and
//! unclosed elements all follow the HTML5 tree-construction rules.

use crate::node::{NodeChild, StructuralNode};
use scraper::{ElementRef, Html, Node};
use tracing::debug;

/// Top-level structural nodes of `inner_markup`, in document order.
///
/// Bare text and comments between top-level elements are not blocks and are
/// skipped. An empty fragment yields an empty list.
pub fn decompose(inner_markup: &str) -> Vec<StructuralNode> {
    let nodes: Vec<StructuralNode> = parse_fragment(inner_markup)
        .into_iter()
        .filter_map(|child| match child {
            NodeChild::Element(node) => Some(node),
            NodeChild::Text(_) => None,
        })
        .collect();
    debug!(blocks = nodes.len(), "decomposed region fragment");
    nodes
}

/// Parse a markup fragment into the children of the synthetic container.
pub fn parse_fragment(markup: &str) -> Vec<NodeChild> {
    let fragment = Html::parse_fragment(markup);
    if !fragment.errors.is_empty() {
        debug!(repairs = fragment.errors.len(), "fragment needed parser repairs");
    }
    // html5ever puts fragment content under a synthetic <html> element
    convert_children(fragment.root_element())
}

fn convert_children(element: ElementRef<'_>) -> Vec<NodeChild> {
    element
        .children()
        .filter_map(|child| match child.value() {
            Node::Element(_) => ElementRef::wrap(child).map(|el| NodeChild::Element(convert(el))),
            Node::Text(text) => Some(NodeChild::Text(String::from(&**text))),
            // Comments, doctypes and processing instructions are not content
            _ => None,
        })
        .collect()
}

fn convert(element: ElementRef<'_>) -> StructuralNode {
    let value = element.value();
    StructuralNode {
        tag: value.name().to_string(),
        attributes: value
            .attrs()
            .map(|(name, val)| (name.to_string(), val.to_string()))
            .collect(),
        children: convert_children(element),
        raw_markup: element.html(),
    }
}
