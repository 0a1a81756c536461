use serde::{Deserialize, Serialize};

/// An element parsed out of a region fragment, with its full subtree.
///
/// Tag and attribute names are lowercased; attribute values and text are
/// entity-decoded. `raw_markup` is the element serialized back to HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralNode {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<NodeChild>,
    pub raw_markup: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeChild {
    Element(StructuralNode),
    Text(String),
}

impl StructuralNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|(key, _)| key == name)
    }

    /// Attribute value, treating an empty or whitespace-only value as absent.
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn class_tokens(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, token: &str) -> bool {
        self.class_tokens().any(|t| t == token)
    }

    pub fn element_children(&self) -> impl Iterator<Item = &StructuralNode> {
        self.children.iter().filter_map(|child| match child {
            NodeChild::Element(node) => Some(node),
            NodeChild::Text(_) => None,
        })
    }

    /// All descendant elements in document order (depth first, self excluded).
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&StructuralNode> = self.element_children().collect();
        stack.reverse();
        Descendants { stack }
    }

    pub fn first_descendant<P>(&self, predicate: P) -> Option<&StructuralNode>
    where
        P: Fn(&StructuralNode) -> bool,
    {
        self.descendants().find(|node| predicate(node))
    }

    pub fn count_descendants(&self, tag: &str) -> usize {
        self.descendants().filter(|node| node.tag == tag).count()
    }

    /// Concatenated descendant text with runs of whitespace collapsed.
    pub fn text_content(&self) -> String {
        let mut raw = String::new();
        self.collect_text(&mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                NodeChild::Text(text) => {
                    out.push_str(text);
                }
                NodeChild::Element(node) => {
                    // Keep words from adjacent elements apart
                    out.push(' ');
                    node.collect_text(out);
                    out.push(' ');
                }
            }
        }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a StructuralNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a StructuralNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let before = self.stack.len();
        self.stack.extend(node.element_children());
        self.stack[before..].reverse();
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str, attributes: &[(&str, &str)], children: Vec<NodeChild>) -> StructuralNode {
        StructuralNode {
            tag: tag.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            children,
            raw_markup: String::new(),
        }
    }

    fn text(value: &str) -> NodeChild {
        NodeChild::Text(value.to_string())
    }

    #[test]
    fn descendants_are_in_document_order() {
        let tree = element(
            "div",
            &[],
            vec![
                NodeChild::Element(element(
                    "section",
                    &[],
                    vec![NodeChild::Element(element("h2", &[], vec![text("A")]))],
                )),
                NodeChild::Element(element("p", &[], vec![text("B")])),
            ],
        );
        let tags: Vec<&str> = tree.descendants().map(|n| n.tag.as_str()).collect();
        assert_eq!(tags, vec!["section", "h2", "p"]);
    }

    #[test]
    fn class_tokens_split_on_whitespace() {
        let node = element("div", &[("class", "  section\tfeatured ")], vec![]);
        assert!(node.has_class("section"));
        assert!(node.has_class("featured"));
        assert!(!node.has_class("sect"));
    }

    #[test]
    fn text_content_collapses_whitespace() {
        let node = element(
            "p",
            &[],
            vec![
                text("  Hello\n"),
                NodeChild::Element(element("b", &[], vec![text("big")])),
                text("world  "),
            ],
        );
        assert_eq!(node.text_content(), "Hello big world");
    }

    #[test]
    fn blank_attribute_is_treated_as_absent() {
        let node = element("img", &[("src", "  ")], vec![]);
        assert!(node.has_attr("src"));
        assert_eq!(node.non_empty_attr("src"), None);
    }
}
