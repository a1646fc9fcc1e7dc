//! Document tree produced by the parser and consumed by build-time transforms.
//!
//! The shape mirrors an HTML syntax tree: elements carry a tag name, a property
//! map and ordered children; text nodes carry literal text. `Raw` holds HTML
//! passed through from the source untouched.

use std::collections::BTreeMap;

use serde::Serialize;

/// Root of a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    /// Top-level nodes in document order
    pub children: Vec<Node>,
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Element(Element),
    Text { value: String },
    Raw { value: String },
}

/// An element node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Element {
    /// Tag name (e.g. `pre`, `code`, `span`)
    pub tag: String,

    /// Properties keyed by attribute name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyValue>,

    /// Ordered children
    pub children: Vec<Node>,
}

/// Value of an element property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    /// Space-separated token list such as `class`
    List(Vec<String>),
    Bool(bool),
}

impl PropertyValue {
    /// The value as a single string, if it is textual.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Node {
    /// Create a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Create a raw HTML node.
    pub fn raw(value: impl Into<String>) -> Self {
        Self::Raw {
            value: value.into(),
        }
    }

    /// Borrow the element, if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Mutably borrow the element, if this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text { value } => out.push_str(value),
            Self::Raw { .. } => {}
            Self::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

impl Element {
    /// Create an empty element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set a string property.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .insert(name.into(), PropertyValue::Text(value.into()));
        self
    }

    /// Set a boolean property.
    pub fn with_flag(mut self, name: impl Into<String>) -> Self {
        self.properties.insert(name.into(), PropertyValue::Bool(true));
        self
    }

    /// Set the class list.
    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = classes.into_iter().map(Into::into).collect();
        self.properties
            .insert("class".to_string(), PropertyValue::List(list));
        self
    }

    /// Append a child node.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Replace the children.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Look up a string property.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(PropertyValue::as_str)
    }

    /// Check whether a property is present.
    pub fn has_attr(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Class tokens of this element.
    ///
    /// Accepts both list-valued and space-separated string `class` properties.
    pub fn classes(&self) -> Vec<&str> {
        match self.properties.get("class") {
            Some(PropertyValue::List(list)) => list.iter().map(String::as_str).collect(),
            Some(PropertyValue::Text(s)) => s.split_whitespace().collect(),
            _ => Vec::new(),
        }
    }

    /// Check for a class token.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().contains(&class)
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

impl Document {
    /// Create a document from top-level nodes.
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Resolve an index path to a node.
    ///
    /// The first index selects a top-level node, each following index a child
    /// of the previous element.
    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get(*first)?;
        for &idx in rest {
            node = node.as_element()?.children.get(idx)?;
        }
        Some(node)
    }

    /// Mutable access to the sibling list containing the node at `path`.
    ///
    /// Returns the list and the node's index within it.
    pub fn siblings_mut(&mut self, path: &[usize]) -> Option<(&mut Vec<Node>, usize)> {
        let (last, parents) = path.split_last()?;
        let mut list = &mut self.children;
        for &idx in parents {
            list = &mut list.get_mut(idx)?.as_element_mut()?.children;
        }
        if *last < list.len() {
            Some((list, *last))
        } else {
            None
        }
    }

    /// Concatenated text of the whole document.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::new(vec![
            Element::new("p").with_child(Node::text("intro")).into(),
            Element::new("section")
                .with_child(Element::new("h2").with_child(Node::text("Title")))
                .with_child(
                    Element::new("p")
                        .with_child(Node::text("a "))
                        .with_child(Element::new("em").with_child(Node::text("b"))),
                )
                .into(),
        ])
    }

    #[test]
    fn resolves_paths() {
        let doc = sample();

        let node = doc.node_at(&[1, 1, 1]).unwrap();
        assert_eq!(node.as_element().unwrap().tag, "em");
        assert!(doc.node_at(&[1, 5]).is_none());
        assert!(doc.node_at(&[]).is_none());
    }

    #[test]
    fn splices_through_sibling_access() {
        let mut doc = sample();

        let (list, idx) = doc.siblings_mut(&[1, 0]).unwrap();
        list.insert(idx + 1, Node::text("inserted"));

        let section = doc.children[1].as_element().unwrap();
        assert_eq!(section.children.len(), 3);
        assert_eq!(section.children[1], Node::text("inserted"));
    }

    #[test]
    fn collects_text_content() {
        let doc = sample();
        assert_eq!(doc.text_content(), "introTitlea b");
    }

    #[test]
    fn serializes_with_type_tags() {
        let node: Node = Element::new("code")
            .with_classes(["language-rust"])
            .with_child(Node::text("x"))
            .into();

        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["type"], "element");
        assert_eq!(json["tag"], "code");
        assert_eq!(json["properties"]["class"][0], "language-rust");
        assert_eq!(json["children"][0]["type"], "text");
        assert_eq!(json["children"][0]["value"], "x");
    }

    #[test]
    fn reads_classes_from_both_forms() {
        let listed = Element::new("code").with_classes(["language-rust", "x"]);
        assert!(listed.has_class("language-rust"));

        let spaced = Element::new("code").with_attr("class", "language-go  y");
        assert_eq!(spaced.classes(), vec!["language-go", "y"]);
    }
}
