//! Arena-backed element tree.
//!
//! Only elements are modelled. Each element carries its own text, rendered
//! before its children, which is enough for the flat markup the simulated
//! application produces.

use super::selector::Selector;
use crate::locator::normalize_whitespace;
use std::collections::{BTreeMap, HashMap};

/// Index of a node in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An element and its rendering flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Lower-case tag name
    pub tag: String,
    /// Attributes, including `id` and `class`
    pub attributes: BTreeMap<String, String>,
    /// Own text
    pub text: String,
    /// `display: none`
    pub hidden: bool,
    /// `disabled` form control
    pub disabled: bool,
}

impl Element {
    /// Create an element
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attr("id", id)
    }

    /// Set the `class` attribute
    #[must_use]
    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.with_attr("class", class)
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set own text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the hidden flag
    #[must_use]
    pub const fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Set the disabled flag
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whitespace-separated class list
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    /// Whether the class list contains `class`
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    element: Element,
}

/// Element tree rooted at `<html>`
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// `<html><body></body></html>`
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                element: Element::new("html"),
            }],
            body: NodeId(0),
        };
        doc.body = doc.append(NodeId(0), Element::new("body"));
        doc
    }

    /// The `<html>` element
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The `<body>` element
    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// Append `element` as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, element: Element) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            element,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Element data
    #[must_use]
    pub fn element(&self, id: NodeId) -> &Element {
        &self.nodes[id.0].element
    }

    /// Parent element
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Child elements
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Ancestors from parent up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |n| self.parent(*n))
    }

    /// Whether `id` is a strict descendant of `ancestor`
    #[must_use]
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Every element in document (pre-)order
    #[must_use]
    pub fn document_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Sort ids into document order
    pub fn sort_document_order(&self, ids: &mut [NodeId]) {
        let rank: HashMap<NodeId, usize> = self
            .document_order()
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        ids.sort_by_key(|id| rank.get(id).copied().unwrap_or(usize::MAX));
    }

    /// `querySelectorAll`: matches in document order, restricted to strict
    /// descendants of `scope` (the whole document when `None`).
    #[must_use]
    pub fn query_all(&self, scope: Option<NodeId>, selector: &Selector) -> Vec<NodeId> {
        self.document_order()
            .into_iter()
            .filter(|id| scope.map_or(true, |s| self.is_descendant_of(*id, s)))
            .filter(|id| selector.matches(self, *id))
            .collect()
    }

    /// Rendered, not hidden itself nor through an ancestor
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        !self.element(id).hidden && self.ancestors(id).all(|a| !self.element(a).hidden)
    }

    /// Concatenated text of the element and all descendants
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = self.element(id).text.clone();
        for child in self.children(id) {
            out.push_str(&self.text_content(*child));
        }
        out
    }

    /// Text of visible descendants, whitespace-normalized
    #[must_use]
    pub fn inner_text(&self, id: NodeId) -> String {
        if !self.is_visible(id) {
            return String::new();
        }
        let mut pieces = Vec::new();
        self.collect_visible_text(id, &mut pieces);
        normalize_whitespace(&pieces.join(" "))
    }

    fn collect_visible_text(&self, id: NodeId, pieces: &mut Vec<String>) {
        let element = self.element(id);
        if element.hidden {
            return;
        }
        if !element.text.is_empty() {
            pieces.push(element.text.clone());
        }
        for child in self.children(id) {
            self.collect_visible_text(*child, pieces);
        }
    }
}
