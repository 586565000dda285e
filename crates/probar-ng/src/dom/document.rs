//! Parsed HTML document with stable node identities.
//!
//! Nodes are stored in an arena in pre-order, so a node's index is its
//! document position: `a` precedes `b` exactly when `a < b`, and the
//! descendants of a node occupy the contiguous range after it.

use crate::driver::ElementHandle;
use crate::script::bridge::Thrown;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;

/// `Node.ELEMENT_NODE`
pub const ELEMENT_NODE: u16 = 1;
/// `Node.TEXT_NODE`
pub const TEXT_NODE: u16 = 3;
/// `Node.PROCESSING_INSTRUCTION_NODE`
pub const PROCESSING_INSTRUCTION_NODE: u16 = 7;
/// `Node.COMMENT_NODE`
pub const COMMENT_NODE: u16 = 8;
/// `Node.DOCUMENT_NODE`
pub const DOCUMENT_NODE: u16 = 9;

const HANDLE_PREFIX: &str = "node-";

/// Position of a node in its document; ordering is document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Pre-order index of the node
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{HANDLE_PREFIX}{}", self.0)
    }
}

/// What a node is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document itself
    Document,
    /// An element with its lowercased tag and attributes in source order
    Element {
        /// Tag name
        tag: String,
        /// Attributes
        attrs: Vec<(String, String)>,
    },
    /// A text node
    Text(String),
    /// A comment
    Comment(String),
    /// Doctype or processing instruction
    Other,
}

impl NodeKind {
    /// DOM `nodeType`
    #[must_use]
    pub const fn node_type(&self) -> u16 {
        match self {
            Self::Document => DOCUMENT_NODE,
            Self::Element { .. } => ELEMENT_NODE,
            Self::Text(_) => TEXT_NODE,
            Self::Comment(_) => COMMENT_NODE,
            Self::Other => PROCESSING_INSTRUCTION_NODE,
        }
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    next_sibling: Option<NodeId>,
    subtree_end: usize,
}

/// An HTML document the local browser queries
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    nodes: Vec<NodeData>,
}

impl Document {
    /// Parse an HTML document
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut nodes: Vec<NodeData> = Vec::new();
        let mut last_child: Vec<Option<NodeId>> = Vec::new();
        let mut ids = HashMap::new();

        for node in parsed.tree.root().descendants() {
            let id = NodeId(nodes.len());
            ids.insert(node.id(), id);
            let parent = node.parent().and_then(|p| ids.get(&p.id()).copied());
            let kind = match node.value() {
                Node::Document | Node::Fragment => NodeKind::Document,
                Node::Element(element) => NodeKind::Element {
                    tag: element.name().to_ascii_lowercase(),
                    attrs: element
                        .attrs()
                        .map(|(name, value)| (name.to_string(), value.to_string()))
                        .collect(),
                },
                Node::Text(text) => NodeKind::Text(text.to_string()),
                Node::Comment(comment) => NodeKind::Comment(comment.to_string()),
                _ => NodeKind::Other,
            };
            if let Some(parent) = parent {
                if let Some(previous) = last_child[parent.0] {
                    nodes[previous.0].next_sibling = Some(id);
                }
                last_child[parent.0] = Some(id);
            }
            nodes.push(NodeData {
                kind,
                parent,
                next_sibling: None,
                subtree_end: id.0,
            });
            last_child.push(None);
        }

        for index in (0..nodes.len()).rev() {
            if let Some(parent) = nodes[index].parent {
                let end = nodes[index].subtree_end;
                if end > nodes[parent.0].subtree_end {
                    nodes[parent.0].subtree_end = end;
                }
            }
        }

        Self {
            source: html.to_string(),
            nodes,
        }
    }

    /// The document node
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, the document included
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document has no nodes at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node kind
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// DOM `nodeType`
    #[must_use]
    pub fn node_type(&self, id: NodeId) -> u16 {
        self.kind(id).node_type()
    }

    /// Whether the node is an element
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.node_type(id) == ELEMENT_NODE
    }

    /// Parent node
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Next sibling node of any type
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next_sibling
    }

    /// Lowercased tag name of an element
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Attribute value of an element
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(attr, _)| attr == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// `nodeValue`: text of a text or comment node
    #[must_use]
    pub fn node_value(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text(text) | NodeKind::Comment(text) => Some(text),
            _ => None,
        }
    }

    /// Whether `b` follows `a` in document order
    #[must_use]
    pub fn follows(&self, a: NodeId, b: NodeId) -> bool {
        b.0 > a.0
    }

    /// Whether `ancestor` strictly contains `node`
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node.0 > ancestor.0 && node.0 <= self.nodes[ancestor.0].subtree_end
    }

    fn descendant_range(&self, scope: NodeId) -> RangeInclusive<usize> {
        scope.0 + 1..=self.nodes[scope.0].subtree_end
    }

    /// Strict descendants of `scope`, in document order
    pub fn descendants(&self, scope: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.descendant_range(scope).map(NodeId)
    }

    /// Descendant elements of `scope`, in document order
    pub fn elements(&self, scope: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(scope).filter(|id| self.is_element(*id))
    }

    /// `textContent`: every descendant text node concatenated
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Text(text) | NodeKind::Comment(text) => text.clone(),
            _ => self
                .descendants(id)
                .filter_map(|node| match self.kind(node) {
                    NodeKind::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    /// Approximation of `innerText`: text content with whitespace runs
    /// collapsed and the ends trimmed
    #[must_use]
    pub fn rendered_text(&self, id: NodeId) -> String {
        self.text_content(id)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `scope.querySelectorAll(selector)`.
    ///
    /// The scraper tree is not `Send`, so the source is parsed again for
    /// matching; parsing is deterministic, so pre-order positions line up
    /// with this document's node ids.
    pub fn select(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, Thrown> {
        let compiled = Selector::parse(selector).map_err(|_| {
            Thrown::syntax_error(format!("'{selector}' is not a valid selector"))
        })?;
        let range = self.descendant_range(scope);
        let parsed = Html::parse_document(&self.source);
        Ok(parsed
            .tree
            .root()
            .descendants()
            .enumerate()
            .filter(|(index, _)| range.contains(index))
            .filter_map(|(index, node)| {
                ElementRef::wrap(node)
                    .filter(|element| compiled.matches(element))
                    .map(|_| NodeId(index))
            })
            .collect())
    }

    /// Handle the local browser hands out for a node
    #[must_use]
    pub fn handle(&self, id: NodeId) -> ElementHandle {
        ElementHandle::new(id.to_string())
    }

    /// Node behind a handle, if it belongs to this document
    #[must_use]
    pub fn resolve(&self, handle: &ElementHandle) -> Option<NodeId> {
        handle
            .id
            .strip_prefix(HANDLE_PREFIX)
            .and_then(|index| index.parse::<usize>().ok())
            .filter(|index| *index < self.nodes.len())
            .map(NodeId)
    }

    /// First element with attribute `name="value"`
    #[must_use]
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<NodeId> {
        self.elements(self.root())
            .find(|id| self.attr(*id, name) == Some(value))
    }
}
