//! DOM abstraction the dialog controller runs against.
//!
//! The controller never touches a concrete tree directly. It goes through
//! the [`Dom`] trait, implemented by the in-memory [`Document`] (native,
//! tests) and by `WebDom` on top of `web-sys` (WASM).

mod document;
mod selector;
mod style;

#[cfg(target_arch = "wasm32")]
mod web;

pub use document::Document;
pub use selector::SelectorList;
pub use style::{TransitionStyle, longest_transition, parse_time};

#[cfg(target_arch = "wasm32")]
pub use web::{NODE_ID_ATTR, WebDom};

use crate::error::DialogResult;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity of a node, independent of the backing DOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Create a new random node ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a node ID from its hyphenated string form.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Operations the dialog controller needs from a document tree.
///
/// Node IDs that do not refer to a live node are treated as absent:
/// queries return `false`/`None` and mutations are ignored.
pub trait Dom {
    /// The document element (`<html>`).
    fn document_element(&self) -> NodeId;

    /// The `<body>` element, if there is one.
    fn body(&self) -> Option<NodeId>;

    /// Whether `node` is a live element (not a text node, not removed).
    fn is_element(&self, node: NodeId) -> bool;

    /// Whether `node` is still attached to the document.
    fn is_connected(&self, node: NodeId) -> bool;

    /// Parent node, if any.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Lowercase tag name of an element.
    fn tag_name(&self, node: NodeId) -> Option<String>;

    /// Attribute value of an element.
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Whether the element carries a CSS class.
    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Add (`on == true`) or remove a CSS class.
    fn set_class(&mut self, node: NodeId, class: &str, on: bool);

    /// Whether the element matches a selector list.
    fn matches(&self, node: NodeId, selector: &str) -> DialogResult<bool>;

    /// All descendants of `root` matching `selector`, in document order.
    /// `root` itself is never included.
    fn query_all(&self, root: NodeId, selector: &str) -> DialogResult<Vec<NodeId>>;

    /// Computed transition declaration of an element.
    fn transition_style(&self, node: NodeId) -> TransitionStyle;

    /// Layout box of an element. A zero-area box means it takes no space.
    fn layout_box(&self, node: NodeId) -> Rect;

    /// Move keyboard focus to an element.
    fn focus(&mut self, node: NodeId);

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// `node` followed by each of its ancestors, innermost first.
    fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            path.push(id);
            current = self.parent(id);
        }
        path
    }

    /// Whether `node` is `ancestor` or lies inside it.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).contains(&ancestor)
    }

    /// Nearest ancestor-or-self element matching `selector`.
    fn closest(&self, node: NodeId, selector: &str) -> DialogResult<Option<NodeId>> {
        for id in self.ancestors(node) {
            if self.is_element(id) && self.matches(id, selector)? {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }
}
