//! In-memory document tree.

use super::selector::SelectorList;
use super::style::TransitionStyle;
use super::{Dom, NodeId};
use crate::error::{DialogError, DialogResult};
use kurbo::Rect;
use selectors::OpaqueElement;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, Default)]
struct ElementData {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    transition: TransitionStyle,
    layout: Rect,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A minimal DOM held entirely in memory.
///
/// Starts out as `<html><body></body></html>`. Elements carry classes,
/// attributes, a transition declaration and a layout box; nothing is
/// computed from stylesheets.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    body: NodeId,
    focused: Option<NodeId>,
}

impl Document {
    /// Create an empty document with `<html>` and `<body>`.
    pub fn new() -> Self {
        let root = NodeId::new();
        let body = NodeId::new();

        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                kind: NodeKind::Element(ElementData {
                    tag: "html".to_string(),
                    ..Default::default()
                }),
                parent: None,
                children: vec![body],
            },
        );
        nodes.insert(
            body,
            Node {
                kind: NodeKind::Element(ElementData {
                    tag: "body".to_string(),
                    ..Default::default()
                }),
                parent: Some(root),
                children: Vec::new(),
            },
        );

        Self {
            nodes,
            root,
            body,
            focused: None,
        }
    }

    /// The `<body>` element.
    pub fn body_element(&self) -> NodeId {
        self.body
    }

    /// Append a new element under `parent`.
    pub fn create_element(&mut self, parent: NodeId, tag: &str) -> DialogResult<NodeId> {
        self.append(
            parent,
            NodeKind::Element(ElementData {
                tag: tag.to_ascii_lowercase(),
                ..Default::default()
            }),
        )
    }

    /// Append a text node under `parent`.
    pub fn create_text(&mut self, parent: NodeId, text: &str) -> DialogResult<NodeId> {
        self.append(parent, NodeKind::Text(text.to_string()))
    }

    fn append(&mut self, parent: NodeId, kind: NodeKind) -> DialogResult<NodeId> {
        if !self.is_element(parent) {
            return Err(DialogError::InvalidNode(parent));
        }
        let id = NodeId::new();
        self.nodes.insert(
            id,
            Node {
                kind,
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(id);
        }
        Ok(id)
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(&id)?.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(&id)?.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    /// Set an attribute. `class` is routed to the class list.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        if name == "class" {
            element.classes = value.split_whitespace().map(str::to_string).collect();
        } else {
            element.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(element) = self.element_mut(id) {
            if name == "class" {
                element.classes.clear();
            } else {
                element.attributes.remove(name);
            }
        }
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        self.set_class(id, class, true);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        self.set_class(id, class, false);
    }

    /// Class list of an element, in insertion order.
    pub fn classes(&self, id: NodeId) -> Vec<&str> {
        self.element(id)
            .map(|e| e.classes.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Declare the element's transition (`transition-property`, `transition-duration`).
    pub fn set_transition(&mut self, id: NodeId, property: &str, duration: &str) {
        if let Some(element) = self.element_mut(id) {
            element.transition = TransitionStyle::new(property, duration);
        }
    }

    pub fn set_layout(&mut self, id: NodeId, layout: Rect) {
        if let Some(element) = self.element_mut(id) {
            element.layout = layout;
        }
    }

    /// Element holding keyboard focus.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Pointer identity of a live node for the selector matcher.
    pub(super) fn opaque(&self, id: NodeId) -> Option<OpaqueElement> {
        self.nodes.get(&id).map(OpaqueElement::new)
    }

    /// Text content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(&id)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element(_) => None,
        }
    }

    /// Detach and drop `id` with its whole subtree, returning the removed IDs.
    /// The document and body elements cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        if id == self.root || id == self.body || !self.nodes.contains_key(&id) {
            return Vec::new();
        }

        if let Some(parent) = self.nodes.get(&id).and_then(|n| n.parent) {
            if let Some(parent) = self.nodes.get_mut(&parent) {
                parent.children.retain(|child| *child != id);
            }
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children);
                removed.push(next);
            }
        }
        if self.focused.is_some_and(|f| removed.contains(&f)) {
            self.focused = None;
        }
        removed
    }

    /// Number of live nodes, including `<html>` and `<body>`.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom for Document {
    fn document_element(&self) -> NodeId {
        self.root
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.body)
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node)?.parent
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.element(node).map(|e| e.tag.clone())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let element = self.element(node)?;
        if name == "class" {
            return (!element.classes.is_empty()).then(|| element.classes.join(" "));
        }
        element.attributes.get(name).cloned()
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn set_class(&mut self, node: NodeId, class: &str, on: bool) {
        let Some(element) = self.element_mut(node) else {
            return;
        };
        let present = element.classes.iter().any(|c| c == class);
        if on && !present {
            element.classes.push(class.to_string());
        } else if !on && present {
            element.classes.retain(|c| c != class);
        }
    }

    fn matches(&self, node: NodeId, selector: &str) -> DialogResult<bool> {
        Ok(SelectorList::parse(selector)?.matches(self, node))
    }

    fn query_all(&self, root: NodeId, selector: &str) -> DialogResult<Vec<NodeId>> {
        let selector = SelectorList::parse(selector)?;
        Ok(self
            .descendants(root)
            .into_iter()
            .filter(|id| selector.matches(self, *id))
            .collect())
    }

    fn transition_style(&self, node: NodeId) -> TransitionStyle {
        self.element(node)
            .map(|e| e.transition.clone())
            .unwrap_or_default()
    }

    fn layout_box(&self, node: NodeId) -> Rect {
        self.element(node).map(|e| e.layout).unwrap_or(Rect::ZERO)
    }

    fn focus(&mut self, node: NodeId) {
        if self.is_element(node) {
            self.focused = Some(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_has_body() {
        let doc = Document::new();
        let body = doc.body_element();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.parent(body), Some(doc.document_element()));
        assert_eq!(doc.tag_name(body).as_deref(), Some("body"));
    }

    #[test]
    fn test_text_nodes_cannot_have_children() {
        let mut doc = Document::new();
        let text = doc.create_text(doc.body_element(), "hi").unwrap();
        assert!(!doc.is_element(text));
        assert_eq!(doc.text(text), Some("hi"));
        assert!(matches!(
            doc.create_element(text, "div"),
            Err(DialogError::InvalidNode(id)) if id == text
        ));
    }

    #[test]
    fn test_class_attribute_roundtrip() {
        let mut doc = Document::new();
        let div = doc.create_element(doc.body_element(), "DIV").unwrap();
        doc.set_attribute(div, "class", "a  b");
        doc.add_class(div, "c");
        doc.add_class(div, "a");
        assert_eq!(doc.classes(div), vec!["a", "b", "c"]);
        assert_eq!(doc.attribute(div, "class").as_deref(), Some("a b c"));
        assert_eq!(doc.tag_name(div).as_deref(), Some("div"));

        doc.remove_class(div, "b");
        assert!(!doc.has_class(div, "b"));
        doc.remove_attribute(div, "class");
        assert_eq!(doc.attribute(div, "class"), None);
    }

    #[test]
    fn test_query_all_document_order() {
        let mut doc = Document::new();
        let body = doc.body_element();
        let a = doc.create_element(body, "p").unwrap();
        let a1 = doc.create_element(a, "p").unwrap();
        let b = doc.create_element(body, "p").unwrap();

        assert_eq!(doc.query_all(body, "p").unwrap(), vec![a, a1, b]);
        // root itself is excluded
        assert_eq!(doc.query_all(a, "p").unwrap(), vec![a1]);
    }

    #[test]
    fn test_closest_and_contains() {
        let mut doc = Document::new();
        let body = doc.body_element();
        let launcher = doc.create_element(body, "button").unwrap();
        doc.set_attribute(launcher, "data-dialog-target", "#x");
        let icon = doc.create_element(launcher, "span").unwrap();
        let label = doc.create_text(icon, "Open").unwrap();

        assert_eq!(doc.closest(label, "[data-dialog-target]").unwrap(), Some(launcher));
        assert_eq!(doc.closest(body, "[data-dialog-target]").unwrap(), None);
        assert!(doc.contains(body, label));
        assert!(!doc.contains(icon, launcher));
    }

    #[test]
    fn test_remove_subtree() {
        let mut doc = Document::new();
        let body = doc.body_element();
        let dialog = doc.create_element(body, "div").unwrap();
        let inner = doc.create_element(dialog, "button").unwrap();
        doc.focus(inner);

        let removed = doc.remove(dialog);
        assert_eq!(removed.len(), 2);
        assert!(!doc.is_connected(inner));
        assert!(doc.children(body).is_empty());
        assert_eq!(doc.focused(), None);
        assert!(doc.remove(body).is_empty());
    }

    #[test]
    fn test_focus_ignores_text() {
        let mut doc = Document::new();
        let text = doc.create_text(doc.body_element(), "x").unwrap();
        doc.focus(text);
        assert_eq!(doc.focused(), None);
    }
}
