//! Browser DOM backend (WASM only).

use super::style::TransitionStyle;
use super::{Dom, NodeId};
use crate::error::{DialogError, DialogResult};
use kurbo::Rect;
use std::cell::RefCell;
use std::collections::HashMap;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

/// Attribute carrying the node ID assigned to a browser element.
pub const NODE_ID_ATTR: &str = "data-dialogkit-id";

fn dom_error(err: JsValue) -> DialogError {
    DialogError::Dom(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

/// [`Dom`] over the page's live document.
///
/// Elements get a [`NodeId`] the first time they are seen, stored in the
/// `data-dialogkit-id` attribute so the identity survives round trips
/// through the browser.
pub struct WebDom {
    document: Document,
    elements: RefCell<HashMap<NodeId, Element>>,
}

impl WebDom {
    /// Bind to the current window's document.
    pub fn new() -> DialogResult<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| DialogError::Dom("no document available".to_string()))?;
        Ok(Self::from_document(document))
    }

    pub fn from_document(document: Document) -> Self {
        Self {
            document,
            elements: RefCell::new(HashMap::new()),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Node ID of `element`, assigning one if it has none yet.
    pub fn id_of(&self, element: &Element) -> NodeId {
        let existing = element
            .get_attribute(NODE_ID_ATTR)
            .and_then(|value| NodeId::parse(&value));
        let id = existing.unwrap_or_else(|| {
            let id = NodeId::new();
            if let Err(err) = element.set_attribute(NODE_ID_ATTR, &id.to_string()) {
                log::warn!("Failed to tag element: {:?}", err);
            }
            id
        });
        self.elements.borrow_mut().insert(id, element.clone());
        id
    }

    /// The browser element behind `id`.
    pub fn element(&self, id: NodeId) -> Option<Element> {
        if let Some(element) = self.elements.borrow().get(&id) {
            return Some(element.clone());
        }
        let selector = format!("[{}=\"{}\"]", NODE_ID_ATTR, id);
        let element = self.document.query_selector(&selector).ok().flatten()?;
        self.elements.borrow_mut().insert(id, element.clone());
        Some(element)
    }

    fn computed(&self, element: &Element, property: &str) -> String {
        self.document
            .default_view()
            .and_then(|window| window.get_computed_style(element).ok().flatten())
            .and_then(|style| style.get_property_value(property).ok())
            .unwrap_or_default()
    }
}

impl Dom for WebDom {
    fn document_element(&self) -> NodeId {
        match self.document.document_element() {
            Some(root) => self.id_of(&root),
            None => NodeId::default(),
        }
    }

    fn body(&self) -> Option<NodeId> {
        let body = self.document.body()?;
        Some(self.id_of(&body))
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|e| e.is_connected())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.element(node)?.parent_element()?;
        Some(self.id_of(&parent))
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.element(node).map(|e| e.tag_name().to_ascii_lowercase())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_some_and(|e| e.class_list().contains(class))
    }

    fn set_class(&mut self, node: NodeId, class: &str, on: bool) {
        let Some(element) = self.element(node) else {
            return;
        };
        if let Err(err) = element.class_list().toggle_with_force(class, on) {
            log::warn!("Failed to toggle class {:?}: {:?}", class, err);
        }
    }

    fn matches(&self, node: NodeId, selector: &str) -> DialogResult<bool> {
        match self.element(node) {
            Some(element) => element.matches(selector).map_err(dom_error),
            None => Ok(false),
        }
    }

    fn query_all(&self, root: NodeId, selector: &str) -> DialogResult<Vec<NodeId>> {
        let Some(root) = self.element(root) else {
            return Ok(Vec::new());
        };
        let list = root.query_selector_all(selector).map_err(dom_error)?;
        Ok((0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.id_of(&element))
            .collect())
    }

    fn closest(&self, node: NodeId, selector: &str) -> DialogResult<Option<NodeId>> {
        let Some(element) = self.element(node) else {
            return Ok(None);
        };
        let found = element.closest(selector).map_err(dom_error)?;
        Ok(found.map(|e| self.id_of(&e)))
    }

    fn transition_style(&self, node: NodeId) -> TransitionStyle {
        match self.element(node) {
            Some(element) => TransitionStyle::new(
                self.computed(&element, "transition-property"),
                self.computed(&element, "transition-duration"),
            ),
            None => TransitionStyle::default(),
        }
    }

    fn layout_box(&self, node: NodeId) -> Rect {
        let Some(element) = self.element(node).and_then(|e| e.dyn_into::<HtmlElement>().ok())
        else {
            return Rect::ZERO;
        };
        let x = element.offset_left() as f64;
        let y = element.offset_top() as f64;
        Rect::new(
            x,
            y,
            x + element.offset_width() as f64,
            y + element.offset_height() as f64,
        )
    }

    fn focus(&mut self, node: NodeId) {
        if let Some(element) = self.element(node).and_then(|e| e.dyn_into::<HtmlElement>().ok()) {
            if let Err(err) = element.focus() {
                log::warn!("Failed to focus {}: {:?}", node, err);
            }
        }
    }
}
