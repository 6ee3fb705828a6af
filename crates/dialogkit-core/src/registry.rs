//! Ownership map from dialog elements to their controllers.

use crate::dialog::DialogController;
use crate::dom::NodeId;
use std::collections::HashMap;

/// Holds at most one controller per element.
#[derive(Debug, Default)]
pub struct Registry {
    controllers: HashMap<NodeId, DialogController>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, element: NodeId) -> Option<&DialogController> {
        self.controllers.get(&element)
    }

    pub(crate) fn get_mut(&mut self, element: NodeId) -> Option<&mut DialogController> {
        self.controllers.get_mut(&element)
    }

    pub fn contains(&self, element: NodeId) -> bool {
        self.controllers.contains_key(&element)
    }

    /// Insert a controller keyed by its element. Callers check for an
    /// existing entry first; a replaced controller is returned.
    pub(crate) fn insert(&mut self, controller: DialogController) -> Option<DialogController> {
        self.controllers.insert(controller.element(), controller)
    }

    pub(crate) fn remove(&mut self, element: NodeId) -> Option<DialogController> {
        self.controllers.remove(&element)
    }

    /// Elements with a controller, in no particular order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.controllers.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DialogController> {
        self.controllers.values()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
