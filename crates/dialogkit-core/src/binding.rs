//! Internal input bindings.
//!
//! Bindings are plain data interpreted by the [`DialogHost`](crate::DialogHost)
//! when it routes clicks, key presses and transition-end signals.

use crate::dom::NodeId;
use std::collections::BTreeMap;

/// Identifier of an installed binding. Increases monotonically, so
/// iteration order is installation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

/// Which input stream a binding listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Click,
    KeyDown,
    TransitionEnd,
}

/// An installed listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Click landing on the dialog element itself (its backdrop region).
    Backdrop { dialog: NodeId },
    /// Click on a dismiss trigger inside the dialog.
    Dismiss { dialog: NodeId, trigger: NodeId },
    /// Window-level escape key.
    Escape { dialog: NodeId },
    /// Delegated launcher click handler on a discovery root.
    Launcher { root: NodeId },
    /// One-shot completion of a running transition.
    TransitionEnd { dialog: NodeId },
}

impl Binding {
    pub fn kind(&self) -> BindingKind {
        match self {
            Self::Backdrop { .. } | Self::Dismiss { .. } | Self::Launcher { .. } => {
                BindingKind::Click
            }
            Self::Escape { .. } => BindingKind::KeyDown,
            Self::TransitionEnd { .. } => BindingKind::TransitionEnd,
        }
    }

    /// Node the binding is attached to; `None` for window-level bindings.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::Backdrop { dialog } | Self::TransitionEnd { dialog } => Some(*dialog),
            Self::Dismiss { trigger, .. } => Some(*trigger),
            Self::Launcher { root } => Some(*root),
            Self::Escape { .. } => None,
        }
    }

    /// Dialog the binding belongs to, if it belongs to one.
    pub fn dialog(&self) -> Option<NodeId> {
        match self {
            Self::Backdrop { dialog }
            | Self::Dismiss { dialog, .. }
            | Self::Escape { dialog }
            | Self::TransitionEnd { dialog } => Some(*dialog),
            Self::Launcher { .. } => None,
        }
    }
}

/// Table of live bindings.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: BTreeMap<BindingId, Binding>,
    next_id: u64,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, binding: Binding) -> BindingId {
        self.next_id += 1;
        let id = BindingId(self.next_id);
        self.entries.insert(id, binding);
        id
    }

    pub fn remove(&mut self, id: BindingId) -> Option<Binding> {
        self.entries.remove(&id)
    }

    pub fn get(&self, id: BindingId) -> Option<&Binding> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: BindingId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Bindings of `kind` attached to `node`, in installation order.
    pub fn on_node(&self, node: NodeId, kind: BindingKind) -> Vec<(BindingId, Binding)> {
        self.entries
            .iter()
            .filter(|(_, b)| b.kind() == kind && b.node() == Some(node))
            .map(|(id, b)| (*id, *b))
            .collect()
    }

    /// Window-level bindings of `kind`, in installation order.
    pub fn on_window(&self, kind: BindingKind) -> Vec<(BindingId, Binding)> {
        self.entries
            .iter()
            .filter(|(_, b)| b.kind() == kind && b.node().is_none())
            .map(|(id, b)| (*id, *b))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BindingId, &Binding)> {
        self.entries.iter().map(|(id, b)| (*id, b))
    }

    /// Number of bindings satisfying `predicate`.
    pub fn count(&self, predicate: impl Fn(&Binding) -> bool) -> usize {
        self.entries.values().filter(|b| predicate(*b)).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
