//! Lifecycle notifications and their observers.

use crate::dom::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four lifecycle notifications a dialog emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleKind {
    BeforeShown,
    AfterShown,
    BeforeHidden,
    AfterHidden,
}

impl LifecycleKind {
    /// Only the `before-*` notifications can be canceled.
    pub fn is_cancelable(self) -> bool {
        matches!(self, Self::BeforeShown | Self::BeforeHidden)
    }
}

impl fmt::Display for LifecycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BeforeShown => "before-shown",
            Self::AfterShown => "after-shown",
            Self::BeforeHidden => "before-hidden",
            Self::AfterHidden => "after-hidden",
        })
    }
}

/// A lifecycle notification travelling from a dialog up through its ancestors.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleEvent {
    name: String,
    kind: LifecycleKind,
    target: NodeId,
    current_target: NodeId,
    launcher: Option<NodeId>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl LifecycleEvent {
    pub fn new(
        name: impl Into<String>,
        kind: LifecycleKind,
        target: NodeId,
        launcher: Option<NodeId>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            target,
            current_target: target,
            launcher,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Configured event name, e.g. `dialog:before-shown`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> LifecycleKind {
        self.kind
    }

    /// The dialog element the event is about.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The node whose observers are currently running.
    pub fn current_target(&self) -> NodeId {
        self.current_target
    }

    /// Element that launched the dialog (show notifications only).
    pub fn launcher(&self) -> Option<NodeId> {
        self.launcher
    }

    pub fn cancelable(&self) -> bool {
        self.kind.is_cancelable()
    }

    pub fn bubbles(&self) -> bool {
        true
    }

    /// Cancel the pending transition. Ignored for non-cancelable events.
    pub fn prevent_default(&mut self) {
        if self.cancelable() {
            self.default_prevented = true;
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stop the event from reaching further ancestors. Observers on the
    /// current node still run.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Handle returned when registering an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Handler = Box<dyn FnMut(&mut LifecycleEvent)>;

struct Listener {
    id: ListenerId,
    node: NodeId,
    name: String,
    handler: Handler,
}

/// Observers of lifecycle notifications, keyed by node and event name.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe `name` events reaching `node`.
    pub fn add<F>(&mut self, node: NodeId, name: impl Into<String>, handler: F) -> ListenerId
    where
        F: FnMut(&mut LifecycleEvent) + 'static,
    {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push(Listener {
            id,
            node,
            name: name.into(),
            handler: Box::new(handler),
        });
        id
    }

    /// Remove an observer. Returns `false` if it was already gone.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Drop every observer registered on `node`.
    pub fn remove_node(&mut self, node: NodeId) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.node != node);
        before - self.listeners.len()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` along `path` (target first, then ancestors).
    pub fn dispatch(&mut self, event: &mut LifecycleEvent, path: &[NodeId]) {
        let name = event.name.clone();
        for node in path {
            event.current_target = *node;
            for listener in self
                .listeners
                .iter_mut()
                .filter(|l| l.node == *node && l.name == name)
            {
                (listener.handler)(event);
            }
            if event.propagation_stopped {
                break;
            }
        }
        event.current_target = event.target;
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> impl FnMut(&mut LifecycleEvent) + 'static {
        let log = log.clone();
        move |event: &mut LifecycleEvent| log.borrow_mut().push(format!("{}:{}", tag, event.kind()))
    }

    #[test]
    fn test_bubbles_innermost_first() {
        let (dialog, body, root) = (NodeId::new(), NodeId::new(), NodeId::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.add(root, "open", record(&log, "root"));
        bus.add(dialog, "open", record(&log, "dialog"));
        bus.add(body, "other", record(&log, "ignored"));

        let mut event = LifecycleEvent::new("open", LifecycleKind::AfterShown, dialog, None);
        bus.dispatch(&mut event, &[dialog, body, root]);

        assert_eq!(*log.borrow(), vec!["dialog:after-shown", "root:after-shown"]);
        assert_eq!(event.current_target(), dialog);
    }

    #[test]
    fn test_stop_propagation() {
        let (dialog, body) = (NodeId::new(), NodeId::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.add(dialog, "open", |e: &mut LifecycleEvent| e.stop_propagation());
        bus.add(dialog, "open", record(&log, "sibling"));
        bus.add(body, "open", record(&log, "body"));

        let mut event = LifecycleEvent::new("open", LifecycleKind::BeforeShown, dialog, None);
        bus.dispatch(&mut event, &[dialog, body]);

        assert_eq!(*log.borrow(), vec!["sibling:before-shown"]);
    }

    #[test]
    fn test_prevent_default_only_when_cancelable() {
        let target = NodeId::new();
        let mut before = LifecycleEvent::new("b", LifecycleKind::BeforeHidden, target, None);
        before.prevent_default();
        assert!(before.default_prevented());

        let mut after = LifecycleEvent::new("a", LifecycleKind::AfterHidden, target, None);
        after.prevent_default();
        assert!(!after.default_prevented());
        assert!(after.bubbles());
    }

    #[test]
    fn test_remove_listener() {
        let node = NodeId::new();
        let mut bus = EventBus::new();
        let id = bus.add(node, "x", |_: &mut LifecycleEvent| {});
        bus.add(node, "y", |_: &mut LifecycleEvent| {});
        assert!(bus.remove(id));
        assert!(!bus.remove(id));
        assert_eq!(bus.remove_node(node), 1);
        assert!(bus.is_empty());
    }
}
