//! Composition root owning the DOM, the controllers and the listeners.

use crate::binding::{Binding, BindingId, BindingKind, Bindings};
use crate::config::{DIALOG_ATTR, DialogConfig, TARGET_ATTR};
use crate::dialog::{Completion, DialogController, DialogState, HostParts};
use crate::dom::{Dom, NodeId};
use crate::error::{DialogError, DialogResult};
use crate::event::{EventBus, LifecycleEvent, ListenerId};
use crate::registry::Registry;

/// Keys that close a visible dialog.
const ESCAPE_KEYS: [&str; 2] = ["Escape", "Esc"];

/// Owns a document and every dialog controller bound into it.
///
/// Input from the event loop is routed in through [`click`](Self::click),
/// [`key_down`](Self::key_down) and [`transition_end`](Self::transition_end).
pub struct DialogHost<D: Dom> {
    dom: D,
    registry: Registry,
    bindings: Bindings,
    bus: EventBus,
    /// Configuration for dialogs instantiated by discovery.
    defaults: DialogConfig,
}

/// Handle to a delegated launcher listener installed by
/// [`DialogHost::discover`].
#[derive(Debug, PartialEq, Eq)]
pub struct DiscoveryHandle {
    root: NodeId,
    binding: Option<BindingId>,
}

impl DiscoveryHandle {
    /// The discovery root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether a launcher listener is still installed.
    pub fn is_attached(&self) -> bool {
        self.binding.is_some()
    }

    /// Remove the launcher listener. Returns `false` if there was none.
    pub fn detach<D: Dom>(&mut self, host: &mut DialogHost<D>) -> bool {
        match self.binding.take() {
            Some(id) => host.bindings.remove(id).is_some(),
            None => false,
        }
    }
}

impl<D: Dom> DialogHost<D> {
    /// Create a host with default dialog configuration.
    pub fn new(dom: D) -> Self {
        Self::with_defaults(dom, DialogConfig::default())
    }

    pub fn with_defaults(dom: D, defaults: DialogConfig) -> Self {
        Self {
            dom,
            registry: Registry::new(),
            bindings: Bindings::new(),
            bus: EventBus::new(),
            defaults,
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn defaults(&self) -> &DialogConfig {
        &self.defaults
    }

    fn parts(&mut self) -> (&mut Registry, HostParts<'_, D>) {
        (
            &mut self.registry,
            HostParts {
                dom: &mut self.dom,
                bus: &mut self.bus,
                bindings: &mut self.bindings,
            },
        )
    }

    /// Bind a new controller to `element`.
    pub fn attach(&mut self, element: NodeId, config: DialogConfig) -> DialogResult<()> {
        if self.registry.contains(element) {
            return Err(DialogError::AlreadyAttached(element));
        }
        let (registry, mut parts) = self.parts();
        let controller = DialogController::attach(&mut parts, element, config)?;
        registry.insert(controller);
        Ok(())
    }

    /// Bind a controller to `element` unless it already has one.
    /// Returns whether a new controller was created.
    pub fn ensure(&mut self, element: NodeId, config: DialogConfig) -> DialogResult<bool> {
        if self.registry.contains(element) {
            return Ok(false);
        }
        self.attach(element, config)?;
        Ok(true)
    }

    pub fn controller(&self, element: NodeId) -> Option<&DialogController> {
        self.registry.get(element)
    }

    pub fn state(&self, element: NodeId) -> Option<DialogState> {
        self.registry.get(element).map(DialogController::state)
    }

    /// Show `dialog`, optionally recording the element that launched it.
    pub fn show(&mut self, dialog: NodeId, launcher: Option<NodeId>) -> DialogResult<Completion> {
        self.request_show(dialog, launcher, false)
    }

    fn request_show(
        &mut self,
        dialog: NodeId,
        launcher: Option<NodeId>,
        focus_on_settle: bool,
    ) -> DialogResult<Completion> {
        let (registry, mut parts) = self.parts();
        let controller = registry
            .get_mut(dialog)
            .ok_or(DialogError::NotAttached(dialog))?;
        Ok(controller.show(&mut parts, launcher, focus_on_settle))
    }

    pub fn hide(&mut self, dialog: NodeId) -> DialogResult<Completion> {
        let (registry, mut parts) = self.parts();
        let controller = registry
            .get_mut(dialog)
            .ok_or(DialogError::NotAttached(dialog))?;
        Ok(controller.hide(&mut parts))
    }

    /// Detach the controller of `dialog` and drop it. Returns `false` if
    /// there was none.
    pub fn release(&mut self, dialog: NodeId) -> bool {
        let (registry, mut parts) = self.parts();
        let Some(controller) = registry.get_mut(dialog) else {
            return false;
        };
        controller.release(&mut parts);
        registry.remove(dialog);
        true
    }

    /// Observe lifecycle notifications named `name` reaching `node`.
    pub fn add_listener<F>(&mut self, node: NodeId, name: impl Into<String>, handler: F) -> ListenerId
    where
        F: FnMut(&mut LifecycleEvent) + 'static,
    {
        self.bus.add(node, name, handler)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.bus.remove(id)
    }

    /// Instantiate dialogs under `root`.
    ///
    /// A root marked `data-dialog` becomes a dialog itself. Otherwise every
    /// launcher under it is checked for an unambiguous target and a single
    /// delegated click listener is installed on the root.
    pub fn discover(&mut self, root: NodeId) -> DialogResult<DiscoveryHandle> {
        if !self.dom.is_element(root) {
            return Err(DialogError::InvalidNode(root));
        }

        if self.dom.has_attribute(root, DIALOG_ATTR) {
            let config = self.defaults.for_element(&self.dom, root)?;
            self.ensure(root, config)?;
            return Ok(DiscoveryHandle { root, binding: None });
        }

        let launcher_selector = format!("[{}]", TARGET_ATTR);
        let mut launchers = self.dom.query_all(root, &launcher_selector)?;
        if self.dom.matches(root, &launcher_selector)? {
            launchers.insert(0, root);
        }
        for launcher in &launchers {
            let selector = self.dom.attribute(*launcher, TARGET_ATTR).unwrap_or_default();
            if selector.trim().is_empty() {
                continue;
            }
            let count = self.dom.query_all(self.dom.document_element(), &selector)?.len();
            if count > 1 {
                return Err(DialogError::AmbiguousTarget { selector, count });
            }
        }

        let binding = self.bindings.insert(Binding::Launcher { root });
        log::debug!("Discovery on {} ({} launchers)", root, launchers.len());
        Ok(DiscoveryHandle {
            root,
            binding: Some(binding),
        })
    }

    /// The single element matching a launcher's target selector.
    fn resolve_target(&self, selector: &str) -> DialogResult<NodeId> {
        if selector.trim().is_empty() {
            return Err(DialogError::TargetNotFound(selector.to_string()));
        }
        let matches = self.dom.query_all(self.dom.document_element(), selector)?;
        match matches.as_slice() {
            [] => Err(DialogError::TargetNotFound(selector.to_string())),
            [target] => Ok(*target),
            _ => Err(DialogError::AmbiguousTarget {
                selector: selector.to_string(),
                count: matches.len(),
            }),
        }
    }

    /// Route a click on `target`. Returns the completions of every show or
    /// hide the click started.
    pub fn click(&mut self, target: NodeId) -> DialogResult<Vec<Completion>> {
        let mut completions = Vec::new();

        for node in self.dom.ancestors(target) {
            for (id, binding) in self.bindings.on_node(node, BindingKind::Click) {
                if !self.bindings.contains(id) {
                    continue;
                }
                match binding {
                    Binding::Backdrop { dialog } if dialog == target => {
                        completions.push(self.hide(dialog)?);
                    }
                    Binding::Dismiss { dialog, .. } => {
                        completions.push(self.hide(dialog)?);
                    }
                    Binding::Launcher { root } => {
                        if let Some(completion) = self.launch(root, target)? {
                            completions.push(completion);
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(completions)
    }

    fn launch(&mut self, root: NodeId, target: NodeId) -> DialogResult<Option<Completion>> {
        let Some(launcher) = self.dom.closest(target, &format!("[{}]", TARGET_ATTR))? else {
            return Ok(None);
        };
        if !self.dom.contains(root, launcher) {
            return Ok(None);
        }

        let selector = self.dom.attribute(launcher, TARGET_ATTR).unwrap_or_default();
        let dialog = self.resolve_target(&selector)?;
        if !self.registry.contains(dialog) {
            let config = self.defaults.for_element(&self.dom, dialog)?;
            self.attach(dialog, config)?;
        }

        log::debug!("Launcher {} opens {}", launcher, dialog);
        self.request_show(dialog, Some(launcher), true).map(Some)
    }

    /// Route a key press. Escape hides every visible dialog listening for it.
    pub fn key_down(&mut self, key: &str) -> Vec<Completion> {
        if !ESCAPE_KEYS.contains(&key) {
            return Vec::new();
        }

        let mut completions = Vec::new();
        for (id, binding) in self.bindings.on_window(BindingKind::KeyDown) {
            let Binding::Escape { dialog } = binding else {
                continue;
            };
            if !self.bindings.contains(id) || self.state(dialog) != Some(DialogState::Visible) {
                continue;
            }
            if let Ok(completion) = self.hide(dialog) {
                completions.push(completion);
            }
        }
        completions
    }

    /// Route a transition-end signal fired on `target`. The signal bubbles,
    /// settling any dialog on the path that is waiting for one. Returns the
    /// number of dialogs settled.
    pub fn transition_end(&mut self, target: NodeId) -> usize {
        let mut settled = 0;

        for node in self.dom.ancestors(target) {
            for (_, binding) in self.bindings.on_node(node, BindingKind::TransitionEnd) {
                let Binding::TransitionEnd { dialog } = binding else {
                    continue;
                };
                let (registry, mut parts) = self.parts();
                if let Some(controller) = registry.get_mut(dialog) {
                    if controller.settle(&mut parts) {
                        settled += 1;
                    }
                }
            }
        }

        if settled == 0 {
            log::trace!("Transition end on {} settled nothing", target);
        }
        settled
    }

    /// Release controllers whose element left the document and drop
    /// launcher listeners on detached roots. Returns the number of
    /// controllers released.
    pub fn prune(&mut self) -> usize {
        let stale: Vec<NodeId> = self
            .registry
            .elements()
            .into_iter()
            .filter(|element| !self.dom.is_connected(*element))
            .collect();
        for element in &stale {
            self.release(*element);
            self.bus.remove_node(*element);
        }

        let roots: Vec<BindingId> = self
            .bindings
            .iter()
            .filter_map(|(id, binding)| match binding {
                Binding::Launcher { root } if !self.dom.is_connected(*root) => Some(id),
                _ => None,
            })
            .collect();
        for id in roots {
            self.bindings.remove(id);
        }

        if !stale.is_empty() {
            log::debug!("Pruned {} detached dialogs", stale.len());
        }
        stale.len()
    }
}
