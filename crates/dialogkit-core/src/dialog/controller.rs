//! The per-element dialog controller.

use super::completion::{Completion, Outcome, Resolver, completion};
use super::state::DialogState;
use crate::binding::{Binding, BindingId, Bindings};
use crate::config::{DISMISS_ATTR, DialogConfig};
use crate::dom::{Dom, NodeId, longest_transition};
use crate::error::{DialogError, DialogResult};
use crate::event::{EventBus, LifecycleEvent, LifecycleKind};

/// Mutable pieces of the host a controller works on.
pub(crate) struct HostParts<'a, D: Dom> {
    pub dom: &'a mut D,
    pub bus: &'a mut EventBus,
    pub bindings: &'a mut Bindings,
}

impl<D: Dom> HostParts<'_, D> {
    fn dispatch(&mut self, event: &mut LifecycleEvent) {
        let path = self.dom.ancestors(event.target());
        self.bus.dispatch(event, &path);
    }
}

#[derive(Debug)]
struct PendingTransition {
    binding: BindingId,
    resolver: Resolver,
    focus_on_settle: bool,
}

/// Visibility controller bound to one dialog element.
///
/// Created and owned by a [`DialogHost`](crate::DialogHost); all state
/// changes go through the host's `show`/`hide`/`release`.
#[derive(Debug)]
pub struct DialogController {
    element: NodeId,
    config: DialogConfig,
    state: DialogState,
    launcher: Option<NodeId>,
    escape: Option<BindingId>,
    backdrop: Option<BindingId>,
    dismiss: Vec<BindingId>,
    pending: Option<PendingTransition>,
}

impl DialogController {
    /// Bind a controller to `element` and install its close triggers.
    pub(crate) fn attach<D: Dom>(
        parts: &mut HostParts<'_, D>,
        element: NodeId,
        config: DialogConfig,
    ) -> DialogResult<Self> {
        if !parts.dom.is_element(element) {
            return Err(DialogError::InvalidNode(element));
        }
        let triggers = parts.dom.query_all(element, &format!("[{}]", DISMISS_ATTR))?;
        let visible = parts.dom.has_class(element, &config.state_class);

        let backdrop = config
            .close_on_backdrop
            .then(|| parts.bindings.insert(Binding::Backdrop { dialog: element }));
        let escape = config
            .close_on_escape
            .then(|| parts.bindings.insert(Binding::Escape { dialog: element }));
        let dismiss = triggers
            .into_iter()
            .map(|trigger| {
                parts.bindings.insert(Binding::Dismiss {
                    dialog: element,
                    trigger,
                })
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Attached dialog {} ({} dismiss triggers, visible: {})",
            element,
            dismiss.len(),
            visible
        );

        Ok(Self {
            element,
            config,
            state: DialogState::steady(visible),
            launcher: None,
            escape,
            backdrop,
            dismiss,
            pending: None,
        })
    }

    /// The dialog element.
    pub fn element(&self) -> NodeId {
        self.element
    }

    pub fn config(&self) -> &DialogConfig {
        &self.config
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    /// Launcher of the current (or running) show, if any.
    pub fn launcher(&self) -> Option<NodeId> {
        self.launcher
    }

    /// Whether a transition is waiting for its completion signal.
    pub fn has_pending_transition(&self) -> bool {
        self.pending.is_some()
    }

    /// Every binding this controller currently owns.
    pub fn bindings(&self) -> Vec<BindingId> {
        self.escape
            .iter()
            .chain(self.backdrop.iter())
            .chain(self.dismiss.iter())
            .copied()
            .chain(self.pending.as_ref().map(|p| p.binding))
            .collect()
    }

    pub(crate) fn show<D: Dom>(
        &mut self,
        parts: &mut HostParts<'_, D>,
        launcher: Option<NodeId>,
        focus_on_settle: bool,
    ) -> Completion {
        self.request(parts, true, launcher, focus_on_settle)
    }

    pub(crate) fn hide<D: Dom>(&mut self, parts: &mut HostParts<'_, D>) -> Completion {
        self.request(parts, false, None, false)
    }

    fn request<D: Dom>(
        &mut self,
        parts: &mut HostParts<'_, D>,
        visible: bool,
        launcher: Option<NodeId>,
        focus_on_settle: bool,
    ) -> Completion {
        let dialog = self.element;

        // Steady visibility follows the state class.
        if !self.state.is_transitioning() {
            self.state = DialogState::steady(parts.dom.has_class(dialog, &self.config.state_class));
        }

        match (self.state, visible) {
            (DialogState::Visible, true) => {
                log::debug!("Dialog {} already shown", dialog);
                return Completion::ready(dialog, Ok(Outcome::AlreadyShown));
            }
            (DialogState::Hidden, false) => {
                log::debug!("Dialog {} already hidden", dialog);
                return Completion::ready(dialog, Ok(Outcome::AlreadyHidden));
            }
            (state, _) if state.is_transitioning() => {
                log::warn!("Dialog {} is {:?}, ignoring request", dialog, state);
                return Completion::ready(dialog, Err(DialogError::TransitionInProgress(dialog)));
            }
            _ => {}
        }

        let (kind, next) = if visible {
            (LifecycleKind::BeforeShown, DialogState::Showing)
        } else {
            (LifecycleKind::BeforeHidden, DialogState::Hiding)
        };

        let mut event = LifecycleEvent::new(self.config.events.name(kind), kind, dialog, launcher);
        parts.dispatch(&mut event);
        if event.default_prevented() {
            log::debug!("Dialog {}: {} canceled", dialog, kind);
            return Completion::ready(dialog, Err(DialogError::Canceled { dialog, event: kind }));
        }

        self.state = next;
        self.launcher = launcher;
        self.begin_transition(parts, visible, focus_on_settle)
    }

    fn begin_transition<D: Dom>(
        &mut self,
        parts: &mut HostParts<'_, D>,
        visible: bool,
        focus_on_settle: bool,
    ) -> Completion {
        let dialog = self.element;
        if let Some(body) = parts.dom.body() {
            parts.dom.set_class(body, &self.config.scroll_lock_class, visible);
        }
        parts.dom.set_class(dialog, &self.config.state_class, visible);

        let duration = longest_transition(&parts.dom.transition_style(dialog));
        let (resolver, completion) = completion(dialog);

        if duration.is_zero() {
            self.finish(parts, resolver, focus_on_settle);
        } else {
            let binding = parts.bindings.insert(Binding::TransitionEnd { dialog });
            self.pending = Some(PendingTransition {
                binding,
                resolver,
                focus_on_settle,
            });
            log::debug!("Dialog {} waiting {:?} for transition end", dialog, duration);
        }
        completion
    }

    /// Complete the running transition. Returns `false` if none is running.
    pub(crate) fn settle<D: Dom>(&mut self, parts: &mut HostParts<'_, D>) -> bool {
        match self.pending.take() {
            Some(pending) => {
                parts.bindings.remove(pending.binding);
                self.finish(parts, pending.resolver, pending.focus_on_settle);
                true
            }
            None => false,
        }
    }

    fn finish<D: Dom>(
        &mut self,
        parts: &mut HostParts<'_, D>,
        resolver: Resolver,
        focus_on_settle: bool,
    ) {
        let dialog = self.element;
        self.state = self.state.settled();
        let visible = self.state == DialogState::Visible;
        if !visible {
            self.launcher = None;
        }

        let kind = if visible {
            LifecycleKind::AfterShown
        } else {
            LifecycleKind::AfterHidden
        };
        let mut event =
            LifecycleEvent::new(self.config.events.name(kind), kind, dialog, self.launcher);
        parts.dispatch(&mut event);

        if visible && focus_on_settle {
            let layout = parts.dom.layout_box(dialog);
            if layout.width() > 0.0 && layout.height() > 0.0 {
                parts.dom.focus(dialog);
            }
        }

        log::debug!("Dialog {} settled as {:?}", dialog, self.state);
        resolver.resolve(Ok(Outcome::Completed));
    }

    /// Detach every binding. A running transition settles as released.
    pub(crate) fn release<D: Dom>(&mut self, parts: &mut HostParts<'_, D>) {
        let owned: Vec<BindingId> = self
            .escape
            .take()
            .into_iter()
            .chain(self.backdrop.take())
            .chain(self.dismiss.drain(..))
            .collect();
        for id in owned {
            parts.bindings.remove(id);
        }

        if let Some(pending) = self.pending.take() {
            parts.bindings.remove(pending.binding);
            pending
                .resolver
                .resolve(Err(DialogError::Released(self.element)));
        }
        log::debug!("Released dialog {}", self.element);
    }
}
