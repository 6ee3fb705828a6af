//! Scripted demo page.
//!
//! Builds a small settings page in an in-memory document, discovers its
//! dialogs and replays click / key / transition-end steps against it.

use dialogkit_core::{
    Completion, DialogError, DialogHost, DialogState, DiscoveryHandle, Document, Dom,
    LifecycleEvent, LifecycleKind, NodeId, Outcome, DISMISS_ATTR, OPTIONS_ATTR, TARGET_ATTR,
};
use kurbo::Rect;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Demo errors.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Dialog(#[from] DialogError),
    #[error("Unknown element: {0}")]
    UnknownElement(String),
    #[error("Invalid script: {0}")]
    Script(#[from] serde_json::Error),
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Click { target: String },
    Key { key: String },
    TransitionEnd { target: String },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click { target } => write!(f, "click {}", target),
            Self::Key { key } => write!(f, "key {}", key),
            Self::TransitionEnd { target } => write!(f, "transitionend {}", target),
        }
    }
}

/// Open, close with Escape, reopen, close with the dismiss button.
pub const DEFAULT_SCRIPT: &str = r#"[
    {"action": "click", "target": "label"},
    {"action": "transition_end", "target": "dialog"},
    {"action": "transition_end", "target": "dialog"},
    {"action": "key", "key": "Escape"},
    {"action": "transition_end", "target": "dialog"},
    {"action": "click", "target": "launcher"},
    {"action": "transition_end", "target": "dialog"},
    {"action": "click", "target": "dismiss"},
    {"action": "transition_end", "target": "dialog"}
]"#;

/// Parse a JSON array of steps.
pub fn parse_script(json: &str) -> Result<Vec<Step>, DemoError> {
    Ok(serde_json::from_str(json)?)
}

/// What a single step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: Step,
    /// Lifecycle notifications emitted during the step.
    pub events: Vec<String>,
    /// Requests that settled during the step.
    pub outcomes: Vec<String>,
    pub state: DialogState,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:24} {:?}", self.step.to_string(), self.state)?;
        if !self.events.is_empty() {
            write!(f, "  events: {}", self.events.join(", "))?;
        }
        if !self.outcomes.is_empty() {
            write!(f, "  settled: {}", self.outcomes.join(", "))?;
        }
        Ok(())
    }
}

/// The demo page and the host driving it.
pub struct DemoPage {
    host: DialogHost<Document>,
    elements: HashMap<&'static str, NodeId>,
    dialog: NodeId,
    events: Rc<RefCell<Vec<String>>>,
    pending: Vec<Completion>,
    discovery: DiscoveryHandle,
}

impl DemoPage {
    /// Build the page and discover its launchers.
    pub fn build() -> Result<Self, DemoError> {
        let mut doc = Document::new();
        let body = doc.body_element();

        let header = doc.create_element(body, "header")?;
        let launcher = doc.create_element(header, "button")?;
        doc.set_attribute(launcher, TARGET_ATTR, "#settings");
        let label = doc.create_text(launcher, "Settings")?;

        let dialog = doc.create_element(body, "div")?;
        doc.set_attribute(dialog, "id", "settings");
        doc.set_attribute(dialog, OPTIONS_ATTR, r#"{"state_class": "is-open"}"#);
        doc.set_transition(dialog, "opacity, transform", "150ms, 200ms");
        doc.set_layout(dialog, Rect::new(320.0, 120.0, 960.0, 600.0));
        let form = doc.create_element(dialog, "form")?;
        let dismiss = doc.create_element(form, "button")?;
        doc.set_attribute(dismiss, DISMISS_ATTR, "");

        let mut host = DialogHost::new(doc);
        let discovery = host.discover(body)?;

        let events = Rc::new(RefCell::new(Vec::new()));
        let names = host.defaults().events.clone();
        for kind in [
            LifecycleKind::BeforeShown,
            LifecycleKind::AfterShown,
            LifecycleKind::BeforeHidden,
            LifecycleKind::AfterHidden,
        ] {
            let events = events.clone();
            host.add_listener(body, names.name(kind), move |event: &mut LifecycleEvent| {
                log::info!("{} on {}", event.name(), event.target());
                events.borrow_mut().push(event.name().to_string());
            });
        }

        let elements = HashMap::from([
            ("body", body),
            ("launcher", launcher),
            ("label", label),
            ("dialog", dialog),
            ("backdrop", dialog),
            ("form", form),
            ("dismiss", dismiss),
        ]);

        Ok(Self {
            host,
            elements,
            dialog,
            events,
            pending: Vec::new(),
            discovery,
        })
    }

    pub fn host(&self) -> &DialogHost<Document> {
        &self.host
    }

    pub fn discovery(&self) -> &DiscoveryHandle {
        &self.discovery
    }

    /// Look up a named element of the page.
    pub fn element(&self, name: &str) -> Result<NodeId, DemoError> {
        self.elements
            .get(name)
            .copied()
            .ok_or_else(|| DemoError::UnknownElement(name.to_string()))
    }

    /// Current state of the settings dialog (hidden until first launched).
    pub fn state(&self) -> DialogState {
        self.host.state(self.dialog).unwrap_or_default()
    }

    /// Replay a single step.
    pub fn run(&mut self, step: &Step) -> Result<StepReport, DemoError> {
        self.events.borrow_mut().clear();

        match step {
            Step::Click { target } => {
                let target = self.element(target)?;
                let started = self.host.click(target)?;
                self.pending.extend(started);
            }
            Step::Key { key } => {
                let started = self.host.key_down(key);
                self.pending.extend(started);
            }
            Step::TransitionEnd { target } => {
                let target = self.element(target)?;
                self.host.transition_end(target);
            }
        }

        let mut outcomes = Vec::new();
        self.pending.retain_mut(|completion| match completion.try_outcome() {
            Some(result) => {
                outcomes.push(describe(&result));
                false
            }
            None => true,
        });

        Ok(StepReport {
            step: step.clone(),
            events: self.events.borrow().clone(),
            outcomes,
            state: self.state(),
        })
    }

    pub fn run_script(&mut self, steps: &[Step]) -> Result<Vec<StepReport>, DemoError> {
        steps.iter().map(|step| self.run(step)).collect()
    }

    /// Whether the dialog element currently has keyboard focus.
    pub fn dialog_focused(&self) -> bool {
        self.host.dom().focused() == Some(self.dialog)
    }

    /// Whether the dialog element carries `class`.
    pub fn dialog_has_class(&self, class: &str) -> bool {
        self.host.dom().has_class(self.dialog, class)
    }
}

fn describe(result: &Result<Outcome, DialogError>) -> String {
    match result {
        Ok(Outcome::Completed) => "completed".to_string(),
        Ok(Outcome::AlreadyShown) => "already shown".to_string(),
        Ok(Outcome::AlreadyHidden) => "already hidden".to_string(),
        Err(err) if err.is_canceled() => "canceled".to_string(),
        Err(err) => format!("failed: {}", err),
    }
}
