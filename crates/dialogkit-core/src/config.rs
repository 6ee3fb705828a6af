//! Dialog configuration and DOM markers.

use crate::dom::{Dom, NodeId};
use crate::error::{DialogError, DialogResult};
use crate::event::LifecycleKind;
use serde::{Deserialize, Serialize};

/// Marks an element as a dialog to instantiate directly on discovery.
pub const DIALOG_ATTR: &str = "data-dialog";

/// On a launcher, holds the selector of the dialog it opens.
pub const TARGET_ATTR: &str = "data-dialog-target";

/// Marks a descendant of a dialog that closes it when clicked.
pub const DISMISS_ATTR: &str = "data-dialog-dismiss";

/// JSON object with per-dialog overrides of [`DialogConfig`].
pub const OPTIONS_ATTR: &str = "data-dialog-options";

/// Names of the four lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventNames {
    pub before_shown: String,
    pub after_shown: String,
    pub before_hidden: String,
    pub after_hidden: String,
}

impl Default for EventNames {
    fn default() -> Self {
        Self {
            before_shown: "dialog:before-shown".to_string(),
            after_shown: "dialog:shown".to_string(),
            before_hidden: "dialog:before-hidden".to_string(),
            after_hidden: "dialog:hidden".to_string(),
        }
    }
}

impl EventNames {
    pub fn name(&self, kind: LifecycleKind) -> &str {
        match kind {
            LifecycleKind::BeforeShown => &self.before_shown,
            LifecycleKind::AfterShown => &self.after_shown,
            LifecycleKind::BeforeHidden => &self.before_hidden,
            LifecycleKind::AfterHidden => &self.after_hidden,
        }
    }
}

/// Per-dialog configuration. Every field is optional when deserialized;
/// unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DialogConfig {
    /// Class present on the dialog element while it is visible.
    pub state_class: String,
    /// Class on `<body>` while a dialog is visible.
    pub scroll_lock_class: String,
    pub events: EventNames,
    /// Hide on the escape key.
    pub close_on_escape: bool,
    /// Hide on clicks landing on the dialog element itself.
    pub close_on_backdrop: bool,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            state_class: "is-visible".to_string(),
            scroll_lock_class: "dialog-open".to_string(),
            events: EventNames::default(),
            close_on_escape: true,
            close_on_backdrop: true,
        }
    }
}

impl DialogConfig {
    /// Parse a full configuration from JSON; missing fields take defaults.
    pub fn from_json(json: &str) -> DialogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply a JSON object of overrides on top of `self`.
    ///
    /// Nested objects merge key by key, so `{"events": {"after_shown": "x"}}`
    /// keeps the other event names.
    pub fn with_overrides(&self, json: &str) -> DialogResult<Self> {
        let overrides: serde_json::Value = serde_json::from_str(json)?;
        if !overrides.is_object() {
            return Err(DialogError::InvalidOptions(
                "options must be a JSON object".to_string(),
            ));
        }
        let mut base = serde_json::to_value(self)?;
        merge(&mut base, overrides);
        Ok(serde_json::from_value(base)?)
    }

    /// Configuration for `node`: `self`, overridden by the element's
    /// `data-dialog-options` attribute if it has one.
    pub fn for_element<D: Dom + ?Sized>(&self, dom: &D, node: NodeId) -> DialogResult<Self> {
        match dom.attribute(node, OPTIONS_ATTR) {
            Some(json) if !json.trim().is_empty() => self.with_overrides(&json),
            _ => Ok(self.clone()),
        }
    }
}

fn merge(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overrides) => *base = overrides,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn test_defaults() {
        let config = DialogConfig::default();
        assert_eq!(config.state_class, "is-visible");
        assert_eq!(config.events.name(LifecycleKind::AfterHidden), "dialog:hidden");
        assert!(config.close_on_escape && config.close_on_backdrop);
    }

    #[test]
    fn test_from_json_partial() {
        let config = DialogConfig::from_json(r#"{"state_class": "open"}"#).unwrap();
        assert_eq!(config.state_class, "open");
        assert_eq!(config.scroll_lock_class, "dialog-open");
    }

    #[test]
    fn test_overrides_merge_nested() {
        let base = DialogConfig {
            state_class: "shown".to_string(),
            ..Default::default()
        };
        let config = base
            .with_overrides(r#"{"events": {"after_shown": "modal:open"}, "close_on_escape": false}"#)
            .unwrap();
        assert_eq!(config.state_class, "shown");
        assert_eq!(config.events.after_shown, "modal:open");
        assert_eq!(config.events.before_shown, "dialog:before-shown");
        assert!(!config.close_on_escape);
    }

    #[test]
    fn test_invalid_options() {
        let base = DialogConfig::default();
        assert!(matches!(base.with_overrides("[1, 2]"), Err(DialogError::InvalidOptions(_))));
        assert!(matches!(base.with_overrides("{oops"), Err(DialogError::InvalidOptions(_))));
        assert!(matches!(
            base.with_overrides(r#"{"close_on_escape": "nope"}"#),
            Err(DialogError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let base = DialogConfig::default();
        assert!(matches!(
            base.with_overrides(r#"{"stateClass": "open"}"#),
            Err(DialogError::InvalidOptions(_))
        ));
        assert!(matches!(
            base.with_overrides(r#"{"events": {"shown": "x"}}"#),
            Err(DialogError::InvalidOptions(_))
        ));
        assert!(matches!(
            DialogConfig::from_json(r#"{"close_on_esc": false}"#),
            Err(DialogError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_for_element_reads_attribute() {
        let mut doc = Document::new();
        let dialog = doc.create_element(doc.body_element(), "div").unwrap();
        let base = DialogConfig::default();
        assert_eq!(base.for_element(&doc, dialog).unwrap(), base);

        doc.set_attribute(dialog, OPTIONS_ATTR, r#"{"close_on_backdrop": false}"#);
        assert!(!base.for_element(&doc, dialog).unwrap().close_on_backdrop);
    }
}
