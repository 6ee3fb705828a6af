//! DialogKit Core Library
//!
//! Platform-agnostic dialog visibility control: a show/hide state machine
//! bound to one element, transition-aware completion, cancelable lifecycle
//! events and delegated launcher discovery.
//!
//! Everything is driven through a [`DialogHost`], which owns the DOM, the
//! controller registry and the listener tables. Input (clicks, key presses,
//! transition-end signals) is routed into the host by whatever owns the
//! real event loop.

pub mod binding;
pub mod config;
pub mod dialog;
pub mod dom;
pub mod error;
pub mod event;
pub mod host;
pub mod registry;

pub use binding::{Binding, BindingId, BindingKind, Bindings};
pub use config::{
    DialogConfig, EventNames, DIALOG_ATTR, DISMISS_ATTR, OPTIONS_ATTR, TARGET_ATTR,
};
pub use dialog::{Completion, DialogController, DialogState, Outcome};
pub use dom::{Document, Dom, NodeId, SelectorList, TransitionStyle, longest_transition};
pub use error::{DialogError, DialogResult};
pub use event::{EventBus, LifecycleEvent, LifecycleKind, ListenerId};
pub use host::{DialogHost, DiscoveryHandle};
pub use registry::Registry;

#[cfg(target_arch = "wasm32")]
pub use dom::WebDom;
