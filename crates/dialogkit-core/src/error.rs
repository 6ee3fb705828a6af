//! Error types for dialog control.

use crate::dom::NodeId;
use crate::event::LifecycleKind;
use thiserror::Error;

/// Dialog errors.
///
/// Construction and discovery failures are returned directly. Cancellation
/// and release are delivered through a [`Completion`](crate::Completion).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DialogError {
    #[error("Not an element node: {0}")]
    InvalidNode(NodeId),
    #[error("Selector {selector:?} matches {count} elements, expected exactly one")]
    AmbiguousTarget { selector: String, count: usize },
    #[error("Selector {0:?} matches no element")]
    TargetNotFound(String),
    #[error("Invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("Invalid dialog options: {0}")]
    InvalidOptions(String),
    #[error("Element {0} already has a dialog controller")]
    AlreadyAttached(NodeId),
    #[error("Element {0} has no dialog controller")]
    NotAttached(NodeId),
    #[error("Dialog {0} is still transitioning")]
    TransitionInProgress(NodeId),
    #[error("Dialog {dialog}: {event} was canceled")]
    Canceled { dialog: NodeId, event: LifecycleKind },
    #[error("Dialog {0} was released before its transition finished")]
    Released(NodeId),
    #[error("DOM error: {0}")]
    Dom(String),
}

impl DialogError {
    /// Whether this error reports a canceled lifecycle event.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled { .. })
    }
}

impl From<serde_json::Error> for DialogError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidOptions(err.to_string())
    }
}

/// Result type for dialog operations.
pub type DialogResult<T> = Result<T, DialogError>;
