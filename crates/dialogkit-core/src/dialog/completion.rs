//! Completion of a show/hide request.
//!
//! A request settles exactly once: the resolver side is consumed when it
//! fires, and dropping it unfired settles the request as released.

use crate::dom::NodeId;
use crate::error::{DialogError, DialogResult};
use futures::channel::oneshot;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// How a successful request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The transition ran and has settled.
    Completed,
    /// `show` on a dialog that was already visible.
    AlreadyShown,
    /// `hide` on a dialog that was already hidden.
    AlreadyHidden,
}

/// Pending result of a show/hide request.
///
/// Await it, or poll synchronously with [`Completion::try_outcome`].
pub struct Completion {
    dialog: NodeId,
    receiver: oneshot::Receiver<DialogResult<Outcome>>,
    settled: Option<DialogResult<Outcome>>,
}

/// Sending half of a [`Completion`].
pub(crate) struct Resolver {
    sender: oneshot::Sender<DialogResult<Outcome>>,
}

/// Create a linked resolver/completion pair for `dialog`.
pub(crate) fn completion(dialog: NodeId) -> (Resolver, Completion) {
    let (sender, receiver) = oneshot::channel();
    (
        Resolver { sender },
        Completion {
            dialog,
            receiver,
            settled: None,
        },
    )
}

impl Resolver {
    pub(crate) fn resolve(self, result: DialogResult<Outcome>) {
        // The caller may have dropped its completion; nothing to deliver then.
        let _ = self.sender.send(result);
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("canceled", &self.sender.is_canceled())
            .finish()
    }
}

impl Completion {
    /// A completion that is already settled.
    pub fn ready(dialog: NodeId, result: DialogResult<Outcome>) -> Self {
        let (resolver, completion) = completion(dialog);
        resolver.resolve(result);
        completion
    }

    /// The dialog this request is about.
    pub fn dialog(&self) -> NodeId {
        self.dialog
    }

    /// The result if the request has settled, `None` while it is pending.
    pub fn try_outcome(&mut self) -> Option<DialogResult<Outcome>> {
        if self.settled.is_none() {
            self.settled = match self.receiver.try_recv() {
                Ok(Some(result)) => Some(result),
                Ok(None) => None,
                Err(oneshot::Canceled) => Some(Err(DialogError::Released(self.dialog))),
            };
        }
        self.settled.clone()
    }

    pub fn is_pending(&mut self) -> bool {
        self.try_outcome().is_none()
    }
}

impl Future for Completion {
    type Output = DialogResult<Outcome>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(result) = self.settled.take() {
            return Poll::Ready(result);
        }
        let dialog = self.dialog;
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(DialogError::Released(dialog))))
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("dialog", &self.dialog)
            .field("settled", &self.settled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_ready_completion() {
        let dialog = NodeId::new();
        let mut done = Completion::ready(dialog, Ok(Outcome::AlreadyShown));
        assert_eq!(done.try_outcome(), Some(Ok(Outcome::AlreadyShown)));
        // inspecting does not consume the result
        assert_eq!(done.try_outcome(), Some(Ok(Outcome::AlreadyShown)));
        assert_eq!(block_on(done), Ok(Outcome::AlreadyShown));
    }

    #[test]
    fn test_pending_until_resolved() {
        let dialog = NodeId::new();
        let (resolver, mut pending) = completion(dialog);
        assert!(pending.is_pending());
        resolver.resolve(Ok(Outcome::Completed));
        assert_eq!(pending.try_outcome(), Some(Ok(Outcome::Completed)));
    }

    #[test]
    fn test_dropped_resolver_reports_release() {
        let dialog = NodeId::new();
        let (resolver, pending) = completion(dialog);
        drop(resolver);
        assert_eq!(block_on(pending), Err(DialogError::Released(dialog)));
    }
}
