//! Dialog visibility control.
//!
//! A dialog moves through four states:
//!
//! ```text
//!   Hidden --show--> Showing --transition end--> Visible
//!   Visible --hide--> Hiding --transition end--> Hidden
//! ```
//!
//! `show`/`hide` first emit a cancelable `before-*` notification; a
//! canceled request leaves the dialog where it was. Zero-length transitions
//! settle synchronously, otherwise the first transition-end signal does.

mod completion;
mod controller;
mod state;

pub use completion::{Completion, Outcome};
pub use controller::DialogController;
pub use state::DialogState;

pub(crate) use controller::HostParts;
