//! DialogKit Application
//!
//! Demo shell around `dialogkit-core`: a scripted page for native runs and
//! the browser entry point that binds every dialog on a real page.

mod demo;

pub use demo::{DEFAULT_SCRIPT, DemoError, DemoPage, Step, StepReport, parse_script};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::run_wasm;
