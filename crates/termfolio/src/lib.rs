#![forbid(unsafe_code)]

//! A fake terminal for a personal portfolio.
//!
//! Visitors type commands at a prompt and get canned text back, revealed one
//! character at a time. The pieces:
//!
//! - [`typewriter`] - paced reveal of output blocks into the [`output`] log
//! - [`controller`] - prompt editing ([`prompt`]), [`history`], completion, submit
//! - [`content`] - the command table and session preferences
//! - [`app`] - the runtime model that ties them together
//!
//! The same [`app::TerminalApp`] runs natively (see `main.rs`), in the
//! browser stepper from `termfolio-web`, and under the test simulator.

pub mod app;
#[cfg(not(target_arch = "wasm32"))]
pub mod cli;
pub mod config;
pub mod content;
pub mod controller;
pub mod history;
pub mod output;
pub mod pointer;
pub mod prompt;
pub mod theme;
pub mod typewriter;

pub use app::{Msg, TerminalApp};
pub use config::{ConfigError, TerminalConfig};
pub use content::{Completion, ContentError, ContentTable, Entry, Preferences};
pub use controller::{Action, Controller};
pub use theme::Theme;
