#![forbid(unsafe_code)]

//! Core: canonical input events, terminal lifecycle, and log setup.

pub mod event;
#[cfg(feature = "subscriber")]
pub mod logging;
#[cfg(not(target_arch = "wasm32"))]
pub mod terminal_session;
