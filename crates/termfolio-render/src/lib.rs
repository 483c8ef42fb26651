#![forbid(unsafe_code)]

//! Render layer for termfolio.
//!
//! `view()` fills a [`Frame`]; hosts turn it into bytes. The native host uses
//! the crossterm [`presenter::Presenter`]; the browser host serializes the
//! frame or renders it to HTML.

pub mod frame;
pub mod link;
#[cfg(not(target_arch = "wasm32"))]
pub mod presenter;
pub mod wrap;

pub use frame::{Frame, Line, Rgb, Span, Style};
pub use link::{find_urls, linkify};
pub use wrap::{wrap_line, wrap_lines};
