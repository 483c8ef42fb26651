#![forbid(unsafe_code)]

//! Browser hosting for the portfolio terminal.
//!
//! JavaScript owns the loop here. It queues input and resizes, moves the
//! clock, and calls [`StepProgram::step`] once per animation frame. Nothing
//! blocks or spawns, so the crate builds for `wasm32-unknown-unknown`.
//! Binding to `wasm-bindgen` is left to the embedding layer, which forwards
//! the HTML fragment (or the frame JSON) that each step publishes.

pub mod html;
pub mod step_program;

use core::time::Duration;
use std::collections::VecDeque;

use termfolio_core::event::Event;
use termfolio_render::Frame;

pub use step_program::{StepProgram, StepResult};

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("step program already initialized")]
    AlreadyInitialized,
    #[error("step program used before init()")]
    NotInitialized,
    #[error("frame serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Time as reported by the host. Never runs backwards.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Jump to an absolute time. Earlier values are ignored.
    pub fn set(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Input waiting for the next step, plus the viewport it was sized for.
#[derive(Debug, Clone)]
pub struct WebEventSource {
    viewport: (u16, u16),
    pending: VecDeque<Event>,
}

impl WebEventSource {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            viewport: (width, height),
            pending: VecDeque::new(),
        }
    }

    #[must_use]
    pub const fn size(&self) -> (u16, u16) {
        self.viewport
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.viewport = (width, height);
    }

    pub fn push_event(&mut self, event: Event) {
        self.pending.push_back(event);
    }

    /// Oldest first.
    pub fn read_event(&mut self) -> Option<Event> {
        self.pending.pop_front()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// What the last steps produced for the page.
#[derive(Debug, Default, Clone)]
pub struct WebOutputs {
    /// `Cmd::Log` lines, oldest first.
    pub logs: Vec<String>,
    pub last_frame: Option<Frame>,
    pub last_frame_json: Option<String>,
    /// Ready to assign to the terminal container's `innerHTML`.
    pub last_html: Option<String>,
}

impl WebOutputs {
    pub(crate) fn record_frame(&mut self, frame: Frame) -> Result<(), WebError> {
        let json = serde_json::to_string(&frame)?;
        self.last_html = Some(html::frame_to_html(&frame));
        self.last_frame_json = Some(json);
        self.last_frame = Some(frame);
        Ok(())
    }
}
