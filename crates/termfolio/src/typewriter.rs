#![forbid(unsafe_code)]

//! Typewriter animation engine.
//!
//! A reveal turns a block of lines into a series of ticks. Starting a line
//! appends an empty output line; every tick after that appends one grapheme
//! cluster, so emoji and combining sequences appear whole. Once a line is
//! complete the next tick starts the following line, and the tick after the
//! last grapheme of the last line finishes the block.
//!
//! The engine owns no timer. The application subscribes to a periodic tick
//! at [`Typewriter::pace`] while [`Typewriter::is_busy`] holds.

use std::collections::VecDeque;
use std::time::Duration;

use unicode_segmentation::UnicodeSegmentation;

use crate::output::{LineHandle, OutputLog};

/// Outcome of one [`Typewriter::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The reveal moved forward and is still running.
    Progress,
    /// The reveal completed (or lost its line to a clear); no longer busy.
    Finished,
    /// Nothing was in flight.
    Idle,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RevealError {
    #[error("a reveal is already in progress")]
    Busy,
}

#[derive(Debug)]
struct ActiveLine {
    handle: LineHandle,
    text: String,
    /// Byte offset of the first grapheme not yet shown.
    shown: usize,
}

impl ActiveLine {
    fn next_grapheme(&self) -> Option<&str> {
        self.text[self.shown..].graphemes(true).next()
    }
}

#[derive(Debug)]
struct Reveal {
    current: ActiveLine,
    pending: VecDeque<String>,
    pace: Duration,
}

#[derive(Debug, Default)]
pub struct Typewriter {
    active: Option<Reveal>,
}

impl Typewriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True from [`reveal_block`](Self::reveal_block) until the finishing tick.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// Tick interval of the reveal in flight.
    #[must_use]
    pub fn pace(&self) -> Option<Duration> {
        self.active.as_ref().map(|r| r.pace)
    }

    /// Start revealing `lines` into `log`, one grapheme per tick.
    ///
    /// The first line is opened immediately. An empty block finishes at once
    /// and never makes the engine busy.
    ///
    /// # Errors
    ///
    /// [`RevealError::Busy`] if another reveal is in flight.
    pub fn reveal_block<I, S>(
        &mut self,
        log: &mut OutputLog,
        lines: I,
        pace: Duration,
    ) -> Result<(), RevealError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.is_busy() {
            tracing::debug!(target: "termfolio.typewriter", "reveal rejected while busy");
            return Err(RevealError::Busy);
        }
        let mut pending: VecDeque<String> = lines.into_iter().map(Into::into).collect();
        let Some(first) = pending.pop_front() else {
            return Ok(());
        };
        tracing::debug!(
            target: "termfolio.typewriter",
            lines = pending.len() + 1,
            pace_ms = pace.as_millis() as u64,
            "reveal started"
        );
        self.active = Some(Reveal {
            current: open_line(log, first),
            pending,
            pace,
        });
        Ok(())
    }

    /// Advance the reveal by one step.
    pub fn tick(&mut self, log: &mut OutputLog) -> Tick {
        let Some(reveal) = self.active.as_mut() else {
            return Tick::Idle;
        };

        let step = reveal.current.next_grapheme().unwrap_or("");
        let len = step.len();
        // An empty append still checks that the line survived.
        if !log.append(reveal.current.handle, step) {
            tracing::debug!(target: "termfolio.typewriter", "line vanished, reveal dropped");
            self.active = None;
            return Tick::Finished;
        }
        if len > 0 {
            reveal.current.shown += len;
            return Tick::Progress;
        }

        match reveal.pending.pop_front() {
            Some(next) => {
                reveal.current = open_line(log, next);
                Tick::Progress
            }
            None => {
                tracing::debug!(target: "termfolio.typewriter", "reveal finished");
                self.active = None;
                Tick::Finished
            }
        }
    }

    /// Show everything that is left at once and finish.
    pub fn flush(&mut self, log: &mut OutputLog) {
        let Some(reveal) = self.active.take() else {
            return;
        };
        let current = reveal.current;
        if log.append(current.handle, &current.text[current.shown..]) {
            for line in reveal.pending {
                log.push_output(line);
            }
        }
    }

    /// Drop the reveal in flight, leaving what was shown so far.
    pub fn cancel(&mut self) {
        if self.active.take().is_some() {
            tracing::debug!(target: "termfolio.typewriter", "reveal cancelled");
        }
    }
}

fn open_line(log: &mut OutputLog, text: String) -> ActiveLine {
    ActiveLine {
        handle: log.push_output(""),
        text,
        shown: 0,
    }
}
