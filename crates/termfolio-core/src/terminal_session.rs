#![forbid(unsafe_code)]

//! Raw-mode guard for the native host.
//!
//! [`TerminalSession`] turns on raw mode plus whichever [`SessionOptions`]
//! were requested and records each mode only after it was enabled. Dropping
//! the session (normal exit, `?`, or a panic unwind) resets colors, shows
//! the cursor, turns the recorded modes off newest first, and leaves raw
//! mode. SIGINT/SIGTERM and panics run the same teardown best-effort.
//!
//! ```no_run
//! use termfolio_core::terminal_session::{SessionOptions, TerminalSession};
//!
//! let session = TerminalSession::new(SessionOptions::fullscreen(true))?;
//! // ... draw, read events ...
//! drop(session);
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crossterm::{cursor, event as cte, style, terminal};

use crate::event::Event;

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Which terminal modes a session turns on. Everything is off by default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Draw on the alternate screen so the shell's scrollback survives.
    pub alternate_screen: bool,
    /// Report mouse presses and releases (click to focus).
    pub mouse_capture: bool,
    /// Deliver a paste as one event instead of a burst of keys.
    pub bracketed_paste: bool,
    /// Report focus gained/lost.
    pub focus_events: bool,
}

impl SessionOptions {
    /// What the portfolio binary runs with.
    #[must_use]
    pub fn fullscreen(mouse_capture: bool) -> Self {
        Self {
            alternate_screen: true,
            mouse_capture,
            bracketed_paste: true,
            focus_events: true,
        }
    }

    fn modes(&self) -> impl Iterator<Item = Mode> + '_ {
        Mode::ALL.into_iter().filter(|mode| match mode {
            Mode::AlternateScreen => self.alternate_screen,
            Mode::Mouse => self.mouse_capture,
            Mode::BracketedPaste => self.bracketed_paste,
            Mode::Focus => self.focus_events,
        })
    }
}

/// One switchable terminal mode, in enabling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    AlternateScreen,
    Mouse,
    BracketedPaste,
    Focus,
}

impl Mode {
    const ALL: [Self; 4] = [
        Self::AlternateScreen,
        Self::Mouse,
        Self::BracketedPaste,
        Self::Focus,
    ];

    fn enable(self, out: &mut impl Write) -> io::Result<()> {
        match self {
            Self::AlternateScreen => crossterm::execute!(out, terminal::EnterAlternateScreen),
            Self::Mouse => crossterm::execute!(out, cte::EnableMouseCapture),
            Self::BracketedPaste => crossterm::execute!(out, cte::EnableBracketedPaste),
            Self::Focus => crossterm::execute!(out, cte::EnableFocusChange),
        }
    }

    fn disable(self, out: &mut impl Write) -> io::Result<()> {
        match self {
            Self::AlternateScreen => crossterm::execute!(out, terminal::LeaveAlternateScreen),
            Self::Mouse => crossterm::execute!(out, cte::DisableMouseCapture),
            Self::BracketedPaste => crossterm::execute!(out, cte::DisableBracketedPaste),
            Self::Focus => crossterm::execute!(out, cte::DisableFocusChange),
        }
    }
}

/// Owns raw mode for as long as it lives. Keep one at a time.
#[derive(Debug)]
pub struct TerminalSession {
    options: SessionOptions,
    /// Modes that were actually turned on, oldest first.
    enabled: Vec<Mode>,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode and enable the requested modes.
    ///
    /// # Errors
    ///
    /// Fails if raw mode or a requested mode cannot be enabled. Whatever was
    /// already on is turned off again when the half-built session drops.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();
        terminal::enable_raw_mode()?;

        let mut session = Self {
            options,
            enabled: Vec::with_capacity(Mode::ALL.len()),
            #[cfg(unix)]
            signal_guard: Some(SignalGuard::new()?),
        };
        let mut stdout = io::stdout();
        let requested: Vec<Mode> = session.options.modes().collect();
        for mode in requested {
            mode.enable(&mut stdout)?;
            session.enabled.push(mode);
        }

        #[cfg(feature = "tracing")]
        tracing::info!(target: "termfolio.session", modes = ?session.enabled, "terminal session started");
        Ok(session)
    }

    /// Current size as (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Wait up to `timeout` for input. `Ok(false)` on timeout.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<bool> {
        cte::poll(timeout)
    }

    /// Block for the next event. Events with no canonical form read as `None`.
    pub fn read_event(&self) -> io::Result<Option<Event>> {
        Ok(Event::from_crossterm(cte::read()?))
    }

    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    fn restore(&mut self) {
        #[cfg(unix)]
        drop(self.signal_guard.take());

        let mut stdout = io::stdout();
        let _ = crossterm::execute!(stdout, style::ResetColor, cursor::Show);
        while let Some(mode) = self.enabled.pop() {
            let _ = mode.disable(&mut stdout);
        }
        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();

        #[cfg(feature = "tracing")]
        tracing::info!(target: "termfolio.session", "terminal restored");
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.restore();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

/// Teardown without knowing which modes are on; disabling an inactive mode
/// is harmless.
fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, style::ResetColor, cursor::Show);
    for mode in Mode::ALL.into_iter().rev() {
        let _ = mode.disable(&mut stdout);
    }
    let _ = terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                #[cfg(feature = "tracing")]
                tracing::warn!(target: "termfolio.session", signal, "termination signal received");
                best_effort_cleanup();
                std::process::exit(128 + signal);
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_request_nothing() {
        assert_eq!(SessionOptions::default().modes().count(), 0);
    }

    #[test]
    fn fullscreen_modes_follow_enabling_order() {
        let modes: Vec<Mode> = SessionOptions::fullscreen(false).modes().collect();
        assert_eq!(
            modes,
            vec![Mode::AlternateScreen, Mode::BracketedPaste, Mode::Focus]
        );
        assert!(SessionOptions::fullscreen(true).modes().any(|m| m == Mode::Mouse));
    }

    #[test]
    fn mode_sequences_reach_the_writer() {
        let mut out = Vec::new();
        Mode::BracketedPaste.enable(&mut out).expect("write to vec");
        Mode::BracketedPaste.disable(&mut out).expect("write to vec");
        let text = String::from_utf8(out).expect("ascii");
        assert_eq!(text, "\x1b[?2004h\x1b[?2004l");
    }
}
