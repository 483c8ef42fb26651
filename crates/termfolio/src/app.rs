#![forbid(unsafe_code)]

//! The portfolio terminal as a runtime [`Model`].
//!
//! Owns the single session: scrollback, typewriter, controller (buffer,
//! history, preferences), pointer tracker, and focus. Every host (native
//! program, browser stepper, simulator) drives it through [`Msg`].

use termfolio_core::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use termfolio_render::{Frame, Line, Span, linkify, wrap_line};
use termfolio_runtime::program::{Cmd, Model};
use termfolio_runtime::subscription::{Every, Subscription};
use unicode_width::UnicodeWidthStr;

use crate::config::{ConfigError, TerminalConfig};
use crate::content::{BOOT_LINES, ContentTable};
use crate::controller::{Action, Controller};
use crate::output::{LineKind, OutputLog};
use crate::pointer::{Gesture, PointerTracker};
use crate::theme::{Palette, Theme};
use crate::typewriter::{RevealError, Tick, Typewriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Key(KeyEvent),
    Paste(String),
    Mouse(MouseEvent),
    Resize { width: u16, height: u16 },
    Focus(bool),
    /// One typewriter step.
    Tick,
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key) => Self::Key(key),
            Event::Paste(paste) => Self::Paste(paste.text),
            Event::Mouse(mouse) => Self::Mouse(mouse),
            Event::Resize { width, height } => Self::Resize { width, height },
            Event::Focus(gained) => Self::Focus(gained),
            Event::Tick => Self::Tick,
        }
    }
}

pub struct TerminalApp {
    config: TerminalConfig,
    log: OutputLog,
    typewriter: Typewriter,
    controller: Controller,
    pointer: PointerTracker,
    focused: bool,
    shut_down: bool,
}

impl TerminalApp {
    /// Build the app, loading any content overrides.
    ///
    /// # Errors
    ///
    /// Invalid configuration or an unusable content file.
    pub fn new(config: TerminalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let content = config.content_table()?;
        Ok(Self::with_content(config, content))
    }

    /// Build the app around an explicit table (no file access).
    #[must_use]
    pub fn with_content(config: TerminalConfig, content: ContentTable) -> Self {
        Self {
            controller: Controller::new(content, config.prompt.clone(), config.theme),
            pointer: PointerTracker::new(config.drag_threshold),
            config,
            log: OutputLog::new(),
            typewriter: Typewriter::new(),
            focused: true,
            shut_down: false,
        }
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.typewriter.is_busy()
    }

    #[must_use]
    pub fn log(&self) -> &OutputLog {
        &self.log
    }

    #[must_use]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.controller.theme()
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    #[must_use]
    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    /// Hosts that can see text selection (the browser) report it here so a
    /// release inside a selection does not steal focus.
    pub fn set_selection_active(&mut self, active: bool) {
        self.pointer.set_selection_active(active);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Cmd<Msg> {
        if key.is_actionable() && (key.is_ctrl_char('c') || key.is_ctrl_char('d')) {
            tracing::info!(target: "termfolio.app", "quit requested");
            return Cmd::quit();
        }
        if !self.focused {
            return Cmd::none();
        }
        let action = self.controller.handle_key(key, self.is_busy());
        self.apply(action);
        Cmd::none()
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.pointer.press(mouse.x, mouse.y),
            MouseEventKind::Up(MouseButton::Left) => {
                let gesture = self.pointer.release(mouse.x, mouse.y);
                if gesture == Gesture::Click && !self.is_busy() {
                    self.focused = true;
                }
            }
            _ => {}
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Clear => {
                self.typewriter.cancel();
                self.log.clear();
            }
            Action::Run { echo, output } => {
                self.log.push_input(echo);
                let pace = self.config.reveal_pace;
                self.start_reveal(output.split('\n').map(str::to_owned).collect(), pace);
            }
        }
    }

    fn start_reveal(&mut self, lines: Vec<String>, pace: std::time::Duration) {
        match self.typewriter.reveal_block(&mut self.log, lines, pace) {
            Ok(()) => {
                if !self.config.animate {
                    self.typewriter.flush(&mut self.log);
                }
            }
            Err(RevealError::Busy) => {
                tracing::warn!(target: "termfolio.app", "reveal requested while busy; dropped");
            }
        }
    }

    fn styled_rows(&self, palette: &Palette, width: u16) -> Vec<Line> {
        let mut rows = Vec::new();
        for line in self.log.lines() {
            let base = match line.kind {
                LineKind::Input => palette.input_style(),
                LineKind::Output => palette.output_style(),
            };
            let styled = Line::from_spans(linkify(&line.text, base, palette.link_style()));
            rows.extend(wrap_line(&styled, width));
        }
        rows
    }
}

impl Model for TerminalApp {
    type Message = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        tracing::info!(
            target: "termfolio.app",
            theme = %self.theme(),
            animate = self.config.animate,
            "boot"
        );
        let pace = self.config.boot_pace;
        self.start_reveal(BOOT_LINES.iter().map(|l| (*l).to_owned()).collect(), pace);
        Cmd::none()
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        if self.shut_down {
            return Cmd::none();
        }
        match msg {
            Msg::Key(key) => return self.handle_key(key),
            Msg::Paste(text) => {
                if self.focused {
                    self.controller.handle_paste(&text, self.is_busy());
                }
            }
            Msg::Mouse(mouse) => self.handle_mouse(mouse),
            Msg::Focus(gained) => self.focused = gained,
            Msg::Resize { .. } => {}
            Msg::Tick => {
                if self.typewriter.tick(&mut self.log) == Tick::Finished {
                    tracing::debug!(target: "termfolio.app", lines = self.log.len(), "output settled");
                }
            }
        }
        Cmd::none()
    }

    fn view(&self, frame: &mut Frame) {
        let palette = self.theme().palette();
        frame.set_background(palette.background);
        let width = frame.width();
        let height = usize::from(frame.height());

        let mut rows = self.styled_rows(&palette, width);
        let mut cursor_offset = None;
        if !self.is_busy() {
            let prompt = self.controller.prompt();
            let editor = self.controller.editor();
            let prompt_line = Line::from_spans(vec![
                Span::styled(prompt, palette.input_style()),
                Span::styled(" ", palette.typed_style()),
                Span::styled(editor.text(), palette.typed_style()),
            ]);
            if self.focused {
                cursor_offset = Some((rows.len(), prompt.width() + 1 + editor.cursor_width()));
            }
            rows.extend(wrap_line(&prompt_line, width));
        }

        // Keep the newest rows on screen.
        let skip = rows.len().saturating_sub(height);
        for row in rows.into_iter().skip(skip) {
            frame.push_line(row);
        }

        if let Some((prompt_row, offset)) = cursor_offset
            && width > 0
        {
            let width = usize::from(width);
            let row = prompt_row + offset / width;
            if let (Some(y), Ok(x)) = (row.checked_sub(skip), u16::try_from(offset % width))
                && let Ok(y) = u16::try_from(y)
            {
                frame.set_cursor(x, y);
            }
        }
    }

    fn subscriptions(&self) -> Vec<Box<dyn Subscription<Msg>>> {
        match self.typewriter.pace() {
            Some(pace) => vec![Box::new(Every::new(pace, || Msg::Tick))],
            None => vec![],
        }
    }

    fn on_shutdown(&mut self) {
        self.typewriter.cancel();
        self.shut_down = true;
        tracing::info!(target: "termfolio.app", history = self.controller.history().len(), "shutdown");
    }
}
