#![forbid(unsafe_code)]

//! Input and history controller.
//!
//! Turns keys into edits of the prompt buffer, history recall, completion,
//! and command submission. The controller never touches the scrollback
//! itself; a submit returns an [`Action`] that the application applies to
//! the log and the typewriter. While the typewriter is busy every key is
//! ignored.

use termfolio_core::event::{KeyCode, KeyEvent};

use crate::content::{CLEAR_COMMAND, Completion, ContentTable, Preferences};
use crate::history::{History, Recall};
use crate::prompt::LineEditor;
use crate::theme::Theme;

/// What the application should do after a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing beyond the buffer edit (if any).
    None,
    /// Wipe the scrollback.
    Clear,
    /// Echo `echo` as an input line, then reveal `output`.
    Run { echo: String, output: String },
}

#[derive(Debug, Clone)]
pub struct Controller {
    editor: LineEditor,
    history: History,
    content: ContentTable,
    prefs: Preferences,
    prompt: String,
}

impl Controller {
    #[must_use]
    pub fn new(content: ContentTable, prompt: impl Into<String>, theme: Theme) -> Self {
        Self {
            editor: LineEditor::new(),
            history: History::new(),
            content,
            prefs: Preferences { theme },
            prompt: prompt.into(),
        }
    }

    /// Handle one key. `busy` is the typewriter state.
    pub fn handle_key(&mut self, key: KeyEvent, busy: bool) -> Action {
        if busy || !key.is_actionable() {
            return Action::None;
        }

        if key.ctrl() {
            match key.code {
                KeyCode::Char(c) => match c.to_ascii_lowercase() {
                    'u' => self.editor.clear(),
                    'w' => self.editor.delete_word(),
                    'a' => self.editor.move_home(),
                    'e' => self.editor.move_end(),
                    _ => {}
                },
                KeyCode::Left => self.editor.move_home(),
                KeyCode::Right => self.editor.move_end(),
                _ => {}
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Enter => return self.submit(),
            KeyCode::Up => {
                if let Some(entry) = self.history.recall_previous() {
                    self.editor.set(entry);
                }
            }
            KeyCode::Down => match self.history.recall_next() {
                Recall::Entry(entry) => self.editor.set(entry),
                Recall::Cleared => self.editor.clear(),
            },
            KeyCode::Tab => {
                if let Completion::Unique(name) = self.content.complete(self.editor.text()) {
                    self.editor.set(name);
                }
            }
            KeyCode::Char(c) if !key.alt() => self.editor.insert_char(c),
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Delete => self.editor.delete(),
            KeyCode::Left => self.editor.move_left(),
            KeyCode::Right => self.editor.move_right(),
            KeyCode::Home => self.editor.move_home(),
            KeyCode::End => self.editor.move_end(),
            _ => {}
        }
        Action::None
    }

    /// Insert pasted text into the buffer, ignored while busy.
    pub fn handle_paste(&mut self, text: &str, busy: bool) {
        if !busy {
            self.editor.insert_str(text);
        }
    }

    /// Submit the buffer.
    ///
    /// Blank input is a no-op and keeps the buffer as typed. Anything else is
    /// recorded in history, the cursor returns past the end, and the buffer
    /// is emptied.
    pub fn submit(&mut self) -> Action {
        let command = self.editor.text().trim().to_owned();
        if command.is_empty() {
            return Action::None;
        }
        self.editor.clear();
        self.history.push(command.clone());

        if command == CLEAR_COMMAND {
            tracing::debug!(target: "termfolio.controller", "clear");
            return Action::Clear;
        }

        let output = match self.content.run(&command, &mut self.prefs) {
            Some(text) => text,
            None => {
                tracing::debug!(target: "termfolio.controller", %command, "unknown command");
                format!("bash: {command}: command not found")
            }
        };
        tracing::debug!(target: "termfolio.controller", %command, "command submitted");
        Action::Run {
            echo: format!("{} {command}", self.prompt),
            output,
        }
    }

    #[must_use]
    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    #[must_use]
    pub fn buffer(&self) -> &str {
        self.editor.text()
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn content(&self) -> &ContentTable {
        &self.content
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.prefs.theme
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}
