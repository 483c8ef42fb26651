#![forbid(unsafe_code)]

//! Input events as the portfolio terminal sees them.
//!
//! The native host maps crossterm events in here, the browser host builds
//! them from DOM events, and tests construct them directly. Mouse positions
//! are 0-indexed cells.

use bitflags::bitflags;
#[cfg(not(target_arch = "wasm32"))]
use crossterm::event as cte;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// New viewport size in cells.
    Resize { width: u16, height: u16 },
    Paste(PasteEvent),
    /// `true` when focus was gained.
    Focus(bool),
    /// Timer tick delivered by the host.
    Tick,
}

impl Event {
    /// Translate a crossterm event. `None` for input the terminal ignores.
    #[must_use]
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        Some(match event {
            cte::Event::Key(key) => Self::Key(KeyEvent::from_crossterm(key)?),
            cte::Event::Mouse(mouse) => Self::Mouse(MouseEvent::from_crossterm(mouse)?),
            cte::Event::Resize(width, height) => Self::Resize { width, height },
            cte::Event::Paste(text) => Self::Paste(PasteEvent::bracketed(text)),
            cte::Event::FocusGained => Self::Focus(true),
            cte::Event::FocusLost => Self::Focus(false),
        })
    }

    /// A plain key press.
    #[must_use]
    pub const fn key(code: KeyCode) -> Self {
        Self::Key(KeyEvent::new(code))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A press with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        self.code == KeyCode::Char(c)
    }

    /// Ctrl held with `c`, either case.
    #[must_use]
    pub fn is_ctrl_char(&self, c: char) -> bool {
        self.ctrl() && matches!(self.code, KeyCode::Char(ch) if ch.eq_ignore_ascii_case(&c))
    }

    /// Presses and auto-repeats count; releases do not.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        !matches!(self.kind, KeyEventKind::Release)
    }

    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn from_crossterm(key: cte::KeyEvent) -> Option<Self> {
        let kind = match key.kind {
            cte::KeyEventKind::Press => KeyEventKind::Press,
            cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
            cte::KeyEventKind::Release => KeyEventKind::Release,
        };
        Some(
            Self::new(KeyCode::from_crossterm(key.code)?)
                .with_modifiers(Modifiers::from_crossterm(key.modifiers))
                .with_kind(kind),
        )
    }
}

/// The keys the prompt reacts to. Anything else is dropped at the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Home,
    End,
    Up,
    Down,
    Left,
    Right,
}

impl KeyCode {
    /// Map a DOM `KeyboardEvent.key` value.
    ///
    /// Any single character is a [`KeyCode::Char`]; unused named keys
    /// (`Shift`, `F5`, ...) give `None`.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(Self::Char(c));
        }
        Some(match key {
            "Enter" => Self::Enter,
            "Escape" | "Esc" => Self::Escape,
            "Backspace" => Self::Backspace,
            "Delete" | "Del" => Self::Delete,
            "Tab" => Self::Tab,
            "Home" => Self::Home,
            "End" => Self::End,
            "ArrowUp" | "Up" => Self::Up,
            "ArrowDown" | "Down" => Self::Down,
            "ArrowLeft" | "Left" => Self::Left,
            "ArrowRight" | "Right" => Self::Right,
            _ => return None,
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn from_crossterm(code: cte::KeyCode) -> Option<Self> {
        Some(match code {
            cte::KeyCode::Char(c) => Self::Char(c),
            cte::KeyCode::Enter => Self::Enter,
            cte::KeyCode::Esc => Self::Escape,
            cte::KeyCode::Backspace => Self::Backspace,
            cte::KeyCode::Delete => Self::Delete,
            cte::KeyCode::Tab => Self::Tab,
            cte::KeyCode::Home => Self::Home,
            cte::KeyCode::End => Self::End,
            cte::KeyCode::Up => Self::Up,
            cte::KeyCode::Down => Self::Down,
            cte::KeyCode::Left => Self::Left,
            cte::KeyCode::Right => Self::Right,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Also used when the terminal cannot tell.
    #[default]
    Press,
    Repeat,
    Release,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0;
        const SHIFT = 1;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

impl Modifiers {
    #[cfg(not(target_arch = "wasm32"))]
    fn from_crossterm(mods: cte::KeyModifiers) -> Self {
        [
            (cte::KeyModifiers::SHIFT, Self::SHIFT),
            (cte::KeyModifiers::ALT, Self::ALT),
            (cte::KeyModifiers::CONTROL, Self::CTRL),
        ]
        .into_iter()
        .filter(|(ct, _)| mods.contains(*ct))
        .fold(Self::NONE, |acc, (_, ours)| acc | ours)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    #[must_use]
    pub const fn new(kind: MouseEventKind, x: u16, y: u16) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Presses, releases, and drags. Moves and wheel events are dropped.
    #[cfg(not(target_arch = "wasm32"))]
    fn from_crossterm(mouse: cte::MouseEvent) -> Option<Self> {
        let button = |b: cte::MouseButton| match b {
            cte::MouseButton::Left => MouseButton::Left,
            cte::MouseButton::Right => MouseButton::Right,
            cte::MouseButton::Middle => MouseButton::Middle,
        };
        let kind = match mouse.kind {
            cte::MouseEventKind::Down(b) => MouseEventKind::Down(button(b)),
            cte::MouseEventKind::Up(b) => MouseEventKind::Up(button(b)),
            cte::MouseEventKind::Drag(b) => MouseEventKind::Drag(button(b)),
            _ => return None,
        };
        Some(
            Self::new(kind, mouse.column, mouse.row)
                .with_modifiers(Modifiers::from_crossterm(mouse.modifiers)),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    Drag(MouseButton),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteEvent {
    pub text: String,
    /// Came through bracketed paste rather than a browser clipboard event.
    pub bracketed: bool,
}

impl PasteEvent {
    #[must_use]
    pub fn new(text: impl Into<String>, bracketed: bool) -> Self {
        Self {
            text: text.into(),
            bracketed,
        }
    }

    #[must_use]
    pub fn bracketed(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }
}
