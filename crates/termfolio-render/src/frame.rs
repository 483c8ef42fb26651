#![forbid(unsafe_code)]

//! Frame = the render target for one `view()` call.
//!
//! A terminal portfolio only ever draws rows of styled text, so the frame is
//! line-oriented: a stack of [`Line`]s, each a run of [`Span`]s, plus the
//! page background and an optional cursor position. Rows past `height` are
//! rejected; the caller decides which tail of its content fits.

use unicode_width::UnicodeWidthStr;

/// A 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS hex notation, e.g. `#4ade80`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Visual attributes of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Style {
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
    pub bold: bool,
    pub underline: bool,
}

impl Style {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            bold: false,
            underline: false,
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: Rgb) -> Self {
        self.fg = Some(color);
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: Rgb) -> Self {
        self.bg = Some(color);
        self
    }

    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub const fn underline(mut self) -> Self {
        self.underline = true;
        self
    }
}

/// A run of text sharing one style, optionally a hyperlink target.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Span {
    pub text: String,
    pub style: Style,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub link: Option<String>,
}

impl Span {
    #[must_use]
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
            link: None,
        }
    }

    /// A span whose text is also its hyperlink target.
    #[must_use]
    pub fn link(url: impl Into<String>, style: Style) -> Self {
        let url = url.into();
        Self {
            text: url.clone(),
            style,
            link: Some(url),
        }
    }

    /// Display width in cells.
    #[must_use]
    pub fn width(&self) -> usize {
        self.text.width()
    }
}

/// One visual row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_spans(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    #[must_use]
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            spans: vec![Span::styled(text, style)],
        }
    }

    pub fn push(&mut self, span: Span) {
        self.spans.push(span);
    }

    /// Display width in cells.
    #[must_use]
    pub fn width(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }

    /// Concatenated text without styling.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }
}

/// The target of a single `view()` pass.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Frame {
    width: u16,
    height: u16,
    background: Option<Rgb>,
    lines: Vec<Line>,
    cursor: Option<(u16, u16)>,
}

impl Frame {
    /// An empty frame of `width` x `height` cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            background: None,
            lines: Vec::with_capacity(usize::from(height)),
            cursor: None,
        }
    }

    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Page background used for every row.
    pub fn set_background(&mut self, color: Rgb) {
        self.background = Some(color);
    }

    #[must_use]
    pub const fn background(&self) -> Option<Rgb> {
        self.background
    }

    /// Append a row. Returns `false` (and drops the row) when the frame is full.
    pub fn push_line(&mut self, line: Line) -> bool {
        if self.lines.len() >= usize::from(self.height) {
            return false;
        }
        self.lines.push(line);
        true
    }

    /// Rows still available.
    #[must_use]
    pub fn remaining_rows(&self) -> usize {
        usize::from(self.height).saturating_sub(self.lines.len())
    }

    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Place the visible cursor. Positions outside the frame are ignored.
    pub fn set_cursor(&mut self, x: u16, y: u16) {
        if x < self.width && y < self.height {
            self.cursor = Some((x, y));
        }
    }

    #[must_use]
    pub const fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }

    /// Plain text of every drawn row, for assertions.
    #[must_use]
    pub fn text_rows(&self) -> Vec<String> {
        self.lines.iter().map(Line::plain_text).collect()
    }
}
