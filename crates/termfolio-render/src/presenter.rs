#![forbid(unsafe_code)]

//! Terminal presenter: writes frames to an ANSI terminal.
//!
//! The presenter remembers the rows it drew last and rewrites only the rows
//! that changed. A size or background change forces a full repaint. Links are
//! emitted as OSC 8 hyperlinks so terminals that support them make URLs
//! clickable; others print the URL text unchanged.
//!
//! All output goes through one `Write` handle and is flushed once per frame.

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::queue;
use crossterm::style::{
    Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{Clear, ClearType};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::frame::{Frame, Line, Rgb, Span};

const OSC8_CLOSE: &str = "\x1b]8;;\x1b\\";

/// Diffing presenter over any writer.
#[derive(Debug)]
pub struct Presenter<W: Write> {
    writer: W,
    previous: Option<Snapshot>,
}

#[derive(Debug)]
struct Snapshot {
    size: (u16, u16),
    background: Option<Rgb>,
    rows: Vec<Line>,
}

impl<W: Write> Presenter<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            previous: None,
        }
    }

    /// Forget what is on screen; the next frame repaints everything.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    /// Draw `frame`. Returns the number of rows written.
    pub fn present(&mut self, frame: &Frame) -> io::Result<usize> {
        let size = (frame.width(), frame.height());
        let full = match &self.previous {
            Some(prev) => prev.size != size || prev.background != frame.background(),
            None => true,
        };

        queue!(self.writer, Hide)?;
        if full {
            queue!(self.writer, ResetColor)?;
            if let Some(bg) = frame.background() {
                queue!(self.writer, SetBackgroundColor(color(bg)))?;
            }
            queue!(self.writer, Clear(ClearType::All))?;
        }

        let empty = Line::new();
        let mut written = 0;
        for row in 0..frame.height() {
            let line = frame.lines().get(usize::from(row)).unwrap_or(&empty);
            let unchanged = !full
                && self
                    .previous
                    .as_ref()
                    .and_then(|prev| prev.rows.get(usize::from(row)))
                    .unwrap_or(&empty)
                    == line;
            if unchanged {
                continue;
            }
            self.write_row(row, line, frame)?;
            written += 1;
        }

        match frame.cursor() {
            Some((x, y)) => queue!(self.writer, MoveTo(x, y), Show)?,
            None => queue!(self.writer, Hide)?,
        }
        self.writer.flush()?;

        self.previous = Some(Snapshot {
            size,
            background: frame.background(),
            rows: frame.lines().to_vec(),
        });
        Ok(written)
    }

    /// Borrow the underlying writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn write_row(&mut self, row: u16, line: &Line, frame: &Frame) -> io::Result<()> {
        queue!(self.writer, MoveTo(0, row), SetAttribute(Attribute::Reset))?;
        let page_bg = frame.background();
        let mut remaining = usize::from(frame.width());
        for span in &line.spans {
            if remaining == 0 {
                break;
            }
            let text = clip(&span.text, remaining);
            remaining -= text.width();
            self.write_span(span, text, page_bg)?;
        }
        queue!(self.writer, SetAttribute(Attribute::Reset), ResetColor)?;
        if let Some(bg) = page_bg {
            queue!(self.writer, SetBackgroundColor(color(bg)))?;
        }
        queue!(self.writer, Clear(ClearType::UntilNewLine))
    }

    fn write_span(&mut self, span: &Span, text: &str, page_bg: Option<Rgb>) -> io::Result<()> {
        match span.style.fg {
            Some(fg) => queue!(self.writer, SetForegroundColor(color(fg)))?,
            None => queue!(self.writer, SetForegroundColor(Color::Reset))?,
        }
        match span.style.bg.or(page_bg) {
            Some(bg) => queue!(self.writer, SetBackgroundColor(color(bg)))?,
            None => queue!(self.writer, SetBackgroundColor(Color::Reset))?,
        }
        if span.style.bold {
            queue!(self.writer, SetAttribute(Attribute::Bold))?;
        }
        if span.style.underline {
            queue!(self.writer, SetAttribute(Attribute::Underlined))?;
        }
        match &span.link {
            Some(url) if is_safe_link(url) => {
                queue!(self.writer, Print(format!("\x1b]8;;{url}\x1b\\")), Print(text))?;
                queue!(self.writer, Print(OSC8_CLOSE))?;
            }
            _ => queue!(self.writer, Print(text))?,
        }
        queue!(self.writer, SetAttribute(Attribute::Reset))
    }
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Longest prefix of `text` that fits in `max` cells, on a grapheme boundary.
fn clip(text: &str, max: usize) -> &str {
    let mut used = 0;
    for (idx, grapheme) in text.grapheme_indices(true) {
        let w = grapheme.width();
        if used + w > max {
            return &text[..idx];
        }
        used += w;
    }
    text
}

/// URLs carrying control characters would break out of the OSC sequence.
fn is_safe_link(url: &str) -> bool {
    !url.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Style;

    fn output(presenter: &Presenter<Vec<u8>>) -> String {
        String::from_utf8_lossy(presenter.writer()).into_owned()
    }

    fn frame_with(rows: &[&str]) -> Frame {
        let mut frame = Frame::new(20, 4);
        for row in rows {
            frame.push_line(Line::styled(*row, Style::new()));
        }
        frame
    }

    #[test]
    fn first_present_repaints_every_row() {
        let mut presenter = Presenter::new(Vec::new());
        let written = presenter.present(&frame_with(&["hello"])).expect("present");
        assert_eq!(written, 4);
        assert!(output(&presenter).contains("hello"));
    }

    #[test]
    fn identical_frame_writes_no_rows() {
        let mut presenter = Presenter::new(Vec::new());
        let frame = frame_with(&["hello", "world"]);
        presenter.present(&frame).expect("present");
        assert_eq!(presenter.present(&frame).expect("present"), 0);
    }

    #[test]
    fn only_changed_rows_are_rewritten() {
        let mut presenter = Presenter::new(Vec::new());
        presenter.present(&frame_with(&["a", "b"])).expect("present");
        let written = presenter.present(&frame_with(&["a", "bc"])).expect("present");
        assert_eq!(written, 1);
    }

    #[test]
    fn background_change_forces_full_repaint() {
        let mut presenter = Presenter::new(Vec::new());
        presenter.present(&frame_with(&["a"])).expect("present");
        let mut frame = frame_with(&["a"]);
        frame.set_background(Rgb::new(1, 2, 3));
        assert_eq!(presenter.present(&frame).expect("present"), 4);
    }

    #[test]
    fn links_are_wrapped_in_osc8() {
        let mut presenter = Presenter::new(Vec::new());
        let mut frame = Frame::new(40, 1);
        frame.push_line(Line::from_spans(vec![Span::link(
            "https://example.com",
            Style::new(),
        )]));
        presenter.present(&frame).expect("present");
        let out = output(&presenter);
        assert!(out.contains("\x1b]8;;https://example.com\x1b\\https://example.com"));
        assert!(out.contains(OSC8_CLOSE));
    }

    #[test]
    fn clip_respects_wide_graphemes() {
        assert_eq!(clip("ab📧c", 3), "ab");
        assert_eq!(clip("ab📧c", 4), "ab📧");
        assert_eq!(clip("abc", 10), "abc");
    }

    #[test]
    fn control_characters_disable_hyperlink() {
        assert!(is_safe_link("https://a.io"));
        assert!(!is_safe_link("https://a.io\x1b]0;x"));
    }
}
