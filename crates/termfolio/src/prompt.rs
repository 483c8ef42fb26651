#![forbid(unsafe_code)]

//! Single-line edit buffer behind the prompt.
//!
//! The cursor is a byte offset that always sits on a grapheme boundary, so
//! Left/Right and Backspace/Delete move over whole clusters.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineEditor {
    text: String,
    cursor: usize,
}

impl LineEditor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte offset of the cursor.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Display width of the text left of the cursor.
    #[must_use]
    pub fn cursor_width(&self) -> usize {
        self.text[..self.cursor].width()
    }

    /// Replace the whole buffer; the cursor goes to the end.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    /// Empty the buffer (Ctrl+U).
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Return the buffer contents and leave it empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
        self.snap_cursor();
    }

    /// Insert pasted text. Line breaks and other control characters are dropped.
    pub fn insert_str(&mut self, text: &str) {
        let clean: String = text.chars().filter(|c| !c.is_control()).collect();
        self.text.insert_str(self.cursor, &clean);
        self.cursor += clean.len();
        self.snap_cursor();
    }

    /// Delete the grapheme left of the cursor.
    pub fn backspace(&mut self) {
        if let Some(start) = self.prev_boundary() {
            self.text.replace_range(start..self.cursor, "");
            self.cursor = start;
        }
    }

    /// Delete the grapheme under the cursor.
    pub fn delete(&mut self) {
        if let Some(end) = self.next_boundary() {
            self.text.replace_range(self.cursor..end, "");
        }
    }

    pub fn move_left(&mut self) {
        if let Some(start) = self.prev_boundary() {
            self.cursor = start;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(end) = self.next_boundary() {
            self.cursor = end;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Delete back to the start of the previous word (Ctrl+W).
    pub fn delete_word(&mut self) {
        let head = &self.text[..self.cursor];
        let trimmed = head.trim_end();
        let start = trimmed
            .rfind(char::is_whitespace)
            .map_or(0, |i| i + trimmed[i..].chars().next().map_or(1, char::len_utf8));
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor]
            .grapheme_indices(true)
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .graphemes(true)
            .next()
            .map(|g| self.cursor + g.len())
    }

    /// A combining mark typed after a base character joins its cluster; keep
    /// the cursor after the whole cluster.
    fn snap_cursor(&mut self) {
        let mut at = 0;
        for (i, g) in self.text.grapheme_indices(true) {
            if i >= self.cursor {
                break;
            }
            at = i + g.len();
        }
        self.cursor = at.max(self.cursor.min(self.text.len()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn editor(text: &str) -> LineEditor {
        let mut e = LineEditor::new();
        e.set(text);
        e
    }

    #[test]
    fn typing_appends_at_cursor() {
        let mut e = LineEditor::new();
        for ch in "hlp".chars() {
            e.insert_char(ch);
        }
        e.move_left();
        e.move_left();
        e.insert_char('e');
        assert_eq!(e.text(), "help");
        assert_eq!(e.cursor(), 2);
    }

    #[test]
    fn backspace_and_delete_remove_whole_graphemes() {
        let mut e = editor("a📧b");
        e.move_left();
        e.backspace();
        assert_eq!(e.text(), "ab");
        e.move_home();
        e.delete();
        assert_eq!(e.text(), "b");
    }

    #[test]
    fn edges_are_no_ops() {
        let mut e = editor("x");
        e.delete();
        e.move_right();
        assert_eq!((e.text(), e.cursor()), ("x", 1));
        e.move_home();
        e.backspace();
        e.move_left();
        assert_eq!((e.text(), e.cursor()), ("x", 0));
    }

    #[test]
    fn paste_drops_line_breaks() {
        let mut e = LineEditor::new();
        e.insert_str("pro\njects\r\n");
        assert_eq!(e.text(), "projects");
        assert_eq!(e.cursor(), 8);
    }

    #[test]
    fn delete_word_removes_previous_word_and_spaces() {
        let mut e = editor("echo hello  ");
        e.delete_word();
        assert_eq!(e.text(), "echo ");
        e.delete_word();
        assert_eq!(e.text(), "");
    }

    #[test]
    fn take_empties_buffer() {
        let mut e = editor("about");
        assert_eq!(e.take(), "about");
        assert!(e.is_empty());
        assert_eq!(e.cursor(), 0);
    }

    #[test]
    fn cursor_width_counts_cells() {
        let e = editor("📧a");
        assert_eq!(e.cursor_width(), 3);
    }

    #[test]
    fn combining_mark_joins_previous_cluster() {
        let mut e = LineEditor::new();
        e.insert_char('e');
        e.insert_char('\u{301}');
        assert_eq!(e.cursor(), e.text().len());
        e.backspace();
        assert_eq!(e.text(), "");
    }
}
