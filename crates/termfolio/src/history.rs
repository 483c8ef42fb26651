#![forbid(unsafe_code)]

//! Command history with a recall cursor.
//!
//! The cursor is either an index into the entries or `None`, meaning "past
//! the newest entry" (the state after every submit). Recall never reads out
//! of range.

/// What a downward recall did to the edit buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recall<'a> {
    /// Show this entry.
    Entry(&'a str),
    /// Ran off the newest entry; the buffer should be emptied.
    Cleared,
}

#[derive(Debug, Default, Clone)]
pub struct History {
    entries: Vec<String>,
    cursor: Option<usize>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted command and park the cursor past the end.
    pub fn push(&mut self, command: impl Into<String>) {
        self.entries.push(command.into());
        self.cursor = None;
    }

    /// ArrowUp. From past-the-end go to the newest entry, otherwise one
    /// older. `None` when there is nothing older (the buffer stays as is).
    pub fn recall_previous(&mut self) -> Option<&str> {
        let target = match self.cursor {
            None => self.entries.len().checked_sub(1)?,
            Some(0) => return None,
            Some(i) => i - 1,
        };
        self.cursor = Some(target);
        self.entries.get(target).map(String::as_str)
    }

    /// ArrowDown. One newer entry, or past the end with a cleared buffer.
    pub fn recall_next(&mut self) -> Recall<'_> {
        match self.cursor {
            Some(i) if i + 1 < self.entries.len() => {
                self.cursor = Some(i + 1);
                Recall::Entry(&self.entries[i + 1])
            }
            _ => {
                self.cursor = None;
                Recall::Cleared
            }
        }
    }

    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
