#![forbid(unsafe_code)]

//! The scrollback of the fake terminal.
//!
//! Lines are append-only and keep their position forever. The only mutation
//! besides appending is growing the text of a line through a [`LineHandle`],
//! which the typewriter uses while a reveal is in flight. Clearing the log
//! bumps its generation so handles taken before the clear stop working.

/// Who produced a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Echo of a submitted command, prompt included.
    Input,
    /// Command result or banner text.
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub kind: LineKind,
    pub text: String,
}

impl OutputLine {
    #[must_use]
    pub fn input(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Input,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn output(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Output,
            text: text.into(),
        }
    }
}

/// Write access to one line of one generation of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineHandle {
    index: usize,
    generation: u64,
}

#[derive(Debug, Default, Clone)]
pub struct OutputLog {
    lines: Vec<OutputLine>,
    generation: u64,
}

impl OutputLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: OutputLine) -> LineHandle {
        self.lines.push(line);
        LineHandle {
            index: self.lines.len() - 1,
            generation: self.generation,
        }
    }

    pub fn push_input(&mut self, text: impl Into<String>) -> LineHandle {
        self.push(OutputLine::input(text))
    }

    pub fn push_output(&mut self, text: impl Into<String>) -> LineHandle {
        self.push(OutputLine::output(text))
    }

    /// Append `text` to the line behind `handle`.
    ///
    /// Returns `false` and leaves the log untouched if the handle predates the
    /// last [`clear`](Self::clear).
    pub fn append(&mut self, handle: LineHandle, text: &str) -> bool {
        if handle.generation != self.generation {
            return false;
        }
        match self.lines.get_mut(handle.index) {
            Some(line) => {
                line.text.push_str(text);
                true
            }
            None => false,
        }
    }

    /// Drop every line and invalidate all outstanding handles.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.generation += 1;
    }

    #[must_use]
    pub fn lines(&self) -> &[OutputLine] {
        &self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Text of every line, for assertions and plain-text dumps.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }
}
