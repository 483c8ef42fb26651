#![forbid(unsafe_code)]

//! The command table.
//!
//! Commands are matched on the whole trimmed input; there is no argument
//! parsing. Most entries are literal text. Effectful entries get mutable
//! access to the session [`Preferences`] and return their confirmation text.
//! `clear` is handled by the controller and cannot be defined here.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::theme::Theme;

/// The command that wipes the screen instead of printing.
pub const CLEAR_COMMAND: &str = "clear";

/// Lines revealed once at startup.
pub const BOOT_LINES: [&str; 4] = [
    "Initializing system...",
    "Loading modules...",
    "Welcome to Andi's Terminal Portfolio!",
    "Type 'help' to get started.",
];

const HELP: &str = "Available commands:
  about      Show information about me
  projects   List my projects
  contact    How to reach me
  resume     View my resume
  theme      Toggle between dark and light mode
  clear      Clear the screen
  help       Show this help message";

const ABOUT: &str = "Hi, I'm Andi Chen 👋 I'm a recent graduate at Stony Brook University with a Computer Science degree. I am passionate about Full Stack development, ML, and cloud systems.";

const PROJECTS: &str = "Some of my projects:
  - RF Coil Array for 7T MRI
  - Cloud-Native Image Classifier (AWS + PyTorch)
  - Claims Management System (Django + HTMX)
  - Friend Recommendation Algorithm";

const CONTACT: &str = "📧 andichen0111@gmail.com
🔗 LinkedIn: https://www.linkedin.com/in/andi-chen-9b0414238/
💻 GitHub: https://github.com/man9opie";

const RESUME: &str = "Opening resume... (simulated)
You can view it at: https://andichen.me/resume.pdf";

/// Session state commands are allowed to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    pub theme: Theme,
}

/// One row of the table.
#[derive(Debug, Clone)]
pub enum Entry {
    Literal(String),
    Effectful(fn(&mut Preferences) -> String),
}

impl Entry {
    /// Produce the command's output text.
    pub fn run(&self, prefs: &mut Preferences) -> String {
        match self {
            Self::Literal(text) => text.clone(),
            Self::Effectful(effect) => effect(prefs),
        }
    }
}

/// Flip the theme and confirm.
pub fn toggle_theme(prefs: &mut Preferences) -> String {
    prefs.theme = prefs.theme.toggled();
    format!("Theme switched to {} mode.", prefs.theme)
}

/// Result of Tab completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Unique(String),
    /// Several candidates, sorted.
    Ambiguous(Vec<String>),
    NoMatch,
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read content file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("content file {path} is not a JSON object of strings")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("command name {0:?} is reserved")]
    Reserved(String),
    #[error("command name {0:?} must be non-empty and contain no whitespace")]
    InvalidName(String),
}

#[derive(Debug, Clone)]
pub struct ContentTable {
    entries: BTreeMap<String, Entry>,
}

impl Default for ContentTable {
    fn default() -> Self {
        Self::portfolio()
    }
}

impl ContentTable {
    /// A table with no commands.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The stock portfolio commands.
    #[must_use]
    pub fn portfolio() -> Self {
        let mut entries = BTreeMap::new();
        for (name, text) in [
            ("help", HELP),
            ("about", ABOUT),
            ("projects", PROJECTS),
            ("contact", CONTACT),
            ("resume", RESUME),
        ] {
            entries.insert(name.to_owned(), Entry::Literal(text.to_owned()));
        }
        entries.insert("theme".to_owned(), Entry::Effectful(toggle_theme));
        Self { entries }
    }

    /// Add or replace a command.
    ///
    /// # Errors
    ///
    /// Rejects `clear` and names that could never be typed as one command.
    pub fn insert(&mut self, name: &str, entry: Entry) -> Result<(), ContentError> {
        validate_name(name)?;
        self.entries.insert(name.to_owned(), entry);
        Ok(())
    }

    /// Merge literal entries from a JSON object (`{"name": "text"}`).
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert); nothing is merged if any name is bad.
    pub fn merge_literals(&mut self, literals: BTreeMap<String, String>) -> Result<(), ContentError> {
        for name in literals.keys() {
            validate_name(name)?;
        }
        for (name, text) in literals {
            self.entries.insert(name, Entry::Literal(text));
        }
        Ok(())
    }

    /// Read a JSON content file and merge it into this table.
    ///
    /// # Errors
    ///
    /// I/O and parse failures name the file.
    pub fn merge_file(&mut self, path: &Path) -> Result<(), ContentError> {
        let raw = fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.to_owned(),
            source,
        })?;
        let literals: BTreeMap<String, String> =
            serde_json::from_str(&raw).map_err(|source| ContentError::Parse {
                path: path.to_owned(),
                source,
            })?;
        let count = literals.len();
        self.merge_literals(literals)?;
        tracing::info!(target: "termfolio.content", path = %path.display(), count, "content overrides loaded");
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// Run `name` against `prefs`. `None` if there is no such command.
    pub fn run(&self, name: &str, prefs: &mut Preferences) -> Option<String> {
        self.get(name).map(|entry| entry.run(prefs))
    }

    /// Table command names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Complete `prefix` against every command name and `clear`.
    #[must_use]
    pub fn complete(&self, prefix: &str) -> Completion {
        let mut matches: Vec<String> = self
            .names()
            .chain(std::iter::once(CLEAR_COMMAND))
            .filter(|name| name.starts_with(prefix))
            .map(str::to_owned)
            .collect();
        matches.sort();
        matches.dedup();
        match matches.len() {
            0 => Completion::NoMatch,
            1 => Completion::Unique(matches.remove(0)),
            _ => Completion::Ambiguous(matches),
        }
    }
}

fn validate_name(name: &str) -> Result<(), ContentError> {
    if name == CLEAR_COMMAND {
        return Err(ContentError::Reserved(name.to_owned()));
    }
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(ContentError::InvalidName(name.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::io::Write as _;

    #[test]
    fn portfolio_has_the_stock_commands() {
        let table = ContentTable::portfolio();
        let names: Vec<_> = table.names().collect();
        assert_eq!(names, vec!["about", "contact", "help", "projects", "resume", "theme"]);
    }

    #[test]
    fn literal_entries_return_their_text() {
        let table = ContentTable::portfolio();
        let mut prefs = Preferences::default();
        let resume = table.run("resume", &mut prefs).expect("resume exists");
        assert_eq!(
            resume,
            "Opening resume... (simulated)\nYou can view it at: https://andichen.me/resume.pdf"
        );
        assert_eq!(table.run("ls", &mut prefs), None);
    }

    #[test]
    fn theme_entry_flips_preferences() {
        let table = ContentTable::portfolio();
        let mut prefs = Preferences::default();
        assert_eq!(
            table.run("theme", &mut prefs).as_deref(),
            Some("Theme switched to light mode.")
        );
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(
            table.run("theme", &mut prefs).as_deref(),
            Some("Theme switched to dark mode.")
        );
        assert_eq!(prefs.theme, Theme::Dark);
    }

    #[test]
    fn matching_is_exact() {
        let table = ContentTable::portfolio();
        assert!(table.get("Help").is_none());
        assert!(table.get("help me").is_none());
    }

    #[test]
    fn completion_unique_ambiguous_and_none() {
        let table = ContentTable::portfolio();
        assert_eq!(table.complete("pro"), Completion::Unique("projects".into()));
        assert_eq!(table.complete("cl"), Completion::Unique("clear".into()));
        assert_eq!(
            table.complete("c"),
            Completion::Ambiguous(vec!["clear".into(), "contact".into()])
        );
        assert_eq!(table.complete("xyz"), Completion::NoMatch);
    }

    #[test]
    fn clear_is_reserved() {
        let mut table = ContentTable::empty();
        assert!(matches!(
            table.insert("clear", Entry::Literal("x".into())),
            Err(ContentError::Reserved(_))
        ));
        assert!(matches!(
            table.insert("two words", Entry::Literal("x".into())),
            Err(ContentError::InvalidName(_))
        ));
    }

    #[test]
    fn file_overrides_and_extends() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"{{"about": "Just me.", "blog": "https://example.com/blog"}}"#).expect("write");

        let mut table = ContentTable::portfolio();
        table.merge_file(file.path()).expect("valid file");
        let mut prefs = Preferences::default();
        assert_eq!(table.run("about", &mut prefs).as_deref(), Some("Just me."));
        assert_eq!(
            table.run("blog", &mut prefs).as_deref(),
            Some("https://example.com/blog")
        );
        assert!(table.get("theme").is_some());
    }

    #[test]
    fn bad_file_is_rejected_whole() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"{{"a": "ok", "clear": "nope"}}"#).expect("write");

        let mut table = ContentTable::empty();
        assert!(matches!(
            table.merge_file(file.path()),
            Err(ContentError::Reserved(_))
        ));
        assert!(table.get("a").is_none());
    }

    #[test]
    fn non_object_json_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, "[1, 2]").expect("write");
        let err = ContentTable::empty().merge_file(file.path()).unwrap_err();
        assert!(matches!(err, ContentError::Parse { .. }));
    }

    proptest! {
        #[test]
        fn completion_agrees_with_prefix_matches(prefix in "[a-z]{0,4}") {
            let table = ContentTable::portfolio();
            let expected: Vec<&str> = table
                .names()
                .chain(std::iter::once(CLEAR_COMMAND))
                .filter(|name| name.starts_with(prefix.as_str()))
                .collect();
            match table.complete(&prefix) {
                Completion::Unique(name) => {
                    prop_assert_eq!(expected, vec![name.as_str()]);
                }
                Completion::Ambiguous(names) => {
                    prop_assert!(names.len() > 1);
                    prop_assert!(names.windows(2).all(|w| w[0] < w[1]));
                    prop_assert_eq!(names.len(), expected.len());
                }
                Completion::NoMatch => prop_assert!(expected.is_empty()),
            }
        }
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ContentTable::empty()
            .merge_file(Path::new("/nonexistent/termfolio.json"))
            .unwrap_err();
        assert!(matches!(err, ContentError::Read { .. }));
    }
}
