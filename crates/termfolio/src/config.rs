#![forbid(unsafe_code)]

//! Application configuration.
//!
//! Defaults reproduce the stock portfolio. The CLI layer (`cli.rs`) fills
//! this in from flags and `TERMFOLIO_*` environment variables; tests and
//! embedders build it directly.

use std::path::PathBuf;
use std::time::Duration;

use crate::content::{ContentError, ContentTable};
use crate::pointer::DEFAULT_DRAG_THRESHOLD;
use crate::theme::Theme;

pub const DEFAULT_PROMPT: &str = "andi@terminal:~$";
pub const DEFAULT_BOOT_PACE: Duration = Duration::from_millis(10);
pub const DEFAULT_REVEAL_PACE: Duration = Duration::from_millis(15);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("{which} pace must be at least 1ms")]
    ZeroPace { which: &'static str },
    #[error("prompt must not contain line breaks")]
    MultilinePrompt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalConfig {
    /// Text shown before the edit buffer and in command echoes.
    pub prompt: String,
    /// Starting theme.
    pub theme: Theme,
    /// Per-grapheme interval for the boot banner.
    pub boot_pace: Duration,
    /// Per-grapheme interval for command output.
    pub reveal_pace: Duration,
    /// When false, output appears at once.
    pub animate: bool,
    pub drag_threshold: u16,
    /// JSON object of extra or replacement literal commands.
    pub content_file: Option<PathBuf>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_owned(),
            theme: Theme::Dark,
            boot_pace: DEFAULT_BOOT_PACE,
            reveal_pace: DEFAULT_REVEAL_PACE,
            animate: true,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            content_file: None,
        }
    }
}

impl TerminalConfig {
    /// Check the values that would make the terminal misbehave.
    ///
    /// # Errors
    ///
    /// Zero paces (only when animating) and multi-line prompts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.animate {
            if self.boot_pace.is_zero() {
                return Err(ConfigError::ZeroPace { which: "boot" });
            }
            if self.reveal_pace.is_zero() {
                return Err(ConfigError::ZeroPace { which: "reveal" });
            }
        }
        if self.prompt.contains(['\n', '\r']) {
            return Err(ConfigError::MultilinePrompt);
        }
        Ok(())
    }

    /// The portfolio table plus anything from [`content_file`](Self::content_file).
    ///
    /// # Errors
    ///
    /// Unreadable or malformed content files.
    pub fn content_table(&self) -> Result<ContentTable, ConfigError> {
        let mut table = ContentTable::portfolio();
        if let Some(path) = &self.content_file {
            table.merge_file(path)?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn defaults_match_the_stock_terminal() {
        let config = TerminalConfig::default();
        assert_eq!(config.prompt, "andi@terminal:~$");
        assert_eq!(config.boot_pace, Duration::from_millis(10));
        assert_eq!(config.reveal_pace, Duration::from_millis(15));
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.drag_threshold, 3);
        assert!(config.animate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_pace_is_only_an_error_when_animating() {
        let mut config = TerminalConfig {
            reveal_pace: Duration::ZERO,
            ..TerminalConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroPace { which: "reveal" })
        ));
        config.animate = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn multiline_prompt_is_rejected() {
        let config = TerminalConfig {
            prompt: "a\nb".into(),
            ..TerminalConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MultilinePrompt)));
    }

    #[test]
    fn content_file_is_merged() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"{{"blog": "soon"}}"#).expect("write");
        let config = TerminalConfig {
            content_file: Some(file.path().to_owned()),
            ..TerminalConfig::default()
        };
        let table = config.content_table().expect("loads");
        assert!(table.get("blog").is_some());
        assert!(table.get("help").is_some());
    }
}
