#![forbid(unsafe_code)]

//! Command-line options for the native binary.
//!
//! Every flag can also come from a `TERMFOLIO_*` environment variable.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use termfolio_core::logging::{LogOptions, LoggingError, init_file_logging};
use termfolio_runtime::{Program, ProgramConfig};

use crate::app::TerminalApp;
use crate::config::{ConfigError, DEFAULT_PROMPT, TerminalConfig};
use crate::theme::Theme;

#[derive(Debug, Parser)]
#[command(name = "termfolio", version, about, long_about = None)]
pub struct Cli {
    /// Starting color theme (`dark` or `light`).
    #[arg(long, default_value_t = Theme::Dark, env = "TERMFOLIO_THEME")]
    pub theme: Theme,

    /// Prompt shown before the input buffer.
    #[arg(long, default_value = DEFAULT_PROMPT, env = "TERMFOLIO_PROMPT")]
    pub prompt: String,

    /// JSON object of extra or replacement commands (`{"name": "text"}`).
    #[arg(long, value_name = "FILE", env = "TERMFOLIO_CONTENT")]
    pub content: Option<PathBuf>,

    /// Milliseconds per character for the boot banner.
    #[arg(long, default_value_t = 10, env = "TERMFOLIO_BOOT_MS")]
    pub boot_ms: u64,

    /// Milliseconds per character for command output.
    #[arg(long, default_value_t = 15, env = "TERMFOLIO_REVEAL_MS")]
    pub reveal_ms: u64,

    /// Print output at once instead of typing it out.
    #[arg(long, env = "TERMFOLIO_NO_ANIMATION")]
    pub no_animation: bool,

    /// Do not capture the mouse (keeps native text selection).
    #[arg(long, env = "TERMFOLIO_NO_MOUSE")]
    pub no_mouse: bool,

    /// Draw on the main screen instead of the alternate screen.
    #[arg(long, env = "TERMFOLIO_INLINE")]
    pub inline: bool,

    /// Write tracing output to this file. The screen is never logged to.
    #[arg(long, value_name = "FILE", env = "TERMFOLIO_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log as JSON lines instead of plain text.
    #[arg(long, env = "TERMFOLIO_LOG_JSON")]
    pub log_json: bool,

    /// Quit on its own after this many milliseconds.
    #[arg(long, value_name = "MS", env = "TERMFOLIO_EXIT_AFTER_MS")]
    pub exit_after_ms: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
}

impl Cli {
    #[must_use]
    pub fn terminal_config(&self) -> TerminalConfig {
        TerminalConfig {
            prompt: self.prompt.clone(),
            theme: self.theme,
            boot_pace: Duration::from_millis(self.boot_ms),
            reveal_pace: Duration::from_millis(self.reveal_ms),
            animate: !self.no_animation,
            content_file: self.content.clone(),
            ..TerminalConfig::default()
        }
    }

    #[must_use]
    pub fn program_config(&self) -> ProgramConfig {
        ProgramConfig {
            alternate_screen: !self.inline,
            mouse: !self.no_mouse,
            exit_after: self.exit_after_ms.map(Duration::from_millis),
            ..ProgramConfig::default()
        }
    }

    #[must_use]
    pub fn log_options(&self) -> Option<LogOptions> {
        self.log_file
            .as_ref()
            .map(|path| LogOptions::new(path.clone()).json(self.log_json))
    }
}

/// Set up logging, build the app, and run it until the user quits.
///
/// # Errors
///
/// Bad configuration, logging setup failures, and terminal I/O errors.
pub fn run(cli: &Cli) -> Result<(), RunError> {
    if let Some(options) = cli.log_options() {
        init_file_logging(&options)?;
    }
    let app = TerminalApp::new(cli.terminal_config())?;
    let app = Program::new(app, cli.program_config())?.run()?;
    tracing::info!(
        target: "termfolio.app",
        commands = app.controller().history().len(),
        "session ended"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_produce_the_stock_config() {
        let cli = Cli::try_parse_from(["termfolio"]).expect("parses");
        assert_eq!(cli.terminal_config(), TerminalConfig::default());
        let program = cli.program_config();
        assert!(program.alternate_screen);
        assert!(program.mouse);
        assert_eq!(program.exit_after, None);
        assert!(cli.log_options().is_none());
    }

    #[test]
    fn flags_map_onto_configs() {
        let cli = Cli::try_parse_from([
            "termfolio",
            "--theme",
            "light",
            "--prompt",
            "guest$",
            "--reveal-ms",
            "1",
            "--no-animation",
            "--inline",
            "--no-mouse",
            "--exit-after-ms",
            "250",
            "--log-file",
            "/tmp/termfolio.log",
            "--log-json",
        ])
        .expect("parses");

        let config = cli.terminal_config();
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.prompt, "guest$");
        assert_eq!(config.reveal_pace, Duration::from_millis(1));
        assert!(!config.animate);

        let program = cli.program_config();
        assert!(!program.alternate_screen);
        assert!(!program.mouse);
        assert_eq!(program.exit_after, Some(Duration::from_millis(250)));

        let log = cli.log_options().expect("log file set");
        assert!(log.json);
    }

    #[test]
    fn unknown_theme_is_rejected() {
        assert!(Cli::try_parse_from(["termfolio", "--theme", "solarized"]).is_err());
    }

    #[test]
    fn theme_flag_uses_the_theme_parser() {
        let cli = Cli::try_parse_from(["termfolio", "--theme", "Light"]).expect("parses");
        assert_eq!(cli.theme, Theme::Light);
        let cli = Cli::try_parse_from(["termfolio", "--theme", "DARK"]).expect("parses");
        assert_eq!(cli.terminal_config().theme, Theme::Dark);
    }
}
