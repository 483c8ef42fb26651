#![forbid(unsafe_code)]

//! Dark and light color schemes.

use std::fmt;
use std::str::FromStr;

use termfolio_render::{Rgb, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Colors used by the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    /// Command results and banner text.
    pub output: Rgb,
    /// Prompt and echoed commands.
    pub input: Rgb,
    /// Text being typed.
    pub typed: Rgb,
    pub link: Rgb,
}

// Tailwind gray-900 / green-400 / teal-400 / blue-400.
const DARK: Palette = Palette {
    background: Rgb::new(0x11, 0x18, 0x27),
    output: Rgb::new(0x4a, 0xde, 0x80),
    input: Rgb::new(0x2d, 0xd4, 0xbf),
    typed: Rgb::new(0x4a, 0xde, 0x80),
    link: Rgb::new(0x60, 0xa5, 0xfa),
};

// Tailwind gray-100 / gray-900 / teal-600 / blue-600.
const LIGHT: Palette = Palette {
    background: Rgb::new(0xf3, 0xf4, 0xf6),
    output: Rgb::new(0x11, 0x18, 0x27),
    input: Rgb::new(0x0d, 0x94, 0x88),
    typed: Rgb::new(0x11, 0x18, 0x27),
    link: Rgb::new(0x25, 0x63, 0xeb),
};

impl Theme {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    #[must_use]
    pub const fn palette(self) -> Palette {
        match self {
            Self::Dark => DARK,
            Self::Light => LIGHT,
        }
    }
}

impl Palette {
    #[must_use]
    pub const fn output_style(&self) -> Style {
        Style::new().fg(self.output)
    }

    #[must_use]
    pub const fn input_style(&self) -> Style {
        Style::new().fg(self.input)
    }

    #[must_use]
    pub const fn typed_style(&self) -> Style {
        Style::new().fg(self.typed)
    }

    #[must_use]
    pub const fn link_style(&self) -> Style {
        Style::new().fg(self.link).underline()
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown theme {0:?} (expected \"dark\" or \"light\")")]
pub struct ParseThemeError(String);

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            _ => Err(ParseThemeError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_is_identity() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn palettes_match_the_page_colors() {
        assert_eq!(Theme::Dark.palette().background.to_hex(), "#111827");
        assert_eq!(Theme::Dark.palette().output.to_hex(), "#4ade80");
        assert_eq!(Theme::Dark.palette().input.to_hex(), "#2dd4bf");
        assert_eq!(Theme::Light.palette().background.to_hex(), "#f3f4f6");
        assert_eq!(Theme::Light.palette().output.to_hex(), "#111827");
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Light".parse::<Theme>(), Ok(Theme::Light));
        assert_eq!(" dark ".parse::<Theme>(), Ok(Theme::Dark));
        assert!("solarized".parse::<Theme>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for theme in [Theme::Dark, Theme::Light] {
            assert_eq!(theme.to_string().parse::<Theme>(), Ok(theme));
        }
    }
}
