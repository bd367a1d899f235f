//! Color themes.
//!
//! The theme is picked once at startup from `COLORFGBG` and handed to every
//! view. Terminals that do not set it get the dark theme.

use ratatui::style::Color;

/// Palette used by the views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Spinner, key hints and the download gauge.
    pub accent: Color,
    /// Highlighted picker row.
    pub selected: Color,
    pub border: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    /// Secondary text and rows that cannot be selected.
    pub muted: Color,
    pub text: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    #[must_use]
    pub fn dark() -> Self {
        Self {
            accent: Color::Cyan,
            selected: Color::LightBlue,
            border: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::DarkGray,
            text: Color::White,
        }
    }

    #[must_use]
    pub fn light() -> Self {
        Self {
            accent: Color::Blue,
            selected: Color::Magenta,
            border: Color::Gray,
            success: Color::Rgb(0, 128, 0),
            warning: Color::Rgb(204, 153, 0),
            error: Color::Rgb(139, 0, 0),
            muted: Color::Gray,
            text: Color::Black,
        }
    }

    /// Picks the theme matching the terminal background.
    #[must_use]
    pub fn detect() -> Self {
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|value| Self::from_colorfgbg(&value))
            .unwrap_or_else(Self::dark)
    }

    /// Parses `COLORFGBG` ("fg;bg" or "fg;extra;bg"). The background is the
    /// last field; ANSI 7 and 8-15 are light backgrounds.
    fn from_colorfgbg(value: &str) -> Option<Self> {
        let mut fields = value.split(';');
        fields.next()?;
        let background: u8 = fields.next_back()?.trim().parse().ok()?;
        if background == 7 || background >= 8 {
            Some(Self::light())
        } else {
            Some(Self::dark())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_background_gives_dark_theme() {
        assert_eq!(Theme::from_colorfgbg("15;0"), Some(Theme::dark()));
        assert_eq!(Theme::from_colorfgbg("7;4"), Some(Theme::dark()));
        assert_eq!(Theme::from_colorfgbg("15;default;0"), Some(Theme::dark()));
    }

    #[test]
    fn light_background_gives_light_theme() {
        assert_eq!(Theme::from_colorfgbg("0;7"), Some(Theme::light()));
        assert_eq!(Theme::from_colorfgbg("0;15"), Some(Theme::light()));
    }

    #[test]
    fn unparseable_values_are_ignored() {
        assert_eq!(Theme::from_colorfgbg(""), None);
        assert_eq!(Theme::from_colorfgbg("15"), None);
        assert_eq!(Theme::from_colorfgbg("default;default"), None);
    }

    #[test]
    fn default_is_dark() {
        assert_eq!(Theme::default(), Theme::dark());
    }
}
