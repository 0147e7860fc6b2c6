//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values. The
//! `ThemeVariant` enum selects between Dark and Light palettes. Source badges
//! carry their own colors from config, parsed with [`parse_hex_color`].

use crate::feed::Source;
use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Build the `ColorPalette` for this variant.
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    // -- List rows --
    pub title: Style,
    pub description: Style,
    /// Title of the selected row; combined with the source's badge colors.
    pub title_selected: Style,
    /// Rows other than the selected one while the user is navigating.
    pub dimmed: Style,
    /// Badge used when the source has no colors configured.
    pub badge_fallback: Style,

    // -- Bottom line --
    pub help: Style,
    pub filter_editing: Style,
    pub filter_active: Style,
    pub status_message: Style,
    pub empty_list: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            title: Style::default(),
            description: Style::default(),
            title_selected: Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            dimmed: Style::default()
                .fg(Color::Rgb(190, 190, 190))
                .add_modifier(Modifier::DIM),
            badge_fallback: Style::default().bg(Color::DarkGray).fg(Color::White),

            help: Style::default()
                .fg(Color::Rgb(150, 150, 150))
                .add_modifier(Modifier::DIM),
            filter_editing: Style::default(),
            filter_active: Style::default().fg(Color::LightGreen),
            status_message: Style::default().bg(Color::DarkGray).fg(Color::White),
            empty_list: Style::default().fg(Color::DarkGray),
        }
    }

    /// Light palette, for light terminal backgrounds.
    fn light() -> Self {
        Self {
            title: Style::default().fg(Color::Black),
            description: Style::default().fg(Color::Black),
            title_selected: Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            dimmed: Style::default().fg(Color::Gray),
            badge_fallback: Style::default().bg(Color::Gray).fg(Color::Black),

            help: Style::default().fg(Color::DarkGray),
            filter_editing: Style::default().fg(Color::Black),
            filter_active: Style::default().fg(Color::Green),
            status_message: Style::default().bg(Color::White).fg(Color::Black),
            empty_list: Style::default().fg(Color::DarkGray),
        }
    }

    /// Badge style for a source: its configured colors, bold, or the
    /// fallback when neither color parses.
    pub fn badge(&self, source: &Source) -> Style {
        let fg = parse_hex_color(&source.fg);
        let bg = parse_hex_color(&source.bg);
        if fg.is_none() && bg.is_none() {
            return self.badge_fallback.add_modifier(Modifier::BOLD);
        }

        let mut style = Style::default().add_modifier(Modifier::BOLD);
        if let Some(fg) = fg {
            style = style.fg(fg);
        }
        if let Some(bg) = bg {
            style = style.bg(bg);
        }
        style
    }
}

/// Parses `#rrggbb` into an RGB color. Anything else yields `None` and the
/// terminal default is used.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_from_str_name() {
        assert_eq!(
            ThemeVariant::from_str_name("dark"),
            Some(ThemeVariant::Dark)
        );
        assert_eq!(
            ThemeVariant::from_str_name("Light"),
            Some(ThemeVariant::Light)
        );
        assert_eq!(ThemeVariant::from_str_name("neon"), None);
    }

    #[test]
    fn light_palette_differs_from_dark() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.title_selected, light.title_selected);
        assert_ne!(dark, light);
    }

    #[test]
    fn parse_hex_color_valid() {
        assert_eq!(parse_hex_color("#930000"), Some(Color::Rgb(0x93, 0, 0)));
        assert_eq!(
            parse_hex_color("#E4e6E9"),
            Some(Color::Rgb(0xe4, 0xe6, 0xe9))
        );
    }

    #[test]
    fn parse_hex_color_invalid() {
        assert_eq!(parse_hex_color(""), None);
        assert_eq!(parse_hex_color("930000"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn badge_uses_source_colors() {
        let palette = ThemeVariant::Dark.palette();
        let source = Source::new("BBC", "http://x").with_colors("#e4e6e9", "#930000");
        let style = palette.badge(&source);
        assert_eq!(style.fg, Some(Color::Rgb(0xe4, 0xe6, 0xe9)));
        assert_eq!(style.bg, Some(Color::Rgb(0x93, 0, 0)));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn badge_falls_back_without_colors() {
        let palette = ThemeVariant::Dark.palette();
        let style = palette.badge(&Source::new("Plain", "http://x"));
        assert_eq!(style.bg, palette.badge_fallback.bg);
    }

    #[test]
    fn badge_with_only_background() {
        let palette = ThemeVariant::Light.palette();
        let source = Source::new("Half", "http://x").with_colors("", "#ff581a");
        let style = palette.badge(&source);
        assert_eq!(style.fg, None);
        assert_eq!(style.bg, Some(Color::Rgb(0xff, 0x58, 0x1a)));
    }
}
