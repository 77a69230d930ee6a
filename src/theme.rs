//! Theme colors, with optional hex overrides from the `[theme]` config table

use ratatui::style::Color;

use crate::config::ThemeConfig;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,           // Focused button, active borders
    pub success: Color,          // Balances, confirmations
    pub warning: Color,          // Status messages
    pub danger: Color,           // Errors
    pub text: Color,             // Primary text
    pub text_dim: Color,         // Hints, separators
    pub bg_selected: Color,      // Focused row background
    pub inactive: Color,         // Inactive borders
    pub header: Color,           // Table headers
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired
        Self {
            accent: Color::Rgb(250, 179, 135),
            success: Color::Rgb(166, 218, 149),
            warning: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(243, 139, 168),
        }
    }
}

impl Theme {
    /// Defaults with any valid hex overrides applied
    pub fn from_config(config: &ThemeConfig) -> Self {
        let mut theme = Self::default();

        let overrides = [
            (&config.accent, &mut theme.accent),
            (&config.success, &mut theme.success),
            (&config.danger, &mut theme.danger),
            (&config.text, &mut theme.text),
        ];
        for (value, slot) in overrides {
            let Some(value) = value else { continue };
            match Self::parse_hex_color(value) {
                Some(color) => *slot = color,
                None => tracing::warn!("Ignoring invalid theme color: {}", value),
            }
        }

        theme
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
