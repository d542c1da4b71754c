//! Color palette and style constants.

use ratatui::style::{Color, Modifier, Style};

use podcast_proto::config::{Config, Rgb};

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_BG: Color = Color::Rgb(18, 18, 18);
pub const C_ACCENT: Color = Color::Rgb(255, 95, 95);
pub const C_PLAYING: Color = Color::Rgb(80, 200, 120);
pub const C_READY: Color = Color::Rgb(255, 184, 80);
pub const C_MUTED: Color = Color::Rgb(72, 72, 88);
pub const C_SEPARATOR: Color = Color::Rgb(40, 40, 52);
pub const C_SECONDARY: Color = Color::Rgb(115, 115, 138);
pub const C_PRIMARY: Color = Color::Rgb(210, 210, 225);
pub const C_SELECTION_BG: Color = Color::Rgb(28, 28, 40);
pub const C_PANEL_BORDER: Color = Color::Rgb(40, 40, 52);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(120, 100, 200);
pub const C_FILTER_BG: Color = Color::Rgb(20, 20, 32);
pub const C_FILTER_FG: Color = Color::Rgb(255, 200, 80);
pub const C_KEY: Color = Color::Rgb(80, 140, 200);
pub const C_DATE: Color = Color::Rgb(100, 160, 130);
pub const C_TOAST_INFO: Color = Color::Rgb(80, 160, 220);
pub const C_TOAST_SUCCESS: Color = Color::Rgb(80, 200, 120);
pub const C_TOAST_WARNING: Color = Color::Rgb(255, 184, 80);
pub const C_TOAST_ERROR: Color = Color::Rgb(255, 95, 95);
pub const C_MODE_NORMAL: Color = Color::Rgb(115, 115, 138);
pub const C_MODE_FILTER: Color = Color::Rgb(255, 200, 80);

/// Bar and selection colours, overridable from the config file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub bar_bg: Color,
    pub bar_fg: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bar_bg: C_FILTER_BG,
            bar_fg: C_PRIMARY,
            selection_bg: C_SELECTION_BG,
            selection_fg: C_PRIMARY,
        }
    }
}

fn rgb(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

impl Palette {
    pub fn from_config(config: &Config) -> Self {
        let d = Self::default();
        Self {
            bar_bg: config.bg_color.map(rgb).unwrap_or(d.bar_bg),
            bar_fg: config.fg_color.map(rgb).unwrap_or(d.bar_fg),
            selection_bg: config.bg_color.map(rgb).unwrap_or(d.selection_bg),
            selection_fg: config.fg_color.map(rgb).unwrap_or(d.selection_fg),
        }
    }

    pub fn bar(&self) -> Style {
        Style::default().bg(self.bar_bg).fg(self.bar_fg)
    }

    pub fn selected(&self, focused: bool) -> Style {
        let style = Style::default().bg(self.selection_bg).fg(self.selection_fg);
        if focused {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }
}

// ── Predefined styles ─────────────────────────────────────────────────────────

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_follows_config() {
        let config = Config {
            bg_color: Some(Rgb(1, 2, 3)),
            ..Config::default()
        };
        let palette = Palette::from_config(&config);
        assert_eq!(palette.bar_bg, Color::Rgb(1, 2, 3));
        assert_eq!(palette.bar_fg, C_PRIMARY);
        assert_eq!(Palette::from_config(&Config::default()), Palette::default());
    }
}
