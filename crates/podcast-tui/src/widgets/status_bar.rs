//! Status bar: bottom line with input mode and key hints.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{Palette, C_MODE_FILTER, C_MODE_NORMAL, C_MUTED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Filter,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Filter => "FILTER",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Filter => C_MODE_FILTER,
        }
    }

    fn hints(self) -> &'static str {
        match self {
            Self::Normal => {
                " Tab panes  j/k move  Enter load  s/p station/episode play  e env  v api  / filter  y copy  ? help  q quit"
            }
            Self::Filter => " type to filter  Up/Down move  Enter keep  Esc clear+close",
        }
    }
}

pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, palette: &Palette) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default().fg(mode.color()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(mode.hints(), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line).style(palette.bar()), area);
}
