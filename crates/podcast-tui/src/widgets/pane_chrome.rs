//! Bordered pane with focus styling and an optional right-aligned badge.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
};

use crate::theme::{style_focused_border, style_unfocused_border, C_MUTED, C_PRIMARY};

/// Short status text in the top-right corner of a pane (counts, "LOADING").
pub struct Badge {
    pub text: String,
    pub color: Color,
}

pub fn pane_chrome(title: &str, focused: bool, badge: Option<Badge>) -> Block<'static> {
    let (border_style, title_style) = if focused {
        (
            style_focused_border(),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        )
    } else {
        (style_unfocused_border(), Style::default().fg(C_MUTED))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Line::from(Span::styled(format!(" {} ", title), title_style)));

    match badge {
        Some(b) => block.title_top(
            Line::from(Span::styled(
                format!(" {} ", b.text),
                Style::default().fg(b.color).add_modifier(Modifier::BOLD),
            ))
            .right_aligned(),
        ),
        None => block,
    }
}
