//! HelpOverlay component: centered popup with the key list and the loaded
//! configuration.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_BG, C_MUTED, C_PANEL_BORDER, C_PRIMARY, C_SECONDARY},
};

const KEYS: &[(&str, &str)] = &[
    ("tab / shift-tab", "focus next / previous pane"),
    ("↑ / ↓  or  j / k", "move selection"),
    ("pg up / pg dn", "jump 10 rows"),
    ("g / G", "first / last row"),
    ("/", "filter the focused list (esc clears + closes)"),
    ("enter", "load station / podcast / episode"),
    ("s", "play or stop the station stream"),
    ("p", "play or stop the episode"),
    ("e", "cycle environment (reloads stations)"),
    ("v", "toggle API version (reloads stations)"),
    ("r", "reload stations"),
    ("y", "copy current stream url"),
    ("?", "toggle this help"),
    ("q / ctrl+c", "quit"),
];

#[derive(Default)]
pub struct HelpOverlay {
    pub visible: bool,
}

impl Component for HelpOverlay {
    fn id(&self) -> ComponentId {
        ComponentId::HelpOverlay
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.visible {
            return vec![];
        }
        match key.code {
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc => vec![Action::ToggleHelp],
            // Swallow everything else while open
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::ToggleHelp = action {
            self.visible = !self.visible;
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        if !self.visible {
            return;
        }
        let summary = state.config.summary();
        let height = (KEYS.len() + summary.len() + 8) as u16;
        let popup = centered_rect(70, height, area);

        let mut lines = vec![section(" keyboard shortcuts"), Line::from("")];
        lines.extend(KEYS.iter().map(|(k, d)| row(k, d.to_string())));
        lines.push(Line::from(""));
        lines.push(section(" configuration"));
        lines.extend(summary.into_iter().map(|(k, v)| row(k, v)));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " press ? or esc to close",
            Style::default().fg(C_MUTED),
        )));

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(C_PANEL_BORDER))
                        .style(Style::default().bg(C_BG)),
                )
                .wrap(Wrap { trim: false }),
            popup,
        );
    }
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        title,
        Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
    ))
}

fn row(key: &str, desc: String) -> Line<'static> {
    Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("{:<20}", key),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc, Style::default().fg(C_SECONDARY)),
    ])
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let [band] = Layout::vertical([Constraint::Length(height.min(r.height))])
        .flex(Flex::Center)
        .areas(r);
    let [popup] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(band);
    popup
}
