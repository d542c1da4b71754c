//! Header component: 2-row top bar.
//!
//! Row 1: app name, environment, API version, configured logo name.
//! Row 2: station player and episode player with their states.
//!
//! Not focusable.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use podcast_proto::player::PlayerState;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_ACCENT, C_MUTED, C_PLAYING, C_PRIMARY, C_READY, C_SECONDARY},
    widgets::text::fit,
};

pub struct Header;

fn state_color(state: PlayerState) -> Color {
    match state {
        PlayerState::NotReady => C_MUTED,
        PlayerState::MediaReady => C_READY,
        PlayerState::Playing => C_PLAYING,
    }
}

fn player_spans(key: char, label: &'static str, what: String, state: PlayerState) -> Vec<Span<'static>> {
    let color = state_color(state);
    vec![
        Span::styled(format!(" [{}] ", key), Style::default().fg(C_MUTED)),
        Span::styled(label, Style::default().fg(C_SECONDARY)),
        Span::raw(" "),
        Span::styled(what, Style::default().fg(C_PRIMARY)),
        Span::raw(" "),
        Span::styled(
            format!("{}", state),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
    ]
}

impl Component for Header {
    fn id(&self) -> ComponentId {
        ComponentId::Header
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        let mut top = vec![
            Span::styled(" podcast-player ", Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD)),
            Span::styled(" env ", Style::default().fg(C_MUTED)),
            Span::styled(state.target.environment.as_str(), Style::default().fg(C_PRIMARY)),
            Span::styled("  api ", Style::default().fg(C_MUTED)),
            Span::styled(state.target.version.as_str(), Style::default().fg(C_PRIMARY)),
        ];
        if let Some(logo) = state.config.logo.as_deref() {
            top.push(Span::styled("  logo ", Style::default().fg(C_MUTED)));
            top.push(Span::styled(logo.to_string(), Style::default().fg(C_SECONDARY)));
        }

        let half = (area.width as usize / 2).saturating_sub(28);
        let station = state
            .station
            .as_ref()
            .map(|s| fit(&s.title(), half))
            .unwrap_or_else(|| "-".to_string());
        let episode = state
            .episode
            .as_ref()
            .map(|e| fit(&e.title, half))
            .unwrap_or_else(|| "-".to_string());
        let mut bottom = player_spans('s', "station", station, state.station_player);
        bottom.extend(player_spans('p', "episode", episode, state.episode_player));

        frame.render_widget(
            Paragraph::new(vec![Line::from(top), Line::from(bottom)]).style(state.palette.bar()),
            area,
        );
    }
}
