//! Details component: named fields of the current selection followed by every
//! attribute the API returned, in API order.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use serde_json::{Map, Value};

use podcast_proto::catalog::display_value;

use crate::{
    action::{Action, ComponentId},
    app_state::{AppState, Details},
    component::Component,
    theme::{C_KEY, C_MUTED, C_PRIMARY, C_SEPARATOR},
    widgets::pane_chrome::pane_chrome,
};

use super::episode_list::format_published;

pub struct DetailsPane {
    scroll: u16,
}

impl DetailsPane {
    pub fn new() -> Self {
        Self { scroll: 0 }
    }
}

impl Default for DetailsPane {
    fn default() -> Self {
        Self::new()
    }
}

/// `(label, value)` rows for the details pane. Empty values are skipped.
pub fn detail_rows(state: &AppState) -> (Vec<(String, String)>, Option<&Map<String, Value>>) {
    let mut rows: Vec<(String, String)> = Vec::new();
    let mut push = |label: &str, value: Option<String>| {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            rows.push((label.to_string(), v));
        }
    };
    let attributes = match &state.details {
        Details::Empty => None,
        Details::Station(s) => {
            push("name", Some(s.name.clone()));
            push("callsign", Some(s.callsign.clone()));
            push("id", Some(s.id.to_string()));
            push("stream", s.stream_url.clone());
            push("logo", s.logo_url.clone());
            push("logo file", state.station_logo.as_ref().map(|p| p.display().to_string()));
            Some(&s.attributes)
        }
        Details::Podcast(p) => {
            push("title", Some(p.title.clone()));
            push("id", Some(p.id.to_string()));
            push("image", p.image_url.clone());
            push("image file", state.images.get(&p.id).map(|p| p.display().to_string()));
            Some(&p.attributes)
        }
        Details::Episode(e) => {
            push("title", Some(e.title.clone()));
            push("id", Some(e.id.to_string()));
            push("published", e.published_date.as_deref().map(format_published));
            push("duration", Some(e.duration_label()));
            push("audio", e.audio_url.clone());
            Some(&e.attributes)
        }
    };
    (rows, attributes)
}

impl Component for DetailsPane {
    fn id(&self) -> ComponentId {
        ComponentId::Details
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            MouseEventKind::ScrollDown => self.scroll = self.scroll.saturating_add(1),
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::LoadStation(_) | Action::LoadPodcast(_) | Action::LoadEpisode(_) = action {
            self.scroll = 0;
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("details", focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let (rows, attributes) = detail_rows(state);
        if rows.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  nothing selected", Style::default().fg(C_MUTED))),
                inner,
            );
            return;
        }

        let label_w = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0).max(10);
        let mut lines: Vec<Line> = rows
            .into_iter()
            .map(|(k, v)| {
                Line::from(vec![
                    Span::styled(
                        format!(" {:<w$} ", k, w = label_w),
                        Style::default().fg(C_KEY).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(v, Style::default().fg(C_PRIMARY)),
                ])
            })
            .collect();

        if let Some(attrs) = attributes.filter(|a| !a.is_empty()) {
            lines.push(Line::from(Span::styled(
                format!(" {}", "─".repeat(inner.width.saturating_sub(2) as usize)),
                Style::default().fg(C_SEPARATOR),
            )));
            let attr_w = attrs.keys().map(|k| k.len()).max().unwrap_or(0).min(28);
            for (k, v) in attrs {
                lines.push(Line::from(vec![
                    Span::styled(format!(" {:<w$} ", k, w = attr_w), Style::default().fg(C_MUTED)),
                    Span::raw(display_value(v)),
                ]));
            }
        }

        let max_scroll = (lines.len() as u16).saturating_sub(inner.height);
        self.scroll = self.scroll.min(max_scroll);
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }).scroll((self.scroll, 0)),
            inner,
        );
    }
}
