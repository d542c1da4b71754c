//! StationList component: left pane, the station index of the current target.

use std::collections::BTreeMap;

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use podcast_proto::catalog::{CatalogId, StationSummary};
use podcast_proto::player::PlayerState;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_PLAYING, C_READY, C_SECONDARY, C_TOAST_INFO},
    widgets::{
        filter_input::{FilterAction, FilterInput},
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
        text::pad,
    },
};

pub struct StationList {
    pub list: ScrollableList<StationSummary>,
    filter_input: FilterInput,
}

impl StationList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(station_matches),
            filter_input: FilterInput::new("callsign or id…"),
        }
    }

    /// Rows come out sorted by callsign.
    pub fn set_stations(&mut self, stations: &BTreeMap<String, CatalogId>) {
        let rows = stations
            .iter()
            .map(|(callsign, id)| StationSummary {
                callsign: callsign.clone(),
                id: id.clone(),
            })
            .collect();
        self.list.set_items(rows);
        if !self.list.filter.is_empty() {
            let query = self.list.filter.clone();
            self.list.set_filter(&query);
        }
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    /// Select `callsign` if it is listed and return its row.
    pub fn select_callsign(&mut self, callsign: &str) -> Option<StationSummary> {
        if self.list.select_where(|s| s.callsign == callsign) {
            self.list.selected_item().cloned()
        } else {
            None
        }
    }

    fn load_selected(&self) -> Vec<Action> {
        match self.list.selected_item() {
            Some(station) => vec![Action::LoadStation(station.clone())],
            None => vec![],
        }
    }

    fn render_item(&self, station: &StationSummary, is_selected: bool, focused: bool, width: usize, state: &AppState) -> ListItem<'static> {
        let is_loaded = state.station.as_ref().map(|s| &s.id) == Some(&station.id);
        let (icon, icon_color) = match (is_loaded, state.station_player) {
            (true, PlayerState::Playing) => ("▶", C_PLAYING),
            (true, PlayerState::MediaReady) => ("■", C_READY),
            (true, PlayerState::NotReady) => ("·", C_MUTED),
            (false, _) => (" ", C_MUTED),
        };
        let callsign_w = width.saturating_sub(4).min(12);
        let id_w = width.saturating_sub(callsign_w + 4);

        let callsign_style = if is_selected {
            state.palette.selected(focused)
        } else if is_loaded {
            Style::default().fg(icon_color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_SECONDARY)
        };

        let line = Line::from(vec![
            Span::styled(format!(" {} ", icon), Style::default().fg(icon_color)),
            Span::styled(pad(&station.callsign, callsign_w), callsign_style),
            Span::raw(" "),
            Span::styled(pad(station.id.as_str(), id_w), Style::default().fg(C_MUTED)),
        ]);
        let item = ListItem::new(line);
        if is_selected {
            item.style(state.palette.selected(focused))
        } else {
            item
        }
    }
}

impl Default for StationList {
    fn default() -> Self {
        Self::new()
    }
}

fn station_matches(station: &StationSummary, q: &str) -> bool {
    let text = format!("{} {}", station.callsign, station.id).to_lowercase();
    q.to_lowercase().split_whitespace().all(|term| text.contains(term))
}

impl Component for StationList {
    fn id(&self) -> ComponentId {
        ComponentId::StationList
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }

        if self.filter_input.is_active() {
            match key.code {
                KeyCode::Up => self.list.select_up(1),
                KeyCode::Down => self.list.select_down(1),
                _ => match self.filter_input.handle_key(key) {
                    FilterAction::Changed(q) => self.list.set_filter(&q),
                    FilterAction::Confirmed => return vec![Action::CloseFilter],
                    FilterAction::Cancelled => {
                        self.list.set_filter("");
                        return vec![Action::CloseFilter];
                    }
                },
            }
            return vec![];
        }

        let step = if key.modifiers.contains(KeyModifiers::SHIFT) { 5 } else { 1 };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(step),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(step),
            KeyCode::PageUp => self.list.select_up(10),
            KeyCode::PageDown => self.list.select_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Enter => return self.load_selected(),
            KeyCode::Char('/') => {
                self.filter_input.activate();
                return vec![Action::OpenFilter];
            }
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => self.list.select_up(1),
            MouseEventKind::ScrollDown => self.list.select_down(1),
            MouseEventKind::Down(MouseButton::Left) => {
                let row = event.row.saturating_sub(area.y + 1) as usize;
                let before = self.list.selected;
                // A click on the already-selected row loads it.
                if self.list.handle_click(row) && self.list.selected == before {
                    return self.load_selected();
                }
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::CycleEnvironment | Action::ToggleApiVersion = action {
            self.filter_input.reset();
            self.list.set_filter("");
        }
        vec![]
    }

    fn is_filtering(&self) -> bool {
        self.filter_input.is_active()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = if state.loading.stations {
            Some(Badge { text: "LOADING".to_string(), color: C_TOAST_INFO })
        } else if self.list.total_len() > 0 {
            Some(Badge {
                text: format!("{}/{}", self.list.len(), self.list.total_len()),
                color: C_MUTED,
            })
        } else {
            None
        };
        let block = pane_chrome("stations", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let placeholder = if state.loading.stations {
            Some("  loading stations…")
        } else if self.list.total_len() == 0 {
            Some("  no stations")
        } else if self.list.is_empty() {
            Some("  no stations match filter")
        } else {
            None
        };

        let filter_h = u16::from(self.filter_input.is_active());
        let list_area = Rect {
            height: inner.height.saturating_sub(filter_h),
            ..inner
        };

        if let Some(msg) = placeholder {
            frame.render_widget(Paragraph::new(Span::styled(msg, Style::default().fg(C_MUTED))), list_area);
        } else {
            let height = list_area.height as usize;
            self.list.ensure_visible(height);
            let sel = self.list.selected_in_view();
            let width = list_area.width as usize;
            let items: Vec<ListItem> = self
                .list
                .visible_items(height)
                .enumerate()
                .map(|(row, station)| self.render_item(station, row == sel, focused, width, state))
                .collect();
            frame.render_widget(List::new(items), list_area);
        }

        if self.filter_input.is_active() {
            let filter_area = Rect {
                y: inner.y + inner.height.saturating_sub(1),
                height: 1,
                ..inner
            };
            self.filter_input.draw(frame, filter_area);
        }
    }
}
