//! EpisodeList component: episodes of the open podcast.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use podcast_proto::catalog::Episode;
use podcast_proto::player::PlayerState;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_DATE, C_MUTED, C_PLAYING, C_READY, C_SECONDARY, C_TOAST_INFO},
    widgets::{
        filter_input::{FilterAction, FilterInput},
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
        text::{fit, pad},
    },
};

const DATE_W: usize = 10;
const DURATION_W: usize = 8;

/// Render an API timestamp as a local `YYYY-MM-DD`.
///
/// Accepts RFC 3339 and bare dates; anything else is shown as given.
pub fn format_published(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&chrono::Local).format("%Y-%m-%d").to_string();
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format("%Y-%m-%d").to_string();
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

pub struct EpisodeList {
    pub list: ScrollableList<Episode>,
    filter_input: FilterInput,
}

impl EpisodeList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(|e: &Episode, q: &str| {
                let text = format!(
                    "{} {}",
                    e.title,
                    e.published_date.as_deref().unwrap_or_default()
                )
                .to_lowercase();
                q.to_lowercase().split_whitespace().all(|t| text.contains(t))
            }),
            filter_input: FilterInput::new("episode title or date…"),
        }
    }

    pub fn set_episodes(&mut self, episodes: Vec<Episode>) {
        self.filter_input.reset();
        self.list.filter.clear();
        self.list.set_items(episodes);
    }

    pub fn clear(&mut self) {
        self.set_episodes(Vec::new());
    }

    fn load_selected(&self) -> Vec<Action> {
        self.list
            .selected_item()
            .map(|e| vec![Action::LoadEpisode(e.clone())])
            .unwrap_or_default()
    }
}

impl Default for EpisodeList {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for EpisodeList {
    fn id(&self) -> ComponentId {
        ComponentId::EpisodeList
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

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(1),
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
                let before = self.list.selected;
                let row = event.row.saturating_sub(area.y + 1) as usize;
                if self.list.handle_click(row) && self.list.selected == before {
                    return self.load_selected();
                }
            }
            _ => {}
        }
        vec![]
    }

    fn is_filtering(&self) -> bool {
        self.filter_input.is_active()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = if state.loading.episodes {
            Some(Badge { text: "LOADING".to_string(), color: C_TOAST_INFO })
        } else if self.list.total_len() > 0 {
            Some(Badge { text: self.list.total_len().to_string(), color: C_MUTED })
        } else {
            None
        };
        let title = match &state.podcast {
            Some(p) if !p.title.is_empty() => format!("episodes · {}", fit(&p.title, 40)),
            _ => "episodes".to_string(),
        };
        let block = pane_chrome(&title, focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let filter_h = u16::from(self.filter_input.is_active());
        let list_area = Rect {
            height: inner.height.saturating_sub(filter_h),
            ..inner
        };

        let placeholder = if state.loading.episodes {
            Some("  loading episodes…")
        } else if state.podcast.is_none() {
            Some("  select a podcast")
        } else if self.list.total_len() == 0 {
            Some("  no episodes")
        } else if self.list.is_empty() {
            Some("  no episodes match filter")
        } else {
            None
        };

        if let Some(msg) = placeholder {
            frame.render_widget(Paragraph::new(Span::styled(msg, Style::default().fg(C_MUTED))), list_area);
        } else {
            let height = list_area.height as usize;
            let title_w = (list_area.width as usize).saturating_sub(DATE_W + DURATION_W + 6);
            self.list.ensure_visible(height);
            let sel = self.list.selected_in_view();
            let loaded = state.episode.as_ref().map(|e| &e.id);
            let items: Vec<ListItem> = self
                .list
                .visible_items(height)
                .enumerate()
                .map(|(row, episode)| {
                    let is_loaded = loaded == Some(&episode.id);
                    let (icon, icon_color) = match (is_loaded, state.episode_player) {
                        (true, PlayerState::Playing) => ("▶", C_PLAYING),
                        (true, _) => ("■", C_READY),
                        (false, _) => (" ", C_MUTED),
                    };
                    let title_style = if row == sel {
                        state.palette.selected(focused)
                    } else if is_loaded {
                        Style::default().fg(icon_color).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(C_SECONDARY)
                    };
                    let date = episode
                        .published_date
                        .as_deref()
                        .map(format_published)
                        .unwrap_or_default();
                    let item = ListItem::new(Line::from(vec![
                        Span::styled(format!(" {} ", icon), Style::default().fg(icon_color)),
                        Span::styled(pad(&episode.title, title_w), title_style),
                        Span::raw(" "),
                        Span::styled(pad(&date, DATE_W), Style::default().fg(C_DATE)),
                        Span::raw(" "),
                        Span::styled(
                            format!("{:>width$}", episode.duration_label(), width = DURATION_W),
                            Style::default().fg(C_MUTED),
                        ),
                    ]));
                    if row == sel {
                        item.style(state.palette.selected(focused))
                    } else {
                        item
                    }
                })
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_published() {
        assert_eq!(format_published("2024-03-01"), "2024-03-01");
        assert_eq!(format_published("2024-03-01 23:10:00"), "2024-03-01");
        assert_eq!(format_published("last tuesday"), "last tuesday");
        // RFC 3339 at noon UTC lands on the same date in any zone within ±11h.
        assert_eq!(format_published("2024-03-01T12:00:00Z"), "2024-03-01");
    }
}
