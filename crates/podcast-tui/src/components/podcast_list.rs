//! PodcastList component: podcasts of the loaded station, with artwork badges.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use podcast_proto::catalog::Podcast;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_PLAYING, C_SECONDARY, C_TOAST_INFO},
    widgets::{
        filter_input::{FilterAction, FilterInput},
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
        text::fit,
    },
};

pub struct PodcastList {
    pub list: ScrollableList<Podcast>,
    filter_input: FilterInput,
}

impl PodcastList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(|p: &Podcast, q: &str| {
                let title = p.title.to_lowercase();
                q.to_lowercase().split_whitespace().all(|t| title.contains(t))
            }),
            filter_input: FilterInput::new("podcast title…"),
        }
    }

    pub fn set_podcasts(&mut self, podcasts: Vec<Podcast>) {
        self.filter_input.reset();
        self.list.filter.clear();
        self.list.set_items(podcasts);
    }

    pub fn clear(&mut self) {
        self.set_podcasts(Vec::new());
    }

    fn load_selected(&self) -> Vec<Action> {
        self.list
            .selected_item()
            .map(|p| vec![Action::LoadPodcast(p.clone())])
            .unwrap_or_default()
    }
}

impl Default for PodcastList {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for PodcastList {
    fn id(&self) -> ComponentId {
        ComponentId::PodcastList
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
        let badge = if state.loading.podcasts {
            Some(Badge { text: "LOADING".to_string(), color: C_TOAST_INFO })
        } else if state.prefetch_pending > 0 {
            Some(Badge { text: format!("art {}…", state.prefetch_pending), color: C_MUTED })
        } else if self.list.total_len() > 0 {
            Some(Badge { text: self.list.total_len().to_string(), color: C_MUTED })
        } else {
            None
        };
        let block = pane_chrome("podcasts", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let filter_h = u16::from(self.filter_input.is_active());
        let list_area = Rect {
            height: inner.height.saturating_sub(filter_h),
            ..inner
        };

        let placeholder = if state.loading.podcasts {
            Some("  loading podcasts…")
        } else if self.list.total_len() == 0 && state.station.is_none() {
            Some("  select a station")
        } else if self.list.total_len() == 0 {
            Some("  no podcasts")
        } else if self.list.is_empty() {
            Some("  no podcasts match filter")
        } else {
            None
        };

        if let Some(msg) = placeholder {
            frame.render_widget(Paragraph::new(Span::styled(msg, Style::default().fg(C_MUTED))), list_area);
        } else {
            let height = list_area.height as usize;
            let width = list_area.width.saturating_sub(4) as usize;
            self.list.ensure_visible(height);
            let sel = self.list.selected_in_view();
            let open = state.podcast.as_ref().map(|p| &p.id);
            let items: Vec<ListItem> = self
                .list
                .visible_items(height)
                .enumerate()
                .map(|(row, podcast)| {
                    // ● artwork cached, ○ not (yet)
                    let (mark, mark_color) = if state.has_image(&podcast.id) {
                        ("●", C_PLAYING)
                    } else {
                        ("○", C_MUTED)
                    };
                    let title_style = if row == sel {
                        state.palette.selected(focused)
                    } else if open == Some(&podcast.id) {
                        Style::default().fg(C_PLAYING)
                    } else {
                        Style::default().fg(C_SECONDARY)
                    };
                    let title = if podcast.title.is_empty() {
                        format!("podcast {}", podcast.id)
                    } else {
                        podcast.title.clone()
                    };
                    let item = ListItem::new(Line::from(vec![
                        Span::styled(format!(" {} ", mark), Style::default().fg(mark_color)),
                        Span::styled(fit(&title, width), title_style),
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
