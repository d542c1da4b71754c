//! FilterInput: a one-line `/` filter bar backed by tui-input.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_FILTER_BG, C_FILTER_FG, C_MUTED};

#[derive(Debug, PartialEq)]
pub enum FilterAction {
    Changed(String),
    Confirmed,
    Cancelled,
}

pub struct FilterInput {
    input: Input,
    active: bool,
    placeholder: &'static str,
}

impl FilterInput {
    pub fn new(placeholder: &'static str) -> Self {
        Self {
            input: Input::default(),
            active: false,
            placeholder,
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    /// Drop the query and close the bar.
    pub fn reset(&mut self) {
        self.input = Input::default();
        self.active = false;
    }

    /// Esc clears a non-empty query first; a second Esc closes the bar.
    pub fn handle_key(&mut self, key: KeyEvent) -> FilterAction {
        match key.code {
            KeyCode::Esc if !self.input.value().is_empty() => {
                self.input = Input::default();
                FilterAction::Changed(String::new())
            }
            KeyCode::Esc => {
                self.active = false;
                FilterAction::Cancelled
            }
            KeyCode::Enter => {
                self.active = false;
                FilterAction::Confirmed
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                FilterAction::Changed(self.input.value().to_string())
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(3) as usize;
        let scroll = self.input.visual_scroll(width);
        let value = self.input.value();
        let span = if value.is_empty() {
            Span::styled(format!("/ {}", self.placeholder), Style::default().fg(C_MUTED))
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(format!("/ {}", visible), Style::default().fg(C_FILTER_FG))
        };
        frame.render_widget(
            Paragraph::new(Line::from(span)).style(Style::default().bg(C_FILTER_BG)),
            area,
        );

        if self.active && area.width > 2 {
            let cursor = (self.input.visual_cursor().saturating_sub(scroll)) as u16;
            let x = (area.x + 2 + cursor).min(area.x + area.width - 1);
            frame.set_cursor_position((x, area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_then_double_escape() {
        let mut f = FilterInput::new("filter");
        f.activate();
        assert_eq!(f.handle_key(key(KeyCode::Char('k'))), FilterAction::Changed("k".into()));
        assert_eq!(f.handle_key(key(KeyCode::Char('q'))), FilterAction::Changed("kq".into()));
        assert_eq!(f.handle_key(key(KeyCode::Esc)), FilterAction::Changed(String::new()));
        assert!(f.is_active());
        assert_eq!(f.handle_key(key(KeyCode::Esc)), FilterAction::Cancelled);
        assert!(!f.is_active());
    }

    #[test]
    fn test_enter_keeps_query() {
        let mut f = FilterInput::new("filter");
        f.activate();
        f.handle_key(key(KeyCode::Char('x')));
        assert_eq!(f.handle_key(key(KeyCode::Enter)), FilterAction::Confirmed);
        assert_eq!(f.text(), "x");
        f.reset();
        assert_eq!(f.text(), "");
    }
}
