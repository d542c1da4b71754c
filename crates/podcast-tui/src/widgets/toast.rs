//! Toast notifications: transient status messages in the top-right corner.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use super::text::fit;
use crate::theme::{C_TOAST_ERROR, C_TOAST_INFO, C_TOAST_SUCCESS, C_TOAST_WARNING};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn icon(self) -> &'static str {
        match self {
            Severity::Info => "·",
            Severity::Success => "✓",
            Severity::Warning => "!",
            Severity::Error => "✗",
        }
    }

    fn style(self) -> Style {
        let color = match self {
            Severity::Info => C_TOAST_INFO,
            Severity::Success => C_TOAST_SUCCESS,
            Severity::Warning => C_TOAST_WARNING,
            Severity::Error => C_TOAST_ERROR,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    fn lifetime(self) -> Duration {
        match self {
            Severity::Info | Severity::Success => Duration::from_secs(3),
            Severity::Warning => Duration::from_secs(4),
            Severity::Error => Duration::from_secs(6),
        }
    }
}

struct Toast {
    message: String,
    severity: Severity,
    expires: Instant,
}

const MAX_VISIBLE: usize = 4;

#[derive(Default)]
pub struct ToastManager {
    toasts: VecDeque<Toast>,
}

impl ToastManager {
    pub fn push(&mut self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        // Repeating the newest toast just extends it.
        if let Some(last) = self.toasts.back_mut() {
            if last.message == message && last.severity == severity {
                last.expires = Instant::now() + severity.lifetime();
                return;
            }
        }
        self.toasts.push_back(Toast {
            message,
            severity,
            expires: Instant::now() + severity.lifetime(),
        });
        while self.toasts.len() > MAX_VISIBLE * 2 {
            self.toasts.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Info);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Success);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Warning);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Error);
    }

    /// Drop expired toasts. Returns true if anything changed.
    pub fn tick(&mut self) -> bool {
        let before = self.toasts.len();
        let now = Instant::now();
        self.toasts.retain(|t| t.expires > now);
        before != self.toasts.len()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Newest toast on top.
    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let max_width = (area.width / 2).clamp(30, 70) as usize;
        let rows = self.toasts.iter().rev().take(MAX_VISIBLE);
        for (i, toast) in rows.enumerate() {
            let y = area.y + 1 + i as u16;
            if y >= area.y + area.height {
                break;
            }
            let text = format!(" {} {} ", toast.severity.icon(), toast.message);
            let text = fit(&text, max_width.min(area.width as usize));
            let w = unicode_width::UnicodeWidthStr::width(text.as_str()) as u16;
            let toast_area = Rect {
                x: area.x + area.width.saturating_sub(w + 1),
                y,
                width: w,
                height: 1,
            };
            frame.render_widget(Clear, toast_area);
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(text, toast.severity.style()))),
                toast_area,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse_and_queue_is_capped() {
        let mut toasts = ToastManager::default();
        toasts.error("no podcasts");
        toasts.error("no podcasts");
        assert_eq!(toasts.len(), 1);
        for i in 0..20 {
            toasts.info(format!("msg {}", i));
        }
        assert_eq!(toasts.len(), MAX_VISIBLE * 2);
    }

    #[test]
    fn test_tick_keeps_fresh_toasts() {
        let mut toasts = ToastManager::default();
        toasts.success("copied");
        assert!(!toasts.tick());
        assert!(!toasts.is_empty());
    }
}
