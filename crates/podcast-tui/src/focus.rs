//! FocusRing: keyboard focus cycling between panes.

use crate::action::ComponentId;

/// Tab order of the focusable panes.
pub struct FocusRing {
    panes: Vec<ComponentId>,
    at: usize,
}

impl FocusRing {
    pub fn new(panes: Vec<ComponentId>) -> Self {
        Self { panes, at: 0 }
    }

    pub fn current(&self) -> Option<ComponentId> {
        self.panes.get(self.at).copied()
    }

    fn step(&mut self, forward: bool) -> Option<ComponentId> {
        let n = self.panes.len();
        if n == 0 {
            return None;
        }
        self.at = if forward { (self.at + 1) % n } else { (self.at + n - 1) % n };
        self.current()
    }

    pub fn next(&mut self) -> Option<ComponentId> {
        self.step(true)
    }

    pub fn prev(&mut self) -> Option<ComponentId> {
        self.step(false)
    }

    /// Focus `id`. Panes outside the ring (header, help) are ignored.
    pub fn set(&mut self, id: ComponentId) {
        if let Some(at) = self.panes.iter().position(|p| *p == id) {
            self.at = at;
        }
    }

    pub fn is_focused(&self, id: ComponentId) -> bool {
        self.current() == Some(id)
    }
}

impl Default for FocusRing {
    fn default() -> Self {
        Self::new(vec![
            ComponentId::StationList,
            ComponentId::PodcastList,
            ComponentId::EpisodeList,
            ComponentId::Details,
        ])
    }
}
