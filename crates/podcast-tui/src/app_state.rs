//! AppState: shared read-only data passed to all components during render/event.
//!
//! Only the App event loop writes to it.

use std::collections::HashMap;
use std::path::PathBuf;

use podcast_proto::api::Target;
use podcast_proto::catalog::{CatalogId, Episode, Podcast, Station};
use podcast_proto::config::Config;
use podcast_proto::player::PlayerState;

use crate::theme::Palette;
use crate::widgets::status_bar::InputMode;

/// What the details pane is describing.
#[derive(Debug, Clone, Default)]
pub enum Details {
    #[default]
    Empty,
    Station(Station),
    Podcast(Podcast),
    Episode(Episode),
}

/// Outstanding catalog requests, for "loading…" placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct Loading {
    pub stations: bool,
    pub podcasts: bool,
    pub episodes: bool,
}

pub struct AppState {
    pub config: Config,
    pub palette: Palette,
    pub target: Target,
    pub input_mode: InputMode,
    pub loading: Loading,

    // ── Selection ───────────────────────────────────────────────────────────
    pub station: Option<Station>,
    pub station_logo: Option<PathBuf>,
    pub podcast: Option<Podcast>,
    pub episode: Option<Episode>,
    pub details: Details,

    // ── Prefetch ────────────────────────────────────────────────────────────
    /// Podcast artwork already on disk, keyed by podcast id.
    pub images: HashMap<CatalogId, PathBuf>,
    pub prefetch_pending: usize,

    // ── Players ─────────────────────────────────────────────────────────────
    pub station_player: PlayerState,
    pub episode_player: PlayerState,
}

impl AppState {
    pub fn new(config: Config, target: Target) -> Self {
        Self {
            palette: Palette::from_config(&config),
            config,
            target,
            input_mode: InputMode::Normal,
            loading: Loading::default(),
            station: None,
            station_logo: None,
            podcast: None,
            episode: None,
            details: Details::Empty,
            images: HashMap::new(),
            prefetch_pending: 0,
            station_player: PlayerState::NotReady,
            episode_player: PlayerState::NotReady,
        }
    }

    /// Forget everything below the station index.
    pub fn clear_station(&mut self) {
        self.station = None;
        self.station_logo = None;
        self.podcast = None;
        self.episode = None;
        self.details = Details::Empty;
        self.images.clear();
        self.prefetch_pending = 0;
        self.loading.podcasts = false;
        self.loading.episodes = false;
    }

    pub fn has_image(&self, id: &CatalogId) -> bool {
        self.images.contains_key(id)
    }
}
