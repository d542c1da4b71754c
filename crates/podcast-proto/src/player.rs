//! Station and episode players.
//!
//! Each [`Player`] walks `NotReady -> MediaReady <-> Playing`. The [`Deck`]
//! owns both and keeps at most one of them audible.

use std::fmt;
use std::io;

use tracing::{debug, info};

/// Starts and stops audio for a single stream.
pub trait MediaBackend {
    fn play(&mut self, url: &str) -> io::Result<()>;
    fn stop(&mut self);
    /// False once the stream started by `play` has ended on its own.
    fn is_running(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    NotReady,
    MediaReady,
    Playing,
}

impl PlayerState {
    pub fn label(&self) -> &'static str {
        match self {
            PlayerState::NotReady => "Media Not Loaded",
            PlayerState::MediaReady => "Media Ready",
            PlayerState::Playing => "Playing",
        }
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub struct Player<B> {
    name: &'static str,
    backend: B,
    media: Option<String>,
    state: PlayerState,
}

impl<B: MediaBackend> Player<B> {
    pub fn new(name: &'static str, backend: B) -> Self {
        Self {
            name,
            backend,
            media: None,
            state: PlayerState::NotReady,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn media(&self) -> Option<&str> {
        self.media.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Replace the loaded media. Playback stops; the new media is not started.
    pub fn load(&mut self, url: impl Into<String>) {
        self.stop();
        let url = url.into();
        debug!("{} player: loaded {}", self.name, url);
        self.media = Some(url);
        self.state = PlayerState::MediaReady;
    }

    /// Forget the loaded media.
    pub fn unload(&mut self) {
        self.stop();
        self.media = None;
        self.state = PlayerState::NotReady;
    }

    /// Play when ready, stop when playing. A failed start leaves the player ready.
    pub fn toggle(&mut self) -> io::Result<PlayerState> {
        match self.state {
            PlayerState::NotReady => {}
            PlayerState::MediaReady => {
                if let Some(url) = self.media.as_deref() {
                    self.backend.play(url)?;
                    info!("{} player: playing {}", self.name, url);
                    self.state = PlayerState::Playing;
                }
            }
            PlayerState::Playing => self.stop(),
        }
        Ok(self.state)
    }

    pub fn stop(&mut self) {
        if self.state == PlayerState::Playing {
            self.backend.stop();
            info!("{} player: stopped", self.name);
            self.state = PlayerState::MediaReady;
        }
    }

    /// Drop back to `MediaReady` if playback ended without a stop.
    /// Returns true when that happened.
    pub fn reap(&mut self) -> bool {
        if self.state != PlayerState::Playing || self.backend.is_running() {
            return false;
        }
        info!("{} player: playback ended", self.name);
        self.state = PlayerState::MediaReady;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSlot {
    Station,
    Episode,
}

impl PlayerSlot {
    pub fn other(self) -> Self {
        match self {
            PlayerSlot::Station => PlayerSlot::Episode,
            PlayerSlot::Episode => PlayerSlot::Station,
        }
    }
}

pub struct Deck<B> {
    station: Player<B>,
    episode: Player<B>,
}

impl<B: MediaBackend> Deck<B> {
    pub fn new(station: B, episode: B) -> Self {
        Self {
            station: Player::new("station", station),
            episode: Player::new("episode", episode),
        }
    }

    pub fn player(&self, slot: PlayerSlot) -> &Player<B> {
        match slot {
            PlayerSlot::Station => &self.station,
            PlayerSlot::Episode => &self.episode,
        }
    }

    pub fn player_mut(&mut self, slot: PlayerSlot) -> &mut Player<B> {
        match slot {
            PlayerSlot::Station => &mut self.station,
            PlayerSlot::Episode => &mut self.episode,
        }
    }

    pub fn load(&mut self, slot: PlayerSlot, url: impl Into<String>) {
        self.player_mut(slot).load(url);
    }

    /// Toggle `slot`, silencing the other player before it starts.
    pub fn toggle(&mut self, slot: PlayerSlot) -> io::Result<PlayerState> {
        if self.player(slot).state() == PlayerState::MediaReady {
            self.player_mut(slot.other()).stop();
        }
        self.player_mut(slot).toggle()
    }

    pub fn stop_all(&mut self) {
        self.station.stop();
        self.episode.stop();
    }

    /// Slots whose playback ended on its own since the last call.
    pub fn reap(&mut self) -> Vec<PlayerSlot> {
        let mut ended = Vec::new();
        if self.station.reap() {
            ended.push(PlayerSlot::Station);
        }
        if self.episode.reap() {
            ended.push(PlayerSlot::Episode);
        }
        ended
    }
}
