//! Action enum: user intents produced by components and dispatched by the App.

use podcast_proto::catalog::{Episode, Podcast, StationSummary};
use podcast_proto::player::PlayerSlot;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    StationList,
    PodcastList,
    EpisodeList,
    Details,
    Header,
    HelpOverlay,
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Catalog ──────────────────────────────────────────────────────────────
    CycleEnvironment,
    ToggleApiVersion,
    ReloadStations,
    LoadStation(StationSummary),
    LoadPodcast(Podcast),
    LoadEpisode(Episode),

    // ── Playback ─────────────────────────────────────────────────────────────
    TogglePlayer(PlayerSlot),
    CopyStreamUrl,

    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),

    // ── Filter ───────────────────────────────────────────────────────────────
    OpenFilter,
    CloseFilter,

    // ── System ───────────────────────────────────────────────────────────────
    ToggleHelp,
    Quit,
}
