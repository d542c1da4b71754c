//! App: component-based event loop.
//!
//! Architecture:
//! - `App` owns all components, the player deck and `AppState` (shared
//!   read-only data for components).
//! - Catalog calls run on tokio tasks and report back as `AppMessage` values on
//!   one `mpsc` channel. Only this loop mutates state.
//! - Every async result carries the generation it was started for; results for
//!   a superseded station, podcast or target are dropped.
//! - Components return `Vec<Action>`; App dispatches each Action.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Terminal,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use podcast_proto::api::{ApiError, CatalogClient, Target};
use podcast_proto::catalog::{CatalogId, Episode, Podcast, Station, StationSummary};
use podcast_proto::config::Config;
use podcast_proto::images::ImageCache;
use podcast_proto::player::{Deck, PlayerSlot, PlayerState};
use podcast_proto::prefetch::{BatchReport, PrefetchJob, PrefetchPool, PrefetchResult};
use podcast_proto::session::SessionState;

use crate::{
    action::{Action, ComponentId},
    app_state::{AppState, Details},
    component::Component,
    components::{
        details::DetailsPane, episode_list::EpisodeList, header::Header,
        help_overlay::HelpOverlay, podcast_list::PodcastList, station_list::StationList,
    },
    focus::FocusRing,
    mpv::MpvBackend,
    theme::C_BG,
    widgets::{
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    Stations {
        generation: u64,
        result: Result<BTreeMap<String, CatalogId>, String>,
    },
    StationDetails {
        generation: u64,
        result: Result<Station, String>,
    },
    StationLogo {
        generation: u64,
        path: Option<PathBuf>,
    },
    Podcasts {
        generation: u64,
        result: Result<Vec<Podcast>, String>,
    },
    Episodes {
        generation: u64,
        result: Result<Vec<Episode>, String>,
    },
    /// One image from the prefetch pool.
    Prefetched(PrefetchResult),
    PrefetchDone {
        batch: u64,
        report: BatchReport,
    },
}

fn describe(e: &ApiError) -> String {
    format!("{} ({})", e, e.kind())
}

/// Screen areas from the last draw, for mouse routing.
#[derive(Debug, Clone, Copy, Default)]
struct PaneAreas {
    stations: Rect,
    podcasts: Rect,
    episodes: Rect,
    details: Rect,
}

pub struct App {
    state: AppState,
    client: CatalogClient,
    images: ImageCache,
    pool: PrefetchPool,
    deck: Deck<MpvBackend>,

    // Components
    header: Header,
    station_list: StationList,
    podcast_list: PodcastList,
    episode_list: EpisodeList,
    details: DetailsPane,
    help_overlay: HelpOverlay,

    focus: FocusRing,
    toast: ToastManager,
    pane_areas: PaneAreas,

    tx: mpsc::Sender<AppMessage>,
    rx: Option<mpsc::Receiver<AppMessage>>,
    prefetch_tx: mpsc::Sender<PrefetchResult>,
    prefetch_rx: Option<mpsc::Receiver<PrefetchResult>>,

    // Generations
    stations_gen: u64,
    station_gen: u64,
    podcast_gen: u64,
    prefetch_batch: u64,
    prefetch_task: Option<JoinHandle<()>>,

    session: SessionState,
    session_path: PathBuf,
    /// Callsign to reselect once the first station index arrives.
    restore_callsign: Option<String>,

    should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        client: CatalogClient,
        mpv_binary: PathBuf,
        session: SessionState,
        session_path: PathBuf,
    ) -> Self {
        let target = Target::new(session.environment, session.api_version);
        let images = ImageCache::with_default_dir(client.http().clone());
        let pool = PrefetchPool::new(images.clone(), config.prefetch_workers);
        let (tx, rx) = mpsc::channel::<AppMessage>(1024);
        let (prefetch_tx, prefetch_rx) = mpsc::channel::<PrefetchResult>(256);

        Self {
            state: AppState::new(config, target),
            client,
            images,
            pool,
            deck: Deck::new(MpvBackend::new(mpv_binary.clone()), MpvBackend::new(mpv_binary)),
            header: Header,
            station_list: StationList::new(),
            podcast_list: PodcastList::new(),
            episode_list: EpisodeList::new(),
            details: DetailsPane::new(),
            help_overlay: HelpOverlay::default(),
            focus: FocusRing::default(),
            toast: ToastManager::default(),
            pane_areas: PaneAreas::default(),
            tx,
            rx: Some(rx),
            prefetch_tx,
            prefetch_rx: Some(prefetch_rx),
            stations_gen: 0,
            station_gen: 0,
            podcast_gen: 0,
            prefetch_batch: 0,
            prefetch_task: None,
            restore_callsign: session.station_callsign.clone(),
            session,
            session_path,
            should_quit: false,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let (Some(rx), Some(prefetch_rx)) = (self.rx.take(), self.prefetch_rx.take()) else {
            anyhow::bail!("event loop already ran");
        };

        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal, rx, prefetch_rx).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        self.deck.stop_all();
        self.abort_prefetch();
        if let Err(e) = self.session.save(&self.session_path).await {
            warn!("session not saved: {}", e);
        }
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        terminal.show_cursor()?;
        info!("podcast-player exiting");

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        mut rx: mpsc::Receiver<AppMessage>,
        mut prefetch_rx: mpsc::Receiver<PrefetchResult>,
    ) -> anyhow::Result<()> {
        // ── Background task: keyboard/mouse events ────────────────────────────
        // Polls so the thread notices the loop has gone and lets the runtime exit.
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || {
            while !event_tx.is_closed() {
                match event::poll(Duration::from_millis(250)) {
                    Ok(false) => continue,
                    Ok(true) => {}
                    Err(_) => break,
                }
                match event::read() {
                    Ok(ev) => {
                        if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        // ── Background task: prefetch results → AppMessage ───────────────────
        let prefetch_fwd = self.tx.clone();
        tokio::spawn(async move {
            while let Some(result) = prefetch_rx.recv().await {
                if prefetch_fwd.send(AppMessage::Prefetched(result)).await.is_err() {
                    break;
                }
            }
        });

        // Toast expiry check
        let mut toast_tick = tokio::time::interval(Duration::from_millis(100));
        toast_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        self.reload_stations();

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    const MAX_DRAIN: usize = 256;
                    let mut redraw = self.handle_message(msg);
                    let mut drained = 0usize;
                    while drained < MAX_DRAIN {
                        let Ok(next) = rx.try_recv() else { break };
                        drained += 1;
                        redraw |= self.handle_message(next);
                    }
                    self.sync_input_mode();
                    needs_redraw = redraw;
                }

                _ = toast_tick.tick() => {
                    needs_redraw = self.toast.tick();
                    needs_redraw |= self.reap_players();
                }
            }
        }
        Ok(())
    }

    // ── Message handling ──────────────────────────────────────────────────────

    /// Returns true when the screen needs a redraw.
    fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                if key.kind == KeyEventKind::Release {
                    return false;
                }
                for action in self.handle_key(key) {
                    self.dispatch(action);
                }
            }
            AppMessage::Event(Event::Mouse(mouse)) => {
                for action in self.handle_mouse(mouse) {
                    self.dispatch(action);
                }
            }
            AppMessage::Event(Event::Resize(..)) => {}
            AppMessage::Event(_) => return false,

            AppMessage::Stations { generation, result } => {
                if generation != self.stations_gen {
                    debug!("dropping stale station index (gen {})", generation);
                    return false;
                }
                self.state.loading.stations = false;
                match result {
                    Ok(stations) => {
                        info!("{} stations for {:?}", stations.len(), self.state.target);
                        if stations.is_empty() {
                            self.toast.warning(format!(
                                "no stations on {} {}",
                                self.state.target.environment, self.state.target.version
                            ));
                        }
                        self.station_list.set_stations(&stations);
                        self.restore_station();
                    }
                    Err(e) => {
                        self.station_list.clear();
                        self.toast.error(format!("stations: {}", e));
                    }
                }
            }

            AppMessage::StationDetails { generation, result } => {
                if generation != self.station_gen {
                    return false;
                }
                match result {
                    Ok(station) => self.on_station_details(station),
                    Err(e) => self.toast.error(format!("station details: {}", e)),
                }
            }

            AppMessage::StationLogo { generation, path } => {
                if generation != self.station_gen {
                    return false;
                }
                self.state.station_logo = path;
            }

            AppMessage::Podcasts { generation, result } => {
                if generation != self.station_gen {
                    return false;
                }
                self.state.loading.podcasts = false;
                match result {
                    Ok(podcasts) => {
                        self.start_prefetch(&podcasts);
                        self.podcast_list.set_podcasts(podcasts);
                    }
                    Err(e) => self.toast.warning(format!("podcasts: {}", e)),
                }
            }

            AppMessage::Episodes { generation, result } => {
                if generation != self.podcast_gen {
                    return false;
                }
                self.state.loading.episodes = false;
                match result {
                    Ok(episodes) => self.episode_list.set_episodes(episodes),
                    Err(e) => self.toast.warning(format!("episodes: {}", e)),
                }
            }

            AppMessage::Prefetched(result) => {
                if result.batch != self.prefetch_batch {
                    return false;
                }
                self.state.prefetch_pending = self.state.prefetch_pending.saturating_sub(1);
                if let Some(path) = result.image {
                    self.state.images.insert(result.podcast_id, path);
                }
            }

            AppMessage::PrefetchDone { batch, report } => {
                if batch != self.prefetch_batch {
                    return false;
                }
                info!(
                    "prefetch batch {}: {} fetched, {} failed, {} cancelled",
                    batch, report.fetched, report.failed, report.cancelled
                );
                self.state.prefetch_pending = 0;
                self.prefetch_task = None;
            }
        }
        true
    }

    fn on_station_details(&mut self, station: Station) {
        match station.stream_url.as_deref() {
            Some(url) => self.deck.load(PlayerSlot::Station, url),
            None => {
                self.deck.player_mut(PlayerSlot::Station).unload();
                self.toast.info(format!("{} has no stream", station.callsign));
            }
        }
        self.sync_players();

        if let Some(logo_url) = station.logo_url.clone() {
            let images = self.images.clone();
            let tx = self.tx.clone();
            let generation = self.station_gen;
            tokio::spawn(async move {
                let path = images.fetch_or_none(&logo_url).await;
                let _ = tx.send(AppMessage::StationLogo { generation, path }).await;
            });
        }

        if matches!(self.state.details, Details::Empty) {
            self.state.details = Details::Station(station.clone());
        }
        self.state.station = Some(station);
    }

    fn restore_station(&mut self) {
        let Some(callsign) = self.restore_callsign.take() else {
            return;
        };
        match self.station_list.select_callsign(&callsign) {
            Some(summary) => {
                debug!("restoring station {}", callsign);
                self.dispatch(Action::LoadStation(summary));
            }
            None => debug!("saved station {} not listed", callsign),
        }
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            return vec![Action::Quit];
        }

        // Help overlay captures all keys when visible
        if self.help_overlay.visible {
            return self.help_overlay.handle_key(key, &self.state);
        }

        // Tab / Shift-Tab always cycle focus, even while a filter is open
        match key.code {
            KeyCode::Tab => return vec![Action::FocusNext],
            KeyCode::BackTab => return vec![Action::FocusPrev],
            _ => {}
        }

        if self.state.input_mode == InputMode::Normal {
            match key.code {
                KeyCode::Char('q') => return vec![Action::Quit],
                KeyCode::Char('?') => return vec![Action::ToggleHelp],
                KeyCode::Char('e') => return vec![Action::CycleEnvironment],
                KeyCode::Char('v') => return vec![Action::ToggleApiVersion],
                KeyCode::Char('r') => return vec![Action::ReloadStations],
                KeyCode::Char('s') => return vec![Action::TogglePlayer(PlayerSlot::Station)],
                KeyCode::Char('p') => return vec![Action::TogglePlayer(PlayerSlot::Episode)],
                KeyCode::Char('y') => return vec![Action::CopyStreamUrl],
                _ => {}
            }
        }

        // Dispatch to the focused component
        let s = &self.state;
        match self.focus.current() {
            Some(ComponentId::StationList) => self.station_list.handle_key(key, s),
            Some(ComponentId::PodcastList) => self.podcast_list.handle_key(key, s),
            Some(ComponentId::EpisodeList) => self.episode_list.handle_key(key, s),
            Some(ComponentId::Details) => self.details.handle_key(key, s),
            _ => vec![],
        }
    }

    // ── Mouse handling ────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        let is_click = matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        );
        if !is_click || self.help_overlay.visible {
            return vec![];
        }

        fn hit(r: Rect, col: u16, row: u16) -> bool {
            r.width > 0
                && r.height > 0
                && col >= r.x
                && col < r.x + r.width
                && row >= r.y
                && row < r.y + r.height
        }

        let areas = self.pane_areas;
        let s = &self.state;
        let (col, row) = (event.column, event.row);

        let (id, mut actions) = if hit(areas.stations, col, row) {
            (ComponentId::StationList, self.station_list.handle_mouse(event, areas.stations, s))
        } else if hit(areas.podcasts, col, row) {
            (ComponentId::PodcastList, self.podcast_list.handle_mouse(event, areas.podcasts, s))
        } else if hit(areas.episodes, col, row) {
            (ComponentId::EpisodeList, self.episode_list.handle_mouse(event, areas.episodes, s))
        } else if hit(areas.details, col, row) {
            (ComponentId::Details, self.details.handle_mouse(event, areas.details, s))
        } else {
            return vec![];
        };

        // Focus follows the click
        if !self.focus.is_focused(id) {
            actions.insert(0, Action::FocusPane(id));
        }
        actions
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        // Broadcast to all components first so they can reset local state
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.station_list.on_action(&action, s));
            out.extend(self.podcast_list.on_action(&action, s));
            out.extend(self.episode_list.on_action(&action, s));
            out.extend(self.details.on_action(&action, s));
            out.extend(self.help_overlay.on_action(&action, s));
            out
        };

        self.apply_action(action);

        // Depth-limited to one level
        for a in secondary {
            self.apply_action(a);
        }
    }

    fn apply_action(&mut self, action: Action) {
        debug!("apply_action: {:?}", action);
        match action {
            // ── Catalog ───────────────────────────────────────────────────────
            Action::CycleEnvironment => {
                let target = self.state.target;
                self.set_target(Target::new(target.environment.next(), target.version));
            }
            Action::ToggleApiVersion => {
                let target = self.state.target;
                self.set_target(Target::new(target.environment, target.version.toggle()));
            }
            Action::ReloadStations => self.reload_stations(),
            Action::LoadStation(summary) => self.load_station(summary),
            Action::LoadPodcast(podcast) => self.load_podcast(podcast),
            Action::LoadEpisode(episode) => self.load_episode(episode),

            // ── Playback ──────────────────────────────────────────────────────
            Action::TogglePlayer(slot) => {
                match self.deck.toggle(slot) {
                    Ok(PlayerState::NotReady) => {
                        let what = match slot {
                            PlayerSlot::Station => "station",
                            PlayerSlot::Episode => "episode",
                        };
                        self.toast.info(format!("no {} media loaded", what));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("mpv failed to start: {}", e);
                        self.toast.error(format!("mpv: {}", e));
                    }
                }
                self.sync_players();
            }
            Action::CopyStreamUrl => self.copy_stream_url(),

            // ── Navigation ────────────────────────────────────────────────────
            Action::FocusNext => {
                self.focus.next();
            }
            Action::FocusPrev => {
                self.focus.prev();
            }
            Action::FocusPane(id) => self.focus.set(id),

            // ── Filter ────────────────────────────────────────────────────────
            Action::OpenFilter => self.state.input_mode = InputMode::Filter,
            Action::CloseFilter => self.state.input_mode = InputMode::Normal,

            // ── System ────────────────────────────────────────────────────────
            Action::ToggleHelp => {}
            Action::Quit => self.should_quit = true,
        }
    }

    // ── Catalog flows ─────────────────────────────────────────────────────────

    fn set_target(&mut self, target: Target) {
        info!("target: {} {}", target.environment, target.version);
        self.state.target = target;
        self.session.environment = target.environment;
        self.session.api_version = target.version;
        self.session.station_callsign = None;
        self.toast.info(format!("{} · {}", target.environment, target.version));
        self.reload_stations();
    }

    fn reload_stations(&mut self) {
        self.unload_station();
        self.station_list.clear();
        self.state.loading.stations = true;
        self.stations_gen += 1;

        let client = self.client.clone();
        let tx = self.tx.clone();
        let target = self.state.target;
        let generation = self.stations_gen;
        tokio::spawn(async move {
            let result = client.try_station_ids(target).await.map_err(|e| describe(&e));
            let _ = tx.send(AppMessage::Stations { generation, result }).await;
        });
    }

    /// Stop both players and forget everything below the station index.
    fn unload_station(&mut self) {
        self.deck.player_mut(PlayerSlot::Station).unload();
        self.deck.player_mut(PlayerSlot::Episode).unload();
        self.sync_players();
        self.abort_prefetch();
        self.state.clear_station();
        self.podcast_list.clear();
        self.episode_list.clear();
        self.station_gen += 1;
        self.podcast_gen += 1;
    }

    fn load_station(&mut self, summary: StationSummary) {
        info!("loading station {} ({})", summary.callsign, summary.id);
        self.unload_station();
        self.session.station_callsign = Some(summary.callsign.clone());
        self.state.loading.podcasts = true;

        let target = self.state.target;
        let generation = self.station_gen;

        let client = self.client.clone();
        let tx = self.tx.clone();
        let id = summary.id.clone();
        tokio::spawn(async move {
            let result = client.try_station(&id, target).await.map_err(|e| describe(&e));
            let _ = tx.send(AppMessage::StationDetails { generation, result }).await;
        });

        let client = self.client.clone();
        let tx = self.tx.clone();
        let id = summary.id;
        tokio::spawn(async move {
            let result = client.try_podcasts(&id, target).await.map_err(|e| describe(&e));
            let _ = tx.send(AppMessage::Podcasts { generation, result }).await;
        });
    }

    fn load_podcast(&mut self, podcast: Podcast) {
        info!("loading podcast {} ({})", podcast.title, podcast.id);
        self.deck.player_mut(PlayerSlot::Episode).unload();
        self.sync_players();
        self.episode_list.clear();
        self.state.episode = None;
        self.state.loading.episodes = true;
        self.podcast_gen += 1;

        let client = self.client.clone();
        let tx = self.tx.clone();
        let target = self.state.target;
        let generation = self.podcast_gen;
        let id = podcast.id.clone();
        tokio::spawn(async move {
            let result = client.try_episodes(&id, target).await.map_err(|e| describe(&e));
            let _ = tx.send(AppMessage::Episodes { generation, result }).await;
        });

        self.state.details = Details::Podcast(podcast.clone());
        self.state.podcast = Some(podcast);
    }

    fn load_episode(&mut self, episode: Episode) {
        match episode.audio_url.as_deref() {
            Some(url) => self.deck.load(PlayerSlot::Episode, url),
            None => {
                self.deck.player_mut(PlayerSlot::Episode).unload();
                self.toast.warning(format!("\"{}\" has no audio", episode.title));
            }
        }
        self.sync_players();
        self.state.details = Details::Episode(episode.clone());
        self.state.episode = Some(episode);
    }

    // ── Prefetch ──────────────────────────────────────────────────────────────

    /// Start a new image batch for `podcasts`. Podcasts without an image URL
    /// in the listing are looked up by the pool workers.
    fn start_prefetch(&mut self, podcasts: &[Podcast]) {
        self.abort_prefetch();
        if podcasts.is_empty() {
            return;
        }
        self.prefetch_batch += 1;
        self.state.prefetch_pending = podcasts.len();

        let jobs: Vec<PrefetchJob> = podcasts
            .iter()
            .map(|p| PrefetchJob {
                podcast_id: p.id.clone(),
                image_url: p.image_url.clone(),
            })
            .collect();
        let batch = self.prefetch_batch;
        let tx = self.tx.clone();
        let workers = self.pool.spawn_resolving(
            batch,
            jobs,
            self.client.clone(),
            self.state.target,
            self.prefetch_tx.clone(),
        );

        self.prefetch_task = Some(tokio::spawn(async move {
            // Aborting this task drops the batch, which aborts its workers.
            let report = workers.join().await;
            let _ = tx.send(AppMessage::PrefetchDone { batch, report }).await;
        }));
    }

    fn abort_prefetch(&mut self) {
        if let Some(task) = self.prefetch_task.take() {
            debug!("aborting prefetch batch {}", self.prefetch_batch);
            task.abort();
        }
        self.state.prefetch_pending = 0;
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Notice players whose stream ended by itself.
    fn reap_players(&mut self) -> bool {
        let ended = self.deck.reap();
        for slot in &ended {
            let what = match slot {
                PlayerSlot::Station => "station",
                PlayerSlot::Episode => "episode",
            };
            self.toast.info(format!("{} playback ended", what));
        }
        self.sync_players();
        !ended.is_empty()
    }

    fn sync_players(&mut self) {
        self.state.station_player = self.deck.player(PlayerSlot::Station).state();
        self.state.episode_player = self.deck.player(PlayerSlot::Episode).state();
    }

    /// Input mode follows whichever pane has focus.
    fn sync_input_mode(&mut self) {
        let filtering = match self.focus.current() {
            Some(ComponentId::StationList) => self.station_list.is_filtering(),
            Some(ComponentId::PodcastList) => self.podcast_list.is_filtering(),
            Some(ComponentId::EpisodeList) => self.episode_list.is_filtering(),
            _ => false,
        };
        self.state.input_mode = if filtering {
            InputMode::Filter
        } else {
            InputMode::Normal
        };
    }

    /// The playing stream if any, else the loaded station, else the episode.
    fn current_stream_url(&self) -> Option<String> {
        [PlayerSlot::Station, PlayerSlot::Episode]
            .into_iter()
            .map(|slot| self.deck.player(slot))
            .find(|p| p.is_playing())
            .and_then(|p| p.media().map(str::to_string))
            .or_else(|| self.state.station.as_ref().and_then(|s| s.stream_url.clone()))
            .or_else(|| self.state.episode.as_ref().and_then(|e| e.audio_url.clone()))
    }

    fn copy_stream_url(&mut self) {
        let Some(url) = self.current_stream_url() else {
            self.toast.info("nothing to copy");
            return;
        };
        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(url.clone())) {
            Ok(()) => self.toast.success(format!("copied {}", url)),
            Err(e) => {
                warn!("clipboard: {}", e);
                self.toast.error(format!("clipboard: {}", e));
            }
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.header.draw(frame, outer[0], false, &self.state);
        status_bar::draw_keys_bar(frame, outer[2], self.state.input_mode, &self.state.palette);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(28), Constraint::Percentage(72)])
            .split(outer[1]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body[1]);
        let lists = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(right[0]);

        self.pane_areas = PaneAreas {
            stations: body[0],
            podcasts: lists[0],
            episodes: lists[1],
            details: right[1],
        };
        let areas = self.pane_areas;
        let s = &self.state;
        let f = |id| self.focus.is_focused(id);
        let (fs, fp, fe, fd) = (
            f(ComponentId::StationList),
            f(ComponentId::PodcastList),
            f(ComponentId::EpisodeList),
            f(ComponentId::Details),
        );
        self.station_list.draw(frame, areas.stations, fs, s);
        self.podcast_list.draw(frame, areas.podcasts, fp, s);
        self.episode_list.draw(frame, areas.episodes, fe, s);
        self.details.draw(frame, areas.details, fd, s);

        self.help_overlay.draw(frame, area, false, s);
        self.toast.draw(frame, area);
    }
}
