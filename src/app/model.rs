//! Application model: the `App` state object and its event handlers.
//!
//! `App` holds the section, query, both source lists, the projected active
//! playlist, the playback cursor and the transport phase. `handle` is the
//! only entry point; it returns the effects the runtime must carry out.

use std::time::Duration;

use log::{debug, info, warn};

use crate::audio::{AudioCmd, PlaybackHandle, SinkEvent};
use crate::backend::{BackendError, BackendJob, BackendReply, PlaybackGrant};
use crate::library::{Section, Track, TrackId};

use super::cursor::{NavTarget, PlaybackCursor, PlaybackState};
use super::projector::{ActivePlaylist, project};
use super::types::{Command, Direction, Effect, Event, Notice, NowPlaying, Phase, Trigger};

/// Request/apply counters for one catalog list.
#[derive(Debug, Default, Clone, Copy)]
struct ListSeq {
    issued: u64,
    applied: u64,
}

impl ListSeq {
    fn next(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Whether a reply for `seq` is newer than anything applied so far.
    /// Marks it applied when it is.
    fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.applied {
            return false;
        }
        self.applied = seq;
        true
    }
}

/// The transition currently being authorized or loaded.
#[derive(Debug, Clone)]
struct Pending {
    generation: u64,
    track: Track,
    trigger: Trigger,
}

/// The main application model.
pub struct App {
    section: Section,
    query: String,
    library: Vec<Track>,
    favorites: Vec<Track>,
    active: ActivePlaylist,
    cursor: PlaybackCursor,
    phase: Phase,
    generation: u64,
    pending: Option<Pending>,
    now_playing: Option<NowPlaying>,
    failure_streak: usize,
    library_seq: ListSeq,
    favorites_seq: ListSeq,
    notice: Option<Notice>,
    playback_handle: Option<PlaybackHandle>,
    restart_threshold: Duration,
}

impl App {
    pub fn new(section: Section, restart_threshold: Duration) -> Self {
        let mut cursor = PlaybackCursor::default();
        cursor.rebind(section);
        Self {
            section,
            query: String::new(),
            library: Vec::new(),
            favorites: Vec::new(),
            active: ActivePlaylist::default(),
            cursor,
            phase: Phase::Idle,
            generation: 0,
            pending: None,
            now_playing: None,
            failure_streak: 0,
            library_seq: ListSeq::default(),
            favorites_seq: ListSeq::default(),
            notice: None,
            playback_handle: None,
            restart_threshold,
        }
    }

    /// Effects to run once at startup: load both lists.
    pub fn start(&mut self) -> Vec<Effect> {
        let mut fx = Vec::new();
        self.refresh_all(&mut fx);
        fx
    }

    /// Where the sink publishes elapsed time.
    pub fn set_playback_handle(&mut self, handle: PlaybackHandle) {
        self.playback_handle = Some(handle);
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn active(&self) -> &ActivePlaylist {
        &self.active
    }

    pub fn playback_state(&self) -> &PlaybackState {
        self.cursor.state()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn now_playing(&self) -> Option<&NowPlaying> {
        self.now_playing.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn failure_streak(&self) -> usize {
        self.failure_streak
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        let mut fx = Vec::new();
        match event {
            Event::User(cmd) => self.on_command(cmd, &mut fx),
            Event::Backend(reply) => self.on_backend(reply, &mut fx),
            Event::Sink(ev) => self.on_sink(ev, &mut fx),
        }
        fx
    }

    fn on_command(&mut self, cmd: Command, fx: &mut Vec<Effect>) {
        match cmd {
            Command::SelectSection(section) => {
                self.section = section;
                self.reproject();
                self.request_list(section, fx);
                fx.push(Effect::ShowPlaylist);
            }
            Command::SetQuery(query) => {
                self.query = query;
                self.reproject();
                fx.push(Effect::ShowPlaylist);
            }
            Command::Play(id) => match self.find_track(id) {
                Some(track) => {
                    if self.phase == Phase::Transitioning {
                        debug!("play {id} supersedes generation {}", self.generation);
                    }
                    self.begin_transition(track, Trigger::User, fx);
                }
                None => self.notify(Notice::error(format!("no track with id {id}")), fx),
            },
            Command::Next => self.advance(Direction::Next, Trigger::User, fx),
            Command::Previous => self.advance(Direction::Previous, Trigger::User, fx),
            Command::TogglePause => match self.phase {
                Phase::Playing => {
                    self.phase = Phase::Paused;
                    fx.push(Effect::Audio(AudioCmd::TogglePause));
                }
                Phase::Paused => {
                    self.phase = Phase::Playing;
                    fx.push(Effect::Audio(AudioCmd::TogglePause));
                }
                Phase::Idle | Phase::Transitioning => {
                    debug!("toggle pause ignored while {:?}", self.phase);
                }
            },
            Command::ToggleFavorite(id) => {
                match id.or_else(|| self.now_playing.as_ref().map(|n| n.id)) {
                    Some(id) => fx.push(Effect::Backend(BackendJob::ToggleFavorite { id })),
                    None => self.notify(Notice::info("nothing is playing"), fx),
                }
            }
            Command::Delete(id) => {
                if self.cursor.current() == Some(id) {
                    info!("deleting the current track {id}; stopping playback");
                    self.cursor.clear();
                    self.generation += 1;
                    self.pending = None;
                    self.phase = Phase::Idle;
                    self.now_playing = None;
                    fx.push(Effect::Audio(AudioCmd::Stop));
                }
                fx.push(Effect::Backend(BackendJob::DeleteTrack { id }));
            }
            Command::Refresh => self.refresh_all(fx),
            Command::List => fx.push(Effect::ShowPlaylist),
            Command::Quit => fx.push(Effect::Quit),
        }
    }

    fn on_backend(&mut self, reply: BackendReply, fx: &mut Vec<Effect>) {
        match reply {
            BackendReply::Library { seq, result } => {
                if !self.library_seq.accept(seq) {
                    debug!("dropping stale library reply {seq}");
                    return;
                }
                match result {
                    Ok(tracks) => {
                        self.library = tracks;
                        if self.section == Section::Library && self.reproject() {
                            fx.push(Effect::ShowPlaylist);
                        }
                    }
                    Err(e) => self.report("loading the library", e, fx),
                }
            }
            BackendReply::Favorites { seq, result } => {
                if !self.favorites_seq.accept(seq) {
                    debug!("dropping stale favorites reply {seq}");
                    return;
                }
                match result {
                    Ok(tracks) => {
                        self.favorites = tracks;
                        if self.section == Section::Favorites && self.reproject() {
                            fx.push(Effect::ShowPlaylist);
                        }
                    }
                    Err(e) => self.report("loading favorites", e, fx),
                }
            }
            BackendReply::Playback {
                generation,
                id,
                result,
            } => self.on_playback_reply(generation, id, result, fx),
            BackendReply::FavoriteState { id, result } => match result {
                Ok(favorite) => self.set_favorite_flag(id, favorite),
                Err(e) => self.report("checking favorite", e, fx),
            },
            BackendReply::FavoriteToggled { id, result } => match result {
                Ok(favorite) => {
                    self.set_favorite_flag(id, favorite);
                    let message = if favorite {
                        format!("track {id} added to favorites")
                    } else {
                        format!("track {id} removed from favorites")
                    };
                    self.notify(Notice::info(message), fx);
                    self.request_list(Section::Favorites, fx);
                }
                Err(e) => self.report("toggling favorite", e, fx),
            },
            BackendReply::Deleted { id, result } => match result {
                Ok(()) => {
                    self.notify(Notice::info(format!("track {id} deleted")), fx);
                    self.refresh_all(fx);
                }
                Err(BackendError::NotFound) => {
                    self.notify(Notice::info(format!("track {id} was already gone")), fx);
                    self.refresh_all(fx);
                }
                Err(e) => self.report("deleting", e, fx),
            },
        }
    }

    fn on_playback_reply(
        &mut self,
        generation: u64,
        id: TrackId,
        result: Result<PlaybackGrant, BackendError>,
        fx: &mut Vec<Effect>,
    ) {
        let pending = match self.pending.as_ref() {
            Some(p) if p.generation == generation && generation == self.generation => p.clone(),
            _ => {
                debug!("ignoring playback reply for {id} (generation {generation})");
                return;
            }
        };

        match result {
            Ok(grant) => {
                let track = pending.track;
                info!("authorized {} ({:?}), loading stream", track.id, pending.trigger);
                self.now_playing = Some(NowPlaying {
                    id: track.id,
                    title: grant.title.unwrap_or(track.title),
                    artist: grant.artist.unwrap_or(track.artist),
                    cover: grant.cover.unwrap_or(track.cover),
                    favorite: None,
                });
                fx.push(Effect::Audio(AudioCmd::Load {
                    generation,
                    url: grant.stream_url,
                }));
                fx.push(Effect::Backend(BackendJob::CheckFavorite { id: track.id }));
            }
            Err(e) => self.playback_failed(id, e, fx),
        }
    }

    fn on_sink(&mut self, ev: SinkEvent, fx: &mut Vec<Effect>) {
        match ev {
            SinkEvent::Started { generation } => {
                if generation != self.generation {
                    debug!("ignoring start of stale generation {generation}");
                    return;
                }
                self.pending = None;
                self.phase = Phase::Playing;
                self.failure_streak = 0;
                if let Some(np) = &self.now_playing {
                    info!("playing {} \"{}\"", np.id, np.title);
                }
            }
            SinkEvent::Ended { generation } => {
                if generation != self.generation || self.phase == Phase::Transitioning {
                    debug!("ignoring end of generation {generation}");
                    return;
                }
                self.phase = Phase::Idle;
                self.advance(Direction::Next, Trigger::Ended, fx);
            }
            SinkEvent::Error { generation, reason } => {
                if generation != self.generation {
                    debug!("ignoring sink error of stale generation {generation}: {reason}");
                    return;
                }
                let id = self
                    .pending
                    .as_ref()
                    .map(|p| p.track.id)
                    .or(self.cursor.current());
                warn!("sink error for generation {generation}: {reason}");
                self.pending = None;
                self.phase = Phase::Idle;
                self.now_playing = None;
                let message = match id {
                    Some(id) => format!("could not play track {id}: {reason}"),
                    None => format!("playback error: {reason}"),
                };
                self.skip_after_failure(message, fx);
            }
        }
    }

    /// Move to the neighbouring track in the active playlist.
    fn advance(&mut self, direction: Direction, trigger: Trigger, fx: &mut Vec<Effect>) {
        if self.phase == Phase::Transitioning {
            debug!("dropping {direction:?} ({trigger:?}) while transitioning");
            return;
        }
        if !self.cursor.is_bound_to(self.section) {
            debug!("cursor bound to another section; rebinding to {}", self.section);
            self.cursor.rebind(self.section);
        }
        self.reproject();

        let target = self.cursor.decide(
            &self.active,
            direction,
            self.elapsed(),
            self.restart_threshold,
        );
        match target {
            NavTarget::Nothing => debug!("{direction:?}: nothing to play"),
            NavTarget::Restart => {
                if self.phase == Phase::Idle {
                    let current = self
                        .cursor
                        .current()
                        .and_then(|id| self.active.position(id))
                        .and_then(|i| self.active.get(i))
                        .cloned();
                    if let Some(track) = current {
                        self.begin_transition(track, trigger, fx);
                    }
                } else {
                    self.phase = Phase::Playing;
                    fx.push(Effect::Audio(AudioCmd::Restart));
                }
            }
            NavTarget::Go(track) => self.begin_transition(track, trigger, fx),
        }
    }

    fn begin_transition(&mut self, track: Track, trigger: Trigger, fx: &mut Vec<Effect>) {
        if trigger == Trigger::User {
            self.failure_streak = 0;
        }
        if let Some(old) = self.pending.take() {
            // The sink may already be downloading the superseded stream.
            debug!("cancelling load of generation {}", old.generation);
            fx.push(Effect::Audio(AudioCmd::Stop));
        }
        self.generation += 1;
        let generation = self.generation;
        let id = track.id;
        self.cursor.move_to(id, self.section);
        self.phase = Phase::Transitioning;
        self.pending = Some(Pending {
            generation,
            track,
            trigger,
        });
        info!("{trigger:?}: requesting playback of {id} (generation {generation})");
        fx.push(Effect::Backend(BackendJob::RequestPlayback { generation, id }));
    }

    fn playback_failed(&mut self, id: TrackId, err: BackendError, fx: &mut Vec<Effect>) {
        warn!("playback of {id} failed: {err}");
        self.pending = None;
        self.phase = Phase::Idle;
        self.now_playing = None;
        fx.push(Effect::Audio(AudioCmd::Stop));

        match err {
            BackendError::Unauthorized => {
                self.notify(Notice::error("session expired; log in again"), fx);
                fx.push(Effect::Reauthenticate);
            }
            BackendError::NotFound => {
                self.notify(Notice::error(format!("track {id} no longer exists")), fx);
                self.refresh_all(fx);
            }
            BackendError::Unplayable(reason) => {
                self.skip_after_failure(format!("could not play track {id}: {reason}"), fx);
            }
            other => {
                self.notify(Notice::error(format!("could not play track {id}: {other}")), fx);
            }
        }
    }

    /// Record a failed track and move on, unless every visible track has
    /// already failed in a row.
    fn skip_after_failure(&mut self, message: String, fx: &mut Vec<Effect>) {
        self.failure_streak += 1;
        self.reproject();
        if self.failure_streak >= self.active.len() {
            warn!(
                "{} consecutive failures in {} tracks; stopping",
                self.failure_streak,
                self.active.len()
            );
            self.failure_streak = 0;
            self.notify(
                Notice::error(format!("{message}; nothing playable in {}", self.section)),
                fx,
            );
            return;
        }
        self.notify(Notice::error(message), fx);
        self.advance(Direction::Next, Trigger::Failure, fx);
    }

    /// Handle a failed non-playback request.
    fn report(&mut self, context: &str, err: BackendError, fx: &mut Vec<Effect>) {
        warn!("{context} failed: {err}");
        if err.is_unauthorized() {
            self.notify(Notice::error("session expired; log in again"), fx);
            fx.push(Effect::Reauthenticate);
        } else {
            self.notify(Notice::error(format!("{context} failed: {err}")), fx);
        }
    }

    fn notify(&mut self, notice: Notice, fx: &mut Vec<Effect>) {
        self.notice = Some(notice.clone());
        fx.push(Effect::Notify(notice));
    }

    fn set_favorite_flag(&mut self, id: TrackId, favorite: bool) {
        if let Some(np) = self.now_playing.as_mut().filter(|np| np.id == id) {
            np.favorite = Some(favorite);
        }
    }

    fn refresh_all(&mut self, fx: &mut Vec<Effect>) {
        self.request_list(Section::Library, fx);
        self.request_list(Section::Favorites, fx);
    }

    fn request_list(&mut self, section: Section, fx: &mut Vec<Effect>) {
        let job = match section {
            Section::Library => BackendJob::FetchLibrary {
                seq: self.library_seq.next(),
            },
            Section::Favorites => BackendJob::FetchFavorites {
                seq: self.favorites_seq.next(),
            },
        };
        fx.push(Effect::Backend(job));
    }

    /// Recompute the active playlist. Returns whether its ids changed.
    fn reproject(&mut self) -> bool {
        let next = project(self.section, &self.library, &self.favorites, &self.query);
        if next.same_ids(&self.active) {
            self.active = next;
            return false;
        }
        self.active = next;
        if let Some(id) = self.cursor.current() {
            if !self.active.contains(id) {
                debug!("track {id} is not visible; next navigation starts from the top");
            }
        }
        true
    }

    /// Look a track up in the visible list first, then in both sources.
    fn find_track(&self, id: TrackId) -> Option<Track> {
        self.active
            .tracks()
            .iter()
            .chain(self.library.iter())
            .chain(self.favorites.iter())
            .find(|t| t.id == id)
            .cloned()
    }

    /// Elapsed time of the current generation's track. Anything the sink
    /// reports for another generation counts as nothing played.
    fn elapsed(&self) -> Duration {
        self.playback_handle
            .as_ref()
            .and_then(|h| h.lock().ok())
            .filter(|info| info.generation == Some(self.generation))
            .map(|info| info.elapsed)
            .unwrap_or_default()
    }
}
