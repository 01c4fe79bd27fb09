//! `Backend` implementation over the betawave HTTP API, backed by `ureq`.

use std::error::Error as _;
use std::io;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::BackendSettings;
use crate::library::{Track, TrackId};

use super::types::{Backend, BackendError, PlaybackGrant};
use super::wire::{ErrorPayload, FavoritePayload, PlayPayload, SongPayload, SongRequest, SuccessPayload};

/// Which endpoint family a response came from; server errors mean different
/// things for playback than for list/favorite calls.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum CallKind {
    Plain,
    Playback,
}

pub struct HttpBackend {
    agent: ureq::Agent,
    base_url: String,
    session_cookie: Option<String>,
    display_artist: String,
    placeholder_cover: String,
    request_timeout: Duration,
    play_timeout: Duration,
}

impl HttpBackend {
    pub fn new(settings: &BackendSettings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(settings.connect_timeout())
            // The server answers unauthenticated calls with a redirect to its
            // login page. Keep the redirect visible so it maps to Unauthorized.
            .redirects(0)
            .build();

        Self {
            agent,
            base_url: settings.base_url.trim().trim_end_matches('/').to_string(),
            session_cookie: settings
                .session_cookie
                .clone()
                .filter(|c| !c.trim().is_empty()),
            display_artist: settings.display_artist.clone(),
            placeholder_cover: settings.placeholder_cover.clone(),
            request_timeout: settings.request_timeout(),
            play_timeout: settings.play_timeout(),
        }
    }

    pub(super) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: ureq::Request) -> ureq::Request {
        match &self.session_cookie {
            Some(cookie) => request.set("Cookie", &format!("session={cookie}")),
            None => request,
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let request = self
            .authorized(self.agent.get(&self.endpoint(path)))
            .timeout(self.request_timeout);
        read_json(request.call(), CallKind::Plain)
    }

    fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
        kind: CallKind,
    ) -> Result<T, BackendError> {
        let request = self
            .authorized(self.agent.post(&self.endpoint(path)))
            .timeout(timeout);
        read_json(request.send_json(body), kind)
    }

    fn tracks(&self, songs: Vec<SongPayload>) -> Vec<Track> {
        songs
            .into_iter()
            .map(|s| s.into_track(&self.display_artist, &self.placeholder_cover))
            .collect()
    }
}

impl Backend for HttpBackend {
    fn fetch_library(&self) -> Result<Vec<Track>, BackendError> {
        let songs: Vec<SongPayload> = self.get_json("/api/songs")?;
        Ok(self.tracks(songs))
    }

    fn fetch_favorites(&self) -> Result<Vec<Track>, BackendError> {
        let songs: Vec<SongPayload> = self.get_json("/api/favorites")?;
        Ok(self.tracks(songs))
    }

    fn is_favorite(&self, id: TrackId) -> Result<bool, BackendError> {
        let payload: FavoritePayload = self.post_json(
            "/api/is_favorite",
            &SongRequest { song_id: id },
            self.request_timeout,
            CallKind::Plain,
        )?;
        Ok(payload.is_favorite)
    }

    fn toggle_favorite(&self, id: TrackId) -> Result<bool, BackendError> {
        let payload: FavoritePayload = self.post_json(
            "/api/toggle_favorite",
            &SongRequest { song_id: id },
            self.request_timeout,
            CallKind::Plain,
        )?;
        Ok(payload.is_favorite)
    }

    fn request_playback(&self, id: TrackId) -> Result<PlaybackGrant, BackendError> {
        let payload: PlayPayload = self.post_json(
            "/api/play",
            &SongRequest { song_id: id },
            self.play_timeout,
            CallKind::Playback,
        )?;
        payload.into_grant()
    }

    fn delete_track(&self, id: TrackId) -> Result<(), BackendError> {
        let payload: SuccessPayload = self.post_json(
            "/api/delete",
            &SongRequest { song_id: id },
            self.request_timeout,
            CallKind::Plain,
        )?;
        if payload.success {
            Ok(())
        } else {
            Err(BackendError::Status(
                200,
                payload.error.unwrap_or_else(|| "delete refused".to_string()),
            ))
        }
    }
}

/// Agent used by the audio loader to download resolved streams. Unlike the
/// API agent it follows redirects, since stream hosts commonly use them.
pub fn stream_agent(settings: &BackendSettings) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(settings.connect_timeout())
        .timeout_read(settings.stream_read_timeout())
        .build()
}

fn read_json<T: DeserializeOwned>(
    result: Result<ureq::Response, ureq::Error>,
    kind: CallKind,
) -> Result<T, BackendError> {
    match result {
        Ok(response) => {
            let status = response.status();
            if (300..400).contains(&status) {
                return Err(classify_status(status, None, kind));
            }
            response
                .into_json::<T>()
                .map_err(|err| BackendError::Decode(err.to_string()))
        }
        Err(ureq::Error::Status(code, response)) => {
            let message = response
                .into_json::<ErrorPayload>()
                .ok()
                .and_then(ErrorPayload::into_message);
            Err(classify_status(code, message, kind))
        }
        Err(ureq::Error::Transport(transport)) => Err(classify_transport(&transport)),
    }
}

pub(super) fn classify_status(code: u16, message: Option<String>, kind: CallKind) -> BackendError {
    match code {
        401 | 300..=399 => BackendError::Unauthorized,
        404 => BackendError::NotFound,
        500..=599 if kind == CallKind::Playback => BackendError::Unplayable(
            message.unwrap_or_else(|| format!("server error {code}")),
        ),
        _ => BackendError::Status(code, message.unwrap_or_default()),
    }
}

fn classify_transport(transport: &ureq::Transport) -> BackendError {
    match transport.kind() {
        ureq::ErrorKind::Io | ureq::ErrorKind::ConnectionFailed if timed_out(transport) => {
            BackendError::Timeout
        }
        _ => BackendError::Network(transport.to_string()),
    }
}

/// Whether the I/O error underneath `transport` is a deadline expiring.
/// Socket read timeouts surface as `WouldBlock` on Unix.
fn timed_out(transport: &ureq::Transport) -> bool {
    let mut source = transport.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return matches!(
                io_err.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            );
        }
        source = err.source();
    }
    false
}
