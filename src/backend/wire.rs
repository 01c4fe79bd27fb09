//! JSON payloads exchanged with the betawave server.

use serde::{Deserialize, Serialize};

use crate::library::{Track, TrackId, cover_from_url};

use super::types::{BackendError, PlaybackGrant};

/// Body of every per-track POST endpoint.
#[derive(Debug, Serialize)]
pub(super) struct SongRequest {
    pub song_id: TrackId,
}

/// One entry of `/api/songs` or `/api/favorites`.
#[derive(Debug, Deserialize)]
pub(super) struct SongPayload {
    pub id: TrackId,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl SongPayload {
    pub fn into_track(self, artist: &str, placeholder_cover: &str) -> Track {
        let cover = cover_from_url(self.url.as_deref(), placeholder_cover);
        Track {
            id: self.id,
            title: self.name,
            artist: artist.to_string(),
            cover,
        }
    }
}

/// Response of `/api/play`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct PlayPayload {
    pub audio_stream_url: Option<String>,
    #[serde(alias = "name", alias = "song_name")]
    pub title: Option<String>,
    pub artist: Option<String>,
    pub cover: Option<String>,
    pub error: Option<String>,
}

impl PlayPayload {
    pub fn into_grant(self) -> Result<PlaybackGrant, BackendError> {
        match self.audio_stream_url.filter(|u| !u.trim().is_empty()) {
            Some(stream_url) => Ok(PlaybackGrant {
                stream_url,
                title: non_empty(self.title),
                artist: non_empty(self.artist),
                cover: non_empty(self.cover),
            }),
            None => Err(BackendError::Unplayable(
                self.error
                    .unwrap_or_else(|| "no stream url in response".to_string()),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct FavoritePayload {
    pub is_favorite: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct SuccessPayload {
    pub success: bool,
    pub error: Option<String>,
}

/// Error body the server attaches to non-2xx responses. A failed `/api/play`
/// also carries the track's source page as `fallback_url`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ErrorPayload {
    pub error: Option<String>,
    pub fallback_url: Option<String>,
}

impl ErrorPayload {
    pub fn into_message(self) -> Option<String> {
        match (non_empty(self.error), non_empty(self.fallback_url)) {
            (Some(error), Some(url)) => Some(format!("{error} (source: {url})")),
            (Some(error), None) => Some(error),
            (None, Some(url)) => Some(format!("source: {url}")),
            (None, None) => None,
        }
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
