use std::fmt;

use crate::library::{Track, TrackId};

/// Failure classes the engine branches on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Session missing or expired; the user has to log in again.
    Unauthorized,
    NotFound,
    /// The server could not resolve a playable stream for the track.
    Unplayable(String),
    /// Any other non-success HTTP status.
    Status(u16, String),
    Timeout,
    Network(String),
    /// The response body did not have the expected shape.
    Decode(String),
}

impl BackendError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackendError::Unauthorized)
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Unauthorized => write!(f, "not logged in"),
            BackendError::NotFound => write!(f, "track not found"),
            BackendError::Unplayable(msg) => write!(f, "track cannot be played: {msg}"),
            BackendError::Status(code, msg) if msg.is_empty() => {
                write!(f, "server returned HTTP {code}")
            }
            BackendError::Status(code, msg) => write!(f, "server returned HTTP {code}: {msg}"),
            BackendError::Timeout => write!(f, "request timed out"),
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
            BackendError::Decode(msg) => write!(f, "unexpected response: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// Result of a successful playback authorization.
///
/// Display fields are the server's view of the track at play time; `None`
/// means the server did not send that field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackGrant {
    pub stream_url: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub cover: Option<String>,
}

/// The operations the engine needs from the server.
pub trait Backend: Send + Sync {
    fn fetch_library(&self) -> Result<Vec<Track>, BackendError>;
    fn fetch_favorites(&self) -> Result<Vec<Track>, BackendError>;
    fn is_favorite(&self, id: TrackId) -> Result<bool, BackendError>;
    /// Flip membership; returns the new state.
    fn toggle_favorite(&self, id: TrackId) -> Result<bool, BackendError>;
    fn request_playback(&self, id: TrackId) -> Result<PlaybackGrant, BackendError>;
    fn delete_track(&self, id: TrackId) -> Result<(), BackendError>;
}

/// Work items sent from the engine to the backend worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendJob {
    FetchLibrary { seq: u64 },
    FetchFavorites { seq: u64 },
    RequestPlayback { generation: u64, id: TrackId },
    CheckFavorite { id: TrackId },
    ToggleFavorite { id: TrackId },
    DeleteTrack { id: TrackId },
}

impl BackendJob {
    /// Playback authorization runs on its own lane so a slow stream lookup
    /// never holds up list refreshes.
    pub fn is_playback(&self) -> bool {
        matches!(self, BackendJob::RequestPlayback { .. })
    }
}

/// Completed jobs, tagged with whatever the engine needs to detect staleness.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendReply {
    Library {
        seq: u64,
        result: Result<Vec<Track>, BackendError>,
    },
    Favorites {
        seq: u64,
        result: Result<Vec<Track>, BackendError>,
    },
    Playback {
        generation: u64,
        id: TrackId,
        result: Result<PlaybackGrant, BackendError>,
    },
    FavoriteState {
        id: TrackId,
        result: Result<bool, BackendError>,
    },
    FavoriteToggled {
        id: TrackId,
        result: Result<bool, BackendError>,
    },
    Deleted {
        id: TrackId,
        result: Result<(), BackendError>,
    },
}

/// Run one job against `backend`.
pub fn run_job<B: Backend + ?Sized>(backend: &B, job: BackendJob) -> BackendReply {
    match job {
        BackendJob::FetchLibrary { seq } => BackendReply::Library {
            seq,
            result: backend.fetch_library(),
        },
        BackendJob::FetchFavorites { seq } => BackendReply::Favorites {
            seq,
            result: backend.fetch_favorites(),
        },
        BackendJob::RequestPlayback { generation, id } => BackendReply::Playback {
            generation,
            id,
            result: backend.request_playback(id),
        },
        BackendJob::CheckFavorite { id } => BackendReply::FavoriteState {
            id,
            result: backend.is_favorite(id),
        },
        BackendJob::ToggleFavorite { id } => BackendReply::FavoriteToggled {
            id,
            result: backend.toggle_favorite(id),
        },
        BackendJob::DeleteTrack { id } => BackendReply::Deleted {
            id,
            result: backend.delete_track(id),
        },
    }
}
