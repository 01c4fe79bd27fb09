use crate::audio::{AudioCmd, SinkEvent};
use crate::backend::{BackendJob, BackendReply};
use crate::library::{Section, TrackId};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Transport phase.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing loaded in the sink.
    #[default]
    Idle,
    Playing,
    Paused,
    /// A track was chosen and is being authorized/loaded. Further advance
    /// requests are dropped until this resolves.
    Transitioning,
}

/// What started a transition. Only used for logging and failure accounting.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Trigger {
    User,
    Ended,
    Failure,
}

/// Commands coming from the user interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SelectSection(Section),
    SetQuery(String),
    Play(TrackId),
    Next,
    Previous,
    TogglePause,
    /// Toggle the favorite flag of a track, or of the current one.
    ToggleFavorite(Option<TrackId>),
    Delete(TrackId),
    Refresh,
    /// Print the active playlist.
    List,
    Quit,
}

/// Everything the engine reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    User(Command),
    Backend(BackendReply),
    Sink(SinkEvent),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Dismissable message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Side effects requested by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Backend(BackendJob),
    Audio(AudioCmd),
    Notify(Notice),
    /// The session is gone; the user must log in again.
    Reauthenticate,
    ShowPlaylist,
    Quit,
}

/// Display fields for the track being played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub cover: String,
    /// Unknown until the server answers.
    pub favorite: Option<bool>,
}
