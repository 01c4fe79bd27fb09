//! Audio-related small types and handles.

use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCmd {
    /// Download and start the stream at `url`, replacing whatever is loaded.
    Load { generation: u64, url: String },
    /// Toggle pause/resume.
    TogglePause,
    /// Play the loaded track again from the start.
    Restart,
    /// Stop playback and drop the loaded track.
    Stop,
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// What the sink reports back to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Started { generation: u64 },
    Ended { generation: u64 },
    Error { generation: u64, reason: String },
}

#[derive(Debug, Clone, Default)]
/// Runtime playback information shared with the engine.
pub struct PlaybackInfo {
    /// Generation of the loaded track, if any.
    pub generation: Option<u64>,
    /// Elapsed playback time for the loaded track.
    pub elapsed: Duration,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
