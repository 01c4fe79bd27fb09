use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::library::Section;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/betawave/config.toml` or `~/.config/betawave/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `BETAWAVE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendSettings,
    pub playback: PlaybackSettings,
    pub audio: AudioSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Base URL of the betawave server, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,
    /// Value of the server's `session` cookie. Never written back out.
    #[serde(skip_serializing)]
    pub session_cookie: Option<String>,
    /// Artist line shown for every track; the server stores none.
    pub display_artist: String,
    /// Cover used when a track's source URL yields no thumbnail.
    pub placeholder_cover: String,
    pub connect_timeout_ms: u64,
    /// Timeout for list, favorite and delete requests.
    pub request_timeout_ms: u64,
    /// Timeout for playback authorization. Resolving a stream can be slow
    /// server-side, so this is kept separate from `request_timeout_ms`.
    pub play_timeout_ms: u64,
    /// Read timeout while downloading an audio stream.
    pub stream_read_timeout_ms: u64,
    /// Upper bound on a downloaded stream, in bytes.
    pub max_stream_bytes: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            session_cookie: None,
            display_artist: "betawave".to_string(),
            placeholder_cover: "https://via.placeholder.com/300".to_string(),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 10_000,
            play_timeout_ms: 15_000,
            stream_read_timeout_ms: 30_000,
            max_stream_bytes: 256 * 1024 * 1024,
        }
    }
}

impl BackendSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn play_timeout(&self) -> Duration {
        Duration::from_millis(self.play_timeout_ms)
    }

    pub fn stream_read_timeout(&self) -> Duration {
        Duration::from_millis(self.stream_read_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// "Previous" restarts the current track when less than this much of it
    /// has played (milliseconds). Set to 0 to always step back.
    pub restart_threshold_ms: u64,
    /// Section shown at startup.
    pub start_section: SectionSetting,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            restart_threshold_ms: 3_000,
            start_section: SectionSetting::Library,
        }
    }
}

impl PlaybackSettings {
    pub fn restart_threshold(&self) -> Duration {
        Duration::from_millis(self.restart_threshold_ms)
    }
}

#[derive(Debug, Copy, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionSetting {
    #[serde(alias = "songs", alias = "all", alias = "my-songs")]
    Library,
    #[serde(alias = "favourites", alias = "favs", alias = "favorite")]
    Favorites,
}

impl From<SectionSetting> for Section {
    fn from(s: SectionSetting) -> Self {
        match s {
            SectionSetting::Library => Section::Library,
            SectionSetting::Favorites => Section::Favorites,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Output volume (1.0 = unchanged).
    pub volume: f32,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            quit_fade_out_ms: 300,
        }
    }
}
