use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Backend-assigned track identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TrackId(pub i64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TrackId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TrackId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    /// Cover image reference (URL).
    pub cover: String,
}

/// Which list is on screen and therefore backs navigation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Library,
    Favorites,
}

impl Section {
    pub fn is_favorites(self) -> bool {
        self == Section::Favorites
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::Library => "library",
            Section::Favorites => "favorites",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
