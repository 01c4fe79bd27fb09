use crate::library::{Section, Track, TrackId, filter};

/// The ordered, currently visible tracks that navigation works on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivePlaylist {
    tracks: Vec<Track>,
}

impl ActivePlaylist {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn position(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.position(id).is_some()
    }

    /// Same ids in the same order. Titles and covers are not compared.
    pub fn same_ids(&self, other: &ActivePlaylist) -> bool {
        self.tracks.len() == other.tracks.len()
            && self.tracks.iter().zip(&other.tracks).all(|(a, b)| a.id == b.id)
    }
}

/// Derive the active playlist for `section` under `query`.
pub fn project(
    section: Section,
    library: &[Track],
    favorites: &[Track],
    query: &str,
) -> ActivePlaylist {
    let source = match section {
        Section::Library => library,
        Section::Favorites => favorites,
    };
    ActivePlaylist::new(filter(source, query))
}
