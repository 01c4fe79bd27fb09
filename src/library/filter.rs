use super::model::Track;

/// Return the tracks whose title or artist contains `query`
/// (case-insensitive), in their original order.
///
/// An empty query returns the whole list. Whitespace is matched literally.
pub fn filter(tracks: &[Track], query: &str) -> Vec<Track> {
    if query.is_empty() {
        return tracks.to_vec();
    }

    let needle = query.to_lowercase();
    tracks
        .iter()
        .filter(|t| matches_lower(t, &needle))
        .cloned()
        .collect()
}

fn matches_lower(track: &Track, needle_lower: &str) -> bool {
    track.title.to_lowercase().contains(needle_lower)
        || track.artist.to_lowercase().contains(needle_lower)
}
