use std::time::Duration;

use log::warn;

use crate::library::{Section, Track, TrackId};

use super::projector::ActivePlaylist;
use super::types::Direction;

/// Which track is current, and which section navigation was bound to when
/// it was chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub current_track_id: Option<TrackId>,
    pub bound_to_favorites: bool,
}

/// Outcome of a navigation decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTarget {
    /// Start this track.
    Go(Track),
    /// Play the current track again from the start.
    Restart,
    Nothing,
}

/// Owner of the `PlaybackState`. All mutations of the current track id go
/// through here.
#[derive(Debug, Default)]
pub struct PlaybackCursor {
    state: PlaybackState,
}

impl PlaybackCursor {
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn current(&self) -> Option<TrackId> {
        self.state.current_track_id
    }

    pub fn is_bound_to(&self, section: Section) -> bool {
        self.state.bound_to_favorites == section.is_favorites()
    }

    pub fn rebind(&mut self, section: Section) {
        self.state.bound_to_favorites = section.is_favorites();
    }

    pub fn move_to(&mut self, id: TrackId, section: Section) {
        self.state.current_track_id = Some(id);
        self.rebind(section);
    }

    /// Forget the current track. Only used when that track is deleted.
    pub fn clear(&mut self) {
        self.state.current_track_id = None;
    }

    /// Decide where `direction` leads from the current track in `playlist`.
    ///
    /// A current track that is not in the playlist (deleted, filtered out or
    /// never set) falls back to the first entry for both directions.
    pub fn decide(
        &self,
        playlist: &ActivePlaylist,
        direction: Direction,
        elapsed: Duration,
        restart_threshold: Duration,
    ) -> NavTarget {
        let len = playlist.len();
        if len == 0 {
            return NavTarget::Nothing;
        }

        let current = self.state.current_track_id;
        let index = match current.and_then(|id| playlist.position(id)) {
            None => 0,
            Some(i) => match direction {
                Direction::Next => (i + 1) % len,
                Direction::Previous if elapsed < restart_threshold => {
                    return NavTarget::Restart;
                }
                Direction::Previous => i.checked_sub(1).unwrap_or(len - 1),
            },
        };

        let Some(target) = playlist.get(index) else {
            return NavTarget::Nothing;
        };
        if len > 1 && Some(target.id) == current {
            warn!(
                "navigation {direction:?} from {} resolved to the same track in a list of {len}; ignoring",
                target.id
            );
            return NavTarget::Nothing;
        }
        NavTarget::Go(target.clone())
    }
}
