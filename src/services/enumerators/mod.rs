// src/services/enumerators/mod.rs
//
// Resumable cursors over ordered or shuffled media collections.
//
// CRITICAL RULES:
// - All state needed to resume an enumerator is {seed, index}; nothing else
//   may be required to reproduce its position after a process restart
// - For a fixed (seed, index) and item list, `current()` is deterministic
// - Enumerators loop their collection indefinitely; they never run out

pub mod chronological;
pub mod season_episode;
pub mod shuffle;

#[cfg(test)]
mod enumerator_tests;

pub use chronological::ChronologicalMediaCollectionEnumerator;
pub use season_episode::SeasonEpisodeMediaCollectionEnumerator;
pub use shuffle::ShuffledMediaCollectionEnumerator;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::media_item::MediaItem;

/// Resumable cursor position, persisted indirectly via playout history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEnumeratorState {
    pub seed: u64,
    pub index: usize,
}

impl CollectionEnumeratorState {
    pub fn start(seed: u64) -> Self {
        Self { seed, index: 0 }
    }
}

/// Stateful cursor over an ordered list of playable items
pub trait MediaCollectionEnumerator: Send {
    /// The item under the cursor; None only for an empty collection
    fn current(&self) -> Option<&MediaItem>;

    /// Advance the cursor one position
    fn move_next(&mut self);

    fn state(&self) -> CollectionEnumeratorState;

    /// Jump the cursor to a previously captured (or reconstructed) position
    fn reset_state(&mut self, state: CollectionEnumeratorState);

    /// Shortest non-zero duration among the collection's items; used for
    /// fit-checking before walking the collection
    fn minimum_duration(&self) -> Option<Duration>;

    fn count(&self) -> usize;
}

/// Sort key for chronological playback: release date first (missing dates
/// last), then season/episode, then id so the order is total.
pub(crate) fn chronological_key(item: &MediaItem) -> (NaiveDate, u32, u32, Uuid) {
    (
        item.release_date.unwrap_or(NaiveDate::MAX),
        item.season_number.unwrap_or(u32::MAX),
        item.episode_number.unwrap_or(u32::MAX),
        item.id,
    )
}

/// Sort key for season/episode playback
pub(crate) fn season_episode_key(item: &MediaItem) -> (u32, u32, NaiveDate, Uuid) {
    (
        item.season_number.unwrap_or(u32::MAX),
        item.episode_number.unwrap_or(u32::MAX),
        item.release_date.unwrap_or(NaiveDate::MAX),
        item.id,
    )
}

/// Shortest non-zero duration in a list; zero-length items carry no
/// scheduling weight and are ignored here.
pub(crate) fn minimum_duration_of(items: &[MediaItem]) -> Option<Duration> {
    items
        .iter()
        .map(MediaItem::duration)
        .filter(|d| *d > Duration::zero())
        .min()
}
