// src/services/enumerators/chronological.rs

use chrono::Duration;

use super::{chronological_key, minimum_duration_of, CollectionEnumeratorState,
    MediaCollectionEnumerator};
use crate::domain::media_item::MediaItem;

/// Cursor over items pre-sorted by release date; cycles modulo the
/// collection size, looping indefinitely.
pub struct ChronologicalMediaCollectionEnumerator {
    items: Vec<MediaItem>,
    state: CollectionEnumeratorState,
    minimum: Option<Duration>,
}

impl ChronologicalMediaCollectionEnumerator {
    pub fn new(mut items: Vec<MediaItem>, state: CollectionEnumeratorState) -> Self {
        items.sort_by_key(chronological_key);
        let minimum = minimum_duration_of(&items);
        let mut enumerator = Self {
            items,
            state: CollectionEnumeratorState::start(state.seed),
            minimum,
        };
        enumerator.reset_state(state);
        enumerator
    }
}

impl MediaCollectionEnumerator for ChronologicalMediaCollectionEnumerator {
    fn current(&self) -> Option<&MediaItem> {
        if self.items.is_empty() {
            return None;
        }
        self.items.get(self.state.index % self.items.len())
    }

    fn move_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.state.index = (self.state.index + 1) % self.items.len();
    }

    fn state(&self) -> CollectionEnumeratorState {
        self.state
    }

    fn reset_state(&mut self, state: CollectionEnumeratorState) {
        self.state = state;
        if !self.items.is_empty() {
            self.state.index %= self.items.len();
        }
    }

    fn minimum_duration(&self) -> Option<Duration> {
        self.minimum
    }

    fn count(&self) -> usize {
        self.items.len()
    }
}
