// src/services/enumerators/shuffle.rs

use chrono::Duration;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{minimum_duration_of, CollectionEnumeratorState, MediaCollectionEnumerator};
use crate::domain::media_item::MediaItem;

/// Cursor over a deterministic permutation of the collection.
///
/// The permutation is a pure function of (seed, bucket) where
/// `bucket = index / count`: re-creating the enumerator with a persisted
/// {seed, index} cursor reproduces exactly the same order, which is what
/// makes shuffle playback resumable across process restarts. Every time the
/// whole list has been played once the bucket increments and a fresh
/// permutation is drawn.
pub struct ShuffledMediaCollectionEnumerator {
    items: Vec<MediaItem>,
    state: CollectionEnumeratorState,
    permutation: Vec<usize>,
    bucket: u64,
    minimum: Option<Duration>,
}

impl ShuffledMediaCollectionEnumerator {
    pub fn new(mut items: Vec<MediaItem>, state: CollectionEnumeratorState) -> Self {
        // canonical input order, so the permutation does not depend on how
        // the caller happened to assemble the list
        items.sort_by_key(|i| i.id);
        let minimum = minimum_duration_of(&items);
        let bucket = bucket_for(&items, state.index);
        let permutation = permutation_for(items.len(), state.seed, bucket);
        Self {
            items,
            state,
            permutation,
            bucket,
            minimum,
        }
    }

    fn reshuffle_if_needed(&mut self) {
        let bucket = bucket_for(&self.items, self.state.index);
        if bucket != self.bucket || self.permutation.len() != self.items.len() {
            self.bucket = bucket;
            self.permutation = permutation_for(self.items.len(), self.state.seed, bucket);
        }
    }
}

fn bucket_for(items: &[MediaItem], index: usize) -> u64 {
    if items.is_empty() {
        return 0;
    }
    (index / items.len()) as u64
}

/// Seeded Fisher-Yates, stable for a given (seed, bucket) pair
fn permutation_for(count: usize, seed: u64, bucket: u64) -> Vec<usize> {
    let mut permutation: Vec<usize> = (0..count).collect();
    let mut rng = StdRng::seed_from_u64(seed ^ bucket.wrapping_mul(0x9e37_79b9_7f4a_7c15));
    permutation.shuffle(&mut rng);
    permutation
}

impl MediaCollectionEnumerator for ShuffledMediaCollectionEnumerator {
    fn current(&self) -> Option<&MediaItem> {
        if self.items.is_empty() {
            return None;
        }
        let position = self.permutation[self.state.index % self.items.len()];
        self.items.get(position)
    }

    fn move_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        // index grows without wrapping; bucket = index / count selects the
        // permutation for the current full pass
        self.state.index += 1;
        self.reshuffle_if_needed();
    }

    fn state(&self) -> CollectionEnumeratorState {
        self.state
    }

    fn reset_state(&mut self, state: CollectionEnumeratorState) {
        let reseed = state.seed != self.state.seed;
        self.state = state;
        if reseed {
            self.bucket = bucket_for(&self.items, self.state.index);
            self.permutation =
                permutation_for(self.items.len(), self.state.seed, self.bucket);
        } else {
            self.reshuffle_if_needed();
        }
    }

    fn minimum_duration(&self) -> Option<Duration> {
        self.minimum
    }

    fn count(&self) -> usize {
        self.items.len()
    }
}
