// src/services/change_detection.rs
//
// Decides which block occurrences must be (re)scheduled and which already
// scheduled items must be torn down, by comparing persisted fingerprints
// against the current state of templates and content.
//
// CRITICAL RULES:
// - An item whose start lies before the build window is never removed,
//   whatever changed; history must not be rewritten retroactively
// - When an occurrence is invalidated, every later item of the same block
//   is invalidated with it; a block reschedules from its earliest change
// - Filler items carry no occurrence fingerprint and are ignored here;
//   the filler pass manages them separately

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::keys::{BlockKey, CollectionKey};
use crate::domain::playout::PlayoutItem;
use crate::error::AppResult;
use crate::services::block_resolver::EffectiveBlock;

/// What a detection pass concluded
#[derive(Debug, Default)]
pub struct ChangeDetectionResult {
    /// Occurrences that must be scheduled, in start order
    pub updated_blocks: Vec<EffectiveBlock>,

    /// Already scheduled items that must be removed before rescheduling
    pub items_to_remove: Vec<PlayoutItem>,
}

/// Parse the persisted occurrence fingerprint of every non-filler item.
/// Items without a fingerprint (filler) are absent from the map, as are
/// items whose stored fingerprint no longer parses; both are invisible to
/// the detection passes.
pub fn playout_item_block_keys(items: &[PlayoutItem]) -> HashMap<Uuid, BlockKey> {
    let mut keys = HashMap::new();
    for item in items {
        if let Some(raw) = item.block_key.as_deref() {
            match BlockKey::from_json(raw) {
                Ok(key) => {
                    keys.insert(item.id, key);
                }
                Err(e) => {
                    log::warn!("unparsable occurrence fingerprint on item {}: {}", item.id, e);
                }
            }
        }
    }
    keys
}

/// Compare persisted items against the occurrences and content of today.
///
/// `window_start` is the instant the current build begins; items starting
/// before it are treated as immutable history.
pub fn find_updated_items(
    playout_items: &[PlayoutItem],
    item_block_keys: &HashMap<Uuid, BlockKey>,
    blocks_to_schedule: &[EffectiveBlock],
    collection_etags: &HashMap<CollectionKey, String>,
    window_start: DateTime<Utc>,
) -> AppResult<ChangeDetectionResult> {
    let keyed_items: Vec<&PlayoutItem> = playout_items
        .iter()
        .filter(|item| item_block_keys.contains_key(&item.id))
        .collect();

    let last_scheduled: Option<DateTime<Utc>> = keyed_items.iter().map(|i| i.start).max();

    let existing_block_keys: HashSet<BlockKey> = keyed_items
        .iter()
        .map(|item| item_block_keys[&item.id])
        .collect();
    let block_keys_to_schedule: HashSet<BlockKey> =
        blocks_to_schedule.iter().map(|eb| eb.block_key).collect();

    let mut sorted: Vec<&EffectiveBlock> = blocks_to_schedule.iter().collect();
    sorted.sort_by_key(|eb| eb.start);

    let mut updated_blocks: HashSet<usize> = HashSet::new();
    let mut updated_item_ids: HashSet<Uuid> = HashSet::new();

    // earliest invalidated start, per occurrence fingerprint and per block
    let mut earliest_effective_blocks: HashMap<BlockKey, DateTime<Utc>> = HashMap::new();
    let mut earliest_blocks: HashMap<Uuid, DateTime<Utc>> = HashMap::new();

    // pass 1: content changes under already scheduled blocks
    for (position, effective_block) in sorted.iter().enumerate() {
        for item in &keyed_items {
            if item_block_keys[&item.id].b != effective_block.block.id {
                continue;
            }

            let updated = match item.collection_key.as_deref() {
                None => true,
                // a corrupt stored key is treated like a missing one
                Some(raw) => match CollectionKey::from_json(raw) {
                    Ok(collection_key) => match collection_etags.get(&collection_key) {
                        None => true,
                        Some(etag) => item.collection_etag.as_deref() != Some(etag.as_str()),
                    },
                    Err(e) => {
                        log::warn!("unparsable collection key on item {}: {}", item.id, e);
                        true
                    }
                },
            };

            if updated {
                if item.start >= window_start {
                    updated_item_ids.insert(item.id);
                }
                updated_blocks.insert(position);
                earliest_effective_blocks
                    .entry(effective_block.block_key)
                    .or_insert(effective_block.start);
                earliest_blocks
                    .entry(effective_block.block.id)
                    .or_insert(effective_block.start);
            }
        }
    }

    // pass 2: new, changed or downstream occurrences
    for (position, effective_block) in sorted.iter().enumerate() {
        if last_scheduled.map_or(true, |last| effective_block.start > last) {
            // beyond everything scheduled so far
            updated_blocks.insert(position);
        } else if !existing_block_keys.contains(&effective_block.block_key) {
            updated_blocks.insert(position);
            earliest_effective_blocks
                .entry(effective_block.block_key)
                .or_insert(effective_block.start);
            earliest_blocks
                .entry(effective_block.block.id)
                .or_insert(effective_block.start);
        } else if earliest_blocks.contains_key(&effective_block.block.id) {
            // an earlier occurrence of this block changed; cascade forward
            updated_blocks.insert(position);
        }
    }

    for (key, start) in &earliest_effective_blocks {
        log::debug!("earliest changed occurrence: {:?} => {}", key, start);
    }
    for (block_id, start) in &earliest_blocks {
        log::debug!("earliest changed block: {} => {}", block_id, start);
    }

    // pass 3: tear down items at or after their block's earliest change
    for item in &keyed_items {
        if item.start < window_start {
            continue;
        }
        let block_key = item_block_keys[&item.id];

        let key_affected = earliest_effective_blocks
            .get(&block_key)
            .is_some_and(|earliest| *earliest <= item.start);
        let block_affected = earliest_blocks
            .get(&block_key.b)
            .is_some_and(|earliest| *earliest <= item.start);

        if key_affected || block_affected || !block_keys_to_schedule.contains(&block_key) {
            updated_item_ids.insert(item.id);
        }
    }

    Ok(ChangeDetectionResult {
        updated_blocks: sorted
            .iter()
            .enumerate()
            .filter(|(position, _)| updated_blocks.contains(position))
            .map(|(_, eb)| (*eb).clone())
            .collect(),
        items_to_remove: keyed_items
            .iter()
            .filter(|item| updated_item_ids.contains(&item.id))
            .map(|item| (*item).clone())
            .collect(),
    })
}
