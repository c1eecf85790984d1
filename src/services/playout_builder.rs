// src/services/playout_builder.rs
//
// The main scheduling loop. One call turns a playout snapshot into a
// BuildResult diff: resolve occurrences, detect changes, walk each changed
// occurrence emitting items and history, then prune the history log.
//
// CRITICAL RULES:
// - The snapshot is never mutated; everything flows through BuildResult
// - Scheduling starts at an occurrence's nominal start even when the build
//   request arrives mid-occurrence; continuity comes from history, not the
//   wall clock
// - An occurrence never begins before the previous one finished; an
//   AfterDurationEnd overrun pushes later occurrences forward rather than
//   overlapping them
// - Generated item and history ids are derived (UUIDv5) from their content
//   so repeated builds over identical inputs produce identical diffs
// - Degraded slots (missing config, empty or unreachable content) log and
//   schedule nothing; only snapshot-level failures return Err

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::block::{BlockItem, BlockStopScheduling, PlaybackOrder};
use crate::domain::keys::CollectionKey;
use crate::domain::media_item::MediaItem;
use crate::domain::playout::{
    BuildResult, FillerKind, PlayoutHistory, PlayoutItem, PlayoutReferenceData,
};
use crate::error::{AppError, AppResult};
use crate::repositories::config_repository::{keys, ConfigRepository, DEFAULT_DAYS_TO_BUILD};
use crate::repositories::content_repository::ContentRepository;
use crate::services::block_resolver::{get_effective_blocks, EffectiveBlock};
use crate::services::change_detection::{find_updated_items, playout_item_block_keys};
use crate::services::collection_etag::collection_etag;
use crate::services::enumerators::{
    ChronologicalMediaCollectionEnumerator, CollectionEnumeratorState, MediaCollectionEnumerator,
    SeasonEpisodeMediaCollectionEnumerator, ShuffledMediaCollectionEnumerator,
};
use crate::services::history::{key_for_block_item, move_to_next_item, HistoryDetails};

pub struct PlayoutBuilder {
    content_repo: Arc<dyn ContentRepository>,
    config_repo: Arc<dyn ConfigRepository>,
}

impl PlayoutBuilder {
    pub fn new(
        content_repo: Arc<dyn ContentRepository>,
        config_repo: Arc<dyn ConfigRepository>,
    ) -> Self {
        Self {
            content_repo,
            config_repo,
        }
    }

    /// One build pass over a playout snapshot.
    pub fn build(
        &self,
        now: DateTime<Utc>,
        reference: &PlayoutReferenceData,
        cancellation: &CancellationToken,
    ) -> AppResult<BuildResult> {
        log::debug!("building playout {}", reference.playout_id);

        let days_to_build = self.days_to_build();
        let effective_blocks = get_effective_blocks(
            &reference.templates,
            reference.timezone,
            now,
            days_to_build,
        );

        let (collections, etags) = self.load_collections(&effective_blocks);

        // the window opens at the earliest occurrence, which may precede
        // `now` when a block is mid-air
        let window_start = effective_blocks
            .first()
            .map(|eb| eb.start)
            .unwrap_or(now);

        let item_block_keys = playout_item_block_keys(&reference.existing_items);
        let detection = find_updated_items(
            &reference.existing_items,
            &item_block_keys,
            &effective_blocks,
            &etags,
            window_start,
        )?;

        let mut result = BuildResult::new();

        let removed_item_ids: HashSet<Uuid> =
            detection.items_to_remove.iter().map(|i| i.id).collect();
        result.item_ids_to_remove.extend(removed_item_ids.iter().copied());
        result.item_ids_to_remove.sort();

        // removing an item also removes the history row written with it
        let removed_history_ids: HashSet<Uuid> = reference
            .history
            .iter()
            .filter(|h| {
                detection.items_to_remove.iter().any(|item| {
                    item_block_keys
                        .get(&item.id)
                        .is_some_and(|key| key.b == h.block_id && h.when == item.start)
                })
            })
            .map(|h| h.id)
            .collect();

        // history still visible to this build's enumerators
        let mut working_history: Vec<PlayoutHistory> = reference
            .history
            .iter()
            .filter(|h| !removed_history_ids.contains(&h.id))
            .cloned()
            .collect();

        // carried across occurrences so an overrun under AfterDurationEnd
        // pushes the next occurrence forward instead of overlapping it
        let mut current_time = window_start;

        for effective_block in &detection.updated_blocks {
            if cancellation.is_cancelled() {
                return Err(AppError::BuildCancelled);
            }

            if current_time < effective_block.start {
                current_time = effective_block.start;
                log::debug!(
                    "scheduling block {} at {}",
                    effective_block.block.name,
                    effective_block.start
                );
            } else {
                log::debug!(
                    "scheduling block {} with start {} at {}",
                    effective_block.block.name,
                    effective_block.start,
                    current_time
                );
            }

            current_time = self.schedule_occurrence(
                reference,
                effective_block,
                current_time,
                &collections,
                &etags,
                &mut working_history,
                &mut result,
            )?;
        }

        prune_history(reference, now, removed_history_ids, &mut result);

        Ok(result)
    }

    fn days_to_build(&self) -> u32 {
        match self.config_repo.get_int(keys::PLAYOUT_DAYS_TO_BUILD) {
            Ok(Some(days)) if days > 0 => days as u32,
            Ok(Some(days)) => {
                log::warn!(
                    "ignoring non-positive {} = {}; using default {}",
                    keys::PLAYOUT_DAYS_TO_BUILD,
                    days,
                    DEFAULT_DAYS_TO_BUILD
                );
                DEFAULT_DAYS_TO_BUILD
            }
            Ok(None) => DEFAULT_DAYS_TO_BUILD,
            Err(e) => {
                log::warn!(
                    "failed to read {}: {}; using default {}",
                    keys::PLAYOUT_DAYS_TO_BUILD,
                    e,
                    DEFAULT_DAYS_TO_BUILD
                );
                DEFAULT_DAYS_TO_BUILD
            }
        }
    }

    /// Batch-load every distinct content source the occurrences reference,
    /// with its fingerprint. Unreachable sources degrade to empty.
    fn load_collections(
        &self,
        effective_blocks: &[EffectiveBlock],
    ) -> (
        HashMap<CollectionKey, Vec<MediaItem>>,
        HashMap<CollectionKey, String>,
    ) {
        let mut distinct: Vec<CollectionKey> = Vec::new();
        for effective_block in effective_blocks {
            for block_item in &effective_block.block.items {
                let key = CollectionKey::for_block_item(block_item);
                if !distinct.contains(&key) {
                    distinct.push(key);
                }
            }
        }

        let mut collections = HashMap::new();
        let mut etags = HashMap::new();
        for key in distinct {
            let items = match self.content_repo.items_for(&key) {
                Ok(items) => items,
                Err(e) => {
                    log::warn!("failed to load content for {:?}: {}", key, e);
                    Vec::new()
                }
            };
            etags.insert(key.clone(), collection_etag(&items));
            collections.insert(key, items);
        }

        (collections, etags)
    }

    /// Returns the time scheduling finished at, which the caller carries
    /// into the next occurrence.
    fn schedule_occurrence(
        &self,
        reference: &PlayoutReferenceData,
        effective_block: &EffectiveBlock,
        start_at: DateTime<Utc>,
        collections: &HashMap<CollectionKey, Vec<MediaItem>>,
        etags: &HashMap<CollectionKey, String>,
        working_history: &mut Vec<PlayoutHistory>,
        result: &mut BuildResult,
    ) -> AppResult<DateTime<Utc>> {
        let mut current_time = start_at;
        let block_finish = effective_block.start + effective_block.block.duration();
        let block_key_json = effective_block.block_key.to_json()?;

        let mut block_items: Vec<&BlockItem> = effective_block.block.items.iter().collect();
        block_items.sort_by_key(|item| item.index);

        for block_item in block_items {
            if current_time >= block_finish {
                break;
            }

            let collection_key = CollectionKey::for_block_item(block_item);
            let items = collections.get(&collection_key).cloned().unwrap_or_default();
            if items.is_empty() {
                log::debug!("nothing to schedule from {:?}; skipping slot", collection_key);
                continue;
            }

            let history_key = key_for_block_item(block_item)?;
            let mut enumerator = self.enumerator_for(
                reference,
                block_item,
                items,
                working_history,
                &history_key,
                current_time,
            )?;

            // nothing in this source can ever fit in what's left
            if enumerator
                .minimum_duration()
                .map_or(true, |minimum| minimum > block_finish - current_time)
            {
                log::debug!(
                    "no item from {:?} fits the remaining {} minutes",
                    collection_key,
                    (block_finish - current_time).num_minutes()
                );
                continue;
            }

            let collection_key_json = collection_key.to_json()?;
            let etag = etags.get(&collection_key).cloned().unwrap_or_default();

            let mut skipped = 0usize;
            while current_time < block_finish {
                let Some(media_item) = enumerator.current() else {
                    break;
                };

                let duration = media_item.duration();
                let finish = current_time + duration;
                let overruns = finish > block_finish;
                let discard_overrun = effective_block.block.stop_scheduling
                    == BlockStopScheduling::BeforeDurationEnd;

                if duration <= Duration::zero() || (overruns && discard_overrun) {
                    skipped += 1;
                    if skipped >= enumerator.count() {
                        break;
                    }
                    enumerator.move_next();
                    continue;
                }

                let state = enumerator.state();
                let details = HistoryDetails::for_media_item(media_item).to_json()?;
                let item_id = derived_id(
                    "item",
                    reference.playout_id,
                    &block_key_json,
                    current_time,
                    media_item.id,
                );

                result.added_items.push(PlayoutItem {
                    id: item_id,
                    media_item_id: media_item.id,
                    start: current_time,
                    finish,
                    block_key: Some(block_key_json.clone()),
                    collection_key: Some(collection_key_json.clone()),
                    collection_etag: Some(etag.clone()),
                    filler_kind: FillerKind::None,
                });

                let history = PlayoutHistory {
                    id: derived_id(
                        "history",
                        reference.playout_id,
                        &history_key,
                        current_time,
                        media_item.id,
                    ),
                    block_id: block_item.block_id,
                    playback_order: block_item.playback_order,
                    seed: state.seed,
                    index: state.index,
                    key: history_key.clone(),
                    when: current_time,
                    details,
                };
                working_history.push(history.clone());
                result.added_history.push(history);

                current_time = finish;
                skipped = 0;
                enumerator.move_next();
            }
        }

        Ok(current_time)
    }

    /// Build the block item's enumerator and resume its cursor from the
    /// most recent applicable history record.
    fn enumerator_for(
        &self,
        reference: &PlayoutReferenceData,
        block_item: &BlockItem,
        items: Vec<MediaItem>,
        working_history: &[PlayoutHistory],
        history_key: &str,
        current_time: DateTime<Utc>,
    ) -> AppResult<Box<dyn MediaCollectionEnumerator>> {
        let latest_history = working_history
            .iter()
            .filter(|h| {
                h.block_id == block_item.block_id
                    && h.key == history_key
                    && h.when < current_time
            })
            .max_by_key(|h| h.when);

        let seed = reference.seed ^ seed_for_block(block_item.block_id);

        match block_item.playback_order {
            PlaybackOrder::Shuffle => {
                let state = match latest_history {
                    Some(h) => CollectionEnumeratorState {
                        seed: h.seed,
                        index: h.index + 1,
                    },
                    None => CollectionEnumeratorState::start(seed),
                };
                Ok(Box::new(ShuffledMediaCollectionEnumerator::new(items, state)))
            }
            PlaybackOrder::Chronological => {
                let mut enumerator = Box::new(ChronologicalMediaCollectionEnumerator::new(
                    items.clone(),
                    CollectionEnumeratorState::start(seed),
                ));
                if let Some(h) = latest_history {
                    move_to_next_item(
                        enumerator.as_mut(),
                        &h.details,
                        &items,
                        PlaybackOrder::Chronological,
                    )?;
                }
                Ok(enumerator)
            }
            PlaybackOrder::SeasonEpisode => {
                let mut enumerator = Box::new(SeasonEpisodeMediaCollectionEnumerator::new(
                    items.clone(),
                    CollectionEnumeratorState::start(seed),
                ));
                if let Some(h) = latest_history {
                    move_to_next_item(
                        enumerator.as_mut(),
                        &h.details,
                        &items,
                        PlaybackOrder::SeasonEpisode,
                    )?;
                }
                Ok(enumerator)
            }
        }
    }
}

/// Bound the history log: per (block, slot key) group, keep everything at
/// or after `now` plus the single most recent older record.
fn prune_history(
    reference: &PlayoutReferenceData,
    now: DateTime<Utc>,
    already_removed: HashSet<Uuid>,
    result: &mut BuildResult,
) {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Source {
        Existing,
        Added,
    }

    let mut groups: HashMap<(Uuid, &str), Vec<(Source, &PlayoutHistory)>> = HashMap::new();
    for history in reference
        .history
        .iter()
        .filter(|h| !already_removed.contains(&h.id))
    {
        groups
            .entry((history.block_id, history.key.as_str()))
            .or_default()
            .push((Source::Existing, history));
    }
    for history in &result.added_history {
        groups
            .entry((history.block_id, history.key.as_str()))
            .or_default()
            .push((Source::Added, history));
    }

    let mut pruned: HashSet<Uuid> = HashSet::new();
    for ((block_id, key), group) in groups {
        let keep_id = group
            .iter()
            .filter(|(_, h)| h.when < now)
            .max_by_key(|(_, h)| h.when)
            .map(|(_, h)| h.id);

        let mut removed = 0;
        for (source, history) in &group {
            if history.when < now && Some(history.id) != keep_id {
                pruned.insert(history.id);
                if *source == Source::Existing {
                    result.history_ids_to_remove.push(history.id);
                }
                removed += 1;
            }
        }
        if removed > 0 {
            log::debug!("pruned {} history records for {} / {}", removed, block_id, key);
        }
    }

    result.added_history.retain(|h| !pruned.contains(&h.id));
    result.history_ids_to_remove.extend(already_removed);
    result.history_ids_to_remove.sort();
}

/// Stable per-block component of the shuffle seed
fn seed_for_block(block_id: Uuid) -> u64 {
    let bytes = block_id.as_bytes();
    u64::from_be_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}

/// Content-derived id so identical builds yield identical diffs
pub(crate) fn derived_id(
    kind: &str,
    playout_id: Uuid,
    key: &str,
    when: DateTime<Utc>,
    media_item_id: Uuid,
) -> Uuid {
    let name = format!(
        "{}:{}:{}:{}:{}",
        kind,
        playout_id,
        key,
        when.to_rfc3339(),
        media_item_id
    );
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}
