// src/services/history.rs
//
// Compact history records tie a scheduled item back to the block item that
// produced it. The key groups history rows per (block, ordering, source);
// the details record what actually played so an ordered cursor can be
// rebuilt after the source collection changes underneath it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::block::{BlockItem, PlaybackOrder};
use crate::domain::keys::CollectionKey;
use crate::domain::media_item::MediaItem;
use crate::error::AppResult;
use crate::services::enumerators::{
    chronological_key, season_episode_key, CollectionEnumeratorState, MediaCollectionEnumerator,
};

// ============================================================================
// HISTORY KEY
// ============================================================================

/// Grouping key for history rows. Field names are deliberately short; this
/// string is persisted once per scheduled item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct HistoryKey {
    b: Uuid,
    o: PlaybackOrder,
    c: CollectionKey,
}

/// Stable key string for a block item's history rows
pub fn key_for_block_item(block_item: &BlockItem) -> AppResult<String> {
    let key = HistoryKey {
        b: block_item.block_id,
        o: block_item.playback_order,
        c: CollectionKey::for_block_item(block_item),
    };
    Ok(serde_json::to_string(&key)?)
}

// ============================================================================
// HISTORY DETAILS
// ============================================================================

/// What a history row actually played, compact enough to persist per item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDetails {
    /// Media item id
    pub m: Uuid,

    /// Release date, when known
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub r: Option<NaiveDate>,

    /// Season number, when known
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub s: Option<u32>,

    /// Episode number, when known
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub e: Option<u32>,
}

impl HistoryDetails {
    pub fn for_media_item(item: &MediaItem) -> HistoryDetails {
        HistoryDetails {
            m: item.id,
            r: item.release_date,
            s: item.season_number,
            e: item.episode_number,
        }
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> AppResult<HistoryDetails> {
        Ok(serde_json::from_str(raw)?)
    }
}

// ============================================================================
// CURSOR RESUME
// ============================================================================

/// Position an ordered enumerator just past the item a history row recorded.
///
/// The recorded item may no longer exist in the collection. When it does,
/// the cursor lands on it and advances once. When it does not, the cursor
/// lands directly on the item that would have followed it in sort order,
/// without an extra advance, so nothing gets skipped.
pub fn move_to_next_item(
    enumerator: &mut dyn MediaCollectionEnumerator,
    details_json: &str,
    items: &[MediaItem],
    playback_order: PlaybackOrder,
) -> AppResult<()> {
    if items.is_empty() {
        return Ok(());
    }

    let details = HistoryDetails::from_json(details_json)?;
    let seed = enumerator.state().seed;

    let mut sorted: Vec<&MediaItem> = items.iter().collect();
    match playback_order {
        PlaybackOrder::SeasonEpisode => sorted.sort_by_key(|i| season_episode_key(i)),
        _ => sorted.sort_by_key(|i| chronological_key(i)),
    }

    let matched = sorted.iter().position(|item| match playback_order {
        PlaybackOrder::SeasonEpisode => match (details.s, details.e) {
            (Some(s), Some(e)) => {
                item.season_number == Some(s) && item.episode_number == Some(e)
            }
            _ => item.id == details.m,
        },
        _ => {
            if let Some(r) = details.r {
                item.release_date == Some(r)
                    && item.season_number == details.s
                    && item.episode_number == details.e
            } else {
                item.id == details.m
            }
        }
    });

    match matched {
        Some(index) => {
            enumerator.reset_state(CollectionEnumeratorState { seed, index });
            enumerator.move_next();
        }
        None => {
            // find where the vanished item would have sat, land on its successor
            let index = match playback_order {
                PlaybackOrder::SeasonEpisode => {
                    let target = (
                        details.s.unwrap_or(u32::MAX),
                        details.e.unwrap_or(u32::MAX),
                        details.r.unwrap_or(NaiveDate::MAX),
                        Uuid::nil(),
                    );
                    sorted.partition_point(|i| season_episode_key(i) < target)
                }
                _ => {
                    let target = (
                        details.r.unwrap_or(NaiveDate::MAX),
                        details.s.unwrap_or(u32::MAX),
                        details.e.unwrap_or(u32::MAX),
                        Uuid::nil(),
                    );
                    sorted.partition_point(|i| chronological_key(i) < target)
                }
            };
            enumerator.reset_state(CollectionEnumeratorState {
                seed,
                index: index % sorted.len(),
            });
        }
    }

    Ok(())
}
