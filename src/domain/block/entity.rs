// src/domain/block/entity.rs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::keys::CollectionKey;

/// Reusable definition of a fixed-duration slot of ordered content references
/// (e.g. "30 minutes of sitcom reruns").
#[derive(Debug, Clone)]
pub struct Block {
    /// Internal immutable identifier
    pub id: Uuid,

    pub name: String,

    /// Logical slot length; the wall-clock span this block claims
    pub duration_minutes: u32,

    /// What happens to an item that would overrun the slot boundary
    pub stop_scheduling: BlockStopScheduling,

    /// Ordered content references, scheduled by ascending `index`
    pub items: Vec<BlockItem>,

    /// Last modification timestamp; part of the block's version fingerprint
    pub updated_at: DateTime<Utc>,
}

/// One content reference inside a Block
#[derive(Debug, Clone)]
pub struct BlockItem {
    pub id: Uuid,

    /// Reference to parent Block (REQUIRED)
    pub block_id: Uuid,

    /// Position within the block; items are walked by ascending index
    pub index: u32,

    /// Content source this item draws from
    pub collection: CollectionKey,

    /// Ordering policy for the enumerator over the source
    pub playback_order: PlaybackOrder,
}

/// Governs whether an item that would finish after the block boundary is
/// still scheduled (truncating the block's logical end) or discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStopScheduling {
    AfterDurationEnd,
    BeforeDurationEnd,
}

/// Content-ordering policy for a block item's enumerator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackOrder {
    Chronological,
    SeasonEpisode,
    Shuffle,
}

impl Block {
    pub fn new(name: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            duration_minutes,
            stop_scheduling: BlockStopScheduling::BeforeDurationEnd,
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// The wall-clock span this block claims
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }
}

impl BlockItem {
    pub fn new(
        block_id: Uuid,
        index: u32,
        collection: CollectionKey,
        playback_order: PlaybackOrder,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            block_id,
            index,
            collection,
            playback_order,
        }
    }
}

impl std::fmt::Display for PlaybackOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackOrder::Chronological => write!(f, "chronological"),
            PlaybackOrder::SeasonEpisode => write!(f, "season_episode"),
            PlaybackOrder::Shuffle => write!(f, "shuffle"),
        }
    }
}
