// src/domain/playout/entity.rs
//
// The Playout aggregate: a channel's schedule, its bounded history log and
// the template assignments that drive both.
//
// CRITICAL RULES:
// - The scheduling engine never mutates the aggregate; it consumes an
//   immutable PlayoutReferenceData snapshot and returns a diff
// - Playout items are immutable records of "what played"; once an occurrence
//   has aged out of the build window its items are never rewritten
// - History exists only to resume enumerator cursors across builds

use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::block::PlaybackOrder;
use crate::domain::keys::CollectionKey;
use crate::domain::template::PlayoutTemplate;

/// One scheduled item on the channel timeline
#[derive(Debug, Clone)]
pub struct PlayoutItem {
    /// Internal immutable identifier
    pub id: Uuid,

    pub media_item_id: Uuid,

    pub start: DateTime<Utc>,

    pub finish: DateTime<Utc>,

    /// Serialized BlockKey of the generating occurrence; None for filler
    pub block_key: Option<String>,

    /// Serialized CollectionKey of the content source
    pub collection_key: Option<String>,

    /// Collection fingerprint captured at schedule time
    pub collection_etag: Option<String>,

    pub filler_kind: FillerKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillerKind {
    None,
    Fallback,
}

/// One cursor-resume record, written alongside every emitted playout item
#[derive(Debug, Clone)]
pub struct PlayoutHistory {
    /// Internal immutable identifier
    pub id: Uuid,

    /// Block that owns the slot
    pub block_id: Uuid,

    pub playback_order: PlaybackOrder,

    /// Enumerator seed at emit time
    pub seed: u64,

    /// Enumerator index at emit time
    pub index: usize,

    /// Slot identity (see services::history::key_for_block_item)
    pub key: String,

    /// Scheduled start of the emitted item
    pub when: DateTime<Utc>,

    /// Serialized detail of what played (see services::history)
    pub details: String,
}

/// Filler configuration attached to a playout or a template time span
#[derive(Debug, Clone)]
pub struct Deco {
    pub id: Uuid,

    pub filler_mode: DecoMode,

    /// Content source drawn from when filling gaps
    pub filler_collection: Option<CollectionKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoMode {
    /// Use the playout's default deco
    Inherit,
    /// Use this deco instead of the playout default
    Override,
    /// No filler for this span
    Disable,
}

/// Binds a Deco to a time-of-day span inside a Template
#[derive(Debug, Clone)]
pub struct DecoTemplateItem {
    pub start_time: NaiveTime,

    /// Exclusive end
    pub end_time: NaiveTime,

    pub deco: Deco,
}

/// The unit of mutation: channel schedule + history + assignments
#[derive(Debug, Clone)]
pub struct Playout {
    /// Internal immutable identifier
    pub id: Uuid,

    pub name: String,

    /// Seed for all shuffle permutations on this channel
    pub seed: u64,

    /// IANA timezone the channel schedules in
    pub timezone: Tz,

    pub templates: Vec<PlayoutTemplate>,

    /// Default filler configuration
    pub deco: Option<Deco>,

    pub items: Vec<PlayoutItem>,

    pub history: Vec<PlayoutHistory>,
}

/// Immutable snapshot handed to the scheduling engine.
///
/// Holding a snapshot instead of the aggregate keeps the engine callable
/// without locks on the real playout.
#[derive(Debug, Clone)]
pub struct PlayoutReferenceData {
    pub playout_id: Uuid,

    pub seed: u64,

    pub timezone: Tz,

    pub templates: Vec<PlayoutTemplate>,

    pub deco: Option<Deco>,

    pub existing_items: Vec<PlayoutItem>,

    pub history: Vec<PlayoutHistory>,
}

/// Diff produced by one build pass; applied to the aggregate atomically by
/// the persistence layer, or discarded wholesale on failure.
#[derive(Debug, Clone, Default)]
pub struct BuildResult {
    pub added_items: Vec<PlayoutItem>,

    pub added_history: Vec<PlayoutHistory>,

    pub item_ids_to_remove: Vec<Uuid>,

    pub history_ids_to_remove: Vec<Uuid>,
}

impl BuildResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when applying this result would change nothing
    pub fn is_noop(&self) -> bool {
        self.added_items.is_empty()
            && self.added_history.is_empty()
            && self.item_ids_to_remove.is_empty()
            && self.history_ids_to_remove.is_empty()
    }
}

impl Playout {
    pub fn new(name: impl Into<String>, timezone: Tz, seed: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            seed,
            timezone,
            templates: Vec::new(),
            deco: None,
            items: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Snapshot for one build pass
    pub fn reference_data(&self) -> PlayoutReferenceData {
        PlayoutReferenceData {
            playout_id: self.id,
            seed: self.seed,
            timezone: self.timezone,
            templates: self.templates.clone(),
            deco: self.deco.clone(),
            existing_items: self.items.clone(),
            history: self.history.clone(),
        }
    }
}
