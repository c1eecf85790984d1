// src/domain/keys.rs
//
// Stable identity keys for change detection.
//
// CRITICAL RULES:
// - Keys are value types: equality is derived from every component
// - The serialized form is persisted verbatim on playout items and re-parsed
//   on the next build; any change to the field names or representation is a
//   breaking migration
// - Entity versions are `updated_at` timestamps truncated to unix seconds

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::block::{Block, BlockItem};
use super::template::{PlayoutTemplate, Template};

/// Identifies a content source for a block item: a collection of some kind,
/// or a degenerate single-media-item reference.
///
/// Serialized with short tags because the JSON is stored on every playout
/// item (`{"t":"c","id":"..."}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "t", content = "id")]
pub enum CollectionKey {
    #[serde(rename = "c")]
    Collection(Uuid),
    #[serde(rename = "sh")]
    Show(Uuid),
    #[serde(rename = "se")]
    Season(Uuid),
    #[serde(rename = "m")]
    MediaItem(Uuid),
}

impl CollectionKey {
    pub fn for_block_item(block_item: &BlockItem) -> CollectionKey {
        block_item.collection
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<CollectionKey> {
        serde_json::from_str(raw)
    }
}

/// Content-addressed fingerprint of one block occurrence definition.
///
/// Two occurrences compare equal iff the block, its template and the
/// template assignment are all unchanged since the items were scheduled.
/// Field names are deliberately terse; see CRITICAL RULES above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockKey {
    /// Block id
    pub b: Uuid,
    /// Template id
    pub t: Uuid,
    /// Playout template (assignment) id
    pub p: Uuid,
    /// Block version (updated_at, unix seconds)
    pub bv: i64,
    /// Template version
    pub tv: i64,
    /// Assignment version
    pub pv: i64,
}

impl BlockKey {
    pub fn new(block: &Block, template: &Template, playout_template: &PlayoutTemplate) -> BlockKey {
        BlockKey {
            b: block.id,
            t: template.id,
            p: playout_template.id,
            bv: block.updated_at.timestamp(),
            tv: template.updated_at.timestamp(),
            pv: playout_template.updated_at.timestamp(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<BlockKey> {
        serde_json::from_str(raw)
    }
}
