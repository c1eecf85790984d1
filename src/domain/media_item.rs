// src/domain/media_item.rs

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A playable item as seen by the scheduler.
///
/// This is a read-only projection of whatever the media library holds; the
/// scheduler only needs identity, duration and ordering metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    /// Internal immutable identifier
    pub id: Uuid,

    pub title: Option<String>,

    pub kind: MediaKind,

    /// Playback length in seconds
    pub duration_seconds: u32,

    /// Release date, used by chronological ordering (missing dates sort last)
    pub release_date: Option<NaiveDate>,

    /// Season number for episodic content
    pub season_number: Option<u32>,

    /// Episode number for episodic content
    pub episode_number: Option<u32>,

    /// Last update timestamp; feeds the collection etag
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Episode,
    Other,
}

impl MediaItem {
    pub fn new(kind: MediaKind, duration_seconds: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: None,
            kind,
            duration_seconds,
            release_date: None,
            season_number: None,
            episode_number: None,
            updated_at: Utc::now(),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(i64::from(self.duration_seconds))
    }
}
