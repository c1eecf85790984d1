// src/repositories/content_repository.rs

use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::keys::CollectionKey;
use crate::domain::media_item::MediaItem;
use crate::error::AppResult;

/// Read-only access to the media library, keyed by content source.
///
/// Distinct keys are independent; a build fetches each referenced key once,
/// up front, and never touches the repository again mid-algorithm.
pub trait ContentRepository: Send + Sync {
    fn items_for(&self, key: &CollectionKey) -> AppResult<Vec<MediaItem>>;
}

/// HashMap-backed implementation, used by tests and embedding callers that
/// keep the library in memory.
pub struct InMemoryContentRepository {
    collections: RwLock<HashMap<CollectionKey, Vec<MediaItem>>>,
}

impl InMemoryContentRepository {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, key: CollectionKey, items: Vec<MediaItem>) {
        self.collections.write().unwrap().insert(key, items);
    }

    pub fn remove(&self, key: &CollectionKey) {
        self.collections.write().unwrap().remove(key);
    }
}

impl Default for InMemoryContentRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentRepository for InMemoryContentRepository {
    fn items_for(&self, key: &CollectionKey) -> AppResult<Vec<MediaItem>> {
        let collections = self.collections.read().unwrap();
        Ok(collections.get(key).cloned().unwrap_or_default())
    }
}
