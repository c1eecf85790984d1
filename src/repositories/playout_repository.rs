// src/repositories/playout_repository.rs

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use uuid::Uuid;

use crate::domain::playout::{BuildResult, Playout, PlayoutReferenceData};
use crate::error::{AppError, AppResult};

/// Load/apply boundary around the Playout aggregate.
///
/// `apply` must be transactional: either the whole diff lands or none of it.
pub trait PlayoutRepository: Send + Sync {
    /// Immutable snapshot for one build pass; None when the playout is gone
    fn load(&self, playout_id: Uuid) -> AppResult<Option<PlayoutReferenceData>>;

    /// Apply a build diff to the aggregate
    fn apply(&self, playout_id: Uuid, result: &BuildResult) -> AppResult<()>;
}

/// HashMap-backed implementation; the single lock scope per call is what
/// makes `apply` atomic here.
pub struct InMemoryPlayoutRepository {
    playouts: RwLock<HashMap<Uuid, Playout>>,
}

impl InMemoryPlayoutRepository {
    pub fn new() -> Self {
        Self {
            playouts: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, playout: Playout) {
        self.playouts.write().unwrap().insert(playout.id, playout);
    }

    pub fn get(&self, playout_id: Uuid) -> Option<Playout> {
        self.playouts.read().unwrap().get(&playout_id).cloned()
    }
}

impl Default for InMemoryPlayoutRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayoutRepository for InMemoryPlayoutRepository {
    fn load(&self, playout_id: Uuid) -> AppResult<Option<PlayoutReferenceData>> {
        let playouts = self.playouts.read().unwrap();
        Ok(playouts.get(&playout_id).map(Playout::reference_data))
    }

    fn apply(&self, playout_id: Uuid, result: &BuildResult) -> AppResult<()> {
        let mut playouts = self.playouts.write().unwrap();
        let playout = playouts
            .get_mut(&playout_id)
            .ok_or(AppError::PlayoutNotFound)?;

        let removed_items: HashSet<Uuid> = result.item_ids_to_remove.iter().copied().collect();
        let removed_history: HashSet<Uuid> =
            result.history_ids_to_remove.iter().copied().collect();

        playout.items.retain(|i| !removed_items.contains(&i.id));
        playout.items.extend(result.added_items.iter().cloned());
        playout.items.sort_by_key(|i| i.start);

        playout.history.retain(|h| !removed_history.contains(&h.id));
        playout.history.extend(result.added_history.iter().cloned());
        playout.history.sort_by_key(|h| h.when);

        Ok(())
    }
}
