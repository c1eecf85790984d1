// src/services/filler_builder.rs
//
// Fills the unscheduled gaps between adjacent schedule items after the
// main build. Filler items are disposable: every pass tears down whatever
// filler existed and refills against the fresh timeline.
//
// CRITICAL RULES:
// - Filler never overruns into primary content; a candidate that would
//   cross the gap boundary is discarded without consuming the gap
// - Filler items carry no occurrence fingerprint and no history

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::keys::CollectionKey;
use crate::domain::media_item::MediaItem;
use crate::domain::playout::{BuildResult, Deco, DecoMode, FillerKind, PlayoutItem,
    PlayoutReferenceData};
use crate::error::AppResult;
use crate::repositories::content_repository::ContentRepository;
use crate::services::block_resolver::select_template_for;
use crate::services::enumerators::{
    CollectionEnumeratorState, MediaCollectionEnumerator, ShuffledMediaCollectionEnumerator,
};
use crate::services::playout_builder::derived_id;

pub struct FillerBuilder {
    content_repo: Arc<dyn ContentRepository>,
}

impl FillerBuilder {
    pub fn new(content_repo: Arc<dyn ContentRepository>) -> Self {
        Self { content_repo }
    }

    /// Extend a main-build result with filler for every gap in the merged
    /// timeline of retained and freshly added items.
    pub fn build(
        &self,
        reference: &PlayoutReferenceData,
        mut result: BuildResult,
    ) -> AppResult<BuildResult> {
        // all previously scheduled filler goes; it is rebuilt below
        let removed: HashSet<Uuid> = result.item_ids_to_remove.iter().copied().collect();
        for item in &reference.existing_items {
            if item.filler_kind != FillerKind::None && !removed.contains(&item.id) {
                result.item_ids_to_remove.push(item.id);
            }
        }
        result.item_ids_to_remove.sort();
        let removed: HashSet<Uuid> = result.item_ids_to_remove.iter().copied().collect();

        let mut timeline: Vec<&PlayoutItem> = reference
            .existing_items
            .iter()
            .filter(|item| !removed.contains(&item.id))
            .chain(result.added_items.iter())
            .collect();
        timeline.sort_by_key(|item| item.start);

        let mut collections: HashMap<CollectionKey, Vec<MediaItem>> = HashMap::new();
        let mut filler: Vec<PlayoutItem> = Vec::new();

        for pair in timeline.windows(2) {
            let gap_start = pair[0].finish;
            let gap_finish = pair[1].start;
            if gap_start >= gap_finish {
                continue;
            }

            let Some(deco) = deco_for(reference, gap_start) else {
                continue;
            };
            let Some(collection_key) = deco.filler_collection.clone() else {
                continue;
            };

            if !collections.contains_key(&collection_key) {
                let items = match self.content_repo.items_for(&collection_key) {
                    Ok(items) => items,
                    Err(e) => {
                        log::warn!("failed to load filler content for {:?}: {}", collection_key, e);
                        Vec::new()
                    }
                };
                collections.insert(collection_key.clone(), items);
            }
            let items = collections.get(&collection_key).cloned().unwrap_or_default();
            if items.is_empty() {
                continue;
            }

            self.fill_gap(
                reference,
                &collection_key,
                items,
                gap_start,
                gap_finish,
                &mut filler,
            )?;
        }

        result.added_items.extend(filler);
        result.added_items.sort_by_key(|item| item.start);
        Ok(result)
    }

    fn fill_gap(
        &self,
        reference: &PlayoutReferenceData,
        collection_key: &CollectionKey,
        items: Vec<MediaItem>,
        gap_start: DateTime<Utc>,
        gap_finish: DateTime<Utc>,
        filler: &mut Vec<PlayoutItem>,
    ) -> AppResult<()> {
        // gap-local seed keeps refills deterministic without any history
        let seed = reference.seed ^ gap_start.timestamp() as u64;
        let mut enumerator =
            ShuffledMediaCollectionEnumerator::new(items, CollectionEnumeratorState::start(seed));
        let collection_key_json = collection_key.to_json()?;

        let mut current = gap_start;
        while current < gap_finish {
            let Some(media_item) = enumerator.current() else {
                break;
            };
            let duration = media_item.duration();
            if duration <= Duration::zero() {
                break;
            }
            if current + duration > gap_finish {
                log::debug!("filler would run into primary content; gap done");
                break;
            }

            filler.push(PlayoutItem {
                id: derived_id(
                    "filler",
                    reference.playout_id,
                    &collection_key_json,
                    current,
                    media_item.id,
                ),
                media_item_id: media_item.id,
                start: current,
                finish: current + duration,
                block_key: None,
                collection_key: Some(collection_key_json.clone()),
                collection_etag: None,
                filler_kind: FillerKind::Fallback,
            });

            current += duration;
            enumerator.move_next();
        }

        Ok(())
    }
}

/// The deco governing a given instant: the day's template deco span wins
/// (honoring its mode), otherwise the playout default.
fn deco_for(reference: &PlayoutReferenceData, at: DateTime<Utc>) -> Option<&Deco> {
    let local = at.with_timezone(&reference.timezone);
    let template = select_template_for(&reference.templates, local.date_naive());

    if let Some(playout_template) = template {
        let time = local.time();
        for deco_item in &playout_template.template.deco_items {
            if deco_item.start_time <= time && time < deco_item.end_time {
                return match deco_item.deco.filler_mode {
                    DecoMode::Inherit => reference.deco.as_ref(),
                    DecoMode::Override => Some(&deco_item.deco),
                    DecoMode::Disable => None,
                };
            }
        }
    }

    reference.deco.as_ref()
}
