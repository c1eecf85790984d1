// src/services/mod.rs
//
// Services Module - the scheduling engine

pub mod block_resolver;
pub mod build_worker;
pub mod change_detection;
pub mod collection_etag;
pub mod enumerators;
pub mod filler_builder;
pub mod history;
pub mod playout_builder;

#[cfg(test)]
mod build_worker_tests;

// Re-export the engine surface
pub use block_resolver::{
    get_effective_blocks,
    resolve_local,
    select_template_for,
    EffectiveBlock,
};

pub use build_worker::{
    BuildRequest,
    BuildWorker,
};

pub use change_detection::{
    find_updated_items,
    playout_item_block_keys,
    ChangeDetectionResult,
};

pub use collection_etag::collection_etag;

pub use enumerators::{
    ChronologicalMediaCollectionEnumerator,
    CollectionEnumeratorState,
    MediaCollectionEnumerator,
    SeasonEpisodeMediaCollectionEnumerator,
    ShuffledMediaCollectionEnumerator,
};

pub use filler_builder::FillerBuilder;

pub use history::{
    key_for_block_item,
    move_to_next_item,
    HistoryDetails,
};

pub use playout_builder::PlayoutBuilder;
