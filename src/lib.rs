// src/lib.rs
// ChannelHub - Block-based playout scheduling engine
//
// Architecture:
// - Domain-centric: All business logic lives in domains
// - Event-driven: Services coordinate through events
// - Explicit: No implicit behavior, no magic
// - Deterministic: Same inputs produce the same schedule

// ============================================================================
// MODULES
// ============================================================================

pub mod domain;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;

// ============================================================================
// PUBLIC API - Domain Entities
// ============================================================================

pub use domain::{
    validate_block,
    validate_playout_template,
    // Block
    Block,
    BlockItem,
    // Identity keys
    BlockKey,
    BlockStopScheduling,
    // Playout aggregate
    BuildResult,
    CollectionKey,
    DateRange,
    Deco,
    DecoMode,
    DecoTemplateItem,
    FillerKind,
    // Media
    MediaItem,
    MediaKind,
    PlaybackOrder,
    Playout,
    PlayoutHistory,
    PlayoutItem,
    PlayoutReferenceData,
    // Template
    PlayoutTemplate,
    Template,
    TemplateItem,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{DomainEvent, EventBus, PlayoutBuildFailed, PlayoutBuilt};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    ConfigRepository,
    ContentRepository,
    InMemoryConfigRepository,
    InMemoryContentRepository,
    InMemoryPlayoutRepository,
    PlayoutRepository,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    get_effective_blocks,
    BuildRequest,
    BuildWorker,
    EffectiveBlock,
    FillerBuilder,
    PlayoutBuilder,
};
