// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// This file MUST declare all domain modules and re-export their public API.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod block;
pub mod keys;
pub mod media_item;
pub mod playout;
pub mod template;

// ============================================================================
// DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Block duration must be positive, got {minutes} minutes")]
    NonPositiveBlockDuration { minutes: u32 },

    #[error("Block item indexes must be unique, index {index} repeats")]
    DuplicateBlockItemIndex { index: u32 },

    #[error("Playout template has an empty recurrence set: {field}")]
    EmptyRecurrence { field: &'static str },

    #[error("Day of month {day} is out of range 1..=31")]
    DayOfMonthOutOfRange { day: u32 },

    #[error("Month {month} is out of range 1..=12")]
    MonthOutOfRange { month: u32 },
}

pub type DomainResult<T> = Result<T, DomainError>;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Block Domain
pub use block::{validate_block, Block, BlockItem, BlockStopScheduling, PlaybackOrder};

// Template Domain
pub use template::{validate_playout_template, DateRange, PlayoutTemplate, Template, TemplateItem};

// Media Items
pub use media_item::{MediaItem, MediaKind};

// Playout Aggregate
pub use playout::{
    BuildResult, Deco, DecoMode, DecoTemplateItem, FillerKind, Playout, PlayoutHistory, PlayoutItem,
    PlayoutReferenceData,
};

// Stable Identity Keys
pub use keys::{BlockKey, CollectionKey};
