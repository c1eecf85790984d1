// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data access
// - NO business logic
// - NO invariant enforcement
// - NO event emission
// - NO cross-repository calls

pub mod config_repository;
pub mod content_repository;
pub mod playout_repository;

pub use config_repository::{ConfigRepository, InMemoryConfigRepository, DEFAULT_DAYS_TO_BUILD};
pub use content_repository::{ContentRepository, InMemoryContentRepository};
pub use playout_repository::{InMemoryPlayoutRepository, PlayoutRepository};
