// src/events/mod.rs
//
// Internal Event System - Public API
//
// CRITICAL: EventHandler is INTERNAL and must NOT be exported

pub mod bus;
pub mod types;

pub use bus::EventBus;

pub use types::{DomainEvent, PlayoutBuildFailed, PlayoutBuilt};
