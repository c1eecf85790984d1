// src/events/types.rs
//
// Build-lifecycle events.
//
// CRITICAL RULES:
// - An event records something that already happened; it commands nothing
// - Events carry only what a subscriber needs to react
// - No business logic in event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

// ============================================================================
// BUILD EVENTS
// ============================================================================

/// Emitted when a playout build completes and its diff has been applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayoutBuilt {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub playout_id: Uuid,
    pub items_added: usize,
    pub items_removed: usize,
}

impl PlayoutBuilt {
    pub fn new(playout_id: Uuid, items_added: usize, items_removed: usize) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            playout_id,
            items_added,
            items_removed,
        }
    }
}

impl DomainEvent for PlayoutBuilt {
    fn event_id(&self) -> Uuid {
        self.event_id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
    fn event_type(&self) -> &'static str {
        "PlayoutBuilt"
    }
}

/// Emitted when a playout build fails; the previous schedule is untouched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayoutBuildFailed {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub playout_id: Uuid,
    pub reason: String,
}

impl PlayoutBuildFailed {
    pub fn new(playout_id: Uuid, reason: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            playout_id,
            reason,
        }
    }
}

impl DomainEvent for PlayoutBuildFailed {
    fn event_id(&self) -> Uuid {
        self.event_id
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
    fn event_type(&self) -> &'static str {
        "PlayoutBuildFailed"
    }
}
