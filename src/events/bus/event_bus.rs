// src/events/bus/event_bus.rs
//
// In-process event bus for build outcomes.
//
// CRITICAL RULES:
// - Handlers run synchronously on the emitting task, in subscription order
// - Every emission is logged with its handler count
// - Events dispatch by concrete type; no stringly-typed routing

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::events::types::DomainEvent;

/// Handler with the event type erased for storage
type EventHandler = Box<dyn Fn(&dyn Any) + Send + Sync>;

/// Central coordination point for build events.
///
/// The worker emits; observers (logging, UI refresh triggers, schedulers)
/// subscribe without a direct dependency on the worker.
///
/// Key characteristics:
/// - Synchronous execution (handlers run on the emitting task)
/// - Handlers execute in subscription order
/// - Type-safe through generics
pub struct EventBus {
    /// Map from event TypeId to list of handlers
    handlers: Arc<RwLock<HashMap<TypeId, Vec<EventHandler>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Subscribe to a specific event type.
    ///
    /// Handlers are executed in the order they are subscribed.
    ///
    /// Example:
    /// ```ignore
    /// bus.subscribe::<PlayoutBuilt>(|event| {
    ///     log::info!("playout {} rebuilt", event.playout_id);
    /// });
    /// ```
    pub fn subscribe<E, F>(&self, handler: F)
    where
        E: DomainEvent + 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<E>();

        // Erase the event type so handlers for different events share a map
        let wrapped: EventHandler = Box::new(move |event_any: &dyn Any| {
            if let Some(event) = event_any.downcast_ref::<E>() {
                handler(event);
            } else {
                log::error!(
                    "failed to downcast event in handler for {}",
                    std::any::type_name::<E>()
                );
            }
        });

        let mut handlers = self.handlers.write().unwrap();
        handlers.entry(type_id).or_insert_with(Vec::new).push(wrapped);
    }

    /// Emit an event.
    ///
    /// Executes all handlers for this event type in subscription order and
    /// returns immediately. A panicking handler is caught and logged so the
    /// remaining handlers still execute.
    pub fn emit<E>(&self, event: E)
    where
        E: DomainEvent + 'static,
    {
        let type_id = TypeId::of::<E>();

        let handlers = self.handlers.read().unwrap();
        let event_handlers = handlers.get(&type_id);
        let handler_count = event_handlers.map(|h| h.len()).unwrap_or(0);

        log::debug!(
            "[EVENT] {} (id: {}) | {} handlers",
            event.event_type(),
            event.event_id(),
            handler_count
        );

        if let Some(handlers) = event_handlers {
            for (idx, handler) in handlers.iter().enumerate() {
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    handler(&event as &dyn Any);
                }));

                if let Err(e) = result {
                    log::error!(
                        "handler {} for {} panicked: {:?}",
                        idx,
                        event.event_type(),
                        e
                    );
                }
            }
        }
    }

    /// Number of subscribers for a specific event type
    pub fn subscriber_count<E>(&self) -> usize
    where
        E: 'static,
    {
        let type_id = TypeId::of::<E>();
        let handlers = self.handlers.read().unwrap();
        handlers.get(&type_id).map(|h| h.len()).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// Clones share the same handler table
impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            handlers: Arc::clone(&self.handlers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::PlayoutBuilt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let seen = Arc::new(RwLock::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            bus.subscribe::<PlayoutBuilt, _>(move |_| {
                seen.write().unwrap().push(tag);
            });
        }

        bus.emit(PlayoutBuilt::new(Uuid::new_v4(), 1, 0));
        assert_eq!(*seen.read().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_emit_without_subscribers_is_a_noop() {
        let bus = EventBus::new();
        bus.emit(PlayoutBuilt::new(Uuid::new_v4(), 0, 0));
        assert_eq!(bus.subscriber_count::<PlayoutBuilt>(), 0);
    }

    #[test]
    fn test_panicking_handler_does_not_block_others() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        bus.subscribe::<PlayoutBuilt, _>(|_| panic!("boom"));
        {
            let count = Arc::clone(&count);
            bus.subscribe::<PlayoutBuilt, _>(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }

        bus.emit(PlayoutBuilt::new(Uuid::new_v4(), 0, 0));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
