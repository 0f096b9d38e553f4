//! Typed event bus
//!
//! Key principles:
//! - Event types are Rust types, keyed by `TypeId`
//! - Delivery is synchronous and in registration order
//! - A failing handler stops delivery and the error reaches the emitter
//! - `on` returns a [`Subscription`]; handing it back is the only way to
//!   remove a handler, so two identical closures can never be confused

use std::any::{Any, TypeId};
use std::collections::HashMap;

use thiserror::Error;

/// Marker trait for event payloads
pub trait Event: 'static {}

/// Error returned by an event handler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    /// Create a handler error from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors raised while emitting an event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// A handler rejected the event; later handlers did not run
    #[error("handler #{subscription} for {event} failed: {source}")]
    Handler {
        /// Type name of the event
        event: &'static str,
        /// Id of the failing subscription
        subscription: u64,
        /// Error returned by the handler
        #[source]
        source: HandlerError,
    },
}

/// Receipt for a registered handler
///
/// Pass it to [`EventBus::off`] (or call [`Subscription::unsubscribe`]) to
/// remove the handler. Dropping it keeps the handler registered for good.
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "dropping a Subscription makes its handler permanent"]
pub struct Subscription {
    event: TypeId,
    event_name: &'static str,
    id: u64,
}

impl Subscription {
    /// Id of this subscription, unique within its bus
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Type name of the subscribed event
    pub const fn event_name(&self) -> &'static str {
        self.event_name
    }

    /// Remove the handler from `bus`
    pub fn unsubscribe(self, bus: &mut EventBus) -> bool {
        bus.off(self)
    }
}

type ErasedHandler = Box<dyn FnMut(&dyn Any) -> Result<(), HandlerError>>;

struct HandlerEntry {
    id: u64,
    handler: ErasedHandler,
}

/// Synchronous publish/subscribe bus
pub struct EventBus {
    handlers: HashMap<TypeId, Vec<HandlerEntry>>,
    next_id: u64,
    emitted: u64,
}

impl EventBus {
    /// Create a new empty event bus
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            next_id: 0,
            emitted: 0,
        }
    }

    /// Register a handler for events of type `E`
    pub fn on<E: Event>(
        &mut self,
        mut handler: impl FnMut(&E) -> Result<(), HandlerError> + 'static,
    ) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;

        let erased: ErasedHandler = Box::new(move |event: &dyn Any| {
            event.downcast_ref::<E>().map_or(Ok(()), &mut handler)
        });

        self.handlers
            .entry(TypeId::of::<E>())
            .or_default()
            .push(HandlerEntry { id, handler: erased });

        Subscription {
            event: TypeId::of::<E>(),
            event_name: std::any::type_name::<E>(),
            id,
        }
    }

    /// Remove the handler behind `subscription`
    ///
    /// Returns `false` if the bus no longer knows it (for example after
    /// [`clear`](Self::clear)).
    pub fn off(&mut self, subscription: Subscription) -> bool {
        let Some(handlers) = self.handlers.get_mut(&subscription.event) else {
            return false;
        };
        let Some(position) = handlers.iter().position(|entry| entry.id == subscription.id) else {
            return false;
        };
        handlers.remove(position);
        if handlers.is_empty() {
            self.handlers.remove(&subscription.event);
        }
        true
    }

    /// Deliver `event` to every handler registered for `E`, in order
    pub fn emit<E: Event>(&mut self, event: &E) -> Result<(), EventError> {
        self.emitted += 1;
        let Some(handlers) = self.handlers.get_mut(&TypeId::of::<E>()) else {
            return Ok(());
        };

        for entry in handlers.iter_mut() {
            (entry.handler)(event).map_err(|source| EventError::Handler {
                event: std::any::type_name::<E>(),
                subscription: entry.id,
                source,
            })?;
        }
        Ok(())
    }

    /// Number of handlers registered for `E`
    pub fn handler_count<E: Event>(&self) -> usize {
        self.handlers.get(&TypeId::of::<E>()).map_or(0, Vec::len)
    }

    /// Number of `emit` calls so far
    pub const fn emitted_count(&self) -> u64 {
        self.emitted
    }

    /// Drop every handler
    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
