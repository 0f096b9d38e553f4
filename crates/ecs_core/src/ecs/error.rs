//! ECS error types

use thiserror::Error;

use super::component::ComponentKey;
use super::entity::EntityId;
use super::system::SystemId;
use crate::events::EventError;

/// Errors raised by the [`World`](super::World)
///
/// Setup-time faults (`DuplicatePool`, `SystemInit`) are programmer errors
/// and are expected to be fixed rather than handled. `SystemFailed` carries
/// whatever a system returned from `update` or `render`; the world does not
/// isolate systems from each other, so the rest of that pass is skipped.
#[derive(Error, Debug)]
pub enum EcsError {
    /// The id never existed or its entity has been recycled
    #[error("{0} does not exist or has been recycled")]
    EntityNotFound(EntityId),

    /// The handle's instance was released back to its pool
    #[error("{key} handle for slot {index} is no longer live")]
    StaleComponentHandle {
        /// Component type of the handle
        key: ComponentKey,
        /// Slot index of the handle
        index: usize,
    },

    /// The handle's instance is already attached to another entity
    #[error("{key} handle for slot {index} is already attached to {owner}")]
    ComponentAlreadyAttached {
        /// Component type of the handle
        key: ComponentKey,
        /// Slot index of the handle
        index: usize,
        /// Entity currently holding the instance
        owner: EntityId,
    },

    /// A pool stored under a key does not hold that key's type
    #[error("pool registered for {0} holds a different component type")]
    PoolTypeMismatch(ComponentKey),

    /// `register_component_pool` was called twice for one type
    #[error("a pool for {0} is already registered")]
    DuplicatePool(ComponentKey),

    /// The system id is unknown or was removed
    #[error("system {0:?} is not registered")]
    SystemNotFound(SystemId),

    /// `update` or `render` was called from inside a system
    #[error("world {0} called while a frame pass is already running")]
    ReentrantFrame(&'static str),

    /// A system's `init` hook failed, so it was not registered
    #[error("system '{system}' failed to initialize: {source}")]
    SystemInit {
        /// Name of the failing system
        system: String,
        /// Error returned by the hook
        #[source]
        source: Box<SystemError>,
    },

    /// A system's `update` or `render` hook failed
    #[error("system '{system}' failed: {source}")]
    SystemFailed {
        /// Name of the failing system
        system: String,
        /// Error returned by the hook
        #[source]
        source: Box<SystemError>,
    },

}

/// Errors returned from [`System`](super::System) hooks
#[derive(Error, Debug)]
pub enum SystemError {
    /// A world operation failed inside the system
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// An event emitted by the system was rejected by a handler
    #[error(transparent)]
    Event(#[from] EventError),

    /// The system's own logic failed
    #[error("{0}")]
    Logic(String),
}

impl SystemError {
    /// Create a logic error from a message
    pub fn logic(message: impl Into<String>) -> Self {
        Self::Logic(message.into())
    }
}

/// Result type for system hooks
pub type SystemResult = Result<(), SystemError>;
