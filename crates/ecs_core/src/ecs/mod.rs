//! Entity-Component-System implementation
//!
//! Pooled, single-threaded ECS runtime for game logic.

pub mod world;
pub mod entity;
pub mod component;
pub mod pool;
pub mod system;
pub mod query;
pub mod error;

pub use world::{World, WorldStats};
pub use entity::{Entity, EntityId};
pub use component::{Component, ComponentHandle, ComponentKey};
pub use pool::{ComponentPool, PoolStats};
pub use system::{RenderSystem, System, SystemId, SystemStats};
pub use query::{EntityRef, Query};
pub use error::{EcsError, SystemError, SystemResult};
