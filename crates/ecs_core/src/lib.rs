//! # ECS Core
//!
//! A pooled, single-threaded Entity-Component-System runtime for 2D games.
//!
//! ## Features
//!
//! - **Pooled Components**: Component instances are recycled through per-type pools
//! - **Prioritized Systems**: Logic and render systems run in a stable priority order
//! - **Declarative Queries**: Filter entities by components, tags and predicates
//! - **Typed Events**: Synchronous publish/subscribe with explicit subscriptions
//! - **Configuration**: TOML or RON world settings
//!
//! ## Quick Start
//!
//! ```rust
//! use ecs_core::prelude::*;
//!
//! #[derive(Default)]
//! struct Velocity(f32);
//! impl Component for Velocity {}
//!
//! struct Drift;
//!
//! impl System for Drift {
//!     fn update(&mut self, world: &mut World, delta_time: f32) -> SystemResult {
//!         for id in world.query().with::<Velocity>().execute() {
//!             if let Some(velocity) = world.get_component_mut::<Velocity>(id) {
//!                 velocity.0 *= 1.0 - delta_time;
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), EcsError> {
//!     let mut world = World::new();
//!     world.add_system(Drift)?;
//!
//!     let ship = world.create_entity();
//!     world.add_component(ship, Velocity(10.0))?;
//!     world.update(0.5)?;
//!
//!     assert_eq!(world.get_component::<Velocity>(ship).map(|v| v.0), Some(5.0));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod ecs;
pub mod events;
pub mod render;

/// Common imports for runtime users
pub mod prelude {
    pub use crate::{
        component_keys,
        config::{Config, ConfigError, WorldConfig},
        ecs::{
            Component, ComponentHandle, ComponentKey, EcsError, Entity, EntityId, EntityRef, Query,
            RenderSystem, System, SystemError, SystemId, SystemResult, World,
        },
        events::{Event, EventBus, EventError, HandlerError, Subscription},
        foundation::{
            math::{Rect, Vec2},
            time::Stopwatch,
        },
        render::{Camera, RenderContext},
    };
}
