//! System traits and the world's per-system bookkeeping
//!
//! Systems hold logic, components hold data. A system is registered once,
//! initialised once, updated every frame while active and cleaned up once
//! on removal. Drawing is an explicit capability: only types registered
//! through [`World::add_render_system`] take part in the render pass.

use std::time::Duration;

use serde::Serialize;

use super::component::ComponentKey;
use super::entity::EntityId;
use super::error::SystemResult;
use super::world::World;
use crate::render::{Camera, RenderContext};

slotmap::new_key_type! {
    /// Handle to a registered system
    pub struct SystemId;
}

/// Logic processor driven by [`World::update`]
pub trait System {
    /// Name used in logs and errors
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Execution order key; lower runs earlier, ties keep registration order
    fn priority(&self) -> i32 {
        0
    }

    /// Called once when the system is registered
    fn init(&mut self, _world: &mut World) -> SystemResult {
        Ok(())
    }

    /// Called once per frame while the system is active
    fn update(&mut self, world: &mut World, delta_time: f32) -> SystemResult;

    /// Called once when the system is removed or the world is torn down
    fn cleanup(&mut self, _world: &mut World) {}

    /// Active entities carrying every component in `keys`
    ///
    /// The list is a snapshot; entities created or destroyed afterwards in
    /// the same frame are not reflected.
    fn get_entities(&self, world: &World, keys: &[ComponentKey]) -> Vec<EntityId> {
        world.entities_with(keys)
    }
}

/// A system that also draws, driven by [`World::render`]
pub trait RenderSystem: System {
    /// Called once per render pass while the system is active
    fn render(&mut self, world: &World, ctx: &mut dyn RenderContext, camera: &dyn Camera) -> SystemResult;
}

/// Registered system, tagged with its capability
pub(crate) enum SystemKind {
    Logic(Box<dyn System>),
    Render(Box<dyn RenderSystem>),
}

impl SystemKind {
    pub(crate) fn name(&self) -> &str {
        match self {
            Self::Logic(system) => system.name(),
            Self::Render(system) => system.name(),
        }
    }

    pub(crate) fn priority(&self) -> i32 {
        match self {
            Self::Logic(system) => system.priority(),
            Self::Render(system) => system.priority(),
        }
    }

    pub(crate) const fn renders(&self) -> bool {
        matches!(self, Self::Render(_))
    }

    pub(crate) fn init(&mut self, world: &mut World) -> SystemResult {
        match self {
            Self::Logic(system) => system.init(world),
            Self::Render(system) => system.init(world),
        }
    }

    pub(crate) fn update(&mut self, world: &mut World, delta_time: f32) -> SystemResult {
        match self {
            Self::Logic(system) => system.update(world, delta_time),
            Self::Render(system) => system.update(world, delta_time),
        }
    }

    pub(crate) fn render(&mut self, world: &World, ctx: &mut dyn RenderContext, camera: &dyn Camera) -> SystemResult {
        match self {
            Self::Logic(_) => Ok(()),
            Self::Render(system) => system.render(world, ctx, camera),
        }
    }

    pub(crate) fn cleanup(&mut self, world: &mut World) {
        match self {
            Self::Logic(system) => system.cleanup(world),
            Self::Render(system) => system.cleanup(world),
        }
    }
}

/// Rolling per-system diagnostics; not part of correctness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SystemStats {
    /// Duration of the most recent `update`
    pub last_update: Duration,
    /// Duration of the most recent `render`
    pub last_render: Duration,
    /// Entities returned by queries during the most recent `update`
    pub last_entity_count: usize,
    /// Number of `update` calls so far
    pub update_calls: u64,
}

/// The world's record of one registered system
pub(crate) struct SystemSlot {
    pub(crate) name: String,
    pub(crate) priority: i32,
    pub(crate) renders: bool,
    pub(crate) active: bool,
    /// `init` has run
    pub(crate) initialized: bool,
    /// Removal requested mid-frame, applied at the next update
    pub(crate) pending_removal: bool,
    pub(crate) stats: SystemStats,
    /// `None` while the system itself is running
    pub(crate) system: Option<SystemKind>,
}

impl SystemSlot {
    pub(crate) fn new(system: SystemKind) -> Self {
        Self {
            name: system.name().to_owned(),
            priority: system.priority(),
            renders: system.renders(),
            active: true,
            initialized: false,
            pending_removal: false,
            stats: SystemStats::default(),
            system: Some(system),
        }
    }
}
