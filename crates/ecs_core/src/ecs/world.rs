//! ECS World implementation
//!
//! The world owns every entity, component pool, system and event handler
//! reachable from it. A host loop drives it with one [`World::update`] and
//! one [`World::render`] per frame:
//!
//! ```text
//! update(dt)
//!   ├── apply system adds/removes deferred from the last frame
//!   ├── rebuild update/render order if dirty
//!   ├── recycle destroyed entities, releasing their components
//!   └── system.update(world, dt) in ascending priority
//! render(ctx, camera)
//!   └── render_system.render(world, ctx, camera) in the same order
//! ```

use std::cell::Cell;
use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use slotmap::SlotMap;

use super::component::{Component, ComponentHandle, ComponentKey};
use super::entity::{Entity, EntityId};
use super::error::EcsError;
use super::pool::{ComponentPool, ErasedPool, PoolStats};
use super::query::{EntityRef, Query};
use super::system::{RenderSystem, System, SystemId, SystemKind, SystemSlot, SystemStats};
use crate::config::WorldConfig;
use crate::events::{Event, EventBus, EventError, HandlerError, Subscription};
use crate::foundation::time::Stopwatch;
use crate::render::{self, Camera};

/// Read-only counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorldStats {
    /// Entities in the world, including destroyed ones not yet recycled
    pub entity_count: usize,
    /// Entities that have not been destroyed
    pub active_entity_count: usize,
    /// Recycled entity records waiting for reuse
    pub pooled_entity_count: usize,
    /// Registered systems
    pub system_count: usize,
    /// Completed `update` calls
    pub frame: u64,
    /// Duration of the most recent `update`
    pub last_update: Duration,
    /// Duration of the most recent `render`
    pub last_render: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FramePhase {
    Idle,
    Updating,
    Rendering,
}

#[derive(Debug, Clone, Copy)]
enum PendingOp {
    Add(SystemId),
    Remove(SystemId),
}

/// ECS World containing all entities, components and systems
pub struct World {
    config: WorldConfig,

    next_entity_id: u64,
    /// Entity records, live or waiting on the free list
    records: Vec<Entity>,
    /// Record indices of live entities, in creation order
    entities: Vec<usize>,
    entity_free_list: Vec<usize>,
    index: HashMap<EntityId, usize>,

    systems: SlotMap<SystemId, SystemSlot>,
    registration: Vec<SystemId>,
    update_order: Vec<SystemId>,
    render_order: Vec<SystemId>,
    order_dirty: bool,
    pending: Vec<PendingOp>,
    phase: FramePhase,
    current_system: Option<SystemId>,
    touched: Cell<usize>,

    pools: HashMap<ComponentKey, Box<dyn ErasedPool>>,
    /// Entity holding each attached component instance
    owners: HashMap<ComponentHandle, EntityId>,
    events: EventBus,

    frame: u64,
    last_update: Duration,
    last_render: Duration,
}

impl World {
    /// Create a new world with default configuration
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a new world with the given configuration
    pub fn with_config(config: WorldConfig) -> Self {
        let capacity = config.initial_entity_capacity;
        Self {
            config,
            next_entity_id: 0,
            records: Vec::with_capacity(capacity),
            entities: Vec::with_capacity(capacity),
            entity_free_list: Vec::new(),
            index: HashMap::with_capacity(capacity),
            systems: SlotMap::with_key(),
            registration: Vec::new(),
            update_order: Vec::new(),
            render_order: Vec::new(),
            order_dirty: false,
            pending: Vec::new(),
            phase: FramePhase::Idle,
            current_system: None,
            touched: Cell::new(0),
            pools: HashMap::new(),
            owners: HashMap::new(),
            events: EventBus::new(),
            frame: 0,
            last_update: Duration::ZERO,
            last_render: Duration::ZERO,
        }
    }

    /// Active configuration
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    /// Create a new entity, reusing a recycled record when one is free
    pub fn create_entity(&mut self) -> EntityId {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;

        let record = if let Some(record) = self.entity_free_list.pop() {
            self.records[record].reset(id);
            record
        } else {
            self.records.push(Entity::new(id));
            self.records.len() - 1
        };

        self.entities.push(record);
        self.index.insert(id, record);
        id
    }

    /// Mark an entity for removal at the start of the next update
    ///
    /// Returns `false` if the id is unknown. Destroying twice is harmless.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        self.entity_mut(id).map(Entity::destroy).is_some()
    }

    /// Entity record for `id`
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&record| &self.records[record])
    }

    /// Mutable entity record for `id`
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let record = *self.index.get(&id)?;
        Some(&mut self.records[record])
    }

    /// Read view of `id` bundling the world, for component lookups
    pub fn entity_ref(&self, id: EntityId) -> Option<EntityRef<'_>> {
        self.entity(id).map(|entity| EntityRef::new(self, entity))
    }

    /// Whether `id` exists and has not been destroyed
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entity(id).is_some_and(Entity::is_active)
    }

    /// Active entities in creation order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entity_records().filter(|entity| entity.is_active())
    }

    /// Entities in the world, including destroyed ones not yet recycled
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entities that have not been destroyed
    pub fn active_entity_count(&self) -> usize {
        self.entities().count()
    }

    pub(crate) fn entity_records(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter().map(|&record| &self.records[record])
    }

    fn record_of(&self, id: EntityId) -> Result<usize, EcsError> {
        self.index.get(&id).copied().ok_or(EcsError::EntityNotFound(id))
    }

    /// Recycle every destroyed entity; returns how many were recycled
    fn sweep_destroyed(&mut self) -> usize {
        let mut order = std::mem::take(&mut self.entities);
        let before = order.len();
        order.retain(|&record| {
            if self.records[record].is_active() {
                true
            } else {
                self.remove_entity(record);
                false
            }
        });
        let recycled = before - order.len();
        self.entities = order;
        recycled
    }

    /// Release an entity's components and put its record on the free list
    fn remove_entity(&mut self, record: usize) {
        let entity = &mut self.records[record];
        let id = entity.id();
        for handle in entity.drain_handles() {
            self.owners.remove(&handle);
            if let Some(pool) = self.pools.get_mut(&handle.key()) {
                pool.release(handle);
            }
        }
        self.index.remove(&id);
        self.entity_free_list.push(record);
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Register a pool for `T`, pre-building `initial_size` instances
    ///
    /// Must happen before the first use of `T`; a second registration is an
    /// error. `factory` only builds new instances: a recycled instance is
    /// reset with [`Component::reset`], so the factory's value does not
    /// survive reuse unless `reset` restores it.
    pub fn register_component_pool<T: Component>(
        &mut self,
        factory: impl Fn() -> T + 'static,
        initial_size: usize,
    ) -> Result<(), EcsError> {
        let key = ComponentKey::of::<T>();
        if self.pools.contains_key(&key) {
            return Err(EcsError::DuplicatePool(key));
        }

        let mut pool = ComponentPool::new(factory).with_growth_logging(self.config.log_pool_growth);
        pool.prepopulate(initial_size);
        self.pools.insert(key, Box::new(pool));
        log::debug!("Registered component pool for {} with {} instances", key, initial_size);
        Ok(())
    }

    fn pool<T: Component>(&self) -> Option<&ComponentPool<T>> {
        self.pools
            .get(&ComponentKey::of::<T>())?
            .as_any()
            .downcast_ref::<ComponentPool<T>>()
    }

    fn pool_mut<T: Component>(&mut self) -> Result<&mut ComponentPool<T>, EcsError> {
        let key = ComponentKey::of::<T>();
        let config = &self.config;
        self.pools
            .entry(key)
            .or_insert_with(|| {
                let mut pool = ComponentPool::<T>::with_default().with_growth_logging(config.log_pool_growth);
                pool.prepopulate(config.default_pool_size);
                log::debug!("Created component pool for {} on first use", key);
                Box::new(pool)
            })
            .as_any_mut()
            .downcast_mut::<ComponentPool<T>>()
            .ok_or(EcsError::PoolTypeMismatch(key))
    }

    /// Take a reset `T` from its pool, creating the pool on first use
    pub fn get_pooled_component<T: Component>(&mut self) -> Result<ComponentHandle, EcsError> {
        Ok(self.pool_mut::<T>()?.acquire())
    }

    /// Return a component to its pool
    ///
    /// Returns `false` for handles that are not live. The caller is
    /// responsible for not releasing a component still attached to an entity.
    pub fn release_component(&mut self, handle: ComponentHandle) -> bool {
        self.owners.remove(&handle);
        self.pools
            .get_mut(&handle.key())
            .is_some_and(|pool| pool.release(handle))
    }

    /// Pooled component value behind `handle`
    pub fn component<T: Component>(&self, handle: ComponentHandle) -> Option<&T> {
        self.pool::<T>()?.get(handle)
    }

    /// Mutable pooled component value behind `handle`
    pub fn component_mut<T: Component>(&mut self, handle: ComponentHandle) -> Option<&mut T> {
        self.pools
            .get_mut(&ComponentKey::of::<T>())?
            .as_any_mut()
            .downcast_mut::<ComponentPool<T>>()?
            .get_mut(handle)
    }

    /// Occupancy of the pool for `T`, if it exists
    pub fn pool_stats<T: Component>(&self) -> Option<PoolStats> {
        self.pool_stats_for(ComponentKey::of::<T>())
    }

    /// Occupancy of the pool for `key`, if it exists
    pub fn pool_stats_for(&self, key: ComponentKey) -> Option<PoolStats> {
        self.pools.get(&key).map(|pool| pool.stats())
    }

    /// Attach `value` to an entity using a pooled instance
    ///
    /// Any component of the same type already attached is released back to
    /// its pool.
    pub fn add_component<T: Component>(&mut self, id: EntityId, value: T) -> Result<ComponentHandle, EcsError> {
        let record = self.record_of(id)?;
        let pool = self.pool_mut::<T>()?;
        let handle = pool.acquire();
        if let Some(slot) = pool.get_mut(handle) {
            *slot = value;
        }
        self.attach_at(record, handle);
        Ok(handle)
    }

    /// Attach an already acquired component to an entity
    ///
    /// Any component of the same type already attached is released back to
    /// its pool. A handle attached to a different entity is rejected; detach
    /// it there with [`remove_component`](Self::remove_component) first.
    pub fn attach_component(&mut self, id: EntityId, handle: ComponentHandle) -> Result<(), EcsError> {
        let record = self.record_of(id)?;
        if let Some(&owner) = self.owners.get(&handle) {
            if owner != id {
                return Err(EcsError::ComponentAlreadyAttached {
                    key: handle.key(),
                    index: handle.index(),
                    owner,
                });
            }
        }
        let live = self
            .pools
            .get(&handle.key())
            .is_some_and(|pool| pool.is_live(handle));
        if !live {
            return Err(EcsError::StaleComponentHandle {
                key: handle.key(),
                index: handle.index(),
            });
        }
        self.attach_at(record, handle);
        Ok(())
    }

    fn attach_at(&mut self, record: usize, handle: ComponentHandle) {
        self.owners.insert(handle, self.records[record].id());
        if let Some(replaced) = self.records[record].insert_handle(handle) {
            if replaced != handle && self.release_component(replaced) {
                log::trace!("Released replaced {} on {}", replaced.key(), self.records[record].id());
            }
        }
    }

    /// Component of type `T` attached to `id`
    pub fn get_component<T: Component>(&self, id: EntityId) -> Option<&T> {
        let handle = self.entity(id)?.component_handle::<T>()?;
        self.component(handle)
    }

    /// Mutable component of type `T` attached to `id`
    pub fn get_component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        let handle = self.entity(id)?.component_handle::<T>()?;
        self.component_mut(handle)
    }

    /// Whether `id` carries a `T`
    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.entity(id).is_some_and(Entity::has_component::<T>)
    }

    /// Detach the `T` from `id` without releasing it
    ///
    /// The returned handle stays live; pass it to
    /// [`release_component`](Self::release_component) or attach it elsewhere.
    #[must_use = "a detached component stays out of its pool until released"]
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> Option<ComponentHandle> {
        let handle = self.entity_mut(id)?.remove_handle(ComponentKey::of::<T>())?;
        self.owners.remove(&handle);
        Some(handle)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Start a query over the active entities
    pub fn query(&self) -> Query<'_> {
        Query::new(self)
    }

    /// Active entities carrying every component in `keys`
    pub fn entities_with(&self, keys: &[ComponentKey]) -> Vec<EntityId> {
        self.query().with_keys(keys).execute()
    }

    pub(crate) fn note_touched(&self, count: usize) {
        self.touched.set(self.touched.get() + count);
    }

    // ------------------------------------------------------------------
    // Systems
    // ------------------------------------------------------------------

    /// Register a logic system and run its `init`
    ///
    /// Called from inside a system's update, the registration (and `init`)
    /// is deferred to the start of the next update.
    pub fn add_system<S: System + 'static>(&mut self, system: S) -> Result<SystemId, EcsError> {
        self.register(SystemKind::Logic(Box::new(system)))
    }

    /// Register a system that also takes part in the render pass
    pub fn add_render_system<S: RenderSystem + 'static>(&mut self, system: S) -> Result<SystemId, EcsError> {
        self.register(SystemKind::Render(Box::new(system)))
    }

    fn register(&mut self, system: SystemKind) -> Result<SystemId, EcsError> {
        let id = self.systems.insert(SystemSlot::new(system));
        if self.phase == FramePhase::Idle {
            self.initialize_system(id)?;
        } else {
            log::debug!("Deferring registration of system {:?} to the next update", id);
            self.pending.push(PendingOp::Add(id));
        }
        Ok(id)
    }

    fn initialize_system(&mut self, id: SystemId) -> Result<(), EcsError> {
        let Some(mut system) = self.systems.get_mut(id).and_then(|slot| slot.system.take()) else {
            return Ok(());
        };
        self.registration.push(id);

        if let Err(source) = system.init(self) {
            let name = system.name().to_owned();
            self.systems.remove(id);
            self.registration.retain(|registered| *registered != id);
            return Err(EcsError::SystemInit {
                system: name,
                source: Box::new(source),
            });
        }

        match self.systems.get_mut(id) {
            Some(slot) => {
                slot.system = Some(system);
                slot.initialized = true;
                self.order_dirty = true;
                log::info!("Registered system '{}' (priority {})", slot.name, slot.priority);
            }
            // Removed itself during init
            None => system.cleanup(self),
        }
        Ok(())
    }

    /// Remove a system, running its `cleanup`
    ///
    /// Called from inside a system's update, the system stops running at
    /// once and its removal and `cleanup` happen at the next update.
    pub fn remove_system(&mut self, id: SystemId) -> Result<(), EcsError> {
        let slot = self.systems.get_mut(id).ok_or(EcsError::SystemNotFound(id))?;
        if self.phase == FramePhase::Idle {
            self.detach_system(id);
        } else if !slot.pending_removal {
            slot.pending_removal = true;
            slot.active = false;
            self.order_dirty = true;
            self.pending.push(PendingOp::Remove(id));
            log::debug!("Deferring removal of system '{}' to the next update", slot.name);
        }
        Ok(())
    }

    fn detach_system(&mut self, id: SystemId) {
        let Some(slot) = self.systems.remove(id) else {
            return;
        };
        self.registration.retain(|registered| *registered != id);
        self.order_dirty = true;

        if let Some(mut system) = slot.system {
            if slot.initialized {
                system.cleanup(self);
            }
        }
        log::info!("Removed system '{}'", slot.name);
    }

    fn apply_pending(&mut self) -> Result<(), EcsError> {
        let mut first_error = None;
        for op in std::mem::take(&mut self.pending) {
            match op {
                PendingOp::Add(id) => {
                    if self.systems.get(id).is_some_and(|slot| slot.pending_removal) {
                        log::debug!("Dropping system {:?}, removed before it was initialized", id);
                        continue;
                    }
                    if let Err(err) = self.initialize_system(id) {
                        log::error!("{}", err);
                        if first_error.is_none() {
                            first_error = Some(err);
                        }
                    }
                }
                PendingOp::Remove(id) => self.detach_system(id),
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Enable or disable a system without removing it
    pub fn set_system_active(&mut self, id: SystemId, active: bool) -> Result<(), EcsError> {
        let slot = self.systems.get_mut(id).ok_or(EcsError::SystemNotFound(id))?;
        let active = active && !slot.pending_removal;
        if slot.active != active {
            slot.active = active;
            self.order_dirty = true;
        }
        Ok(())
    }

    /// Whether a system is registered and active
    pub fn is_system_active(&self, id: SystemId) -> bool {
        self.systems.get(id).is_some_and(|slot| slot.active)
    }

    /// Change a system's priority; takes effect at the next update
    pub fn set_system_priority(&mut self, id: SystemId, priority: i32) -> Result<(), EcsError> {
        let slot = self.systems.get_mut(id).ok_or(EcsError::SystemNotFound(id))?;
        if slot.priority != priority {
            slot.priority = priority;
            self.order_dirty = true;
        }
        Ok(())
    }

    /// Diagnostics for one system
    pub fn system_stats(&self, id: SystemId) -> Option<SystemStats> {
        self.systems.get(id).map(|slot| slot.stats)
    }

    /// Name a system was registered under
    pub fn system_name(&self, id: SystemId) -> Option<&str> {
        self.systems.get(id).map(|slot| slot.name.as_str())
    }

    /// Registered systems
    pub fn system_count(&self) -> usize {
        self.registration.len()
    }

    /// System whose update is running right now, if any
    pub const fn current_system(&self) -> Option<SystemId> {
        self.current_system
    }

    fn rebuild_order(&mut self) {
        let systems = &self.systems;
        self.update_order.clear();
        self.update_order.extend(
            self.registration
                .iter()
                .copied()
                .filter(|id| systems.get(*id).is_some_and(|slot| slot.active)),
        );
        // Stable, so equal priorities keep registration order
        self.update_order
            .sort_by_key(|id| systems.get(*id).map_or(0, |slot| slot.priority));

        self.render_order.clear();
        self.render_order.extend(
            self.update_order
                .iter()
                .copied()
                .filter(|id| systems.get(*id).is_some_and(|slot| slot.renders)),
        );
        self.order_dirty = false;
        log::trace!(
            "Rebuilt system order: {} update, {} render",
            self.update_order.len(),
            self.render_order.len()
        );
    }

    // ------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------

    /// Advance the simulation by `delta_time` seconds
    ///
    /// An error from any system aborts the rest of this update and is
    /// returned as [`EcsError::SystemFailed`]. A deferred system whose `init`
    /// fails is dropped and its [`EcsError::SystemInit`] is returned once the
    /// frame has run.
    pub fn update(&mut self, delta_time: f32) -> Result<(), EcsError> {
        if self.phase != FramePhase::Idle {
            return Err(EcsError::ReentrantFrame("update"));
        }
        let mut frame_watch = Stopwatch::start_new();

        let deferred = self.apply_pending();
        if self.order_dirty {
            self.rebuild_order();
        }

        let recycled = self.sweep_destroyed();
        if recycled > 0 {
            log::trace!("Recycled {} destroyed entities", recycled);
        }

        self.phase = FramePhase::Updating;
        let result = self.run_updates(delta_time);
        self.phase = FramePhase::Idle;
        self.current_system = None;

        self.frame += 1;
        self.last_update = frame_watch.stop();
        if let (Err(_), Err(err)) = (&deferred, &result) {
            log::error!("{}", err);
        }
        deferred.and(result)
    }

    fn run_updates(&mut self, delta_time: f32) -> Result<(), EcsError> {
        let mut position = 0;
        while let Some(&id) = self.update_order.get(position) {
            position += 1;
            let Some(slot) = self.systems.get_mut(id) else {
                continue;
            };
            if !slot.active {
                continue;
            }
            let Some(mut system) = slot.system.take() else {
                continue;
            };

            self.current_system = Some(id);
            self.touched.set(0);
            let mut watch = Stopwatch::start_new();
            let result = system.update(self, delta_time);
            let elapsed = watch.stop();
            self.current_system = None;

            let Some(slot) = self.systems.get_mut(id) else {
                log::warn!("System '{}' was torn down during its own update", system.name());
                system.cleanup(self);
                continue;
            };
            slot.system = Some(system);
            slot.stats.last_update = elapsed;
            slot.stats.last_entity_count = self.touched.get();
            slot.stats.update_calls += 1;

            let threshold = self.config.slow_system_warning_ms;
            if threshold > 0.0 && elapsed.as_secs_f64() * 1000.0 > threshold {
                log::warn!(
                    "System '{}' took {:.2} ms (threshold {:.2} ms)",
                    slot.name,
                    elapsed.as_secs_f64() * 1000.0,
                    threshold
                );
            }

            if let Err(source) = result {
                return Err(EcsError::SystemFailed {
                    system: slot.name.clone(),
                    source: Box::new(source),
                });
            }
        }
        Ok(())
    }

    /// Run every active render system in priority order
    ///
    /// Does not recycle entities; that only happens in [`update`](Self::update).
    pub fn render(&mut self, ctx: &mut dyn render::RenderContext, camera: &dyn Camera) -> Result<(), EcsError> {
        if self.phase != FramePhase::Idle {
            return Err(EcsError::ReentrantFrame("render"));
        }
        let mut frame_watch = Stopwatch::start_new();
        if self.order_dirty {
            self.rebuild_order();
        }

        self.phase = FramePhase::Rendering;
        let result = self.run_renders(ctx, camera);
        self.phase = FramePhase::Idle;

        self.last_render = frame_watch.stop();
        result
    }

    fn run_renders(&mut self, ctx: &mut dyn render::RenderContext, camera: &dyn Camera) -> Result<(), EcsError> {
        let mut position = 0;
        while let Some(&id) = self.render_order.get(position) {
            position += 1;
            let Some(slot) = self.systems.get_mut(id) else {
                continue;
            };
            if !slot.active {
                continue;
            }
            let Some(mut system) = slot.system.take() else {
                continue;
            };

            let mut watch = Stopwatch::start_new();
            let result = system.render(self, ctx, camera);
            let elapsed = watch.stop();

            if let Some(slot) = self.systems.get_mut(id) {
                slot.system = Some(system);
                slot.stats.last_render = elapsed;
                if let Err(source) = result {
                    return Err(EcsError::SystemFailed {
                        system: slot.name.clone(),
                        source: Box::new(source),
                    });
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Register an event handler
    pub fn on<E: Event>(
        &mut self,
        handler: impl FnMut(&E) -> Result<(), HandlerError> + 'static,
    ) -> Subscription {
        self.events.on(handler)
    }

    /// Remove an event handler
    pub fn off(&mut self, subscription: Subscription) -> bool {
        self.events.off(subscription)
    }

    /// Deliver an event to its handlers synchronously
    pub fn emit<E: Event>(&mut self, event: &E) -> Result<(), EventError> {
        self.events.emit(event)
    }

    /// The world's event bus
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// The world's event bus, mutably
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    // ------------------------------------------------------------------
    // Teardown and diagnostics
    // ------------------------------------------------------------------

    /// Tear everything down: clean up systems, drop entities, pools and handlers
    ///
    /// Entity ids keep counting up afterwards, so ids from before the
    /// teardown never resolve again.
    pub fn cleanup(&mut self) {
        let registered = std::mem::take(&mut self.registration);
        log::info!("Cleaning up world with {} systems and {} entities", registered.len(), self.entities.len());

        for id in registered {
            let Some(slot) = self.systems.remove(id) else {
                continue;
            };
            if let Some(mut system) = slot.system.filter(|_| slot.initialized) {
                system.cleanup(self);
            }
        }

        self.systems.clear();
        self.update_order.clear();
        self.render_order.clear();
        self.pending.clear();
        self.order_dirty = false;

        self.records.clear();
        self.entities.clear();
        self.entity_free_list.clear();
        self.index.clear();

        self.pools.clear();
        self.owners.clear();
        self.events.clear();
    }

    /// Read-only counters for diagnostics
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            entity_count: self.entity_count(),
            active_entity_count: self.active_entity_count(),
            pooled_entity_count: self.entity_free_list.len(),
            system_count: self.system_count(),
            frame: self.frame,
            last_update: self.last_update,
            last_render: self.last_render,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
