//! Free-list recycler for one component type
//!
//! Instances live in an index arena. Acquiring pops the most recently
//! released slot (LIFO) and resets it; when nothing is free a new instance is
//! built from the pool's factory. Growth is unbounded: running out
//! of pooled instances costs an allocation, never a failed frame.
//!
//! ```text
//! acquire ──> free.pop() ──> reset() ──> in use ──> release ──> free.push()
//!                 │ empty
//!                 └──> factory() ──> in use
//! ```

use std::any::Any;

use serde::Serialize;

use super::component::{Component, ComponentHandle, ComponentKey};

/// Counters describing a pool's current occupancy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Instances waiting on the free list
    pub free: usize,
    /// Instances currently handed out
    pub in_use: usize,
    /// Total instances ever built by this pool
    pub capacity: usize,
    /// Acquisitions served from the free list
    pub reuses: u64,
    /// Acquisitions that had to build a new instance
    pub growths: u64,
}

struct Slot<T> {
    value: T,
    generation: u32,
    live: bool,
}

/// Pool of recyclable instances of one component type
pub struct ComponentPool<T: Component> {
    key: ComponentKey,
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    in_use: usize,
    reuses: u64,
    growths: u64,
    factory: Box<dyn Fn() -> T>,
    log_growth: bool,
}

impl<T: Component> ComponentPool<T> {
    /// Create an empty pool that builds new instances with `factory`
    ///
    /// Recycled instances go through [`Component::reset`] instead, so a
    /// non-default factory value is only seen on freshly built slots.
    pub fn new(factory: impl Fn() -> T + 'static) -> Self {
        Self {
            key: ComponentKey::of::<T>(),
            slots: Vec::new(),
            free: Vec::new(),
            in_use: 0,
            reuses: 0,
            growths: 0,
            factory: Box::new(factory),
            log_growth: false,
        }
    }

    /// Create an empty pool that builds new instances with `T::default`
    pub fn with_default() -> Self {
        Self::new(T::default)
    }

    /// Log every growth at debug level
    pub fn with_growth_logging(mut self, enabled: bool) -> Self {
        self.log_growth = enabled;
        self
    }

    /// Build `count` instances up front and put them on the free list
    pub fn prepopulate(&mut self, count: usize) {
        self.slots.reserve(count);
        self.free.reserve(count);
        for _ in 0..count {
            let index = self.slots.len();
            self.slots.push(Slot {
                value: (self.factory)(),
                generation: 0,
                live: false,
            });
            self.free.push(index);
        }
    }

    /// Hand out an instance, recycling the most recently released one
    pub fn acquire(&mut self) -> ComponentHandle {
        let index = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.value.reset();
            slot.live = true;
            self.reuses += 1;
            index
        } else {
            let index = self.slots.len();
            self.slots.push(Slot {
                value: (self.factory)(),
                generation: 0,
                live: true,
            });
            self.growths += 1;
            if self.log_growth {
                log::debug!("Pool {} grew to {} instances", self.key, self.slots.len());
            }
            index
        };

        self.in_use += 1;
        ComponentHandle {
            key: self.key,
            index,
            generation: self.slots[index].generation,
        }
    }

    /// Return an instance to the free list
    ///
    /// Releasing a handle that is not live (already released, stale, or from
    /// another pool) is a no-op and returns `false`.
    pub fn release(&mut self, handle: ComponentHandle) -> bool {
        if !self.is_live(handle) {
            log::trace!("Ignoring release of non-live {} handle #{}", self.key, handle.index);
            return false;
        }

        let slot = &mut self.slots[handle.index];
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.in_use -= 1;
        true
    }

    /// Whether `handle` refers to an instance that is currently handed out
    pub fn is_live(&self, handle: ComponentHandle) -> bool {
        handle.key == self.key
            && self
                .slots
                .get(handle.index)
                .is_some_and(|slot| slot.live && slot.generation == handle.generation)
    }

    /// Read a live instance
    pub fn get(&self, handle: ComponentHandle) -> Option<&T> {
        if self.is_live(handle) {
            Some(&self.slots[handle.index].value)
        } else {
            None
        }
    }

    /// Mutate a live instance
    pub fn get_mut(&mut self, handle: ComponentHandle) -> Option<&mut T> {
        if self.is_live(handle) {
            Some(&mut self.slots[handle.index].value)
        } else {
            None
        }
    }

    /// Current occupancy counters
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            free: self.free.len(),
            in_use: self.in_use,
            capacity: self.slots.len(),
            reuses: self.reuses,
            growths: self.growths,
        }
    }
}

/// Object-safe view of a [`ComponentPool`] so the world can hold pools of
/// every type in one map
pub(crate) trait ErasedPool {
    fn release(&mut self, handle: ComponentHandle) -> bool;
    fn is_live(&self, handle: ComponentHandle) -> bool;
    fn stats(&self) -> PoolStats;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedPool for ComponentPool<T> {
    fn release(&mut self, handle: ComponentHandle) -> bool {
        ComponentPool::release(self, handle)
    }

    fn is_live(&self, handle: ComponentHandle) -> bool {
        ComponentPool::is_live(self, handle)
    }

    fn stats(&self) -> PoolStats {
        ComponentPool::stats(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
