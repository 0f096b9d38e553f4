//! Entity implementation
//!
//! An entity is an identity plus at most one component per type plus a set
//! of string tags. Entity records are recycled by the world; the id is not.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use super::component::{Component, ComponentHandle, ComponentKey};

/// Entity identifier
///
/// Ids come from a counter owned by the [`World`](super::World) and are never
/// reused, so a stale id simply stops resolving once its entity is recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(u64);

impl EntityId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric id
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Entity record: identity, component handles and tags
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    active: bool,
    components: HashMap<ComponentKey, ComponentHandle>,
    tags: HashSet<String>,
}

impl Entity {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            active: true,
            components: HashMap::new(),
            tags: HashSet::new(),
        }
    }

    /// Get the entity ID
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// `false` once the entity has been destroyed
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Mark the entity for removal
    ///
    /// The entity stays in place, invisible to queries, until the start of
    /// the next world update recycles it. Calling this twice is harmless.
    pub fn destroy(&mut self) {
        self.active = false;
    }

    /// Whether a component of type `T` is attached
    pub fn has_component<T: Component>(&self) -> bool {
        self.has_component_key(ComponentKey::of::<T>())
    }

    /// Whether a component with `key` is attached
    pub fn has_component_key(&self, key: ComponentKey) -> bool {
        self.components.contains_key(&key)
    }

    /// Whether every key in `keys` is attached (an empty list is always satisfied)
    pub fn has_components(&self, keys: &[ComponentKey]) -> bool {
        keys.iter().all(|key| self.components.contains_key(key))
    }

    /// Handle of the attached `T`, if any
    pub fn component_handle<T: Component>(&self) -> Option<ComponentHandle> {
        self.handle_for(ComponentKey::of::<T>())
    }

    /// Handle of the component attached under `key`, if any
    pub fn handle_for(&self, key: ComponentKey) -> Option<ComponentHandle> {
        self.components.get(&key).copied()
    }

    /// Keys of all attached components, in no particular order
    pub fn component_keys(&self) -> impl Iterator<Item = ComponentKey> + '_ {
        self.components.keys().copied()
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Add a tag, returning `false` if it was already present
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(tag.into())
    }

    /// Remove a tag, returning `false` if it was not present
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Check if entity has a specific tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// All tags, in no particular order
    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.tags.iter().map(String::as_str)
    }

    /// Attach `handle`, returning the handle it replaced
    pub(crate) fn insert_handle(&mut self, handle: ComponentHandle) -> Option<ComponentHandle> {
        self.components.insert(handle.key(), handle)
    }

    /// Detach the component under `key` without releasing it
    pub(crate) fn remove_handle(&mut self, key: ComponentKey) -> Option<ComponentHandle> {
        self.components.remove(&key)
    }

    /// Detach every component, handing the handles to the caller
    pub(crate) fn drain_handles(&mut self) -> impl Iterator<Item = ComponentHandle> + '_ {
        self.components.drain().map(|(_, handle)| handle)
    }

    /// Bring a recycled record back to life under a new id
    ///
    /// Only the world's pooling path calls this.
    pub(crate) fn reset(&mut self, id: EntityId) {
        self.id = id;
        self.active = true;
        self.components.clear();
        self.tags.clear();
    }
}
