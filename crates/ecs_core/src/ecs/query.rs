//! Query builder over the world's entities
//!
//! A query is built, executed and dropped within one call. Every builder
//! method only narrows the filter, so the order of calls does not change the
//! result. Results follow the world's entity order (creation order).

use std::borrow::Cow;

use super::component::{Component, ComponentKey};
use super::entity::{Entity, EntityId};
use super::world::World;

/// Read-only view of one entity together with its world
///
/// Handed to query predicates so they can look at component values.
#[derive(Clone, Copy)]
pub struct EntityRef<'w> {
    world: &'w World,
    entity: &'w Entity,
}

impl<'w> EntityRef<'w> {
    pub(crate) const fn new(world: &'w World, entity: &'w Entity) -> Self {
        Self { world, entity }
    }

    /// Entity id
    pub const fn id(&self) -> EntityId {
        self.entity.id()
    }

    /// Underlying entity record
    pub const fn entity(&self) -> &'w Entity {
        self.entity
    }

    /// Component value of type `T`, if attached
    pub fn get<T: Component>(&self) -> Option<&'w T> {
        let handle = self.entity.component_handle::<T>()?;
        self.world.component::<T>(handle)
    }

    /// Whether a `T` is attached
    pub fn has<T: Component>(&self) -> bool {
        self.entity.has_component::<T>()
    }

    /// Whether the entity carries `tag`
    pub fn has_tag(&self, tag: &str) -> bool {
        self.entity.has_tag(tag)
    }
}

type Predicate<'w> = Box<dyn Fn(EntityRef<'w>) -> bool + 'w>;

/// Declarative entity filter, created by [`World::query`]
pub struct Query<'w> {
    world: &'w World,
    required: Vec<ComponentKey>,
    excluded: Vec<ComponentKey>,
    required_tags: Vec<Cow<'w, str>>,
    excluded_tags: Vec<Cow<'w, str>>,
    predicates: Vec<Predicate<'w>>,
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}

impl<'w> Query<'w> {
    pub(crate) const fn new(world: &'w World) -> Self {
        Self {
            world,
            required: Vec::new(),
            excluded: Vec::new(),
            required_tags: Vec::new(),
            excluded_tags: Vec::new(),
            predicates: Vec::new(),
        }
    }

    /// Require a component of type `T`
    #[must_use]
    pub fn with<T: Component>(self) -> Self {
        self.with_keys(&[ComponentKey::of::<T>()])
    }

    /// Require every component in `keys`
    #[must_use]
    pub fn with_keys(mut self, keys: &[ComponentKey]) -> Self {
        for key in keys {
            push_unique(&mut self.required, *key);
        }
        self
    }

    /// Exclude entities carrying a `T`
    #[must_use]
    pub fn without<T: Component>(self) -> Self {
        self.without_keys(&[ComponentKey::of::<T>()])
    }

    /// Exclude entities carrying any component in `keys`
    #[must_use]
    pub fn without_keys(mut self, keys: &[ComponentKey]) -> Self {
        for key in keys {
            push_unique(&mut self.excluded, *key);
        }
        self
    }

    /// Require `tag`
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<Cow<'w, str>>) -> Self {
        push_unique(&mut self.required_tags, tag.into());
        self
    }

    /// Require every tag in `tags`
    #[must_use]
    pub fn with_tags(self, tags: &[&'w str]) -> Self {
        tags.iter().fold(self, |query, tag| query.with_tag(*tag))
    }

    /// Exclude entities carrying `tag`
    #[must_use]
    pub fn without_tag(mut self, tag: impl Into<Cow<'w, str>>) -> Self {
        push_unique(&mut self.excluded_tags, tag.into());
        self
    }

    /// Exclude entities carrying any tag in `tags`
    #[must_use]
    pub fn without_tags(self, tags: &[&'w str]) -> Self {
        tags.iter().fold(self, |query, tag| query.without_tag(*tag))
    }

    /// Keep only entities for which `predicate` returns `true`
    ///
    /// Several predicates must all hold.
    #[must_use]
    pub fn filter(mut self, predicate: impl Fn(EntityRef<'w>) -> bool + 'w) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    fn matches(&self, entity: &'w Entity) -> bool {
        entity.is_active()
            && entity.has_components(&self.required)
            && !self.excluded.iter().any(|key| entity.has_component_key(*key))
            && self.required_tags.iter().all(|tag| entity.has_tag(tag))
            && !self.excluded_tags.iter().any(|tag| entity.has_tag(tag))
            && self
                .predicates
                .iter()
                .all(|predicate| predicate(EntityRef::new(self.world, entity)))
    }

    /// Ids of every matching entity, in world order
    pub fn execute(self) -> Vec<EntityId> {
        let matched: Vec<EntityId> = self
            .world
            .entity_records()
            .filter(|entity| self.matches(*entity))
            .map(Entity::id)
            .collect();
        self.world.note_touched(matched.len());
        matched
    }

    /// Number of matching entities
    pub fn count(self) -> usize {
        let count = self
            .world
            .entity_records()
            .filter(|entity| self.matches(*entity))
            .count();
        self.world.note_touched(count);
        count
    }

    /// First matching entity in world order
    pub fn first(self) -> Option<EntityId> {
        let found = self
            .world
            .entity_records()
            .find(|entity| self.matches(*entity))
            .map(Entity::id);
        self.world.note_touched(usize::from(found.is_some()));
        found
    }
}
