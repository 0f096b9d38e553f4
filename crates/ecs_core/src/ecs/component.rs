//! Component trait and type keys
//!
//! Components are plain data and never hold a reference to a system or to
//! the world.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Marker trait for poolable components
///
/// `reset` is called on a recycled instance before it is handed out again.
/// The default assigns `Self::default()`; override it to reset in place when
/// a component owns buffers worth keeping.
pub trait Component: 'static + Send + Sync + Default {
    /// Restore default field values before reuse
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Stable identity of a component type
///
/// Equality and hashing use the [`TypeId`] only; the name is carried for
/// logs and error messages.
#[derive(Clone, Copy)]
pub struct ComponentKey {
    id: TypeId,
    name: &'static str,
}

impl ComponentKey {
    /// Key of component type `T`
    pub fn of<T: Component>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Underlying type id
    pub const fn type_id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for ComponentKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentKey {}

impl Hash for ComponentKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentKey({})", self.name)
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Generation-checked handle to a pooled component instance
///
/// A handle stays valid until its instance is released back to the pool.
/// After that every lookup through it fails, even once the slot has been
/// handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentHandle {
    pub(crate) key: ComponentKey,
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl ComponentHandle {
    /// Component type this handle points at
    pub const fn key(&self) -> ComponentKey {
        self.key
    }

    /// Slot index inside the pool
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Slot generation at the time the handle was issued
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Build an array of [`ComponentKey`]s from a list of component types
///
/// ```ignore
/// let moving = world.entities_with(&component_keys![Position, Velocity]);
/// ```
#[macro_export]
macro_rules! component_keys {
    ($($ty:ty),* $(,)?) => {
        [$($crate::ecs::ComponentKey::of::<$ty>()),*]
    };
}
