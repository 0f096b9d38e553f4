//! Render boundary
//!
//! The world never draws anything. It forwards an opaque drawing context and
//! a camera to render-capable systems, which know what concrete types they
//! were built against.

use std::any::Any;

use crate::foundation::math::{Rect, Vec2};

/// World↔screen transform and visible bounds supplied by the host
pub trait Camera {
    /// Map a world-space point to screen pixels
    fn world_to_screen(&self, point: Vec2) -> Vec2;

    /// Map a screen pixel to world space
    fn screen_to_world(&self, point: Vec2) -> Vec2;

    /// World-space rectangle currently on screen
    fn viewport(&self) -> Rect;

    /// Whether a circle in world space is at least partly on screen
    fn is_visible(&self, center: Vec2, radius: f32) -> bool {
        self.viewport().intersects_circle(center, radius)
    }
}

/// Opaque drawing target handed through [`World::render`](crate::ecs::World::render)
///
/// Implemented for every `'static` type. Render systems recover their
/// concrete target with [`downcast_mut`](Self::downcast_mut).
pub trait RenderContext: Any {
    /// Borrow as [`Any`]
    fn as_any(&self) -> &dyn Any;

    /// Mutably borrow as [`Any`]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> RenderContext for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<'a> dyn RenderContext + 'a {
    /// The concrete target, if it is a `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// The concrete target, mutably, if it is a `T`
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}
