//! Demo components and events

use ecs_core::prelude::*;

/// Position and velocity in world units
#[derive(Debug, Clone, Default)]
pub struct Transform {
    /// Current position
    pub position: Vec2,

    /// Units per second
    pub velocity: Vec2,
}

impl Component for Transform {}

/// Seconds left before the entity expires
#[derive(Debug, Clone, Default)]
pub struct Lifetime {
    /// Remaining time in seconds
    pub remaining: f32,
}

impl Component for Lifetime {}

/// Asteroid component
#[derive(Debug, Clone, Default)]
pub struct Asteroid {
    /// Collision radius in world units
    pub radius: f32,

    /// Points awarded when it expires
    pub points: u32,
}

impl Component for Asteroid {}

/// Character drawn by the text renderer
#[derive(Debug, Clone)]
pub struct Glyph {
    /// Symbol to draw
    pub symbol: char,
}

impl Component for Glyph {}

impl Default for Glyph {
    fn default() -> Self {
        Self { symbol: '?' }
    }
}

/// Emitted when an asteroid's lifetime runs out
#[derive(Debug, Clone)]
pub struct AsteroidExpired {
    /// The expiring entity; recycled at the next update
    pub entity: EntityId,

    /// Points carried by the asteroid
    pub points: u32,
}

impl Event for AsteroidExpired {}
