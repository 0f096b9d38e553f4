//! Demo systems
//!
//! Frame order: spawner (0), movement (10), lifetime (20), text renderer (100).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ecs_core::prelude::*;

use crate::components::{Asteroid, AsteroidExpired, Glyph, Lifetime, Transform};
use crate::render::TextCanvas;

/// Tag carried by every spawned asteroid
pub const ASTEROID_TAG: &str = "asteroid";

/// Spawns asteroids anywhere in the field on a fixed interval
pub struct SpawnerSystem {
    rng: StdRng,
    field: Rect,
    interval: f32,
    timer: f32,
    max_alive: usize,
}

impl SpawnerSystem {
    /// Create a spawner for `field`, seeded for reproducible runs
    pub fn new(field: Rect, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            field,
            interval: 0.25,
            timer: 0.0,
            max_alive: 24,
        }
    }

    fn spawn(&mut self, world: &mut World) -> SystemResult {
        let size = self.field.size();
        let position = self.field.min + Vec2::new(self.rng.gen_range(0.0..size.x), self.rng.gen_range(0.0..size.y));
        let heading = self.rng.gen_range(0.0..std::f32::consts::TAU);
        let speed: f32 = self.rng.gen_range(10.0..40.0);
        let large = self.rng.gen_bool(0.3);

        let id = world.create_entity();
        world.add_component(
            id,
            Transform {
                position,
                velocity: Vec2::new(heading.cos(), heading.sin()) * speed,
            },
        )?;
        world.add_component(
            id,
            Lifetime {
                remaining: self.rng.gen_range(1.5..4.0),
            },
        )?;
        world.add_component(
            id,
            Asteroid {
                radius: if large { 8.0 } else { 3.0 },
                points: if large { 20 } else { 50 },
            },
        )?;
        world.add_component(id, Glyph { symbol: if large { 'O' } else { 'o' } })?;
        if let Some(entity) = world.entity_mut(id) {
            entity.add_tag(ASTEROID_TAG);
        }
        log::trace!("Spawned asteroid {} at ({:.1}, {:.1})", id, position.x, position.y);
        Ok(())
    }
}

impl System for SpawnerSystem {
    fn name(&self) -> &str {
        "spawner"
    }

    fn update(&mut self, world: &mut World, delta_time: f32) -> SystemResult {
        self.timer += delta_time;
        while self.timer >= self.interval {
            self.timer -= self.interval;
            if world.query().with_tag(ASTEROID_TAG).count() < self.max_alive {
                self.spawn(world)?;
            }
        }
        Ok(())
    }
}

/// Integrates velocity and wraps positions around the field
pub struct MovementSystem {
    field: Rect,
}

impl MovementSystem {
    /// Create a movement system wrapping at the edges of `field`
    pub const fn new(field: Rect) -> Self {
        Self { field }
    }
}

fn wrap(value: f32, min: f32, max: f32) -> f32 {
    min + (value - min).rem_euclid(max - min)
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn update(&mut self, world: &mut World, delta_time: f32) -> SystemResult {
        let movers = self.get_entities(world, &ecs_core::component_keys![Transform]);
        for id in movers {
            if let Some(transform) = world.get_component_mut::<Transform>(id) {
                let next = transform.position + transform.velocity * delta_time;
                transform.position = Vec2::new(
                    wrap(next.x, self.field.min.x, self.field.max.x),
                    wrap(next.y, self.field.min.y, self.field.max.y),
                );
            }
        }
        Ok(())
    }
}

/// Counts lifetimes down, destroying and announcing expired entities
pub struct LifetimeSystem;

impl System for LifetimeSystem {
    fn name(&self) -> &str {
        "lifetime"
    }

    fn priority(&self) -> i32 {
        20
    }

    fn update(&mut self, world: &mut World, delta_time: f32) -> SystemResult {
        for id in world.query().with::<Lifetime>().execute() {
            let expired = world.get_component_mut::<Lifetime>(id).is_some_and(|lifetime| {
                lifetime.remaining -= delta_time;
                lifetime.remaining <= 0.0
            });
            if !expired {
                continue;
            }

            let points = world.get_component::<Asteroid>(id).map_or(0, |asteroid| asteroid.points);
            world.destroy_entity(id);
            world.emit(&AsteroidExpired { entity: id, points })?;
        }
        Ok(())
    }
}

/// Draws every visible glyph onto a [`TextCanvas`]
#[derive(Default)]
pub struct TextRenderSystem {
    culled: usize,
}

impl System for TextRenderSystem {
    fn name(&self) -> &str {
        "text_renderer"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn update(&mut self, _world: &mut World, _delta_time: f32) -> SystemResult {
        Ok(())
    }
}

impl RenderSystem for TextRenderSystem {
    fn render(&mut self, world: &World, ctx: &mut dyn RenderContext, camera: &dyn Camera) -> SystemResult {
        let canvas = ctx
            .downcast_mut::<TextCanvas>()
            .ok_or_else(|| SystemError::logic("text renderer needs a TextCanvas target"))?;

        self.culled = 0;
        for id in world.query().with::<Transform>().with::<Glyph>().execute() {
            let (Some(transform), Some(glyph)) = (world.get_component::<Transform>(id), world.get_component::<Glyph>(id))
            else {
                continue;
            };
            let radius = world.get_component::<Asteroid>(id).map_or(0.0, |asteroid| asteroid.radius);
            if !camera.is_visible(transform.position, radius) {
                self.culled += 1;
                continue;
            }
            canvas.plot(camera.world_to_screen(transform.position), glyph.symbol);
        }
        log::trace!("Culled {} off-screen glyphs", self.culled);
        Ok(())
    }
}
