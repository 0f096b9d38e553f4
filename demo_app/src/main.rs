//! Headless frame demo
//!
//! Drives an asteroid field through the ECS runtime with a fixed time step
//! and prints the text-mode render every second of simulated time.
//!
//! Usage: `frame_demo [seed]`. World tunables are read from
//! `frame_demo.toml` when present.

mod components;
mod render;
mod systems;

use std::cell::Cell;
use std::rc::Rc;

use ecs_core::foundation::logging;
use ecs_core::prelude::*;

use components::{Asteroid, AsteroidExpired, Glyph, Lifetime, Transform};
use render::{GridCamera, TextCanvas};
use systems::{LifetimeSystem, MovementSystem, SpawnerSystem, TextRenderSystem};

const FIXED_DT: f32 = 1.0 / 60.0;
const FRAME_COUNT: u32 = 600;
const CANVAS_COLUMNS: usize = 64;
const CANVAS_ROWS: usize = 20;
const CONFIG_PATH: &str = "frame_demo.toml";

/// Errors that end the demo
#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Ecs(#[from] EcsError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

struct FrameDemo {
    world: World,
    camera: GridCamera,
    canvas: TextCanvas,
    score: Rc<Cell<u32>>,
    expired: Option<Subscription>,
}

impl FrameDemo {
    fn new(config: WorldConfig, seed: u64) -> Result<Self, DemoError> {
        let field = Rect::from_center(Vec2::zeros(), Vec2::new(320.0, 200.0));
        let mut world = World::with_config(config);

        // Sized for the spawner's cap on live asteroids
        world.register_component_pool(Transform::default, 32)?;
        world.register_component_pool(Lifetime::default, 32)?;
        world.register_component_pool(Asteroid::default, 32)?;
        world.register_component_pool(Glyph::default, 32)?;

        world.add_system(SpawnerSystem::new(field, seed))?;
        world.add_system(MovementSystem::new(field))?;
        world.add_system(LifetimeSystem)?;
        world.add_render_system(TextRenderSystem::default())?;

        let score = Rc::new(Cell::new(0));
        let expired = world.on({
            let score = Rc::clone(&score);
            move |event: &AsteroidExpired| {
                score.set(score.get() + event.points);
                log::debug!("{} expired for {} points", event.entity, event.points);
                Ok(())
            }
        });

        Ok(Self {
            world,
            camera: GridCamera::new(field, CANVAS_COLUMNS, CANVAS_ROWS),
            canvas: TextCanvas::new(CANVAS_COLUMNS, CANVAS_ROWS),
            score,
            expired: Some(expired),
        })
    }

    fn run(&mut self) -> Result<(), DemoError> {
        let mut stopwatch = Stopwatch::start_new();

        for frame in 1..=FRAME_COUNT {
            self.world.update(FIXED_DT)?;

            self.canvas.clear();
            self.world.render(&mut self.canvas, &self.camera)?;

            if frame % 60 == 0 {
                let stats = self.world.stats();
                log::info!(
                    "frame {}: {} asteroids, {} glyphs drawn, score {}\n{}",
                    stats.frame,
                    stats.active_entity_count,
                    self.canvas.filled(),
                    self.score.get(),
                    self.canvas
                );
            }
        }

        log::info!(
            "Simulated {} frames in {:.2} ms",
            FRAME_COUNT,
            stopwatch.stop().as_secs_f64() * 1000.0
        );
        Ok(())
    }

    fn report(&self) {
        let stats = self.world.stats();
        log::info!(
            "World: {} entities ({} recycled records), {} systems, last update {:?}, last render {:?}",
            stats.entity_count,
            stats.pooled_entity_count,
            stats.system_count,
            stats.last_update,
            stats.last_render
        );

        for (name, pool) in [
            ("Transform", self.world.pool_stats::<Transform>()),
            ("Lifetime", self.world.pool_stats::<Lifetime>()),
            ("Asteroid", self.world.pool_stats::<Asteroid>()),
            ("Glyph", self.world.pool_stats::<Glyph>()),
        ] {
            if let Some(pool) = pool {
                log::info!(
                    "Pool {}: {} in use, {} free, {} reuses, {} growths",
                    name,
                    pool.in_use,
                    pool.free,
                    pool.reuses,
                    pool.growths
                );
            }
        }
    }

    fn shutdown(&mut self) {
        if let Some(subscription) = self.expired.take() {
            self.world.off(subscription);
        }
        self.world.cleanup();
        log::info!("Final score: {}", self.score.get());
    }
}

fn main() -> Result<(), DemoError> {
    logging::init_with_default("info");
    log::info!("Starting ECS frame demo");

    let seed = std::env::args().nth(1).and_then(|arg| arg.parse().ok()).unwrap_or(42);
    let config = WorldConfig::load_or_default(CONFIG_PATH)?;
    config.validate()?;

    let mut demo = FrameDemo::new(config, seed)?;
    let result = demo.run();
    demo.report();
    demo.shutdown();

    match result {
        Ok(()) => {
            log::info!("Frame demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Frame demo failed: {}", e);
            Err(e)
        }
    }
}
