//! End-to-end world scenarios
//!
//! Drives a `World` the way a host loop would and checks entity recycling,
//! pooling, system ordering, deferred system changes and event delivery.

use std::cell::RefCell;
use std::rc::Rc;

use ecs_core::ecs::PoolStats;
use ecs_core::prelude::*;

#[derive(Debug, Default, Clone, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}
impl Component for Position {}

#[derive(Debug, Default, Clone, PartialEq)]
struct Velocity {
    x: f32,
    y: f32,
}
impl Component for Velocity {}

#[derive(Debug, Default)]
struct Armor(u32);
impl Component for Armor {}

type CallLog = Rc<RefCell<Vec<String>>>;

fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Logic-only system that records every hook call
struct Recorder {
    name: &'static str,
    priority: i32,
    log: CallLog,
}

impl Recorder {
    fn new(name: &'static str, priority: i32, log: &CallLog) -> Self {
        Self {
            name,
            priority,
            log: Rc::clone(log),
        }
    }
}

impl System for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn init(&mut self, _world: &mut World) -> SystemResult {
        self.log.borrow_mut().push(format!("{}:init", self.name));
        Ok(())
    }

    fn update(&mut self, _world: &mut World, _delta_time: f32) -> SystemResult {
        self.log.borrow_mut().push(format!("{}:update", self.name));
        Ok(())
    }

    fn cleanup(&mut self, _world: &mut World) {
        self.log.borrow_mut().push(format!("{}:cleanup", self.name));
    }
}

/// Render-capable system that records update and render calls
struct Painter {
    name: &'static str,
    priority: i32,
    log: CallLog,
}

impl System for Painter {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn update(&mut self, _world: &mut World, _delta_time: f32) -> SystemResult {
        self.log.borrow_mut().push(format!("{}:update", self.name));
        Ok(())
    }
}

impl RenderSystem for Painter {
    fn render(&mut self, world: &World, ctx: &mut dyn RenderContext, camera: &dyn Camera) -> SystemResult {
        self.log.borrow_mut().push(format!("{}:render", self.name));
        let frame = ctx
            .downcast_mut::<Vec<String>>()
            .ok_or_else(|| SystemError::logic("unexpected render target"))?;
        for id in world.query().with::<Position>().execute() {
            if let Some(position) = world.get_component::<Position>(id) {
                let screen = camera.world_to_screen(Vec2::new(position.x, position.y));
                frame.push(format!("{}@{},{}", self.name, screen.x, screen.y));
            }
        }
        Ok(())
    }
}

struct IdentityCamera;

impl Camera for IdentityCamera {
    fn world_to_screen(&self, point: Vec2) -> Vec2 {
        point
    }

    fn screen_to_world(&self, point: Vec2) -> Vec2 {
        point
    }

    fn viewport(&self) -> Rect {
        Rect::new(Vec2::zeros(), Vec2::new(640.0, 480.0))
    }
}

fn entries(log: &CallLog) -> Vec<String> {
    log.borrow().clone()
}

#[test]
fn test_new_entity_is_active_and_empty() {
    let mut world = World::new();
    for _ in 0..3 {
        let id = world.create_entity();
        let entity = world.entity(id).unwrap();
        assert!(entity.is_active());
        assert_eq!(entity.component_count(), 0);
        assert_eq!(entity.tags().count(), 0);
    }
}

#[test]
fn test_get_component_returns_the_added_instance() {
    let mut world = World::new();
    let id = world.create_entity();
    let handle = world.add_component(id, Position { x: 1.0, y: 2.0 }).unwrap();

    assert_eq!(world.entity(id).unwrap().component_handle::<Position>(), Some(handle));
    let through_entity = world.get_component::<Position>(id).unwrap();
    let through_handle = world.component::<Position>(handle).unwrap();
    assert!(std::ptr::eq(through_entity, through_handle));
    assert_eq!(through_entity, &Position { x: 1.0, y: 2.0 });
}

#[test]
fn test_has_components_requires_all() {
    let mut world = World::new();
    let id = world.create_entity();
    world.add_component(id, Position::default()).unwrap();
    world.add_component(id, Velocity::default()).unwrap();

    let entity = world.entity(id).unwrap();
    assert!(entity.has_components(&ecs_core::component_keys![Position, Velocity]));
    assert!(!entity.has_components(&ecs_core::component_keys![Position, Armor]));
    assert!(entity.has_components(&[]));
}

#[test]
fn test_recycled_entity_does_not_leak_previous_life() {
    let mut world = World::new();
    let old = world.create_entity();
    world.add_component(old, Armor(7)).unwrap();
    world.entity_mut(old).unwrap().add_tag("boss");
    world.destroy_entity(old);

    world.update(0.016).unwrap();
    assert_eq!(world.stats().pooled_entity_count, 1);

    let new = world.create_entity();
    assert_eq!(world.stats().pooled_entity_count, 0);
    assert_ne!(new, old);

    let entity = world.entity(new).unwrap();
    assert!(entity.is_active());
    assert_eq!(entity.component_count(), 0);
    assert!(!entity.has_tag("boss"));
    assert!(world.get_component::<Armor>(new).is_none());
}

#[test]
fn test_query_with_two_components_returns_intersection() {
    let mut world = World::new();
    let e1 = world.create_entity();
    world.add_component(e1, Position::default()).unwrap();
    let e2 = world.create_entity();
    world.add_component(e2, Position::default()).unwrap();
    world.add_component(e2, Velocity::default()).unwrap();
    let e3 = world.create_entity();
    world.add_component(e3, Velocity::default()).unwrap();

    assert_eq!(world.query().with::<Position>().with::<Velocity>().execute(), vec![e2]);
    assert_eq!(world.entities_with(&ecs_core::component_keys![Position, Velocity]), vec![e2]);
    assert_eq!(world.query().with::<Velocity>().without::<Position>().execute(), vec![e3]);
    assert_eq!(world.query().with::<Position>().execute(), vec![e1, e2]);
}

#[test]
fn test_query_tags_and_predicates() {
    let mut world = World::new();
    let fast = world.create_entity();
    world.add_component(fast, Velocity { x: 9.0, y: 0.0 }).unwrap();
    world.entity_mut(fast).unwrap().add_tag("enemy");
    let slow = world.create_entity();
    world.add_component(slow, Velocity { x: 1.0, y: 0.0 }).unwrap();
    world.entity_mut(slow).unwrap().add_tag("enemy");
    let player = world.create_entity();
    world.add_component(player, Velocity { x: 9.0, y: 0.0 }).unwrap();
    world.entity_mut(player).unwrap().add_tag("player");

    let quick_enemies = world
        .query()
        .with_tag("enemy")
        .filter(|entity| entity.get::<Velocity>().is_some_and(|v| v.x > 5.0))
        .execute();
    assert_eq!(quick_enemies, vec![fast]);

    assert_eq!(world.query().with::<Velocity>().without_tag("enemy").execute(), vec![player]);
    assert_eq!(world.query().with_tags(&["enemy", "player"]).count(), 0);
    assert_eq!(world.query().without_tags(&["player"]).first(), Some(fast));

    world.destroy_entity(fast);
    assert_eq!(world.query().with_tag("enemy").execute(), vec![slow]);
}

#[test]
fn test_prepopulated_pool_is_drained_before_growing() {
    let mut world = World::new();
    world.register_component_pool(|| Armor(1), 5).unwrap();

    let handles: Vec<ComponentHandle> = (0..7).map(|_| world.get_pooled_component::<Armor>().unwrap()).collect();
    let indices: Vec<usize> = handles.iter().map(ComponentHandle::index).collect();
    assert_eq!(indices, vec![4, 3, 2, 1, 0, 5, 6]);
    assert_eq!(
        world.pool_stats::<Armor>(),
        Some(PoolStats {
            free: 0,
            in_use: 7,
            capacity: 7,
            reuses: 5,
            growths: 2,
        })
    );

    assert!(world.release_component(handles[2]));
    let again = world.get_pooled_component::<Armor>().unwrap();
    assert_eq!(again.index(), handles[2].index());
    assert!(world.component::<Armor>(handles[2]).is_none());
    // Reacquired instances come back reset, not rebuilt by the factory
    assert_eq!(world.component::<Armor>(again).map(|armor| armor.0), Some(0));
}

#[test]
fn test_systems_run_in_priority_order() {
    let log = call_log();
    let mut world = World::new();
    world.add_system(Recorder::new("a", 10, &log)).unwrap();
    world.add_system(Recorder::new("b", 5, &log)).unwrap();
    world.add_system(Recorder::new("c", 5, &log)).unwrap();
    log.borrow_mut().clear();

    world.update(0.016).unwrap();
    assert_eq!(entries(&log), vec!["b:update", "c:update", "a:update"]);
}

#[test]
fn test_priority_change_applies_next_update() {
    let log = call_log();
    let mut world = World::new();
    let a = world.add_system(Recorder::new("a", 0, &log)).unwrap();
    world.add_system(Recorder::new("b", 1, &log)).unwrap();
    world.set_system_priority(a, 2).unwrap();
    log.borrow_mut().clear();

    world.update(0.016).unwrap();
    assert_eq!(entries(&log), vec!["b:update", "a:update"]);
}

#[test]
fn test_render_only_reaches_render_systems() {
    let log = call_log();
    let mut world = World::new();
    world.add_system(Recorder::new("logic", 0, &log)).unwrap();
    world
        .add_render_system(Painter {
            name: "hud",
            priority: 20,
            log: Rc::clone(&log),
        })
        .unwrap();
    world
        .add_render_system(Painter {
            name: "sprites",
            priority: 10,
            log: Rc::clone(&log),
        })
        .unwrap();
    let ship = world.create_entity();
    world.add_component(ship, Position { x: 3.0, y: 4.0 }).unwrap();
    log.borrow_mut().clear();

    let mut frame: Vec<String> = Vec::new();
    world.render(&mut frame, &IdentityCamera).unwrap();

    assert_eq!(entries(&log), vec!["sprites:render", "hud:render"]);
    assert_eq!(frame, vec!["sprites@3,4", "hud@3,4"]);
    assert_eq!(world.stats().frame, 0);
}

#[test]
fn test_render_system_fails_on_wrong_target() {
    let log = call_log();
    let mut world = World::new();
    world
        .add_render_system(Painter {
            name: "sprites",
            priority: 0,
            log: Rc::clone(&log),
        })
        .unwrap();

    let mut wrong_target = String::new();
    let err = world.render(&mut wrong_target, &IdentityCamera).unwrap_err();
    assert!(matches!(err, EcsError::SystemFailed { ref system, .. } if system == "sprites"));
}

#[test]
fn test_destroyed_entity_components_return_to_pool() {
    let mut world = World::new();
    let ids: Vec<EntityId> = (0..3).map(|_| world.create_entity()).collect();
    for &id in &ids {
        world.add_component(id, Position::default()).unwrap();
    }
    world.add_component(ids[1], Armor(3)).unwrap();

    let positions_before = world.pool_stats::<Position>().unwrap();
    let armor_before = world.pool_stats::<Armor>().unwrap();
    world.destroy_entity(ids[1]);
    world.update(0.016).unwrap();

    assert_eq!(world.entities().count(), 2);
    assert_eq!(world.entities().map(Entity::id).collect::<Vec<_>>(), vec![ids[0], ids[2]]);
    assert_eq!(world.pool_stats::<Position>().unwrap().free, positions_before.free + 1);
    assert_eq!(world.pool_stats::<Armor>().unwrap().free, armor_before.free + 1);
    assert!(world.entity(ids[1]).is_none());
}

#[test]
fn test_removed_system_never_runs_again() {
    let log = call_log();
    let mut world = World::new();
    let id = world.add_system(Recorder::new("gone", 0, &log)).unwrap();
    world.remove_system(id).unwrap();

    for _ in 0..3 {
        world.update(0.016).unwrap();
    }
    assert_eq!(entries(&log), vec!["gone:init", "gone:cleanup"]);
    assert_eq!(world.system_count(), 0);
    assert!(matches!(world.remove_system(id), Err(EcsError::SystemNotFound(_))));
}

#[test]
fn test_inactive_system_is_skipped() {
    let log = call_log();
    let mut world = World::new();
    let id = world.add_system(Recorder::new("paused", 0, &log)).unwrap();
    world.set_system_active(id, false).unwrap();
    world.update(0.016).unwrap();
    assert!(!world.is_system_active(id));

    world.set_system_active(id, true).unwrap();
    world.update(0.016).unwrap();
    assert_eq!(entries(&log), vec!["paused:init", "paused:update"]);
    assert_eq!(world.system_stats(id).unwrap().update_calls, 1);
}

/// Registers a recorder from inside its own update, once
struct Installer {
    log: CallLog,
    installed: bool,
}

impl System for Installer {
    fn update(&mut self, world: &mut World, _delta_time: f32) -> SystemResult {
        if !self.installed {
            self.installed = true;
            world.add_system(Recorder::new("late", 5, &self.log))?;
        }
        Ok(())
    }
}

#[test]
fn test_system_added_during_update_starts_next_frame() {
    let log = call_log();
    let mut world = World::new();
    world
        .add_system(Installer {
            log: Rc::clone(&log),
            installed: false,
        })
        .unwrap();

    world.update(0.016).unwrap();
    assert!(entries(&log).is_empty());
    assert_eq!(world.system_count(), 1);

    world.update(0.016).unwrap();
    assert_eq!(entries(&log), vec!["late:init", "late:update"]);
    assert_eq!(world.system_count(), 2);
}

/// Removes another system the first time it runs
struct Remover {
    target: Option<SystemId>,
}

impl System for Remover {
    fn priority(&self) -> i32 {
        -1
    }

    fn update(&mut self, world: &mut World, _delta_time: f32) -> SystemResult {
        if let Some(target) = self.target.take() {
            world.remove_system(target)?;
        }
        Ok(())
    }
}

#[test]
fn test_system_removed_during_update_stops_at_once() {
    let log = call_log();
    let mut world = World::new();
    let target = world.add_system(Recorder::new("victim", 0, &log)).unwrap();
    world.add_system(Remover { target: Some(target) }).unwrap();

    world.update(0.016).unwrap();
    assert_eq!(entries(&log), vec!["victim:init"]);
    assert_eq!(world.system_count(), 2);

    world.update(0.016).unwrap();
    assert_eq!(entries(&log), vec!["victim:init", "victim:cleanup"]);
    assert_eq!(world.system_count(), 1);
}

struct Faulty;

impl System for Faulty {
    fn update(&mut self, _world: &mut World, _delta_time: f32) -> SystemResult {
        Err(SystemError::logic("out of fuel"))
    }
}

#[test]
fn test_system_error_aborts_the_rest_of_the_frame() {
    let log = call_log();
    let mut world = World::new();
    world.add_system(Faulty).unwrap();
    world.add_system(Recorder::new("after", 1, &log)).unwrap();
    log.borrow_mut().clear();

    let err = world.update(0.016).unwrap_err();
    match err {
        EcsError::SystemFailed { source, .. } => assert_eq!(source.to_string(), "out of fuel"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(entries(&log).is_empty());
    assert_eq!(world.stats().frame, 1);
}

struct AsteroidDestroyed {
    points: u32,
}
impl Event for AsteroidDestroyed {}

/// Destroys every armored entity and announces it
struct Demolisher;

impl System for Demolisher {
    fn update(&mut self, world: &mut World, _delta_time: f32) -> SystemResult {
        for id in world.query().with::<Armor>().execute() {
            let points = world.get_component::<Armor>(id).map_or(0, |armor| armor.0);
            world.destroy_entity(id);
            world.emit(&AsteroidDestroyed { points })?;
        }
        Ok(())
    }
}

#[test]
fn test_events_emitted_by_systems_reach_handlers() {
    let score = Rc::new(RefCell::new(0));
    let mut world = World::new();
    let subscription = world.on({
        let score = Rc::clone(&score);
        move |event: &AsteroidDestroyed| {
            *score.borrow_mut() += event.points;
            Ok(())
        }
    });
    world.add_system(Demolisher).unwrap();

    for points in [10, 20] {
        let id = world.create_entity();
        world.add_component(id, Armor(points)).unwrap();
    }
    world.update(0.016).unwrap();
    assert_eq!(*score.borrow(), 30);
    assert_eq!(world.active_entity_count(), 0);

    assert!(world.off(subscription));
    let id = world.create_entity();
    world.add_component(id, Armor(5)).unwrap();
    world.update(0.016).unwrap();
    assert_eq!(*score.borrow(), 30);
}

#[test]
fn test_rejected_event_fails_the_emitting_system() {
    let mut world = World::new();
    let _veto = world.on(|_: &AsteroidDestroyed| Err(HandlerError::new("no scoring in menus")));
    world.add_system(Demolisher).unwrap();
    let id = world.create_entity();
    world.add_component(id, Armor(1)).unwrap();

    let err = world.update(0.016).unwrap_err();
    match err {
        EcsError::SystemFailed { source, .. } => assert!(matches!(*source, SystemError::Event(_))),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_cleanup_tears_down_systems_once() {
    let log = call_log();
    let mut world = World::new();
    world.add_system(Recorder::new("a", 1, &log)).unwrap();
    world.add_system(Recorder::new("b", 0, &log)).unwrap();
    let id = world.create_entity();
    world.add_component(id, Position::default()).unwrap();

    world.cleanup();
    world.update(0.016).unwrap();

    assert_eq!(entries(&log), vec!["a:init", "b:init", "a:cleanup", "b:cleanup"]);
    assert_eq!(world.stats().entity_count, 0);
    assert!(world.pool_stats::<Position>().is_none());
}

#[test]
fn test_world_config_drives_lazy_pools() {
    let config = WorldConfig::default().with_default_pool_size(4);
    let mut world = World::with_config(config);
    let id = world.create_entity();
    world.add_component(id, Velocity { x: 1.0, y: 0.0 }).unwrap();

    let stats = world.pool_stats::<Velocity>().unwrap();
    assert_eq!(stats.capacity, 4);
    assert_eq!(stats.reuses, 1);
}

#[test]
fn test_render_leaves_destroyed_entities_in_place() {
    let mut world = World::new();
    let keep = world.create_entity();
    let doomed = world.create_entity();
    world.add_component(doomed, Position { x: 1.0, y: 1.0 }).unwrap();
    world.destroy_entity(doomed);

    let mut frame: Vec<String> = Vec::new();
    world.render(&mut frame, &IdentityCamera).unwrap();
    assert_eq!(world.entity_count(), 2);
    assert_eq!(world.stats().pooled_entity_count, 0);
    assert_eq!(world.pool_stats::<Position>().unwrap().in_use, 1);

    world.update(0.016).unwrap();
    assert_eq!(world.entity_count(), 1);
    assert_eq!(world.stats().pooled_entity_count, 1);
    assert_eq!(world.pool_stats::<Position>().unwrap().in_use, 0);
    assert!(world.is_alive(keep));
}

struct Unready;

impl System for Unready {
    fn init(&mut self, _world: &mut World) -> SystemResult {
        Err(SystemError::logic("no target"))
    }

    fn update(&mut self, _world: &mut World, _delta_time: f32) -> SystemResult {
        Ok(())
    }
}

/// Counts its updates and registers an `Unready` system on the first one
struct Spawner {
    log: CallLog,
}

impl System for Spawner {
    fn update(&mut self, world: &mut World, _delta_time: f32) -> SystemResult {
        if self.log.borrow().is_empty() {
            world.add_system(Unready)?;
        }
        self.log.borrow_mut().push("spawner:update".to_owned());
        Ok(())
    }
}

#[test]
fn test_deferred_init_failure_still_runs_the_frame() {
    let log = call_log();
    let mut world = World::new();
    world.add_system(Spawner { log: Rc::clone(&log) }).unwrap();
    world.update(0.016).unwrap();

    let doomed = world.create_entity();
    world.destroy_entity(doomed);
    let err = world.update(0.016).unwrap_err();

    assert!(matches!(err, EcsError::SystemInit { ref system, .. } if system.ends_with("Unready")));
    assert_eq!(entries(&log), vec!["spawner:update", "spawner:update"]);
    assert_eq!(world.stats().frame, 2);
    assert_eq!(world.entity_count(), 0);
    assert_eq!(world.system_count(), 1);

    world.update(0.016).unwrap();
}
