#![allow(dead_code)]

use forge_ecs::engine::world::ECSWorld;

pub const ENTITIES_SMALL: usize = 10_000;
pub const ENTITIES_MED: usize = 100_000;

#[derive(Clone, Copy)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy)]
pub struct Health(pub f32);

pub fn setup_world(entity_count: usize) -> ECSWorld {
    let mut world = ECSWorld::new();

    for i in 0..entity_count {
        let entity = world.create_entity();
        let f = i as f32;
        world
            .add_component(entity, Position { x: f, y: 0.0, z: 0.0 })
            .expect("bench setup: add Position");
        world
            .add_component(entity, Velocity { x: 1.0, y: 0.0, z: 0.0 })
            .expect("bench setup: add Velocity");
    }

    world
}
