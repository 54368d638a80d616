use forge_ecs::engine::world::ECSWorld;
use forge_ecs::engine::commands::Command;

#[derive(Clone, Copy, PartialEq, Debug)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Clone, Copy, PartialEq, Debug)]
struct Health(f32);

#[test]
fn deferred_commands_apply_in_order() {
    let mut world = ECSWorld::new();

    let position_id = world.register_component::<Position>();
    let entity = world.create_entity();

    world.defer(Command::Add {
        entity,
        component_id: position_id,
        value: Box::new(Position { x: 1.0, y: 0.0, z: 0.0 }),
    });
    // A later command wins over an earlier one.
    world.defer(Command::Add {
        entity,
        component_id: position_id,
        value: Box::new(Position { x: 2.0, y: 0.0, z: 0.0 }),
    });
    world.defer(Command::Spawn { name: Some("deferred".into()) });

    // Nothing happens until the synchronization point.
    assert!(!world.has_component::<Position>(entity));
    assert_eq!(world.entity_count(), 1);

    world.apply_deferred_commands().unwrap();

    assert_eq!(
        world.get_component::<Position>(entity),
        Some(&Position { x: 2.0, y: 0.0, z: 0.0 })
    );
    assert_eq!(world.entity_count(), 2);
}

#[test]
fn deferred_remove_and_despawn() {
    let mut world = ECSWorld::new();

    let entity = world.create_entity();
    world.add_component(entity, Position { x: 0.0, y: 0.0, z: 0.0 }).unwrap();
    world.add_component(entity, Health(5.0)).unwrap();
    let health_id = world.components().id_of::<Health>().unwrap();

    let victim = world.create_entity();

    world.defer(Command::Remove { entity, component_id: health_id });
    world.defer(Command::Despawn { entity: victim });
    world.apply_deferred_commands().unwrap();

    assert!(!world.has_component::<Health>(entity));
    assert!(world.has_component::<Position>(entity));
    assert!(!world.is_valid(victim));
}

#[test]
fn commands_against_dead_entities_are_skipped() {
    let mut world = ECSWorld::new();

    let position_id = world.register_component::<Position>();
    let doomed = world.create_entity();
    let survivor = world.create_entity();

    world.defer(Command::Add {
        entity: doomed,
        component_id: position_id,
        value: Box::new(Position { x: 0.0, y: 0.0, z: 0.0 }),
    });
    world.defer(Command::Add {
        entity: survivor,
        component_id: position_id,
        value: Box::new(Position { x: 7.0, y: 0.0, z: 0.0 }),
    });

    // The target dies before the synchronization point.
    world.destroy_entity(doomed);
    world.apply_deferred_commands().unwrap();

    assert!(!world.is_valid(doomed));
    assert_eq!(
        world.get_component::<Position>(survivor),
        Some(&Position { x: 7.0, y: 0.0, z: 0.0 })
    );

    // The queue drained; reapplying is a no-op.
    world.apply_deferred_commands().unwrap();
    assert_eq!(world.entity_count(), 1);
}
