use forge_ecs::engine::world::ECSWorld;
use forge_ecs::engine::types::Signature;

#[derive(Clone, Copy, PartialEq, Debug)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Clone, Copy, PartialEq, Debug)]
struct Velocity {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Clone, Copy, PartialEq, Debug)]
struct Health(f32);

#[test]
fn identical_signatures_resolve_to_the_same_archetype() {
    let mut world = ECSWorld::new();

    let position_id = world.register_component::<Position>();
    let velocity_id = world.register_component::<Velocity>();

    let mut signature = Signature::default();
    signature.set(position_id);
    signature.set(velocity_id);

    let mut same = Signature::default();
    same.set(velocity_id);
    same.set(position_id);

    let a = world.get_or_create_archetype(signature).unwrap();
    let b = world.get_or_create_archetype(same).unwrap();
    assert_eq!(a, b);

    // Entities with the same component set land in the same archetype.
    let e1 = world.create_entity();
    let e2 = world.create_entity();
    for &entity in &[e1, e2] {
        world.add_component(entity, Position { x: 0.0, y: 0.0, z: 0.0 }).unwrap();
        world.add_component(entity, Velocity { x: 0.0, y: 0.0, z: 0.0 }).unwrap();
    }
    assert_eq!(world.entity_archetype(e1), world.entity_archetype(e2));
    assert_eq!(world.entity_archetype(e1), Some(a));
}

#[test]
fn adding_a_component_migrates_and_preserves_existing_values() {
    let mut world = ECSWorld::new();

    let entity = world.create_entity();
    world.add_component(entity, Position { x: 1.0, y: 2.0, z: 3.0 }).unwrap();
    world.add_component(entity, Velocity { x: 4.0, y: 5.0, z: 6.0 }).unwrap();

    let before = world.entity_archetype(entity).unwrap();
    world.add_component(entity, Health(42.0)).unwrap();
    let after = world.entity_archetype(entity).unwrap();

    // A component-set change always moves the entity to a different
    // archetype instance.
    assert_ne!(before, after);

    // Existing values transferred by relocation, untouched.
    assert_eq!(
        world.get_component::<Position>(entity),
        Some(&Position { x: 1.0, y: 2.0, z: 3.0 })
    );
    assert_eq!(
        world.get_component::<Velocity>(entity),
        Some(&Velocity { x: 4.0, y: 5.0, z: 6.0 })
    );
    assert_eq!(world.get_component::<Health>(entity), Some(&Health(42.0)));
}

#[test]
fn removing_a_component_migrates_and_preserves_the_rest() {
    let mut world = ECSWorld::new();

    let entity = world.create_entity();
    world.add_component(entity, Position { x: 1.0, y: 2.0, z: 3.0 }).unwrap();
    world.add_component(entity, Velocity { x: 4.0, y: 5.0, z: 6.0 }).unwrap();
    world.add_component(entity, Health(7.0)).unwrap();

    world.remove_component::<Velocity>(entity).unwrap();

    assert!(!world.has_component::<Velocity>(entity));
    assert_eq!(
        world.get_component::<Position>(entity),
        Some(&Position { x: 1.0, y: 2.0, z: 3.0 })
    );
    assert_eq!(world.get_component::<Health>(entity), Some(&Health(7.0)));
}

#[test]
fn removing_the_last_component_keeps_the_entity_alive() {
    let mut world = ECSWorld::new();

    let entity = world.create_entity();
    let empty_archetype = world.entity_archetype(entity).unwrap();

    world.add_component(entity, Health(1.0)).unwrap();
    assert_ne!(world.entity_archetype(entity), Some(empty_archetype));

    world.remove_component::<Health>(entity).unwrap();

    assert!(world.is_valid(entity));
    assert!(!world.has_component::<Health>(entity));
    assert_eq!(world.entity_archetype(entity), Some(empty_archetype));
}

#[test]
fn removing_an_absent_component_is_a_no_op() {
    let mut world = ECSWorld::new();

    let entity = world.create_entity();
    world.add_component(entity, Position { x: 0.0, y: 0.0, z: 0.0 }).unwrap();

    let archetype = world.entity_archetype(entity);
    let archetypes_before = world.archetype_count();

    // Registered but not carried.
    world.register_component::<Health>();
    world.remove_component::<Health>(entity).unwrap();

    // Never registered at all.
    world.remove_component::<Velocity>(entity).unwrap();

    assert_eq!(world.entity_archetype(entity), archetype);
    assert_eq!(world.archetype_count(), archetypes_before);
    assert_eq!(
        world.get_component::<Position>(entity),
        Some(&Position { x: 0.0, y: 0.0, z: 0.0 })
    );
}

#[test]
fn archetype_growth_is_monotonic_and_demand_driven() {
    let mut world = ECSWorld::new();
    assert_eq!(world.archetype_count(), 1); // the empty archetype

    let entity = world.create_entity();
    world.add_component(entity, Position { x: 0.0, y: 0.0, z: 0.0 }).unwrap();
    assert_eq!(world.archetype_count(), 2); // {Position}

    world.add_component(entity, Velocity { x: 0.0, y: 0.0, z: 0.0 }).unwrap();
    assert_eq!(world.archetype_count(), 3); // {Position, Velocity}

    // A second entity walking the same path creates nothing new.
    let other = world.create_entity();
    world.add_component(other, Position { x: 0.0, y: 0.0, z: 0.0 }).unwrap();
    world.add_component(other, Velocity { x: 0.0, y: 0.0, z: 0.0 }).unwrap();
    assert_eq!(world.archetype_count(), 3);

    // Destruction never removes archetypes.
    world.destroy_entity(entity);
    world.destroy_entity(other);
    assert_eq!(world.archetype_count(), 3);
}

#[test]
fn swap_remove_keeps_all_columns_in_lockstep() {
    let mut world = ECSWorld::new();

    let mut spawned = Vec::new();
    for i in 0..5 {
        let entity = world.create_entity();
        let f = i as f32;
        world.add_component(entity, Position { x: f, y: f, z: f }).unwrap();
        world.add_component(entity, Velocity { x: 10.0 * f, y: 0.0, z: 0.0 }).unwrap();
        spawned.push(entity);
    }

    // Remove from the middle; the last row is swapped into the hole.
    world.destroy_entity(spawned[1]);

    let archetype_id = world.entity_archetype(spawned[0]).unwrap();
    let archetype = world.archetype(archetype_id).unwrap();
    assert_eq!(archetype.len(), 4);

    // Every surviving entity still sees its own values across all columns.
    for &entity in &[spawned[0], spawned[2], spawned[3], spawned[4]] {
        let position = world.get_component::<Position>(entity).unwrap();
        let velocity = world.get_component::<Velocity>(entity).unwrap();
        assert_eq!(velocity.x, 10.0 * position.x);

        let archetype = world.archetype(archetype_id).unwrap();
        let row = archetype.find_entity(entity).unwrap();
        assert_eq!(archetype.get_entity(row), Some(entity));
    }

    assert_eq!(world.get_component::<Position>(spawned[1]), None);
}

#[test]
fn migration_of_one_entity_does_not_disturb_its_old_neighbors() {
    let mut world = ECSWorld::new();

    let stays = world.create_entity();
    let moves = world.create_entity();
    let last = world.create_entity();

    for (i, &entity) in [stays, moves, last].iter().enumerate() {
        let f = i as f32;
        world.add_component(entity, Position { x: f, y: 0.0, z: 0.0 }).unwrap();
    }

    // Migrating `moves` out of {Position} swap-removes its row there.
    world.add_component(moves, Health(1.0)).unwrap();

    assert_eq!(world.get_component::<Position>(stays).unwrap().x, 0.0);
    assert_eq!(world.get_component::<Position>(moves).unwrap().x, 1.0);
    assert_eq!(world.get_component::<Position>(last).unwrap().x, 2.0);
}
