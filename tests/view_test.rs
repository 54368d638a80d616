use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use forge_ecs::engine::world::ECSWorld;
use forge_ecs::engine::entity::Entity;
use forge_ecs::engine::error::ECSError;

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
struct Frozen;

#[derive(Clone, Copy, PartialEq, Debug)]
struct Tag(&'static str);

#[test]
fn views_match_superset_archetypes_only() {
    let mut world = ECSWorld::new();

    // One entity with Position only, one with Position + Velocity.
    let plain = world.create_entity();
    world.add_component(plain, Position { x: 0.0, y: 0.0, z: 0.0 }).unwrap();

    let moving = world.create_entity();
    world.add_component(moving, Position { x: 0.0, y: 0.0, z: 0.0 }).unwrap();
    world.add_component(moving, Velocity { x: 1.0, y: 0.0, z: 0.0 }).unwrap();

    assert_eq!(world.view::<(Position,)>().unwrap().len(), 2);
    assert_eq!(world.view::<(Position, Velocity)>().unwrap().len(), 1);
    assert_eq!(world.view::<(Velocity,)>().unwrap().len(), 1);

    // A registered kind no entity carries matches nothing.
    world.register_component::<Frozen>();
    assert_eq!(world.view::<(Frozen,)>().unwrap().len(), 0);
    assert!(world.view::<(Frozen,)>().unwrap().is_empty());

    // An entity in a non-superset archetype never appears in iteration.
    let seen: HashSet<Entity> = world.view::<(Position, Velocity)>().unwrap().entities().collect();
    assert!(seen.contains(&moving));
    assert!(!seen.contains(&plain));
}

#[test]
fn view_len_equals_sum_of_matching_archetype_lengths() {
    let mut world = ECSWorld::new();

    for i in 0..4 {
        let entity = world.create_entity();
        world.add_component(entity, Position { x: i as f32, y: 0.0, z: 0.0 }).unwrap();
        if i % 2 == 0 {
            world.add_component(entity, Velocity { x: 0.0, y: 0.0, z: 0.0 }).unwrap();
        }
    }

    let view = world.view::<(Position,)>().unwrap();
    let by_archetypes: usize = view
        .archetype_ids()
        .iter()
        .map(|&id| world.archetype(id).unwrap().len())
        .sum();

    assert_eq!(view.len(), 4);
    assert_eq!(view.len(), by_archetypes);

    let mut visited = 0;
    view.for_each(|_, _position| visited += 1);
    assert_eq!(visited, 4);
}

#[test]
fn destroyed_entities_leave_views() {
    let mut world = ECSWorld::new();

    let e1 = world.create_entity();
    world.add_component(e1, Tag("x")).unwrap();
    let e2 = world.create_entity();
    world.add_component(e2, Tag("x")).unwrap();

    world.destroy_entity(e1);

    let view = world.view::<(Tag,)>().unwrap();
    assert_eq!(view.len(), 1);

    let survivors: Vec<Entity> = view.entities().collect();
    assert_eq!(survivors, vec![e2]);
    view.for_each(|entity, tag| {
        assert_eq!(entity, e2);
        assert_eq!(tag, &Tag("x"));
    });
}

#[test]
fn view_iteration_yields_matching_entity_component_pairs() {
    let mut world = ECSWorld::new();

    for i in 0..8 {
        let entity = world.create_entity();
        let f = i as f32;
        world.add_component(entity, Position { x: f, y: 2.0 * f, z: 0.0 }).unwrap();
        world.add_component(entity, Velocity { x: f, y: f, z: f }).unwrap();
    }

    let view = world.view::<(Position, Velocity)>().unwrap();
    let mut rows = 0;
    view.for_each(|entity, position, velocity| {
        // Components delivered per position must belong to the same entity.
        assert_eq!(position.y, 2.0 * position.x);
        assert_eq!(velocity.x, position.x);
        assert_eq!(
            world.get_component::<Position>(entity).unwrap().x,
            position.x
        );
        rows += 1;
    });
    assert_eq!(rows, 8);
}

#[test]
fn mutable_views_write_through_to_storage() {
    let mut world = ECSWorld::new();

    let mut entities = Vec::new();
    for i in 0..4 {
        let entity = world.create_entity();
        let f = i as f32;
        world.add_component(entity, Position { x: f, y: 0.0, z: 0.0 }).unwrap();
        world.add_component(entity, Velocity { x: 1.0, y: 0.0, z: 0.0 }).unwrap();
        entities.push(entity);
    }

    let mut view = world.view_mut::<(Position, Velocity)>().unwrap();
    view.for_each(|_, position, velocity| {
        position.x += velocity.x;
    });

    for (i, &entity) in entities.iter().enumerate() {
        assert_eq!(
            world.get_component::<Position>(entity).unwrap().x,
            i as f32 + 1.0
        );
    }
}

#[test]
fn parallel_iteration_visits_every_row_once() {
    let mut world = ECSWorld::new();

    for i in 0..64 {
        let entity = world.create_entity();
        world.add_component(entity, Position { x: i as f32, y: 0.0, z: 0.0 }).unwrap();
        if i % 2 == 0 {
            world.add_component(entity, Velocity { x: 0.0, y: 0.0, z: 0.0 }).unwrap();
        }
    }

    let view = world.view::<(Position,)>().unwrap();
    let visits = AtomicUsize::new(0);
    view.par_for_each(|_, _position| {
        visits.fetch_add(1, Ordering::Relaxed);
    });

    assert_eq!(visits.load(Ordering::Relaxed), view.len());
    assert_eq!(view.len(), 64);
}

#[test]
fn views_over_unknown_or_duplicate_kinds_are_rejected() {
    let mut world = ECSWorld::new();

    let entity = world.create_entity();
    world.add_component(entity, Position { x: 0.0, y: 0.0, z: 0.0 }).unwrap();

    // Velocity was never registered with this world.
    let result = world.view::<(Position, Velocity)>();
    assert!(matches!(result, Err(ECSError::UnregisteredComponent { .. })));

    let result = world.view::<(Position, Position)>();
    assert!(matches!(result, Err(ECSError::DuplicateViewComponent { .. })));
}

#[test]
fn debug_dump_reports_entities_and_signatures() {
    let mut world = ECSWorld::new();

    let hero = world.create_entity_named("hero");
    world.add_component(hero, Position { x: 0.0, y: 0.0, z: 0.0 }).unwrap();

    let dump = world.debug_dump();
    assert!(dump.contains("2 archetypes"));
    assert!(dump.contains("1 entities"));
    assert!(dump.contains("hero"));
    assert!(dump.contains("Position"));
}
