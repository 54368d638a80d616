//! # forge_ecs
//!
//! Archetype-based entity/component storage engine.
//!
//! Entities are grouped by the exact set of component types attached to them
//! ("archetypes"); component data is stored in contiguous per-type columns
//! for cache-friendly iteration, and entities migrate between archetypes as
//! their component sets change.
//!
//! ## Design goals
//! - Archetype-based storage for cache efficiency
//! - Stable entity handles decoupled from storage location
//! - O(1) component access and swap-remove structural changes
//! - Safe, explicit data access: structural mutation requires `&mut` world
//!
//! ## Example
//! ```
//! use forge_ecs::prelude::*;
//!
//! #[derive(Clone, Copy, PartialEq, Debug)]
//! struct Position { x: f32, y: f32, z: f32 }
//!
//! #[derive(Clone, Copy, PartialEq, Debug)]
//! struct Velocity { x: f32, y: f32, z: f32 }
//!
//! let mut world = ECSWorld::new();
//! let entity = world.create_entity();
//! world.add_component(entity, Position { x: 0.0, y: 0.0, z: 0.0 }).unwrap();
//! world.add_component(entity, Velocity { x: 1.0, y: 0.0, z: 0.0 }).unwrap();
//!
//! let mut view = world.view_mut::<(Position, Velocity)>().unwrap();
//! view.for_each(|_entity, position, velocity| {
//!     position.x += velocity.x;
//! });
//!
//! assert_eq!(world.get_component::<Position>(entity).unwrap().x, 1.0);
//! ```

#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod engine;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use engine::world::ECSWorld;

pub use engine::entity::{
    Entity,
    Entities,
};

pub use engine::component::{
    ComponentRegistry,
    ComponentDesc,
};

pub use engine::archetype::Archetype;

pub use engine::storage::{
    Attribute,
    TypeErasedAttribute,
};

pub use engine::view::{
    View,
    ViewMut,
    ViewSet,
};

pub use engine::commands::Command;

pub use engine::error::{
    ECSResult,
    ECSError,
    AttributeError,
    MoveError,
    StaleEntityError,
};

pub use engine::types::{
    EntityID,
    ComponentID,
    ArchetypeID,
    RowID,
    Signature,
    COMPONENT_CAP,
};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used engine types.
///
/// Import with:
/// ```rust
/// use forge_ecs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ECSWorld,
        Entity,
        View,
        ViewMut,
        Command,
        Signature,
        ECSResult,
        ECSError,
    };
}
