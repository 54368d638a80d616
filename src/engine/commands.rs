//! Deferred structural mutation commands.
//!
//! ## Purpose
//! Commands provide an explicit, ordered representation of structural world
//! mutations such as entity creation, destruction, and component addition or
//! removal.
//!
//! Rather than mutating archetypes while a query is being iterated, callers
//! record `Command` values and apply them later at a synchronization point
//! ([`ECSWorld::apply_deferred_commands`](crate::engine::world::ECSWorld::apply_deferred_commands)).
//! This keeps the "query phase" free of structural changes that would
//! invalidate rows and references.
//!
//! ## Design
//! - Commands are plain data describing *what* change should occur, not
//!   *how*.
//! - Execution is handled centrally by the world, in recording order.
//!
//! ## Invariants
//! - Commands are executed in the order they are recorded.
//! - A command aimed at an entity that died before application is skipped,
//!   not an error.
//! - Component identifiers and values must match the world's registry.

use std::any::Any;

use crate::engine::entity::Entity;
use crate::engine::types::ComponentID;

/// Represents a deferred world mutation.
///
/// ## Design
/// Commands are typically produced during view iteration and consumed by the
/// world's command processor, which applies them to archetypes and entity
/// storage.
///
/// ## Invariants
/// - Commands must be applied in the order they are issued.
/// - Component values must match the registered component type for their
///   `component_id`.
pub enum Command {
    /// Spawns a new entity with no components.
    Spawn {
        /// Optional display name for the new entity.
        name: Option<String>,
    },

    /// Despawns an existing entity.
    ///
    /// ## Behavior
    /// - Removes the entity from its archetype via swap-remove.
    /// - Releases the entity handle.
    Despawn {
        /// Entity to be removed from the world.
        entity: Entity,
    },

    /// Adds a component to an existing entity.
    ///
    /// ## Behavior
    /// - Migrates the entity to the archetype that includes the added kind.
    /// - The provided value is inserted into the destination archetype.
    Add {
        /// Target entity receiving the component.
        entity: Entity,

        /// Identifier of the component type to add.
        component_id: ComponentID,

        /// Component value to insert.
        ///
        /// Must match the registered component type for `component_id`.
        value: Box<dyn Any + Send + Sync>,
    },

    /// Removes a component from an existing entity.
    ///
    /// ## Behavior
    /// - Migrates the entity to the archetype that excludes the kind.
    /// - The removed component value is dropped.
    Remove {
        /// Target entity losing the component.
        entity: Entity,

        /// Identifier of the component type to remove.
        component_id: ComponentID,
    },
}
