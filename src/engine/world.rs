//! World management: entity lifecycle, component migration, and archetype
//! ownership.
//!
//! This module defines [`ECSWorld`], the central orchestration layer of the
//! storage engine, responsible for:
//!
//! * owning the component registry, all archetypes, and the entity allocator,
//! * mapping component signatures to archetypes (creating them on demand),
//! * coordinating entity movement between archetypes when component sets
//!   change,
//! * managing deferred structural mutations via commands,
//! * providing introspection over entities, archetypes, and signatures.
//!
//! ## Concurrency model
//!
//! The world is single-threaded by contract. Every structural mutation
//! (entity creation/destruction, component add/remove, archetype creation)
//! takes `&mut self`, so exclusive access is enforced by the borrow checker
//! rather than by API discipline or internal locking. Views take `&self` and
//! therefore cannot coexist with structural mutation; read-only views may be
//! shared across threads between mutation phases.
//!
//! ## Migration semantics
//!
//! Adding or removing a component never mutates an archetype's signature in
//! place: the entity's row moves to a different archetype (created lazily on
//! first use of its signature). Values of all component kinds shared between
//! the source and destination archetypes transfer by relocation, never
//! reconstruction, so unrelated component data survives every migration
//! bit-for-bit. Migration is atomic from the caller's perspective: there is
//! no observable "being migrated" state.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Write as _;

use crate::engine::types::{
    ArchetypeID, ComponentID, SIGNATURE_SIZE, Signature,
};
use crate::engine::component::ComponentRegistry;
use crate::engine::storage::{downcast_attribute, downcast_attribute_mut};
use crate::engine::archetype::Archetype;
use crate::engine::entity::{Entity, Entities, EntityHasher};
use crate::engine::commands::Command;
use crate::engine::error::{ECSError, ECSResult};

/// The archetype holding entities with no components; seeded at construction.
const EMPTY_ARCHETYPE: ArchetypeID = 0;

/// Core ECS storage and orchestration structure.
///
/// ## Responsibilities
/// * Owns the component registry, all archetypes, and entity identity
/// * Maps canonical signature bit patterns to archetype IDs
/// * Manages entity placement across archetypes
/// * Executes structural changes and deferred commands
///
/// ## Invariants
/// * `signature_map` and `archetypes` remain consistent: every archetype is
///   reachable through the map entry for its signature, and archetypes are
///   never destroyed once created.
/// * Entity locations always point at the archetype whose entity list
///   contains them.
pub struct ECSWorld {
    components: ComponentRegistry,
    archetypes: Vec<Archetype>,
    signature_map: HashMap<[u64; SIGNATURE_SIZE], ArchetypeID>,
    entities: Entities,
    names: HashMap<Entity, String, EntityHasher>,
    deferred: Vec<Command>,
}

impl Default for ECSWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl ECSWorld {
    /// Creates an empty world.
    ///
    /// ## Behavior
    /// Seeds the archetype for the empty signature; entities carry no
    /// components until some are added, and they return here when their last
    /// component is removed.
    pub fn new() -> Self {
        let components = ComponentRegistry::new();
        let empty = Signature::default();

        let root = Archetype::new(EMPTY_ARCHETYPE, empty, &components)
            .expect("the empty signature allocates no columns");

        Self {
            components,
            signature_map: HashMap::from([(empty.components, EMPTY_ARCHETYPE)]),
            archetypes: vec![root],
            entities: Entities::new(),
            names: HashMap::default(),
            deferred: Vec::new(),
        }
    }

    /// Returns the world's component registry.
    #[inline]
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Registers component type `T`, returning its stable ID.
    ///
    /// ## Notes
    /// Registration also happens implicitly on the first `add_component` of a
    /// new kind; explicit registration is only needed to build views over
    /// kinds no entity has carried yet.
    pub fn register_component<T: 'static + Send + Sync>(&mut self) -> ComponentID {
        self.components.register::<T>()
    }

    /// Returns the number of distinct component types registered so far.
    #[inline]
    pub fn registered_component_count(&self) -> usize {
        self.components.count()
    }

    /// Creates a new entity with no components.
    ///
    /// ## Behavior
    /// Allocates the next handle and inserts it into the empty-signature
    /// archetype. Never fails.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.spawn(EMPTY_ARCHETYPE);
        self.archetypes[EMPTY_ARCHETYPE as usize].add_entity(entity);
        log::trace!("created entity {entity}");
        entity
    }

    /// Creates a new entity with no components and a display name.
    pub fn create_entity_named(&mut self, name: impl Into<String>) -> Entity {
        let entity = self.create_entity();
        self.names.insert(entity, name.into());
        entity
    }

    /// Returns the display name recorded for `entity`, if any.
    pub fn entity_name(&self, entity: Entity) -> Option<&str> {
        self.names.get(&entity).map(String::as_str)
    }

    /// Destroys an entity, releasing its row and retiring its handle.
    ///
    /// ## Behavior
    /// Removes the entity from its archetype via swap-remove, erases the
    /// location mapping and any name, and bumps the slot generation. Returns
    /// `false` without side effects for null, stale, or never-created
    /// handles — destroying twice is a no-op, not an error.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        let Some(archetype_id) = self.entities.location(entity) else {
            return false;
        };

        let archetype = &mut self.archetypes[archetype_id as usize];
        let Some(row) = archetype.find_entity(entity) else {
            panic!("ECS corruption detected: live entity {entity} missing from its archetype");
        };

        if let Err(e) = archetype.remove_entity(row) {
            panic!("ECS corruption detected: {e}");
        }

        self.names.remove(&entity);
        self.entities.despawn(entity);
        log::trace!("destroyed entity {entity}");
        true
    }

    /// Returns `true` iff `entity` is non-null and currently alive.
    #[inline]
    pub fn is_valid(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Returns the number of live entities.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.live_count()
    }

    /// Returns the number of archetypes created so far (monotonic).
    #[inline]
    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    /// Returns the archetype with the given ID, if it exists.
    pub fn archetype(&self, archetype_id: ArchetypeID) -> Option<&Archetype> {
        self.archetypes.get(archetype_id as usize)
    }

    /// Returns the ID of the archetype currently holding `entity`.
    ///
    /// ## Notes
    /// The returned ID is invalidated as a location by any structural change
    /// to the entity; treat it as a snapshot, not a cache.
    pub fn entity_archetype(&self, entity: Entity) -> Option<ArchetypeID> {
        self.entities.location(entity)
    }

    #[inline]
    pub(crate) fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    #[inline]
    pub(crate) fn archetypes_mut(&mut self) -> &mut [Archetype] {
        &mut self.archetypes
    }

    /// Retrieves the archetype matching `signature`, creating it if needed.
    ///
    /// ## Semantics
    /// Looked up by the canonical signature bit pattern; two signatures with
    /// identical patterns always resolve to the same archetype instance.
    /// This is the only path by which archetypes are born, and archetypes
    /// are never destroyed once created.
    pub fn get_or_create_archetype(&mut self, signature: Signature) -> ECSResult<ArchetypeID> {
        if let Some(&archetype_id) = self.signature_map.get(&signature.components) {
            return Ok(archetype_id);
        }

        assert!(
            self.archetypes.len() < ArchetypeID::MAX as usize,
            "exceeded configured archetype capacity"
        );

        let archetype_id = self.archetypes.len() as ArchetypeID;
        let archetype = Archetype::new(archetype_id, signature, &self.components)?;

        self.signature_map.insert(signature.components, archetype_id);
        self.archetypes.push(archetype);

        log::debug!("created archetype {archetype_id} for signature {signature}");
        Ok(archetype_id)
    }

    /// Returns mutable references to two distinct archetypes.
    ///
    /// ## Purpose
    /// Enables mutation of source and destination archetypes during entity
    /// migration without violating aliasing rules.
    ///
    /// ## Panics
    /// Panics if `a == b`.
    #[inline]
    fn archetype_pair_mut(
        archetypes: &mut [Archetype],
        a: ArchetypeID,
        b: ArchetypeID,
    ) -> (&mut Archetype, &mut Archetype) {
        assert!(a != b);

        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = archetypes.split_at_mut(high as usize);

        let left = &mut head[low as usize];
        let right = &mut tail[0];

        if a < b { (left, right) } else { (right, left) }
    }

    /// Adds a component to an entity, migrating it between archetypes if its
    /// signature changes.
    ///
    /// ## Semantics
    /// * Registers `T` on first use.
    /// * If the entity already carries `T`, the stored value is overwritten
    ///   in place; no migration happens.
    /// * Otherwise the destination archetype (current signature plus `T`) is
    ///   resolved or created and the entity's row migrates: every component
    ///   kind shared between the two archetypes transfers by relocation, the
    ///   new kind's value is inserted at the same row, and the entity's
    ///   location mapping is updated.
    ///
    /// ## Returns
    /// A mutable reference to the stored value.
    ///
    /// ## Errors
    /// * `StaleEntity` for null, dead, or stale handles.
    /// * `Move`/`Attribute`/`Internal` errors indicate violated engine
    ///   invariants and are not recoverable.
    ///
    /// ## Notes
    /// This is a structural operation: it invalidates all rows and component
    /// references previously observed for the affected archetypes.
    pub fn add_component<T: 'static + Send + Sync>(
        &mut self,
        entity: Entity,
        value: T,
    ) -> ECSResult<&mut T> {
        let component_id = self.components.register::<T>();
        self.add_component_dyn(entity, component_id, Box::new(value))?;

        let slot = self.component_slot_mut::<T>(entity, component_id)?;
        Ok(slot)
    }

    /// Removes component `T` from an entity, migrating it to the archetype
    /// for the reduced signature.
    ///
    /// ## Semantics
    /// The removed value is dropped. When the last component is removed the
    /// entity migrates back to the empty-signature archetype; it stays alive
    /// and keeps its handle. Removing a kind the entity does not carry (or
    /// one that was never registered) is a no-op.
    ///
    /// ## Errors
    /// `StaleEntity` for null, dead, or stale handles.
    pub fn remove_component<T: 'static + Send + Sync>(&mut self, entity: Entity) -> ECSResult<()> {
        let Some(component_id) = self.components.id_of::<T>() else {
            // Never registered, so no entity can carry it.
            return match self.entities.is_alive(entity) {
                true => Ok(()),
                false => Err(ECSError::StaleEntity),
            };
        };
        self.remove_component_dyn(entity, component_id)
    }

    /// Returns `true` if `entity` is alive and currently carries `T`.
    pub fn has_component<T: 'static>(&self, entity: Entity) -> bool {
        let Some(component_id) = self.components.id_of::<T>() else {
            return false;
        };
        let Some(archetype_id) = self.entities.location(entity) else {
            return false;
        };
        self.archetypes[archetype_id as usize].has(component_id)
    }

    /// Returns a reference to entity's `T` value, if it carries one.
    ///
    /// ## Notes
    /// O(1): archetype lookup through the location map, then row lookup
    /// through the archetype's index map.
    pub fn get_component<T: 'static + Send + Sync>(&self, entity: Entity) -> Option<&T> {
        let component_id = self.components.id_of::<T>()?;
        let archetype_id = self.entities.location(entity)?;
        let archetype = &self.archetypes[archetype_id as usize];

        let row = archetype.find_entity(entity)?;
        let column = archetype.column(component_id)?;
        downcast_attribute::<T>(column)?.get(row)
    }

    /// Returns a mutable reference to entity's `T` value, if it carries one.
    pub fn get_component_mut<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<&mut T> {
        let component_id = self.components.id_of::<T>()?;
        let archetype_id = self.entities.location(entity)?;
        let archetype = &mut self.archetypes[archetype_id as usize];

        let row = archetype.find_entity(entity)?;
        let column = archetype.column_mut(component_id)?;
        downcast_attribute_mut::<T>(column.as_mut())?.get_mut(row)
    }

    /// Queues a structural command for deferred execution.
    ///
    /// ## Use case
    /// Callers that iterate views cannot mutate structure at the same time;
    /// they record commands instead and apply them at a synchronization
    /// point.
    pub fn defer(&mut self, command: Command) {
        self.deferred.push(command);
    }

    /// Applies all queued deferred commands in FIFO order.
    ///
    /// ## Semantics
    /// This is a synchronization point where structural changes requested
    /// during a query phase take effect. Commands aimed at entities that
    /// died in the meantime are skipped; internal errors abort application.
    pub fn apply_deferred_commands(&mut self) -> ECSResult<()> {
        let commands = std::mem::take(&mut self.deferred);
        for command in commands {
            let result = match command {
                Command::Spawn { name } => {
                    match name {
                        Some(name) => self.create_entity_named(name),
                        None => self.create_entity(),
                    };
                    Ok(())
                }
                Command::Despawn { entity } => {
                    self.destroy_entity(entity);
                    Ok(())
                }
                Command::Add { entity, component_id, value } => {
                    self.add_component_dyn(entity, component_id, value)
                }
                Command::Remove { entity, component_id } => {
                    self.remove_component_dyn(entity, component_id)
                }
            };

            match result {
                Ok(()) | Err(ECSError::StaleEntity) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Renders a human-readable dump of entities, archetypes, and
    /// signatures.
    ///
    /// ## Purpose
    /// Debug introspection only; the format is not a stable interface.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "world: {} entities, {} archetypes, {} component types",
            self.entity_count(),
            self.archetype_count(),
            self.registered_component_count(),
        );

        for archetype in &self.archetypes {
            let signature = archetype.signature();
            let kinds: Vec<&str> = signature
                .iter_component_ids()
                .map(|id| self.components.name(id).unwrap_or("?"))
                .collect();

            let _ = writeln!(
                out,
                "archetype {} signature {} [{}]: {} entities",
                archetype.archetype_id(),
                signature,
                kinds.join(", "),
                archetype.len(),
            );

            for &entity in archetype.entities() {
                match self.entity_name(entity) {
                    Some(name) => {
                        let _ = writeln!(out, "  {entity} \"{name}\"");
                    }
                    None => {
                        let _ = writeln!(out, "  {entity}");
                    }
                }
            }
        }

        out
    }

    /// Type-erased component insertion; shared by the typed API and the
    /// deferred command path.
    fn add_component_dyn(
        &mut self,
        entity: Entity,
        component_id: ComponentID,
        value: Box<dyn Any>,
    ) -> ECSResult<()> {
        let source_id = self.entities.location(entity).ok_or(ECSError::StaleEntity)?;
        let source_signature = *self.archetypes[source_id as usize].signature();

        if source_signature.has(component_id) {
            // Same signature: overwrite the existing slot in place.
            let archetype = &mut self.archetypes[source_id as usize];
            let row = archetype
                .find_entity(entity)
                .ok_or(ECSError::Internal("live entity missing from its archetype"))?;
            let column = archetype
                .column_mut(component_id)
                .ok_or(ECSError::Internal("missing column for signature bit"))?;
            column.write_any(row, value)?;
            return Ok(());
        }

        let mut new_signature = source_signature;
        new_signature.set(component_id);
        let destination_id = self.get_or_create_archetype(new_signature)?;

        let (source, destination) =
            Self::archetype_pair_mut(&mut self.archetypes, source_id, destination_id);

        let source_row = source
            .find_entity(entity)
            .ok_or(ECSError::Internal("live entity missing from its archetype"))?;

        source.move_row_to(destination, entity, source_row, vec![(component_id, value)])?;
        self.entities.set_location(entity, destination_id);

        log::trace!(
            "entity {entity} migrated from archetype {source_id} to {destination_id} (added component {component_id})"
        );
        Ok(())
    }

    /// Type-erased component removal; shared by the typed API and the
    /// deferred command path.
    fn remove_component_dyn(&mut self, entity: Entity, component_id: ComponentID) -> ECSResult<()> {
        let source_id = self.entities.location(entity).ok_or(ECSError::StaleEntity)?;
        let source_signature = *self.archetypes[source_id as usize].signature();

        if !source_signature.has(component_id) {
            return Ok(());
        }

        let mut new_signature = source_signature;
        new_signature.clear(component_id);
        let destination_id = self.get_or_create_archetype(new_signature)?;

        let (source, destination) =
            Self::archetype_pair_mut(&mut self.archetypes, source_id, destination_id);

        let source_row = source
            .find_entity(entity)
            .ok_or(ECSError::Internal("live entity missing from its archetype"))?;

        source.move_row_to(destination, entity, source_row, Vec::new())?;
        self.entities.set_location(entity, destination_id);

        log::trace!(
            "entity {entity} migrated from archetype {source_id} to {destination_id} (removed component {component_id})"
        );
        Ok(())
    }

    /// Resolves the mutable slot for `entity`'s `T` value after an insert.
    fn component_slot_mut<T: 'static + Send + Sync>(
        &mut self,
        entity: Entity,
        component_id: ComponentID,
    ) -> ECSResult<&mut T> {
        let archetype_id = self
            .entities
            .location(entity)
            .ok_or(ECSError::Internal("entity vanished during component insert"))?;
        let archetype = &mut self.archetypes[archetype_id as usize];

        let row = archetype
            .find_entity(entity)
            .ok_or(ECSError::Internal("live entity missing from its archetype"))?;
        let column = archetype
            .column_mut(component_id)
            .ok_or(ECSError::Internal("missing column for signature bit"))?;

        downcast_attribute_mut::<T>(column.as_mut())
            .ok_or(ECSError::Internal("column element type mismatch"))?
            .get_mut(row)
            .ok_or(ECSError::Internal("row out of bounds after insert"))
    }
}
