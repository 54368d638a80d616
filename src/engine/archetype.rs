//! Archetype storage: entities grouped by an identical component signature.
//!
//! An [`Archetype`] owns columnar component storage for a fixed set of
//! component types plus a parallel list of the entities whose data it holds.
//! Row `i` of every component column and slot `i` of the entity list refer to
//! the same logical entity.
//!
//! ## Design
//! - Component data is stored column-major by component type
//!   ([`Attribute`](crate::engine::storage::Attribute) columns behind
//!   `TypeErasedAttribute`).
//! - Entities are densely packed using swap-remove semantics.
//! - Entity rows are tracked in an incremental index map, giving O(1)
//!   `find_entity` instead of a linear scan.
//!
//! ## Invariants
//! - All component columns have the same row count as the entity list
//!   (outside the explicit two-phase window of [`Archetype::add_entity`]).
//! - The row index map is consistent with the entity list.
//! - The signature exactly reflects allocated component columns.
//! - The signature never changes after construction: when an entity's
//!   component set changes it *moves* to a different archetype, it never
//!   mutates this one.

use std::any::Any;

use crate::engine::types::{
    ArchetypeID, RowID, ComponentID, COMPONENT_CAP, SIGNATURE_SIZE,
    Signature, iter_bits_from_words,
};
use crate::engine::storage::TypeErasedAttribute;
use crate::engine::entity::{Entity, EntityRowMap};
use crate::engine::component::ComponentRegistry;
use crate::engine::error::{ECSError, ECSResult, MoveError};

/// Stores entities that share an identical component signature.
pub struct Archetype {
    archetype_id: ArchetypeID,
    signature: Signature,
    entities: Vec<Entity>,
    rows: EntityRowMap,
    columns: Vec<Option<Box<dyn TypeErasedAttribute>>>,
}

impl Archetype {
    /// Creates a new empty `Archetype` for the given signature.
    ///
    /// ## Behavior
    /// - Allocates `COMPONENT_CAP` column slots, all initially empty.
    /// - Builds one empty column per signature bit using the registry's
    ///   storage factories.
    ///
    /// ## Errors
    /// `Internal` if the signature names a component ID the registry has no
    /// factory for; the world only builds signatures out of registered IDs.
    pub fn new(
        archetype_id: ArchetypeID,
        signature: Signature,
        registry: &ComponentRegistry,
    ) -> ECSResult<Self> {
        let mut archetype = Self {
            archetype_id,
            signature,
            entities: Vec::new(),
            rows: EntityRowMap::default(),
            columns: (0..COMPONENT_CAP).map(|_| None).collect(),
        };

        for component_id in signature.iter_component_ids() {
            let column = registry.make_empty_column(component_id)?;
            archetype.columns[(component_id - 1) as usize] = Some(column);
        }

        Ok(archetype)
    }

    /// Returns the `ArchetypeID` associated with this archetype.
    ///
    /// ## Notes
    /// This value is stable for the lifetime of the archetype.
    #[inline]
    pub fn archetype_id(&self) -> ArchetypeID {
        self.archetype_id
    }

    /// Returns a reference to the archetype's signature.
    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns the number of entities stored in the archetype.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the archetype holds no entities.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the dense entity list.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Returns the entity at `row`, if in bounds.
    #[inline]
    pub fn get_entity(&self, row: RowID) -> Option<Entity> {
        self.entities.get(row as usize).copied()
    }

    /// Returns the row currently occupied by `entity`, if present.
    ///
    /// ## Notes
    /// O(1) through the incremental index map. The returned row is
    /// invalidated by any subsequent swap-remove in this archetype and must
    /// not be cached across mutations.
    #[inline]
    pub fn find_entity(&self, entity: Entity) -> Option<RowID> {
        self.rows.get(&entity).map(|&row| row as RowID)
    }

    /// Returns `true` if the archetype stores the specified component kind.
    ///
    /// ## Notes
    /// This checks the signature only; it does not inspect column storage.
    #[inline]
    pub fn has(&self, component_id: ComponentID) -> bool {
        self.signature.has(component_id)
    }

    /// Returns `true` if this archetype's signature is a superset of `need`.
    #[inline]
    pub fn matches_all(&self, need: &Signature) -> bool {
        self.signature.contains_all(need)
    }

    /// Returns the type-erased column for a component kind.
    #[inline]
    pub fn column(&self, component_id: ComponentID) -> Option<&dyn TypeErasedAttribute> {
        if component_id == 0 || (component_id as usize) > COMPONENT_CAP {
            return None;
        }
        self.columns[(component_id - 1) as usize]
            .as_deref()
    }

    /// Returns the type-erased column for a component kind, mutably.
    #[inline]
    pub fn column_mut(&mut self, component_id: ComponentID) -> Option<&mut Box<dyn TypeErasedAttribute>> {
        if component_id == 0 || (component_id as usize) > COMPONENT_CAP {
            return None;
        }
        self.columns[(component_id - 1) as usize].as_mut()
    }

    /// Idempotently ensures a column exists for `component_id`.
    ///
    /// ## Behavior
    /// Allocates a new column from the registry if not already present and
    /// marks the component bit in the signature. Only meaningful while the
    /// archetype is still empty; extending a populated archetype would break
    /// column length parity.
    pub fn ensure_column(
        &mut self,
        component_id: ComponentID,
        registry: &ComponentRegistry,
    ) -> ECSResult<()> {
        if component_id == 0 || (component_id as usize) > COMPONENT_CAP {
            return Err(ECSError::Internal("component id out of range"));
        }

        let index = (component_id - 1) as usize;
        if self.columns[index].is_none() {
            debug_assert!(self.entities.is_empty(), "column added to a populated archetype");
            self.columns[index] = Some(registry.make_empty_column(component_id)?);
            self.signature.set(component_id);
        }

        Ok(())
    }

    /// Appends `entity` to the entity list and returns its new row.
    ///
    /// ## Two-phase contract
    /// This records *identity only*. The caller must then populate exactly
    /// one slot in every component column at the returned row (by direct
    /// construction or relocation) before the archetype is consistent again;
    /// [`Self::debug_assert_consistent`] checks parity in debug builds.
    pub fn add_entity(&mut self, entity: Entity) -> RowID {
        let row = self.entities.len();
        self.entities.push(entity);
        self.rows.insert(entity, row);
        row as RowID
    }

    /// Removes the entity at `row`, swap-removing every parallel array.
    ///
    /// ## Behavior
    /// - Every component column swap-removes `row`.
    /// - The entity list swap-removes `row` in lockstep.
    /// - The index map entry for the removed entity is erased and the entry
    ///   for the displaced entity (if any) is repointed at `row`.
    ///
    /// ## Errors
    /// `Internal` if `row` is out of bounds or the index map is out of sync.
    pub fn remove_entity(&mut self, row: RowID) -> ECSResult<()> {
        let slot = row as usize;
        if slot >= self.entities.len() {
            return Err(ECSError::Internal("remove_entity: row out of bounds"));
        }

        for component_id in self.signature.iter_component_ids() {
            let column = self.columns[(component_id - 1) as usize]
                .as_mut()
                .ok_or(ECSError::Internal("remove_entity: missing column for signature bit"))?;
            column.swap_remove_dyn(row).map_err(|source_error| MoveError::SwapRemoveError {
                component_id,
                source_error,
            })?;
        }

        let removed = self.entities.swap_remove(slot);
        self.rows
            .remove(&removed)
            .ok_or(ECSError::Internal("remove_entity: entity missing from index map"))?;

        if slot < self.entities.len() {
            let displaced = self.entities[slot];
            self.rows.insert(displaced, slot);
        }

        self.debug_assert_consistent();
        Ok(())
    }

    /// Moves an entity's component row from this archetype to another.
    ///
    /// ## Purpose
    /// Transfers an entity between archetypes when its component signature
    /// changes, constructing a row in the destination that exactly matches
    /// the destination signature. This is the core operation behind adding
    /// and removing components.
    ///
    /// ## Behavior
    ///
    /// The move is performed in four ordered phases:
    ///
    /// 1. **Signature analysis** — computes the component sets shared between
    ///    source and destination, present only in the source (to be
    ///    dropped), and present only in the destination (to be supplied by
    ///    `added_components`).
    /// 2. **Identity append** — the entity is appended to the destination's
    ///    entity list, fixing the destination row.
    /// 3. **Data population** — shared values are *relocated* with
    ///    `push_from_dyn` (each relocation also swap-removes the source
    ///    row), and destination-only values are inserted from
    ///    `added_components`. Every column must land on the established
    ///    destination row.
    /// 4. **Source cleanup** — source-only values are swap-removed, then the
    ///    source entity list is swap-removed and both index maps repaired.
    ///
    /// ## Parameters
    /// - `destination`: target archetype; must be a different instance.
    /// - `entity`: the entity being moved.
    /// - `source_row`: the entity's row in this archetype.
    /// - `added_components`: values for components required by the
    ///   destination but absent from the source.
    ///
    /// ## Returns
    /// The entity's row in the destination archetype.
    ///
    /// ## Errors
    /// - `InconsistentStorage` if `added_components` does not supply exactly
    ///   the destination-only kinds, or a required column is missing.
    /// - `PushFromFailed` / `PushFailed` / `SwapRemoveError` on column-level
    ///   failures.
    /// - `RowMisalignment` if columns disagree on row placement.
    /// - `MetadataFailure` if index maps become inconsistent.
    ///
    /// ## Invariants
    /// - All columns remain row-aligned in both archetypes.
    /// - Values of all shared component kinds transfer by relocation, never
    ///   reconstruction.
    pub fn move_row_to(
        &mut self,
        destination: &mut Archetype,
        entity: Entity,
        source_row: RowID,
        mut added_components: Vec<(ComponentID, Box<dyn Any>)>,
    ) -> Result<RowID, MoveError> {
        let mut shared_words = [0u64; SIGNATURE_SIZE];
        let mut source_only_words = [0u64; SIGNATURE_SIZE];
        let mut destination_only_words = [0u64; SIGNATURE_SIZE];

        for i in 0..SIGNATURE_SIZE {
            let a = self.signature.components[i];
            let b = destination.signature.components[i];

            shared_words[i] = a & b;
            source_only_words[i] = a & !b;
            destination_only_words[i] = b & !a;
        }

        if (source_row as usize) >= self.entities.len() {
            return Err(MoveError::MetadataFailure);
        }

        let destination_row = destination.add_entity(entity);

        for component_id in iter_bits_from_words(&shared_words) {
            let source_column = self.columns[(component_id - 1) as usize]
                .as_mut()
                .ok_or(MoveError::InconsistentStorage)?;
            let destination_column = destination.columns[(component_id - 1) as usize]
                .as_mut()
                .ok_or(MoveError::InconsistentStorage)?;

            let got = destination_column
                .push_from_dyn(source_column.as_mut(), source_row)
                .map_err(|source_error| MoveError::PushFromFailed { component_id, source_error })?;

            if got != destination_row {
                return Err(MoveError::RowMisalignment {
                    expected: destination_row,
                    got,
                    component_id,
                });
            }
        }

        for component_id in iter_bits_from_words(&destination_only_words) {
            let position = added_components
                .iter()
                .position(|(id, _)| *id == component_id)
                .ok_or(MoveError::InconsistentStorage)?;
            let (_, value) = added_components.swap_remove(position);

            let destination_column = destination.columns[(component_id - 1) as usize]
                .as_mut()
                .ok_or(MoveError::InconsistentStorage)?;

            let got = destination_column
                .push_any(value)
                .map_err(|source_error| MoveError::PushFailed { component_id, source_error })?;

            if got != destination_row {
                return Err(MoveError::RowMisalignment {
                    expected: destination_row,
                    got,
                    component_id,
                });
            }
        }

        if !added_components.is_empty() {
            // Leftover values mean the caller supplied a kind the
            // destination does not store.
            return Err(MoveError::InconsistentStorage);
        }

        for component_id in iter_bits_from_words(&source_only_words) {
            let source_column = self.columns[(component_id - 1) as usize]
                .as_mut()
                .ok_or(MoveError::InconsistentStorage)?;
            source_column
                .swap_remove_dyn(source_row)
                .map_err(|source_error| MoveError::SwapRemoveError { component_id, source_error })?;
        }

        let slot = source_row as usize;
        let removed = self.entities.swap_remove(slot);
        if removed != entity {
            return Err(MoveError::MetadataFailure);
        }
        if self.rows.remove(&removed).is_none() {
            return Err(MoveError::MetadataFailure);
        }
        if slot < self.entities.len() {
            let displaced = self.entities[slot];
            self.rows.insert(displaced, slot);
        }

        self.debug_assert_consistent();
        destination.debug_assert_consistent();

        Ok(destination_row)
    }

    /// Returns the entity list together with disjoint mutable access to up
    /// to `N` columns.
    ///
    /// ## Purpose
    /// Lets query iteration borrow several columns mutably at once while
    /// still reading the entity list.
    ///
    /// ## Panics
    /// Debug-asserts that the requested component IDs are pairwise distinct;
    /// distinct IDs address distinct columns, which is what makes the
    /// simultaneous mutable borrows sound.
    pub fn entities_and_columns_mut<const N: usize>(
        &mut self,
        component_ids: [ComponentID; N],
    ) -> (&[Entity], [Option<&mut Box<dyn TypeErasedAttribute>>; N]) {
        let entities = &self.entities;
        let columns = &mut self.columns;
        let base = columns.as_mut_ptr();

        let mut out: [Option<&mut Box<dyn TypeErasedAttribute>>; N] =
            std::array::from_fn(|_| None);

        for (k, &component_id) in component_ids.iter().enumerate() {
            debug_assert!(
                component_ids[..k].iter().all(|&other| other != component_id),
                "duplicate component id in disjoint column borrow"
            );
            if component_id == 0 || (component_id as usize) > COMPONENT_CAP {
                continue;
            }
            let index = (component_id - 1) as usize;
            // SAFETY: indices derive from pairwise-distinct component IDs,
            // so every `&mut` handed out aliases a distinct vector slot.
            let slot = unsafe { &mut *base.add(index) };
            out[k] = slot.as_mut();
        }

        (entities, out)
    }

    /// Debug-build check that every column's length matches the entity list.
    ///
    /// Violation means the two-phase add/populate contract was broken and is
    /// treated as fatal.
    #[inline]
    pub fn debug_assert_consistent(&self) {
        if cfg!(debug_assertions) {
            for component_id in self.signature.iter_component_ids() {
                let length = self.columns[(component_id - 1) as usize]
                    .as_ref()
                    .map(|column| column.length());
                debug_assert_eq!(
                    length,
                    Some(self.entities.len()),
                    "column {} out of lockstep with entity list",
                    component_id
                );
            }
            debug_assert_eq!(self.rows.len(), self.entities.len());
        }
    }
}
