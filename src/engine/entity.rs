//! Entity handles and the entity allocator.
//!
//! An [`Entity`] is an opaque 64-bit handle packing a slot index and a
//! generation counter. The [`Entities`] allocator owns the slot table: it
//! hands out handles, recycles slot indices through a free list, bumps the
//! generation on destruction so stale handles are detectable, and records
//! which archetype currently holds each live entity.
//!
//! ## Identity rules
//! - `Entity::NULL` (raw value 0) is reserved and never allocated;
//!   generations start at 1, so every live handle is non-zero.
//! - A raw handle value is never reassigned to a different logical entity:
//!   recycling a slot changes the generation half of the handle.
//! - The allocator stores the authoritative entity→archetype mapping; the
//!   row inside the archetype is resolved through the archetype's own index
//!   map so it stays correct across swap-removal.

use std::collections::HashMap;
use std::hash::BuildHasherDefault;

use nohash_hasher::NoHashHasher;

use crate::engine::types::{
    EntityID, IndexID, GenerationID, ArchetypeID,
    INDEX_BITS, INDEX_MASK,
};

/// Hasher for maps keyed by [`Entity`]; handles are already uniform.
pub type EntityHasher = BuildHasherDefault<NoHashHasher<EntityID>>;

/// Map from entity handles to archetype rows, used inside archetypes.
pub type EntityRowMap = HashMap<Entity, usize, EntityHasher>;

/// Opaque handle to an entity.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Entity(pub EntityID);

impl nohash_hasher::IsEnabled for Entity {}

#[inline]
const fn make_id(index: IndexID, generation: GenerationID) -> EntityID {
    ((generation as EntityID) << INDEX_BITS) | (index as EntityID)
}

#[inline]
fn make_entity(index: IndexID, generation: GenerationID) -> Entity {
    debug_assert!((index as EntityID) <= INDEX_MASK);
    debug_assert!(generation != 0);
    Entity(make_id(index, generation))
}

#[inline]
const fn split_entity(entity: Entity) -> (IndexID, GenerationID) {
    let id = entity.0;
    let index = (id & INDEX_MASK) as IndexID;
    let generation = (id >> INDEX_BITS) as GenerationID;
    (index, generation)
}

impl Entity {
    /// The reserved null handle; never allocated, never valid.
    pub const NULL: Entity = Entity(0);

    /// Returns the slot index half of the handle.
    #[inline]
    pub fn index(self) -> IndexID {
        (self.0 & INDEX_MASK) as IndexID
    }

    /// Returns the generation half of the handle.
    #[inline]
    pub fn generation(self) -> GenerationID {
        (self.0 >> INDEX_BITS) as GenerationID
    }

    /// Returns `true` if this is the reserved null handle.
    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

/// Slot-table allocator for entity handles.
///
/// ## Purpose
/// Owns entity identity: allocation, recycling, staleness detection, and the
/// entity→archetype mapping.
///
/// ## Invariants
/// - `generations`, `alive`, and `locations` always have equal length.
/// - `free_store` holds exactly the dead slot indices.
/// - `generations[i] >= 1` for every slot ever allocated.
#[derive(Default)]
pub struct Entities {
    generations: Vec<GenerationID>,
    alive: Vec<bool>,
    locations: Vec<ArchetypeID>,
    free_store: Vec<IndexID>,
    live: usize,
}

impl Entities {
    /// Creates an empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a handle for a new entity living in `location`.
    ///
    /// ## Behavior
    /// Reuses a dead slot when one is available (with a fresh generation),
    /// otherwise grows the slot table. Never fails; the table is bounded only
    /// by `INDEX_MASK`, which is an unchecked edge of the design.
    pub fn spawn(&mut self, location: ArchetypeID) -> Entity {
        let index = match self.free_store.pop() {
            Some(index) => index,
            None => {
                let index = self.generations.len() as IndexID;
                self.generations.push(1);
                self.alive.push(false);
                self.locations.push(0);
                index
            }
        };

        let slot = index as usize;
        self.alive[slot] = true;
        self.locations[slot] = location;
        self.live += 1;

        make_entity(index, self.generations[slot])
    }

    /// Marks `entity` dead and recycles its slot.
    ///
    /// ## Behavior
    /// Bumps the slot generation so the handle (and any copy of it) becomes
    /// stale. Returns `false` without side effects if the handle was already
    /// dead or stale.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        let (index, generation) = split_entity(entity);
        let slot = index as usize;
        match self.generations.get_mut(slot) {
            Some(live) if *live == generation && self.alive[slot] => {
                *live = live.wrapping_add(1);
                if *live == 0 {
                    // Generation 0 is reserved so handles stay non-null.
                    *live = 1;
                }
                self.alive[slot] = false;
                self.locations[slot] = 0;
                self.free_store.push(index);
                self.live -= 1;
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if `entity` refers to a live slot of the matching
    /// generation.
    pub fn is_alive(&self, entity: Entity) -> bool {
        if entity.is_null() {
            return false;
        }
        let (index, generation) = split_entity(entity);
        let slot = index as usize;
        slot < self.generations.len()
            && self.alive[slot]
            && self.generations[slot] == generation
    }

    /// Returns the archetype currently holding `entity`, if it is alive.
    pub fn location(&self, entity: Entity) -> Option<ArchetypeID> {
        if self.is_alive(entity) {
            Some(self.locations[entity.index() as usize])
        } else {
            None
        }
    }

    /// Records a new archetype location for a live entity.
    pub fn set_location(&mut self, entity: Entity, location: ArchetypeID) {
        debug_assert!(
            self.is_alive(entity),
            "set_location called on a dead or stale entity: {:?}",
            entity
        );
        let slot = entity.index() as usize;
        if slot < self.locations.len() {
            self.locations[slot] = location;
        }
    }

    /// Returns the number of live entities.
    #[inline]
    pub fn live_count(&self) -> usize {
        self.live
    }
}
