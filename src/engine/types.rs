//! Core ECS types, identifiers, and bit-level layouts.
//!
//! This module defines the **fundamental types, identifiers, and signatures**
//! shared across the storage engine: entity handles, component identifiers,
//! archetype identifiers, and the fixed-width [`Signature`] bitset that keys
//! the archetype registry.
//!
//! ## Design
//!
//! The engine is built around:
//!
//! - **Dense storage** — component values live in contiguous per-type columns,
//! - **Bitset-based signatures** — archetype identity is a fixed bit pattern,
//! - **Stable numeric identifiers** — all IDs are small, copyable integers.
//!
//! ## Entity representation
//!
//! Entities are encoded as a packed 64-bit integer:
//!
//! ```text
//! | generation (32) | index (32) |
//! ```
//!
//! - **Index** identifies the allocator slot.
//! - **Generation** detects stale handles after the slot is recycled.
//!
//! Generations start at 1, so a live handle is never equal to the reserved
//! null value 0. Bit widths are compile-time constants validated with static
//! assertions.
//!
//! ## Components and archetypes
//!
//! Component kinds are identified by compact [`ComponentID`] values assigned
//! by the registry in first-use order starting at 1; the value 0 is reserved
//! for "unregistered". Archetypes are described by [`Signature`] bitsets, a
//! fixed-size array of `u64` words that supports fast equality, subset tests,
//! and iteration over set bits. The word array is the canonical
//! representation used for archetype lookup.

use std::fmt;

/// Bit-width type used for compile-time layout calculations.
pub type Bits = u8;

/// Globally unique entity identifier encoded as a packed 64-bit value.
pub type EntityID = u64;
/// Index into the entity allocator's slot table.
pub type IndexID = u32;
/// Generation counter used to detect stale entity handles.
pub type GenerationID = u32;

/// Total number of bits in an [`EntityID`].
pub const ENTITY_BITS: Bits = 64;
/// Number of bits reserved for the generation counter.
pub const GENERATION_BITS: Bits = 32;
/// Number of bits reserved for the slot index.
pub const INDEX_BITS: Bits = ENTITY_BITS - GENERATION_BITS;

const _: [(); 1] = [(); (GENERATION_BITS < ENTITY_BITS) as usize];
const _: [(); 1] = [(); (INDEX_BITS > 0) as usize];

const fn mask(bits: Bits) -> EntityID {
    if bits == 0 { 0 } else { ((1 as EntityID) << bits) - 1 }
}

/// Mask selecting the index portion of an [`EntityID`].
pub const INDEX_MASK: EntityID = mask(INDEX_BITS);

/// Unique identifier for an archetype.
///
/// Resolved through the world's signature map; stable for the lifetime of the
/// world and used only as a lookup key.
pub type ArchetypeID = u16;
/// Row index within an archetype's parallel arrays.
pub type RowID = u32;

/// Unique identifier for a component type.
///
/// Assigned per registry in first-use order starting at 1. The value 0 is
/// reserved for "unregistered" and never handed out.
pub type ComponentID = u16;

/// Maximum number of distinct component types a registry can hold.
pub const COMPONENT_CAP: usize = 256;
/// Number of `u64` words required to represent a full component signature.
pub const SIGNATURE_SIZE: usize = (COMPONENT_CAP + 63) / 64;

#[inline]
const fn bit_position(component_id: ComponentID) -> (usize, usize) {
    // Component IDs are 1-based; bit (id - 1) carries the kind.
    let bit = (component_id as usize) - 1;
    (bit / 64, bit % 64)
}

/// Bitset representing a set of component kinds.
///
/// ## Purpose
/// A `Signature` records which component kinds an archetype stores (or a
/// query requires). Two signatures with identical bit patterns denote the
/// same archetype.
///
/// ## Invariants
/// - Fixed width: always `SIGNATURE_SIZE` words, cheaply copied and hashed.
/// - Bit `(id - 1)` is set iff component kind `id` is present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Packed component bitset.
    pub components: [u64; SIGNATURE_SIZE],
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            components: [0u64; SIGNATURE_SIZE],
        }
    }
}

impl Signature {
    /// Sets the bit corresponding to `component_id`.
    #[inline]
    pub fn set(&mut self, component_id: ComponentID) {
        debug_assert!(component_id >= 1 && (component_id as usize) <= COMPONENT_CAP);
        let (word, bit) = bit_position(component_id);
        self.components[word] |= 1u64 << bit;
    }

    /// Clears the bit corresponding to `component_id`.
    #[inline]
    pub fn clear(&mut self, component_id: ComponentID) {
        debug_assert!(component_id >= 1 && (component_id as usize) <= COMPONENT_CAP);
        let (word, bit) = bit_position(component_id);
        self.components[word] &= !(1u64 << bit);
    }

    /// Returns `true` if `component_id` is present in this signature.
    #[inline]
    pub fn has(&self, component_id: ComponentID) -> bool {
        if component_id == 0 || (component_id as usize) > COMPONENT_CAP {
            return false;
        }
        let (word, bit) = bit_position(component_id);
        (self.components[word] >> bit) & 1 == 1
    }

    /// Returns `true` if all components in `required` are present.
    #[inline]
    pub fn contains_all(&self, required: &Signature) -> bool {
        self.components
            .iter()
            .zip(required.components.iter())
            .all(|(have, need)| (have & need) == *need)
    }

    /// Returns `true` if no component bit is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.iter().all(|&word| word == 0)
    }

    /// Returns the number of component kinds present.
    #[inline]
    pub fn count(&self) -> usize {
        self.components.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Iterates over all component IDs set in this signature, ascending.
    pub fn iter_component_ids(&self) -> impl Iterator<Item = ComponentID> + '_ {
        iter_bits_from_words(&self.components)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, component_id) in self.iter_component_ids().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{component_id}")?;
        }
        write!(f, "}}")
    }
}

/// Builds a component signature from a list of component IDs.
pub fn build_signature(component_ids: &[ComponentID]) -> Signature {
    let mut signature = Signature::default();
    for &component_id in component_ids {
        signature.set(component_id);
    }
    signature
}

/// Iterates over component IDs encoded in a raw signature word array.
#[inline]
pub fn iter_bits_from_words(
    words: &[u64; SIGNATURE_SIZE],
) -> impl Iterator<Item = ComponentID> + '_ {
    words.iter().enumerate().flat_map(|(word_index, &word)| {
        let base = word_index * 64;
        let mut bits = word;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let tz = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some((base + tz + 1) as ComponentID)
        })
    })
}
