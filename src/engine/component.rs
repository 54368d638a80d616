//! Component type registry.
//!
//! This module provides the registry that assigns stable [`ComponentID`]
//! values to Rust component types and exposes type-erased storage factories
//! for archetype column allocation.
//!
//! ## Purpose
//! The registry decouples component type information (`TypeId`, name, size,
//! alignment) from runtime storage, enabling archetypes to store
//! heterogeneous component columns behind `TypeErasedAttribute`.
//!
//! ## Design
//! - The registry is an explicitly constructed, caller-owned value (owned by
//!   the world), not a process-wide singleton; two worlds never share
//!   component identity state.
//! - Components are registered on first use and assigned a compact
//!   `ComponentID` in `[1, COMPONENT_CAP]`; 0 is reserved for
//!   "unregistered".
//! - A per-component factory function is stored for constructing empty
//!   column storage.
//!
//! ## Invariants
//! - `ComponentID` values are unique and stable for the lifetime of the
//!   registry, assigned in first-use order.
//! - A registered component always has a corresponding storage factory.
//! - Registration is append-only; there is no removal.

use std::{
    any::{TypeId, type_name},
    mem::{size_of, align_of},
    collections::HashMap,
};

use crate::engine::storage::{Attribute, TypeErasedAttribute};
use crate::engine::types::{ComponentID, COMPONENT_CAP};
use crate::engine::error::{ECSError, ECSResult};

/// Factory function for constructing an empty type-erased component column.
type FactoryFn = fn() -> Box<dyn TypeErasedAttribute>;

fn new_attribute_storage<T: 'static + Send + Sync>() -> Box<dyn TypeErasedAttribute> {
    Box::<Attribute<T>>::default()
}

/// Mapping between Rust component types and compact `ComponentID` values.
///
/// ## Purpose
/// Assigns stable runtime identifiers (`ComponentID`) to component types
/// (`TypeId`) and stores component metadata (`ComponentDesc`) used for
/// diagnostics and column allocation.
///
/// ## Design
/// - `by_type` maps `TypeId -> ComponentID`.
/// - `by_id` stores `ComponentDesc` indexed by `ComponentID - 1`.
/// - `factories` stores the storage factory at the same index.
/// - `next_id` assigns new IDs sequentially until `COMPONENT_CAP`.
///
/// ## Invariants
/// - Every entry in `by_type` has a matching `by_id` descriptor and factory.
/// - IDs are always in `[1, COMPONENT_CAP]`.
pub struct ComponentRegistry {
    next_id: ComponentID,
    by_type: HashMap<TypeId, ComponentID>,
    by_id: Vec<ComponentDesc>,
    factories: Vec<FactoryFn>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            by_type: HashMap::new(),
            by_id: Vec::new(),
            factories: Vec::new(),
        }
    }

    /// Registers component type `T` and returns its assigned `ComponentID`.
    ///
    /// ## Behavior
    /// - If `T` is already registered, returns the existing ID.
    /// - Otherwise allocates the next ID, stores a `ComponentDesc`, and
    ///   installs the `TypeErasedAttribute` factory for this type.
    ///
    /// ## Panics
    /// Panics if `COMPONENT_CAP` distinct types have already been registered.
    pub fn register<T: 'static + Send + Sync>(&mut self) -> ComponentID {
        let type_id = TypeId::of::<T>();
        if let Some(&existing) = self.by_type.get(&type_id) {
            return existing;
        }

        let component_id = self.next_id;
        assert!(
            (component_id as usize) <= COMPONENT_CAP,
            "exceeded configured component capacity"
        );
        self.next_id = component_id.wrapping_add(1);

        self.by_type.insert(type_id, component_id);
        self.by_id.push(ComponentDesc::of::<T>().with_id(component_id));
        self.factories.push(new_attribute_storage::<T>);

        log::debug!(
            "registered component {} as id {}",
            type_name::<T>(),
            component_id
        );

        component_id
    }

    /// Returns the `ComponentID` for `T`, if registered.
    #[inline]
    pub fn id_of<T: 'static>(&self) -> Option<ComponentID> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the `ComponentID` for `T`, or an error if it was never
    /// registered with this registry.
    pub fn require_id_of<T: 'static>(&self) -> ECSResult<ComponentID> {
        self.id_of::<T>()
            .ok_or(ECSError::UnregisteredComponent { name: type_name::<T>() })
    }

    /// Returns the `ComponentID` associated with a runtime `TypeId`, if
    /// registered.
    pub fn id_of_type_id(&self, type_id: TypeId) -> Option<ComponentID> {
        self.by_type.get(&type_id).copied()
    }

    /// Returns the component descriptor for a `ComponentID`, if registered.
    pub fn description(&self, component_id: ComponentID) -> Option<&ComponentDesc> {
        if component_id == 0 {
            return None;
        }
        self.by_id.get((component_id - 1) as usize)
    }

    /// Returns the display name for a `ComponentID`, if registered.
    pub fn name(&self, component_id: ComponentID) -> Option<&'static str> {
        self.description(component_id).map(|desc| desc.name)
    }

    /// Returns the number of distinct component types registered so far.
    #[inline]
    pub fn count(&self) -> usize {
        self.by_id.len()
    }

    /// Creates an empty type-erased storage column for `component_id`.
    ///
    /// ## Purpose
    /// Used by archetype construction to allocate an empty column for each
    /// bit of a signature.
    ///
    /// ## Errors
    /// `Internal` if no factory was registered for this component ID; the
    /// world only builds signatures out of registered IDs, so this indicates
    /// an engine bug.
    pub fn make_empty_column(&self, component_id: ComponentID) -> ECSResult<Box<dyn TypeErasedAttribute>> {
        if component_id == 0 {
            return Err(ECSError::Internal("component id 0 has no storage factory"));
        }
        let factory = self
            .factories
            .get((component_id - 1) as usize)
            .ok_or(ECSError::Internal("no storage factory for component id"))?;
        Ok(factory())
    }
}

/// Describes a registered component type.
///
/// ## Purpose
/// Provides metadata about a component type for debugging, validation, and
/// tooling.
///
/// ## Notes
/// `ComponentDesc` is `Copy` and safe to clone freely for reporting.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentDesc {
    /// Runtime identifier assigned to this component type.
    pub component_id: ComponentID,

    /// Rust type name for diagnostics.
    pub name: &'static str,

    /// Runtime `TypeId` of the component.
    pub type_id: TypeId,

    /// Size of the component type in bytes.
    pub size: usize,

    /// Alignment of the component type in bytes.
    pub align: usize,
}

impl ComponentDesc {
    /// Constructs a descriptor for type `T` using its `TypeId`, name, size,
    /// and alignment.
    ///
    /// ## Notes
    /// The returned descriptor uses `component_id = 0` and should be
    /// finalized via `with_id`.
    #[inline]
    pub fn of<T: 'static>() -> Self {
        Self {
            component_id: 0,
            name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            size: size_of::<T>(),
            align: align_of::<T>(),
        }
    }

    /// Returns `true` if this descriptor refers to type `T`.
    #[inline]
    pub fn matches_type<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Returns a copy of this descriptor with `component_id` set.
    #[inline]
    pub fn with_id(mut self, component_id: ComponentID) -> Self {
        self.component_id = component_id;
        self
    }
}

impl std::fmt::Display for ComponentDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ComponentDesc {{ id: {}, name: {}, size: {}, align: {} }}",
            self.component_id, self.name, self.size, self.align
        )
    }
}
