//! Dense attribute storage and type-erased access for ECS column data.
//!
//! This module implements the column container [`Attribute<T>`], which stores
//! one component kind's values densely in a single contiguous array, and the
//! [`TypeErasedAttribute`] trait that lets archetypes manage heterogeneous
//! columns behind `Box<dyn TypeErasedAttribute>`.
//!
//! # Storage model
//!
//! An attribute stores its values as a plain `Vec<T>`. Rows are addressed by
//! a single [`RowID`] in `0..length`; row `i` of every column in an archetype
//! (and slot `i` of its entity list) refer to the same logical entity. The
//! archetype, not the column, is responsible for keeping that correspondence.
//!
//! # Core operations
//!
//! - **Append**: `push` writes at the end; amortized O(1).
//! - **Remove**: `swap_remove` deletes a row in O(1) by moving the last value
//!   into the removed slot (unless the removed row is already last). This is
//!   the only removal path; it changes which entity occupies the row.
//! - **Transfer**: `push_from_dyn` relocates a value from another column of
//!   the same element type into this one, swap-removing it from the source.
//!   This is the primitive used during archetype migration so existing
//!   component values move instead of being reconstructed.
//!
//! These operations preserve dense packing but do **not** preserve element
//! order.
//!
//! # Type erasure
//!
//! [`TypeErasedAttribute`] provides a dynamically-typed interface for
//! interacting with columns without knowing `T` at compile time. Typed access
//! goes through `as_any`/`as_any_mut` downcasting (see
//! [`downcast_attribute`]); mutation mirrors the typed operations
//! (`push_any`, `swap_remove_dyn`, `push_from_dyn`) and fails with an
//! [`AttributeError`] when types or rows do not line up.
//!
//! Iteration-heavy callers are expected to downcast **once per column** and
//! then walk the typed slice directly; no virtual dispatch happens per
//! element.

use std::any::{Any, TypeId, type_name};

use crate::engine::types::RowID;
use crate::engine::error::{AttributeError, RowOutOfBoundsError, TypeMismatchError};

/// A type-erased interface for dense attribute storage.
///
/// ## Purpose
/// Allows archetypes to own heterogeneous component columns behind trait
/// objects and to move rows between archetypes without static knowledge of
/// the element type.
///
/// ## Invariants
/// - `length()` returns the number of stored values.
/// - All rows below `length()` are valid, initialized values.
/// - `push_any` and `push_from_dyn` only succeed when the dynamic element
///   type matches this column's element type.
///
/// ## Downcasting
/// Implementers return `self` cast to `&dyn Any` / `&mut dyn Any` so callers
/// can attempt a `downcast::<Attribute<T>>()` for typed slice access.
pub trait TypeErasedAttribute: Any + Send + Sync {
    /// Returns the number of values stored in this column.
    fn length(&self) -> usize;

    /// Returns an immutable type-erased reference for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable type-erased reference for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns the `TypeId` of the element type stored by this column.
    fn element_type_id(&self) -> TypeId;

    /// Returns the human-readable name of the element type stored.
    fn element_type_name(&self) -> &'static str;

    /// Removes the value at `row` using swap-remove, dropping it.
    ///
    /// ## Behavior
    /// The last value is moved into `row` (unless `row` is last) and the
    /// column shrinks by one.
    fn swap_remove_dyn(&mut self, row: RowID) -> Result<(), AttributeError>;

    /// Relocates the value at `source_row` of `source` to the end of `self`,
    /// swap-removing it from `source`.
    ///
    /// ## Returns
    /// The row the value now occupies in `self`.
    ///
    /// ## Errors
    /// - `TypeMismatch` if `source` stores a different element type.
    /// - `Row` if `source_row` is out of bounds.
    fn push_from_dyn(
        &mut self,
        source: &mut dyn TypeErasedAttribute,
        source_row: RowID,
    ) -> Result<RowID, AttributeError>;

    /// Appends a dynamically-typed value to the end of the column.
    ///
    /// ## Errors
    /// `TypeMismatch` if the boxed value is not of the element type.
    fn push_any(&mut self, value: Box<dyn Any>) -> Result<RowID, AttributeError>;

    /// Overwrites the value at `row` with a dynamically-typed value,
    /// dropping the previous value.
    ///
    /// ## Errors
    /// - `TypeMismatch` if the boxed value is not of the element type.
    /// - `Row` if `row` is out of bounds.
    fn write_any(&mut self, row: RowID, value: Box<dyn Any>) -> Result<(), AttributeError>;
}

/// Dense storage for a single component kind.
///
/// ## Purpose
/// One `Attribute<T>` is owned per component kind per archetype; row `i`
/// holds the value belonging to the entity at slot `i` of the archetype's
/// entity list.
pub struct Attribute<T> {
    values: Vec<T>,
}

impl<T: 'static + Send + Sync> Attribute<T> {
    /// Creates an empty column.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Creates an empty column with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { values: Vec::with_capacity(capacity) }
    }

    /// Appends a value and returns the row it occupies.
    #[inline]
    pub fn push(&mut self, value: T) -> RowID {
        let row = self.values.len() as RowID;
        self.values.push(value);
        row
    }

    /// Returns a reference to the value at `row`, if in bounds.
    #[inline]
    pub fn get(&self, row: RowID) -> Option<&T> {
        self.values.get(row as usize)
    }

    /// Returns a mutable reference to the value at `row`, if in bounds.
    #[inline]
    pub fn get_mut(&mut self, row: RowID) -> Option<&mut T> {
        self.values.get_mut(row as usize)
    }

    /// Returns the full column as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Returns the full column as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Removes and returns the value at `row` using swap-remove.
    ///
    /// ## Behavior
    /// The last value is moved into `row` (unless `row` is last) and the
    /// column shrinks by one. The caller is responsible for repairing any
    /// row bookkeeping for the displaced value.
    pub fn swap_remove(&mut self, row: RowID) -> Result<T, AttributeError> {
        if (row as usize) >= self.values.len() {
            return Err(RowOutOfBoundsError { row, length: self.values.len() }.into());
        }
        Ok(self.values.swap_remove(row as usize))
    }

    /// Returns the number of values stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the column holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: 'static + Send + Sync> Default for Attribute<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static + Send + Sync> TypeErasedAttribute for Attribute<T> {
    fn length(&self) -> usize {
        self.values.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn element_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn element_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn swap_remove_dyn(&mut self, row: RowID) -> Result<(), AttributeError> {
        self.swap_remove(row).map(drop)
    }

    fn push_from_dyn(
        &mut self,
        source: &mut dyn TypeErasedAttribute,
        source_row: RowID,
    ) -> Result<RowID, AttributeError> {
        let source_type = source.element_type_id();
        let source = source
            .as_any_mut()
            .downcast_mut::<Attribute<T>>()
            .ok_or(TypeMismatchError {
                expected: TypeId::of::<T>(),
                actual: source_type,
            })?;

        let value = source.swap_remove(source_row)?;
        Ok(self.push(value))
    }

    fn push_any(&mut self, value: Box<dyn Any>) -> Result<RowID, AttributeError> {
        let value = value.downcast::<T>().map_err(|value| TypeMismatchError {
            expected: TypeId::of::<T>(),
            actual: value.as_ref().type_id(),
        })?;
        Ok(self.push(*value))
    }

    fn write_any(&mut self, row: RowID, value: Box<dyn Any>) -> Result<(), AttributeError> {
        let value = value.downcast::<T>().map_err(|value| TypeMismatchError {
            expected: TypeId::of::<T>(),
            actual: value.as_ref().type_id(),
        })?;
        let length = self.values.len();
        let slot = self
            .get_mut(row)
            .ok_or(RowOutOfBoundsError { row, length })?;
        *slot = *value;
        Ok(())
    }
}

/// Downcasts a type-erased column to its concrete typed form.
///
/// Returns `None` if the column stores a different element type.
#[inline]
pub fn downcast_attribute<T: 'static + Send + Sync>(
    column: &dyn TypeErasedAttribute,
) -> Option<&Attribute<T>> {
    column.as_any().downcast_ref::<Attribute<T>>()
}

/// Mutable variant of [`downcast_attribute`].
#[inline]
pub fn downcast_attribute_mut<T: 'static + Send + Sync>(
    column: &mut dyn TypeErasedAttribute,
) -> Option<&mut Attribute<T>> {
    column.as_any_mut().downcast_mut::<Attribute<T>>()
}
