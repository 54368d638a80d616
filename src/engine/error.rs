//! Error types for entity storage, migration, and queries.
//!
//! This module declares focused, composable error types used across the
//! entity–component storage engine. Each error carries enough context to make
//! failures actionable while remaining small and cheap to pass around or
//! convert into the aggregate [`ECSError`].
//!
//! ## Goals
//! * **Specificity:** Each error type models a single failure mode (e.g.
//!   stale entity handles, column type mismatches, misaligned rows).
//! * **Ergonomics:** All errors implement [`std::error::Error`] and
//!   [`fmt::Display`], and provide `From<T>` conversions into [`ECSError`].
//! * **Actionability:** Structured fields (offending rows, expected vs.
//!   actual types, component IDs) make logs useful without reproducing the
//!   issue.
//!
//! ## Typical flow
//! Low-level column operations return [`AttributeError`]; archetype migration
//! wraps them into [`MoveError`]; world-level operations use `?` to bubble
//! both into [`ECSError`], which callers can match on or log.
//!
//! ## Display vs. Debug
//! * [`fmt::Display`] is optimized for operator logs (short, imperative
//!   phrasing).
//! * [`fmt::Debug`] (derived) retains full structure for diagnostics.

use std::fmt;
use std::any::TypeId;

use crate::engine::types::{ComponentID, RowID};

/// Convenient alias for fallible engine operations.
pub type ECSResult<T> = Result<T, ECSError>;

/// Returned when an `Entity` handle is no longer valid—typically because it
/// was destroyed or its generation no longer matches live storage.
///
/// Use this to prevent use-after-free style logic errors at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleEntityError;

impl fmt::Display for StaleEntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("stale or dead entity reference")
    }
}

impl std::error::Error for StaleEntityError {}

/// Returned when a row index refers to a position outside valid component
/// storage bounds.
///
/// ## Context
/// Used by attribute and archetype storage to report invalid addressing,
/// typically caused by stale metadata or incorrect index calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowOutOfBoundsError {
    /// Row index that was addressed.
    pub row: RowID,

    /// Number of valid rows in the storage.
    pub length: usize,
}

impl fmt::Display for RowOutOfBoundsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} out of bounds (length {})", self.row, self.length)
    }
}

impl std::error::Error for RowOutOfBoundsError {}

/// Returned when a component write targets a storage column whose element
/// type does not match the provided value's type.
///
/// This is a logic/configuration error surfaced by storage when component
/// type IDs diverge (e.g. writing `Velocity` into a `Position` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMismatchError {
    /// Destination column's declared element type.
    pub expected: TypeId,

    /// Provided value's dynamic type.
    pub actual: TypeId,
}

impl fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type mismatch: expected {:?}, actual {:?}", self.expected, self.actual)
    }
}

impl std::error::Error for TypeMismatchError {}

/// Aggregate error for attribute (component column) operations.
///
/// This wraps precise, low-level failures that can occur when pushing,
/// removing, or relocating component data. Conversions (`From<T>`) are
/// implemented for the underlying errors so callers can write `?` and still
/// return a single, expressive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeError {
    /// A row index addressed storage outside valid bounds.
    Row(RowOutOfBoundsError),

    /// The dynamic type of a value did not match the column element type.
    TypeMismatch(TypeMismatchError),
}

impl fmt::Display for AttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeError::Row(e) => write!(f, "{e}"),
            AttributeError::TypeMismatch(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AttributeError {}

impl From<RowOutOfBoundsError> for AttributeError {
    fn from(e: RowOutOfBoundsError) -> Self { AttributeError::Row(e) }
}

impl From<TypeMismatchError> for AttributeError {
    fn from(e: TypeMismatchError) -> Self { AttributeError::TypeMismatch(e) }
}

/// Errors that can occur while moving an entity between archetypes.
///
/// ## Context
/// `MoveError` is used by archetype migration logic when transferring
/// component rows between archetypes during component add/remove operations.
///
/// ## Notes
/// These errors generally indicate internal inconsistencies or violated
/// invariants rather than recoverable user-facing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// Component storage layouts were inconsistent between archetypes.
    InconsistentStorage,

    /// Failed to relocate component data from the source archetype.
    PushFromFailed {
        /// Component being transferred.
        component_id: ComponentID,

        /// Underlying attribute error.
        source_error: AttributeError,
    },

    /// Component columns disagreed on the destination row.
    RowMisalignment {
        /// Expected destination row.
        expected: RowID,

        /// Actual row produced by the column.
        got: RowID,

        /// Component whose storage was misaligned.
        component_id: ComponentID,
    },

    /// Failed while inserting component data into the destination archetype.
    PushFailed {
        /// Component being inserted.
        component_id: ComponentID,

        /// Underlying attribute error.
        source_error: AttributeError,
    },

    /// Failed while removing component data from the source archetype.
    SwapRemoveError {
        /// Component being removed.
        component_id: ComponentID,

        /// Underlying attribute error.
        source_error: AttributeError,
    },

    /// Entity metadata could not be updated consistently after the move.
    MetadataFailure,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::InconsistentStorage => {
                f.write_str("component storage layouts are inconsistent between archetypes")
            }

            MoveError::PushFromFailed { component_id, source_error } => {
                write!(
                    f,
                    "failed to move component {} from source archetype: {}",
                    component_id, source_error
                )
            }

            MoveError::RowMisalignment { expected, got, component_id } => {
                write!(
                    f,
                    "component {} storage misaligned: expected row {}, got {}",
                    component_id, expected, got
                )
            }

            MoveError::PushFailed { component_id, source_error } => {
                write!(
                    f,
                    "failed to insert component {} into destination archetype: {}",
                    component_id, source_error
                )
            }

            MoveError::SwapRemoveError { component_id, source_error } => {
                write!(
                    f,
                    "failed to remove component {} from source archetype: {}",
                    component_id, source_error
                )
            }

            MoveError::MetadataFailure => {
                f.write_str("failed to update entity metadata after archetype move")
            }
        }
    }
}

impl std::error::Error for MoveError {}

/// Top-level error for world operations.
///
/// This aggregates the failure modes encountered while mutating or querying
/// the world. It intentionally preserves the underlying structured error to
/// keep diagnostics actionable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ECSError {
    /// An entity handle was null, stale, or referred to a destroyed entity.
    StaleEntity,

    /// A component type was used in a context that requires prior
    /// registration (e.g. a view over a kind no entity has ever carried).
    UnregisteredComponent {
        /// Rust type name of the offending component.
        name: &'static str,
    },

    /// The same component type was requested twice by one view.
    DuplicateViewComponent {
        /// Rust type name of the duplicated component.
        name: &'static str,
    },

    /// A column-level operation failed.
    Attribute(AttributeError),

    /// An archetype migration failed.
    Move(MoveError),

    /// An internal invariant was violated.
    ///
    /// This indicates a serious bug in the engine, not caller error.
    Internal(&'static str),
}

impl fmt::Display for ECSError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ECSError::StaleEntity => f.write_str("stale or dead entity reference"),
            ECSError::UnregisteredComponent { name } => {
                write!(f, "component type {} is not registered", name)
            }
            ECSError::DuplicateViewComponent { name } => {
                write!(f, "component type {} requested more than once by a view", name)
            }
            ECSError::Attribute(e) => write!(f, "{e}"),
            ECSError::Move(e) => write!(f, "{e}"),
            ECSError::Internal(message) => write!(f, "internal invariant violation: {}", message),
        }
    }
}

impl std::error::Error for ECSError {}

impl From<StaleEntityError> for ECSError {
    fn from(_: StaleEntityError) -> Self { ECSError::StaleEntity }
}

impl From<AttributeError> for ECSError {
    fn from(e: AttributeError) -> Self { ECSError::Attribute(e) }
}

impl From<MoveError> for ECSError {
    fn from(e: MoveError) -> Self { ECSError::Move(e) }
}
