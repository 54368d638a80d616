//! Typed view construction and execution.
//!
//! This module provides the query surface of the engine: a [`View`] is built
//! from a tuple of component types and iterates every entity whose archetype
//! signature is a superset of that set.
//!
//! ## Design goals
//! * **Static intent:** The component set is the tuple type parameter;
//!   arities 1–4 are implemented through the [`ViewSet`] trait.
//! * **Runtime efficiency:** Each matched archetype's columns are downcast
//!   **once**, then iteration walks native typed slices; no per-element
//!   dispatch.
//! * **Safety by construction:** Views hold borrows of the world, so the
//!   borrow checker rules out structural mutation while a view is alive.
//!   Mutable iteration ([`ViewMut`]) requires exclusive world access and
//!   rejects duplicate component kinds at construction, which is what makes
//!   its disjoint column borrows sound.
//!
//! ## Snapshot semantics
//! A view eagerly captures the list of matching archetypes at construction
//! time. Archetypes created afterwards are not reflected in an already-built
//! view. Iteration order is archetype creation order outer, row order inner;
//! this is deterministic within a run but not a documented guarantee.
//!
//! ## Parallelism
//! [`View::par_for_each`] fans archetypes out across rayon workers for
//! read-only iteration. This is the "query phase" of the engine's
//! mutate-phase/query-phase discipline; structural mutation is impossible
//! while the view exists.

use std::marker::PhantomData;

use rayon::prelude::*;

use crate::engine::types::{ArchetypeID, ComponentID, build_signature};
use crate::engine::component::ComponentRegistry;
use crate::engine::storage::{downcast_attribute, downcast_attribute_mut};
use crate::engine::entity::Entity;
use crate::engine::world::ECSWorld;
use crate::engine::error::{ECSError, ECSResult};

/// A tuple of component types usable as a view's required set.
///
/// Implemented for tuples of arity 1–4 whose members are `'static + Send +
/// Sync` component types.
pub trait ViewSet {
    /// Resolves the tuple's component IDs against a registry, in tuple
    /// order.
    ///
    /// ## Errors
    /// - `UnregisteredComponent` if a member type was never registered (the
    ///   set can match nothing).
    /// - `DuplicateViewComponent` if the same type appears twice.
    fn component_ids(registry: &ComponentRegistry) -> ECSResult<Vec<ComponentID>>;
}

/// Read-only query over the entities carrying a component set.
///
/// Constructed by [`ECSWorld::view`]; holds a shared borrow of the world for
/// its whole lifetime.
pub struct View<'w, Q: ViewSet> {
    world: &'w ECSWorld,
    component_ids: Vec<ComponentID>,
    archetype_ids: Vec<ArchetypeID>,
    _marker: PhantomData<fn() -> Q>,
}

/// Read-write query over the entities carrying a component set.
///
/// Constructed by [`ECSWorld::view_mut`]; holds an exclusive borrow of the
/// world. Iteration yields mutable references to every requested component.
pub struct ViewMut<'w, Q: ViewSet> {
    world: &'w mut ECSWorld,
    component_ids: Vec<ComponentID>,
    archetype_ids: Vec<ArchetypeID>,
    _marker: PhantomData<fn() -> Q>,
}

fn matching_archetypes(world: &ECSWorld, component_ids: &[ComponentID]) -> Vec<ArchetypeID> {
    let required = build_signature(component_ids);
    world
        .archetypes()
        .iter()
        .filter(|archetype| archetype.matches_all(&required))
        .map(|archetype| archetype.archetype_id())
        .collect()
}

impl<'w, Q: ViewSet> View<'w, Q> {
    pub(crate) fn new(world: &'w ECSWorld) -> ECSResult<Self> {
        let component_ids = Q::component_ids(world.components())?;
        let archetype_ids = matching_archetypes(world, &component_ids);
        Ok(Self {
            world,
            component_ids,
            archetype_ids,
            _marker: PhantomData,
        })
    }

    /// Returns the number of entities this view covers.
    ///
    /// Computed by summing the entity counts of the matched archetypes.
    pub fn len(&self) -> usize {
        self.archetype_ids
            .iter()
            .map(|&archetype_id| self.world.archetypes()[archetype_id as usize].len())
            .sum()
    }

    /// Returns `true` if no entity matches the view.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the archetypes captured by this view, in iteration order.
    pub fn archetype_ids(&self) -> &[ArchetypeID] {
        &self.archetype_ids
    }

    /// Iterates the entity handles covered by this view.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.archetype_ids.iter().flat_map(move |&archetype_id| {
            self.world.archetypes()[archetype_id as usize]
                .entities()
                .iter()
                .copied()
        })
    }
}

impl<'w, Q: ViewSet> ViewMut<'w, Q> {
    pub(crate) fn new(world: &'w mut ECSWorld) -> ECSResult<Self> {
        let component_ids = Q::component_ids(world.components())?;
        let archetype_ids = matching_archetypes(world, &component_ids);
        Ok(Self {
            world,
            component_ids,
            archetype_ids,
            _marker: PhantomData,
        })
    }

    /// Returns the number of entities this view covers.
    pub fn len(&self) -> usize {
        self.archetype_ids
            .iter()
            .map(|&archetype_id| self.world.archetypes()[archetype_id as usize].len())
            .sum()
    }

    /// Returns `true` if no entity matches the view.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ECSWorld {
    /// Begins a read-only query over the component kinds in `Q`.
    ///
    /// ## Semantics
    /// The matching archetype list is captured eagerly; archetypes created
    /// after construction are not reflected in the returned view.
    ///
    /// ## Errors
    /// - `UnregisteredComponent` if a kind in `Q` was never registered.
    /// - `DuplicateViewComponent` if `Q` lists the same kind twice.
    pub fn view<Q: ViewSet>(&self) -> ECSResult<View<'_, Q>> {
        View::new(self)
    }

    /// Begins a read-write query over the component kinds in `Q`.
    ///
    /// Identical matching semantics to [`Self::view`], but iteration yields
    /// mutable component references and therefore requires exclusive world
    /// access.
    pub fn view_mut<Q: ViewSet>(&mut self) -> ECSResult<ViewMut<'_, Q>> {
        ViewMut::new(self)
    }
}

macro_rules! impl_view_set {
    ($(($t:ident, $v:ident, $i:tt)),+) => {
        impl<$($t: 'static + Send + Sync),+> ViewSet for ($($t,)+) {
            fn component_ids(registry: &ComponentRegistry) -> ECSResult<Vec<ComponentID>> {
                let component_ids = vec![$(registry.require_id_of::<$t>()?),+];

                for (position, id) in component_ids.iter().enumerate() {
                    if component_ids[..position].contains(id) {
                        return Err(ECSError::DuplicateViewComponent {
                            name: registry.name(*id).unwrap_or("?"),
                        });
                    }
                }

                Ok(component_ids)
            }
        }

        impl<'w, $($t: 'static + Send + Sync),+> View<'w, ($($t,)+)> {
            /// Invokes `f` for every matching entity with shared references
            /// to its requested components.
            pub fn for_each(&self, mut f: impl FnMut(Entity, $(&$t),+)) {
                for &archetype_id in &self.archetype_ids {
                    let archetype = &self.world.archetypes()[archetype_id as usize];

                    $(
                        let $v = downcast_attribute::<$t>(
                            archetype
                                .column(self.component_ids[$i])
                                .expect("view archetype lost a required column"),
                        )
                        .expect("view column element type mismatch")
                        .as_slice();
                    )+

                    for (row, &entity) in archetype.entities().iter().enumerate() {
                        f(entity, $(&$v[row]),+);
                    }
                }
            }

            /// Parallel variant of [`Self::for_each`].
            ///
            /// Archetypes are distributed across rayon workers; component
            /// access stays read-only, so sharing is safe between mutation
            /// phases.
            pub fn par_for_each(&self, f: impl Fn(Entity, $(&$t),+) + Send + Sync) {
                self.archetype_ids.par_iter().for_each(|&archetype_id| {
                    let archetype = &self.world.archetypes()[archetype_id as usize];

                    $(
                        let $v = downcast_attribute::<$t>(
                            archetype
                                .column(self.component_ids[$i])
                                .expect("view archetype lost a required column"),
                        )
                        .expect("view column element type mismatch")
                        .as_slice();
                    )+

                    for (row, &entity) in archetype.entities().iter().enumerate() {
                        f(entity, $(&$v[row]),+);
                    }
                });
            }
        }

        impl<'w, $($t: 'static + Send + Sync),+> ViewMut<'w, ($($t,)+)> {
            /// Invokes `f` for every matching entity with mutable references
            /// to its requested components.
            ///
            /// The component kinds of a view are pairwise distinct (checked
            /// at construction), so the mutable column borrows are disjoint.
            pub fn for_each(&mut self, mut f: impl FnMut(Entity, $(&mut $t),+)) {
                for &archetype_id in &self.archetype_ids {
                    let archetype = &mut self.world.archetypes_mut()[archetype_id as usize];
                    let (entities, [$($v),+]) =
                        archetype.entities_and_columns_mut([$(self.component_ids[$i]),+]);

                    $(
                        let $v = downcast_attribute_mut::<$t>(
                            $v.expect("view archetype lost a required column").as_mut(),
                        )
                        .expect("view column element type mismatch")
                        .as_mut_slice();
                    )+

                    for (row, &entity) in entities.iter().enumerate() {
                        f(entity, $(&mut $v[row]),+);
                    }
                }
            }
        }
    };
}

impl_view_set!((A, a, 0));
impl_view_set!((A, a, 0), (B, b, 1));
impl_view_set!((A, a, 0), (B, b, 1), (C, c, 2));
impl_view_set!((A, a, 0), (B, b, 1), (C, c, 2), (D, d, 3));
