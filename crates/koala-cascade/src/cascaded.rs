//! Cascaded-Value Accumulator.
//!
//! [§ 6.1 Cascaded Values](https://www.w3.org/TR/css-cascade-4/#cascaded)
//!
//! Each element folds the blocks that matched it, highest priority first,
//! into one [`CascadedValues`]. Because every merge only fills fields that
//! are still undeclared, the first block to declare a field decides it.
//!
//! Small groups live directly in the element's slot. Larger ones are pushed
//! into the run's [`CascadeArena`] and the slot keeps their index, so an
//! element touching `display` and `font-family` allocates only once.

use std::collections::TryReserveError;
use std::collections::hash_map::Entry;
use std::fmt;

use koala_dom::NodeId;
use rustc_hash::FxHashMap;

use crate::declarations::{DeclBlock, Declarations};
use crate::properties::{Aggregate, AggregateTag, CascadeArena, StoredAggregate, apply_group};
use crate::values::{CssWideKeyword, Importance};

/// Largest group, in bytes, kept inline in a cascaded slot.
pub const INLINE_CAPACITY: usize = 16;

/// Size bounds of a storage class, checked against every group at compile time.
pub trait StorageClass {
    /// Smallest group size this class accepts.
    const MIN_SIZE: usize;
    /// Largest group size this class accepts.
    const MAX_SIZE: usize;
}

/// How a cascaded slot holds a group of type `A`.
pub trait SlotKind<A>: StorageClass {
    /// What the slot stores.
    type Slot: Clone + fmt::Debug;

    /// Create a slot holding an all-undeclared group.
    ///
    /// # Errors
    ///
    /// Growing the arena failed.
    fn alloc(arena: &mut CascadeArena) -> Result<Self::Slot, TryReserveError>;

    /// Resolve a slot to its group.
    fn get<'a>(slot: &'a Self::Slot, arena: &'a CascadeArena) -> Option<&'a A>;

    /// Resolve a slot to its group, mutably.
    fn get_mut<'a>(slot: &'a mut Self::Slot, arena: &'a mut CascadeArena) -> Option<&'a mut A>;
}

/// Storage class of groups that fit in [`INLINE_CAPACITY`] bytes.
#[derive(Debug, Clone, Copy)]
pub struct Inline;

/// Storage class of groups kept in the [`CascadeArena`].
#[derive(Debug, Clone, Copy)]
pub struct InArena;

/// Position of a group in its [`CascadeArena`] slab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlabIndex(usize);

impl StorageClass for Inline {
    const MIN_SIZE: usize = 0;
    const MAX_SIZE: usize = INLINE_CAPACITY;
}

impl StorageClass for InArena {
    const MIN_SIZE: usize = INLINE_CAPACITY + 1;
    const MAX_SIZE: usize = usize::MAX;
}

impl<A: Aggregate> SlotKind<A> for Inline {
    type Slot = A;

    fn alloc(_arena: &mut CascadeArena) -> Result<A, TryReserveError> {
        Ok(A::default())
    }

    fn get<'a>(slot: &'a A, _arena: &'a CascadeArena) -> Option<&'a A> {
        Some(slot)
    }

    fn get_mut<'a>(slot: &'a mut A, _arena: &'a mut CascadeArena) -> Option<&'a mut A> {
        Some(slot)
    }
}

impl<A: Aggregate> SlotKind<A> for InArena {
    type Slot = SlabIndex;

    fn alloc(arena: &mut CascadeArena) -> Result<SlabIndex, TryReserveError> {
        let slab = A::slab_mut(arena);
        slab.try_reserve(1)?;
        slab.push(A::default());
        Ok(SlabIndex(slab.len() - 1))
    }

    fn get<'a>(slot: &'a SlabIndex, arena: &'a CascadeArena) -> Option<&'a A> {
        A::slab(arena).get(slot.0)
    }

    fn get_mut<'a>(slot: &'a mut SlabIndex, arena: &'a mut CascadeArena) -> Option<&'a mut A> {
        A::slab_mut(arena).get_mut(slot.0)
    }
}

/// Resolved declarations of one element.
#[derive(Debug, Clone, Default)]
pub struct CascadedValues {
    slots: FxHashMap<AggregateTag, StoredAggregate>,
    all: Option<CssWideKeyword>,
}

impl CascadedValues {
    /// The winning `all` keyword, if one was applied.
    ///
    /// Undeclared fields and absent groups resolve to this keyword.
    #[must_use]
    pub const fn all(&self) -> Option<CssWideKeyword> {
        self.all
    }

    /// The resolved `A` group, or `None` if no applied block declared it.
    #[must_use]
    pub fn get<'a, A: Aggregate>(&'a self, arena: &'a CascadeArena) -> Option<&'a A> {
        let slot = A::unwrap_ref(self.slots.get(&A::TAG)?)?;
        <A::Storage as SlotKind<A>>::get(slot, arena)
    }

    /// Whether a group slot exists for `tag`.
    #[must_use]
    pub fn contains(&self, tag: AggregateTag) -> bool {
        self.slots.contains_key(&tag)
    }

    /// Number of groups with a slot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no group has a slot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Merge `block`'s declarations at `importance` into these values.
    ///
    /// Once `all` is set only groups exempt from `all` still change; with no
    /// exemptions configured the call is a no-op.
    ///
    /// # Errors
    ///
    /// Growing the slot map or the arena failed. Values already merged stay
    /// as they were.
    pub fn apply_decl_block(
        &mut self,
        arena: &mut CascadeArena,
        decls: &Declarations,
        block: DeclBlock,
        importance: Importance,
    ) -> Result<(), TryReserveError> {
        let exempt = decls.config().all_exempt;
        let all_was_set = self.all.is_some();
        if all_was_set && exempt.is_empty() {
            return Ok(());
        }
        let Some(meta) = decls.meta(block) else {
            return Ok(());
        };

        if !all_was_set {
            if let Some((keyword, all_importance)) = meta.all {
                if all_importance == importance {
                    self.all = Some(keyword);
                }
            }
        }

        for tag in meta.touched(importance).iter() {
            if all_was_set && !exempt.contains(tag) {
                continue;
            }
            apply_group(tag, self, arena, decls, block, importance)?;
        }
        Ok(())
    }

    pub(crate) fn apply_aggregate<A: Aggregate>(
        &mut self,
        arena: &mut CascadeArena,
        decls: &Declarations,
        block: DeclBlock,
        importance: Importance,
    ) -> Result<(), TryReserveError> {
        self.slots.try_reserve(1)?;
        let stored = match self.slots.entry(A::TAG) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let slot = <A::Storage as SlotKind<A>>::alloc(arena)?;
                entry.insert(A::wrap(slot))
            }
        };
        let Some(slot) = A::unwrap_mut(stored) else {
            return Ok(());
        };
        if let Some(dest) = <A::Storage as SlotKind<A>>::get_mut(slot, arena) {
            decls.apply(block, importance, dest);
        }
        Ok(())
    }
}

/// Cascaded values of every element reached by one cascade run, plus the
/// arena backing them.
#[derive(Debug, Default)]
pub struct CascadedStore {
    elements: FxHashMap<NodeId, CascadedValues>,
    arena: CascadeArena,
}

impl CascadedStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every element's values, keeping allocated capacity for the
    /// next run.
    pub fn reset(&mut self) {
        self.elements.clear();
        self.arena.reset();
    }

    /// The values cascaded onto `node`, or `None` if no block matched it.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<CascadedView<'_>> {
        self.elements.get(&node).map(|values| CascadedView {
            values,
            arena: &self.arena,
        })
    }

    /// Elements that received at least one block, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.elements.keys().copied()
    }

    /// Number of elements with cascaded values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether no element has cascaded values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The arena backing out-of-line groups.
    #[must_use]
    pub const fn arena(&self) -> &CascadeArena {
        &self.arena
    }

    pub(crate) fn apply_decl_block(
        &mut self,
        node: NodeId,
        decls: &Declarations,
        block: DeclBlock,
        importance: Importance,
    ) -> Result<(), TryReserveError> {
        self.elements.try_reserve(1)?;
        self.elements
            .entry(node)
            .or_default()
            .apply_decl_block(&mut self.arena, decls, block, importance)
    }
}

/// Read-only access to one element's cascaded values.
#[derive(Debug, Clone, Copy)]
pub struct CascadedView<'a> {
    values: &'a CascadedValues,
    arena: &'a CascadeArena,
}

impl<'a> CascadedView<'a> {
    /// The resolved `A` group, or `None` if no applied block declared it.
    #[must_use]
    pub fn get<A: Aggregate>(&self) -> Option<&'a A> {
        self.values.get::<A>(self.arena)
    }

    /// The winning `all` keyword, if any.
    #[must_use]
    pub const fn all(&self) -> Option<CssWideKeyword> {
        self.values.all()
    }

    /// The underlying values.
    #[must_use]
    pub const fn values(&self) -> &'a CascadedValues {
        self.values
    }
}
