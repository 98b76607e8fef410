//! Declaration Store.
//!
//! [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
//!
//! Each declaration block (a rule body or an inline `style` attribute) gets a
//! [`DeclBlock`] handle. Declared values are kept per property group, per
//! importance: a block that declares `color` and `padding-left` holds one
//! [`Color`](crate::Color) header and one
//! [`HorizontalEdges`](crate::HorizontalEdges) header, nothing else.
//!
//! Within one block and importance the first declaration of a field wins.
//! Parsers hand declarations over in reverse source order, so "first" here
//! is the declaration that appears last in the block.

pub(crate) mod list;

use rustc_hash::FxHashMap;
use serde::Serialize;

use koala_common::warning::warn_once;

use crate::config::CascadeConfig;
use crate::error::DeclarationError;
use crate::properties::{Aggregate, AggregateSet, AggregateStores, AggregateTag, DeclaredValues};
use crate::values::{CssWideKeyword, Importance};

pub use list::MAX_LIST_LEN;

/// Handle for one declaration block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DeclBlock(u32);

impl DeclBlock {
    /// Position of this block in its store.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Per-block bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockMeta {
    /// Whether any field was declared without `!important`.
    pub has_normal_values: bool,
    /// Whether any field was declared with `!important`.
    pub has_important_values: bool,
    /// The block's `all` shorthand, if any. Only the most important one is kept.
    pub all: Option<(CssWideKeyword, Importance)>,
    touched_normal: AggregateSet,
    touched_important: AggregateSet,
}

impl BlockMeta {
    /// Whether the block declares anything at `importance`, `all` included.
    #[must_use]
    pub fn has_values(&self, importance: Importance) -> bool {
        let declared = match importance {
            Importance::Normal => self.has_normal_values,
            Importance::Important => self.has_important_values,
        };
        declared || self.all.is_some_and(|(_, all)| all == importance)
    }

    /// Property groups this block holds a header for at `importance`.
    #[must_use]
    pub const fn touched(&self, importance: Importance) -> AggregateSet {
        match importance {
            Importance::Normal => self.touched_normal,
            Importance::Important => self.touched_important,
        }
    }

    fn mark_declared(&mut self, importance: Importance, tag: AggregateTag) {
        match importance {
            Importance::Normal => {
                self.has_normal_values = true;
                self.touched_normal.insert(tag);
            }
            Importance::Important => {
                self.has_important_values = true;
                self.touched_important.insert(tag);
            }
        }
    }
}

/// Headers of one property group, split by importance.
#[derive(Debug, Default)]
pub struct AggregateStore<A: Aggregate> {
    normal: FxHashMap<DeclBlock, A::Header>,
    important: FxHashMap<DeclBlock, A::Header>,
}

impl<A: Aggregate> AggregateStore<A> {
    /// Headers declared at `importance`.
    #[must_use]
    pub const fn get(&self, importance: Importance) -> &FxHashMap<DeclBlock, A::Header> {
        match importance {
            Importance::Normal => &self.normal,
            Importance::Important => &self.important,
        }
    }

    const fn get_mut(&mut self, importance: Importance) -> &mut FxHashMap<DeclBlock, A::Header> {
        match importance {
            Importance::Normal => &mut self.normal,
            Importance::Important => &mut self.important,
        }
    }
}

/// Declared values of every block of a parsed stylesheet.
///
/// Lives as long as the stylesheet. Blocks are append-only: once a parser
/// has finished a block, nothing in it changes.
#[derive(Debug, Default)]
pub struct Declarations {
    config: CascadeConfig,
    blocks: Vec<BlockMeta>,
    stores: AggregateStores,
}

impl Declarations {
    /// Create an empty store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store.
    #[must_use]
    pub fn with_config(config: CascadeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The configuration this store was created with.
    #[must_use]
    pub const fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Number of blocks handed out so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no block has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Allocate a fresh, empty block.
    ///
    /// # Errors
    ///
    /// [`DeclarationError::OutOfBlocks`] once `max_blocks` handles exist.
    pub fn new_block(&mut self) -> Result<DeclBlock, DeclarationError> {
        let limit = self.config.max_blocks;
        let index = u32::try_from(self.blocks.len())
            .ok()
            .filter(|&index| index < limit)
            .ok_or(DeclarationError::OutOfBlocks { limit })?;
        self.blocks.push(BlockMeta::default());
        Ok(DeclBlock(index))
    }

    /// Metadata of `block`, or `None` if this store never issued it.
    #[must_use]
    pub fn meta(&self, block: DeclBlock) -> Option<&BlockMeta> {
        self.blocks.get(block.index())
    }

    fn check(&self, block: DeclBlock) -> Result<(), DeclarationError> {
        self.meta(block)
            .map(|_| ())
            .ok_or(DeclarationError::UnknownBlock(block))
    }

    /// Add every declared field of `values` to `block`.
    ///
    /// Fields already declared in this block at this importance keep their
    /// value. Groups other than the configured exemptions are ignored once
    /// the block carries `all`.
    ///
    /// # Errors
    ///
    /// [`DeclarationError::UnknownBlock`] for a foreign handle, or a list
    /// length error. On error nothing is written.
    pub fn add_values(
        &mut self,
        block: DeclBlock,
        importance: Importance,
        values: &DeclaredValues,
    ) -> Result<(), DeclarationError> {
        self.check(block)?;
        values.validate()?;
        values.write_into(self, block, importance);
        Ok(())
    }

    /// Add the declared fields of a single property group to `block`.
    ///
    /// # Errors
    ///
    /// Same as [`Declarations::add_values`].
    pub fn add_aggregate<A: Aggregate>(
        &mut self,
        block: DeclBlock,
        importance: Importance,
        value: &A,
    ) -> Result<(), DeclarationError> {
        self.check(block)?;
        value.validate()?;
        if !value.is_undeclared() {
            self.write_aggregate(block, importance, value);
        }
        Ok(())
    }

    /// [§ 3.2 The all property](https://www.w3.org/TR/css-cascade-4/#all-shorthand)
    ///
    /// Record an `all` declaration. An `all` of lower importance than the
    /// one already recorded is dropped, as is a second one of equal
    /// importance.
    ///
    /// # Errors
    ///
    /// [`DeclarationError::UnknownBlock`] for a foreign handle.
    pub fn add_all(
        &mut self,
        block: DeclBlock,
        importance: Importance,
        keyword: CssWideKeyword,
    ) -> Result<(), DeclarationError> {
        let meta = self
            .blocks
            .get_mut(block.index())
            .ok_or(DeclarationError::UnknownBlock(block))?;
        match meta.all {
            Some((_, recorded)) if recorded >= importance => {}
            _ => meta.all = Some((keyword, importance)),
        }
        Ok(())
    }

    /// Merge `block`'s `A` fields at `importance` into `dest`, filling only
    /// fields `dest` has not resolved yet.
    ///
    /// Without a header for `A`, the block's `all` keyword fills `dest`
    /// instead, provided it was declared at `importance` and `A` is not
    /// exempt from `all`.
    pub fn apply<A: Aggregate>(&self, block: DeclBlock, importance: Importance, dest: &mut A) {
        let Some(meta) = self.meta(block) else {
            return;
        };
        if let Some(header) = A::store(&self.stores).get(importance).get(&block) {
            dest.read_header(header);
            return;
        }
        if let Some((keyword, all_importance)) = meta.all {
            if all_importance == importance && !self.config.all_exempt.contains(A::TAG) {
                dest.fill_with_keyword(keyword);
            }
        }
    }

    /// The `A` fields `block` declares at `importance`, or `None` if it
    /// holds no header for `A`.
    #[must_use]
    pub fn declared<A: Aggregate>(&self, block: DeclBlock, importance: Importance) -> Option<A> {
        let header = A::store(&self.stores).get(importance).get(&block)?;
        let mut value = A::default();
        value.read_header(header);
        Some(value)
    }

    pub(crate) fn write_aggregate<A: Aggregate>(
        &mut self,
        block: DeclBlock,
        importance: Importance,
        value: &A,
    ) {
        let exempt = self.config.all_exempt.contains(A::TAG);
        let Some(meta) = self.blocks.get_mut(block.index()) else {
            return;
        };
        if meta.all.is_some() && !exempt {
            warn_once(
                "cascade",
                &format!("{} declared after `all` in the same block is ignored", A::TAG),
            );
            return;
        }

        let header = A::store_mut(&mut self.stores)
            .get_mut(importance)
            .entry(block)
            .or_default();
        if value.write_header(header) {
            meta.mark_declared(importance, A::TAG);
        }
    }
}
