//! Errors surfaced by the declaration store and the cascade driver.
//!
//! Duplicate declarations and lower-priority `all` keywords are not errors:
//! the store silently keeps the first (or most important) one.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::declarations::DeclBlock;
use crate::properties::AggregateTag;

/// Failure while building declaration blocks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// Every block handle below the configured limit is in use.
    #[error("out of declaration block handles (limit {limit})")]
    OutOfBlocks {
        /// The handle limit that was reached.
        limit: u32,
    },
    /// A list-valued field was declared with no items.
    #[error("`{group}.{field}` declared with an empty list")]
    EmptyList {
        /// Property group of the offending field.
        group: AggregateTag,
        /// Field name within the group.
        field: &'static str,
    },
    /// A list-valued field was declared with more items than a header can count.
    #[error("`{group}.{field}` declared with {count} items (at most {max})", max = crate::declarations::list::MAX_LIST_LEN)]
    TooManyValues {
        /// Property group of the offending field.
        group: AggregateTag,
        /// Field name within the group.
        field: &'static str,
        /// Number of items that were supplied.
        count: usize,
    },
    /// The handle was not issued by this store.
    #[error("unknown declaration block {0:?}")]
    UnknownBlock(DeclBlock),
}

/// Failure of a whole cascade run. No element's cascaded values survive it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CascadeError {
    /// Growing the match lists or the cascade arena failed.
    #[error("out of memory during cascade: {0}")]
    OutOfMemory(#[from] TryReserveError),
}
