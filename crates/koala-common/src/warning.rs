//! Browser warnings routed through the [`log`] facade.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the DOM and cascade components to report simplified behavior.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a simplified or unsupported feature (logged once per unique message)
///
/// The component name becomes the log target, so hosts can filter with
/// e.g. `RUST_LOG=cascade=off`.
///
/// # Example
/// ```ignore
/// warn_once("cascade", "declarations after `all` in the same block are ignored");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_log = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_log {
        log::warn!(target: component, "{message}");
    }
}

/// Clear all recorded warnings (call when loading a new page)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

/// Number of distinct warnings emitted since the last [`clear_warnings`].
#[must_use]
pub fn warning_count() -> usize {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map_or(0, HashSet::len)
}
