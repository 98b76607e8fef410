//! Common utilities for the Koala browser.
//!
//! This crate provides shared infrastructure used by all browser components:
//! - **Warning System** - deduplicated warnings for simplified or unsupported behavior

pub mod warning;
