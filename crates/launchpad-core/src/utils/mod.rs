//! # Launchpad Core Utilities
//!
//! Small filesystem helpers shared by the resource scanner and the
//! configuration loader.
pub mod fs;

pub use fs::{has_extension, is_hidden, sorted_entries};
