//! URL handling module
//!
//! This module provides URL normalization, the canonical dedup key, and the
//! host-scoping helpers used by link extraction.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{origin_prefix, same_host};
pub use normalize::{canonical_key, normalize_url};
