//! Query caching for the API access layer.
//!
//! This module provides a resource-agnostic caching mechanism that:
//! - Addresses cached read results by hierarchical token-sequence keys
//! - Tracks staleness per entry with per-read staleness windows
//! - Invalidates by key prefix, so a scope covers every nested key
//! - Deduplicates concurrent fetches for the same key

mod key;
mod store;

pub use key::QueryKey;
pub use store::QueryCache;
