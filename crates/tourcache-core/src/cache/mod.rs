//! In-memory caching for upstream data.
//!
//! This module provides the `CacheManager` for the upstream source
//! collections and translation overlays, and the generic `TtlCache` that
//! every derived cache (home selections, search indexes) is built on.
//! Entries are considered expired once `now - cached_at >= ttl`.
//!
//! Cached data types include:
//! - Scenic spots, restaurants, activities (24h)
//! - Translation overlays per domain (24h)

pub mod entry;
pub mod manager;
pub mod store;

pub use entry::CachedData;
pub use manager::{CacheAge, CacheManager, CacheSettings, CachedSource};
pub use store::TtlCache;
