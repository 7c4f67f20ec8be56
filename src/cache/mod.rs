//! Key/value caching shared by the memoizing and validating layers.
//!
//! This module is catalogue-agnostic:
//! - `storage` holds raw blobs with an expiry (SQLite or no-op)
//! - `layer` adds JSON encoding, the TTL policy and logging
//! - `traits` defines the `mal:<tag>[:<arg>]*` key grammar

mod layer;
mod storage;
mod traits;

pub use layer::{Store, DEFAULT_TTL};
pub use storage::{CacheStorage, NoopStorage, SqliteStorage};
pub use traits::{CacheKey, KeyArg, NAMESPACE};
