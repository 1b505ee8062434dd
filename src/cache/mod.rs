//! Generic query cache for data fetched from the remote store.
//!
//! This module is store-agnostic. It provides:
//! - One entry per logical resource key, with loading/ready/errored status
//! - Coalescing of concurrent reads onto a single in-flight fetch
//! - Generation-guarded commits, so a superseded fetch never overwrites newer data
//! - Explicit invalidation by key or resource prefix (no time-based expiry)

mod key;
mod layer;
mod storage;
mod traits;

pub use key::CacheKey;
pub use layer::QueryCache;
pub use storage::{EntrySnapshot, EntryStatus};
pub use traits::{CacheError, CacheResult, CacheSource, Cacheable};
