//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};

/// Trait for values that can be held by the query cache.
///
/// Values are stored type-erased and recovered by downcasting, so the
/// same key must always be read with the same type.
pub trait Cacheable: Clone + Send + Sync + 'static {
  /// Entity type name used in logs and type mismatch errors (e.g., "entrepreneur")
  fn entity_type() -> &'static str;
}

impl<T: Cacheable> Cacheable for Vec<T> {
  fn entity_type() -> &'static str {
    T::entity_type()
  }
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was committed to the cache (if it was)
  pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from a fetch this call started.
  pub fn from_network(data: T, fetched_at: Option<DateTime<Utc>>) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      fetched_at,
    }
  }

  /// Create a new cache result from a fresh cache entry.
  pub fn from_cache(data: T, fetched_at: Option<DateTime<Utc>>) -> Self {
    Self {
      data,
      source: CacheSource::CacheFresh,
      fetched_at,
    }
  }

  /// Create a new cache result from a fetch another caller started.
  pub fn coalesced(data: T, fetched_at: Option<DateTime<Utc>>) -> Self {
    Self {
      data,
      source: CacheSource::Coalesced,
      fetched_at,
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CacheResult<U> {
    CacheResult {
      data: f(self.data),
      source: self.source,
      fetched_at: self.fetched_at,
    }
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from a fetch started by this call
  Network,
  /// Data from cache, still considered fresh
  CacheFresh,
  /// Joined a fetch that was already in flight for the same key
  Coalesced,
}

/// Error returned by cache reads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
  /// The fetch for this key failed; carries the fetcher's error detail
  #[error("{0}")]
  Fetch(String),
  /// The key holds a value of a different type than the one requested
  #[error("cached value for '{key}' is not a {expected}")]
  TypeMismatch {
    key: super::CacheKey,
    expected: &'static str,
  },
}
