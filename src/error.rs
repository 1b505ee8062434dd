use crate::cache::CacheError;
use crate::gateway::GatewayError;

/// Errors surfaced to views by the synchronization layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
  /// No gateway is connected yet. Only point reads and writes report this;
  /// list reads return an empty collection instead.
  #[error("gateway connection is not established yet")]
  GatewayNotReady,

  /// A read failed; the detail is also held on the cache entry
  #[error("fetch failed: {0}")]
  FetchFailure(#[from] CacheError),

  /// A write was rejected; nothing was cached and nothing will be retried
  #[error("write failed: {0}")]
  MutationFailure(#[from] GatewayError),
}

pub type SyncResult<T> = Result<T, SyncError>;
