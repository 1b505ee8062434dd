//! In-memory entry storage with per-key generation tracking.
//!
//! All state transitions happen under a single mutex that is never held
//! across an `.await`. The async orchestration lives in `layer.rs`.

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tracing::debug;

use super::key::CacheKey;
use super::traits::CacheError;

/// Type-erased cached value
pub(crate) type Payload = std::sync::Arc<dyn Any + Send + Sync>;

/// A completed fetch, committed or not
#[derive(Clone)]
pub(crate) struct Fetched {
  pub payload: Payload,
  pub fetched_at: DateTime<Utc>,
}

pub(crate) type FetchOutcome = Result<Fetched, CacheError>;

/// Handle that every caller interested in an in-flight fetch awaits
pub(crate) type PendingFetch = Shared<BoxFuture<'static, FetchOutcome>>;

/// Lifecycle status of a cache entry.
///
/// `Empty -> Loading -> {Ready, Errored}`; `Ready -> Loading` after
/// invalidation; `Errored -> Loading` on the next read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryStatus {
  #[default]
  Empty,
  Loading,
  Ready,
  Errored,
}

/// Point-in-time view of a cache entry, for rendering without fetching.
#[derive(Debug, Clone)]
pub struct EntrySnapshot<T> {
  pub status: EntryStatus,
  /// Last committed value; kept while a refetch is in flight
  pub data: Option<T>,
  /// Detail of the last failed fetch, cleared by the next success
  pub error: Option<String>,
  pub generation: u64,
  /// Set by invalidation, cleared by the next committed fetch
  pub stale: bool,
  pub fetched_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Slot {
  status: EntryStatus,
  data: Option<Payload>,
  error: Option<String>,
  generation: u64,
  stale: bool,
  fetched_at: Option<DateTime<Utc>>,
  pending: Option<PendingFetch>,
}

impl Slot {
  /// Status implied by what the slot holds once no fetch is in flight.
  fn settle_status(&mut self) {
    self.status = if self.error.is_some() {
      EntryStatus::Errored
    } else if self.data.is_some() {
      EntryStatus::Ready
    } else {
      EntryStatus::Empty
    };
  }
}

/// Permission to run the fetch for one generation of a key.
pub(crate) struct FetchTicket {
  pub generation: u64,
  pub sender: oneshot::Sender<FetchOutcome>,
  pub pending: PendingFetch,
}

/// Outcome of looking a key up for a read.
pub(crate) enum Acquire {
  /// Fresh committed value
  Fresh(Fetched),
  /// Another caller's fetch is in flight
  Join(PendingFetch),
  /// This caller must start the fetch
  Start(FetchTicket),
}

/// Process-wide map of cache entries.
#[derive(Default)]
pub(crate) struct CacheStore {
  entries: Mutex<HashMap<CacheKey, Slot>>,
}

impl CacheStore {
  fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Slot>> {
    // No invariant spans a panic point inside the critical sections
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Look up `key`, registering a new pending fetch on a miss.
  ///
  /// Lookup and registration happen in one critical section, so concurrent
  /// readers of the same key always see at most one pending fetch.
  pub fn acquire(&self, key: &CacheKey) -> Acquire {
    let mut entries = self.lock();
    let slot = entries.entry(key.clone()).or_default();

    if let Some(pending) = &slot.pending {
      return Acquire::Join(pending.clone());
    }

    if slot.status == EntryStatus::Ready && !slot.stale {
      if let (Some(payload), Some(fetched_at)) = (&slot.data, slot.fetched_at) {
        return Acquire::Fresh(Fetched {
          payload: payload.clone(),
          fetched_at,
        });
      }
    }

    let (sender, receiver) = oneshot::channel::<FetchOutcome>();
    let pending = receiver
      .map(|received| {
        received.unwrap_or_else(|_| Err(CacheError::Fetch("fetch task ended without a result".into())))
      })
      .boxed()
      .shared();

    slot.generation += 1;
    slot.status = EntryStatus::Loading;
    slot.pending = Some(pending.clone());

    Acquire::Start(FetchTicket {
      generation: slot.generation,
      sender,
      pending,
    })
  }

  /// Commit a finished fetch if it still belongs to the current generation.
  ///
  /// Returns false when the result was discarded.
  pub fn complete(&self, key: &CacheKey, generation: u64, outcome: &FetchOutcome) -> bool {
    let mut entries = self.lock();
    let Some(slot) = entries.get_mut(key) else {
      return false;
    };

    if slot.generation != generation {
      debug!(%key, generation, current = slot.generation, "discarding superseded fetch result");
      return false;
    }

    slot.pending = None;
    match outcome {
      Ok(fetched) => {
        slot.data = Some(fetched.payload.clone());
        slot.fetched_at = Some(fetched.fetched_at);
        slot.error = None;
        slot.stale = false;
      }
      Err(e) => {
        slot.error = Some(e.to_string());
      }
    }
    slot.settle_status();
    true
  }

  /// Mark every entry matched by `target` stale. Returns the number marked.
  ///
  /// An in-flight fetch for a matched key is detached and its generation
  /// superseded, so it can no longer commit and the next read starts anew.
  pub fn invalidate(&self, target: &CacheKey) -> usize {
    let mut entries = self.lock();
    let mut marked = 0;

    for (key, slot) in entries.iter_mut().filter(|(key, _)| target.matches(key)) {
      slot.stale = true;
      slot.generation += 1;
      if slot.pending.take().is_some() {
        debug!(%key, generation = slot.generation, "superseding in-flight fetch");
        slot.settle_status();
      }
      marked += 1;
    }

    marked
  }

  /// Copy out the entry for `key` with its payload still erased.
  pub fn snapshot(&self, key: &CacheKey) -> Option<EntrySnapshot<Payload>> {
    let entries = self.lock();
    entries.get(key).map(|slot| EntrySnapshot {
      status: slot.status,
      data: slot.data.clone(),
      error: slot.error.clone(),
      generation: slot.generation,
      stale: slot.stale,
      fetched_at: slot.fetched_at,
    })
  }
}
