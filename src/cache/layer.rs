//! Query cache that coalesces fetches and guards commits by generation.

use chrono::Utc;
use futures::FutureExt;
use std::fmt::Display;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::key::CacheKey;
use super::storage::{Acquire, CacheStore, EntrySnapshot, EntryStatus, FetchOutcome, Fetched, Payload};
use super::traits::{CacheError, CacheResult, Cacheable};

/// Keyed store of fetched results shared by every view.
///
/// Cloning is cheap and every clone refers to the same entries. There is
/// no time-based expiry: an entry stays fresh until it is invalidated.
#[derive(Clone, Default)]
pub struct QueryCache {
  store: Arc<CacheStore>,
}

impl QueryCache {
  /// Create an empty cache.
  pub fn new() -> Self {
    Self::default()
  }

  /// Read `key`, fetching it with `fetcher` only when needed.
  ///
  /// 1. If a fetch for `key` is in flight, wait for it instead of starting one
  /// 2. If the entry is ready and not stale, return it immediately
  /// 3. Otherwise start a new generation and run `fetcher` on its own task
  ///
  /// The fetch task commits its result even if every caller stops waiting,
  /// but only while its generation is still current.
  pub async fn get<T, F, Fut, E>(&self, key: &CacheKey, fetcher: F) -> Result<CacheResult<T>, CacheError>
  where
    T: Cacheable,
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    E: Display + Send + 'static,
  {
    match self.store.acquire(key) {
      Acquire::Fresh(fetched) => {
        debug!(%key, entity = T::entity_type(), "cache hit");
        let data = downcast::<T>(key, &fetched.payload)?;
        Ok(CacheResult::from_cache(data, Some(fetched.fetched_at)))
      }
      Acquire::Join(pending) => {
        debug!(%key, "joining in-flight fetch");
        let fetched = pending.await?;
        let data = downcast::<T>(key, &fetched.payload)?;
        Ok(CacheResult::coalesced(data, Some(fetched.fetched_at)))
      }
      Acquire::Start(ticket) => {
        debug!(%key, generation = ticket.generation, entity = T::entity_type(), "starting fetch");

        let generation = ticket.generation;
        let future = match panic::catch_unwind(AssertUnwindSafe(fetcher)) {
          Ok(future) => future,
          Err(payload) => {
            warn!(%key, generation, "fetcher panicked before starting");
            self.store.complete(key, generation, &Err(panicked()));
            panic::resume_unwind(payload);
          }
        };
        let store = Arc::clone(&self.store);
        let task_key = key.clone();
        let sender = ticket.sender;

        tokio::spawn(async move {
          let outcome: FetchOutcome = match AssertUnwindSafe(future).catch_unwind().await {
            Ok(Ok(value)) => Ok(Fetched {
              payload: Arc::new(value) as Payload,
              fetched_at: Utc::now(),
            }),
            Ok(Err(e)) => {
              warn!(key = %task_key, generation, error = %e, "fetch failed");
              Err(CacheError::Fetch(e.to_string()))
            }
            Err(_) => {
              warn!(key = %task_key, generation, "fetch panicked");
              Err(panicked())
            }
          };
          store.complete(&task_key, generation, &outcome);
          // Ignore send errors - every waiter may have been dropped
          let _ = sender.send(outcome);
        });

        let fetched = ticket.pending.await?;
        let data = downcast::<T>(key, &fetched.payload)?;
        Ok(CacheResult::from_network(data, Some(fetched.fetched_at)))
      }
    }
  }

  /// Mark `target` stale, and every id-parameterized key under it when
  /// `target` has no id.
  ///
  /// Currently held data is kept for display; the next `get` refetches.
  pub fn invalidate(&self, target: &CacheKey) -> usize {
    let marked = self.store.invalidate(target);
    info!(%target, marked, "invalidated cache entries");
    marked
  }

  /// Status of `key`, `Empty` if it was never read.
  pub fn status(&self, key: &CacheKey) -> EntryStatus {
    self
      .store
      .snapshot(key)
      .map(|snapshot| snapshot.status)
      .unwrap_or_default()
  }

  /// Current entry for `key` without triggering a fetch.
  ///
  /// Data of an unexpected type is reported as absent.
  pub fn peek<T: Cacheable>(&self, key: &CacheKey) -> Option<EntrySnapshot<T>> {
    let snapshot = self.store.snapshot(key)?;
    let data = match snapshot.data {
      Some(payload) => match downcast::<T>(key, &payload) {
        Ok(data) => Some(data),
        Err(e) => {
          warn!(%key, error = %e, "peeked with the wrong type");
          None
        }
      },
      None => None,
    };

    Some(EntrySnapshot {
      status: snapshot.status,
      data,
      error: snapshot.error,
      generation: snapshot.generation,
      stale: snapshot.stale,
      fetched_at: snapshot.fetched_at,
    })
  }
}

fn panicked() -> CacheError {
  CacheError::Fetch("fetch panicked".to_string())
}

fn downcast<T: Cacheable>(key: &CacheKey, payload: &Payload) -> Result<T, CacheError> {
  (**payload)
    .downcast_ref::<T>()
    .cloned()
    .ok_or_else(|| CacheError::TypeMismatch {
      key: key.clone(),
      expected: std::any::type_name::<T>(),
    })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheSource;
  use futures::FutureExt;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::time::Duration;
  use tokio::sync::oneshot;
  use tokio::task::JoinHandle;

  #[derive(Debug, Clone, PartialEq)]
  struct Numbers(Vec<u32>);

  impl Cacheable for Numbers {
    fn entity_type() -> &'static str {
      "numbers"
    }
  }

  fn key() -> CacheKey {
    CacheKey::new("numbers")
  }

  /// Start a read whose fetch resolves when the returned sender fires.
  fn spawn_gated_get(
    cache: &QueryCache,
  ) -> (
    oneshot::Sender<Vec<u32>>,
    JoinHandle<Result<CacheResult<Numbers>, CacheError>>,
  ) {
    let (tx, rx) = oneshot::channel::<Vec<u32>>();
    let cache = cache.clone();
    let handle = tokio::spawn(async move {
      cache
        .get(&key(), move || async move {
          rx.await.map(Numbers).map_err(|e| e.to_string())
        })
        .await
    });
    (tx, handle)
  }

  /// Yield until the entry for `key()` reaches `generation`.
  async fn wait_for_generation(cache: &QueryCache, generation: u64) {
    for _ in 0..1000 {
      let current = cache.peek::<Numbers>(&key()).map(|s| s.generation);
      if current == Some(generation) && cache.status(&key()) == EntryStatus::Loading {
        return;
      }
      tokio::task::yield_now().await;
    }
    panic!("fetch for generation {} never started", generation);
  }

  #[tokio::test]
  async fn test_concurrent_gets_share_one_fetch() {
    let cache = QueryCache::new();
    let calls = Arc::new(AtomicU32::new(0));

    let reads = (0..5).map(|_| {
      let calls = calls.clone();
      let cache = cache.clone();
      async move {
        cache
          .get(&key(), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, String>(Numbers(vec![1, 2, 3]))
          })
          .await
      }
    });
    let results = futures::future::join_all(reads).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let results: Vec<_> = results.into_iter().map(|r| r.unwrap()).collect();
    assert!(results.iter().all(|r| r.data == Numbers(vec![1, 2, 3])));
    assert_eq!(
      results
        .iter()
        .filter(|r| r.source == CacheSource::Network)
        .count(),
      1
    );
    assert_eq!(
      results
        .iter()
        .filter(|r| r.source == CacheSource::Coalesced)
        .count(),
      4
    );
  }

  #[tokio::test]
  async fn test_fresh_entry_is_served_from_cache() {
    let cache = QueryCache::new();
    let calls = Arc::new(AtomicU32::new(0));

    for _ in 0..3 {
      let calls = calls.clone();
      cache
        .get(&key(), move || async move {
          calls.fetch_add(1, Ordering::SeqCst);
          Ok::<_, String>(Numbers(vec![7]))
        })
        .await
        .unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let result = cache
      .get(&key(), || async { Ok::<_, String>(Numbers(vec![0])) })
      .await
      .unwrap();
    assert_eq!(result.source, CacheSource::CacheFresh);
    assert_eq!(result.data, Numbers(vec![7]));
  }

  #[tokio::test]
  async fn test_invalidate_forces_refetch_and_keeps_data_meanwhile() {
    let cache = QueryCache::new();
    cache
      .get(&key(), || async { Ok::<_, String>(Numbers(vec![1])) })
      .await
      .unwrap();

    assert_eq!(cache.invalidate(&key()), 1);
    let snapshot = cache.peek::<Numbers>(&key()).unwrap();
    assert!(snapshot.stale);
    assert_eq!(snapshot.status, EntryStatus::Ready);
    assert_eq!(snapshot.data, Some(Numbers(vec![1])));

    let (tx, handle) = spawn_gated_get(&cache);
    wait_for_generation(&cache, 3).await;

    // Old data stays visible while the refetch is outstanding
    let snapshot = cache.peek::<Numbers>(&key()).unwrap();
    assert_eq!(snapshot.status, EntryStatus::Loading);
    assert_eq!(snapshot.data, Some(Numbers(vec![1])));

    tx.send(vec![2]).unwrap();
    let result = handle.await.unwrap().unwrap();
    assert_eq!(result.source, CacheSource::Network);
    assert_eq!(result.data, Numbers(vec![2]));

    let snapshot = cache.peek::<Numbers>(&key()).unwrap();
    assert!(!snapshot.stale);
    assert_eq!(snapshot.status, EntryStatus::Ready);
  }

  #[tokio::test]
  async fn test_superseded_fetch_completing_last_is_discarded() {
    let cache = QueryCache::new();

    let (tx_old, old) = spawn_gated_get(&cache);
    wait_for_generation(&cache, 1).await;

    cache.invalidate(&key());

    let (tx_new, new) = spawn_gated_get(&cache);
    wait_for_generation(&cache, 3).await;

    tx_new.send(vec![2]).unwrap();
    assert_eq!(new.await.unwrap().unwrap().data, Numbers(vec![2]));

    tx_old.send(vec![1]).unwrap();
    // The superseded caller still gets what its own fetch returned
    assert_eq!(old.await.unwrap().unwrap().data, Numbers(vec![1]));

    let snapshot = cache.peek::<Numbers>(&key()).unwrap();
    assert_eq!(snapshot.data, Some(Numbers(vec![2])));
    assert_eq!(snapshot.status, EntryStatus::Ready);
  }

  #[tokio::test]
  async fn test_superseded_fetch_completing_first_is_discarded() {
    let cache = QueryCache::new();

    let (tx_old, old) = spawn_gated_get(&cache);
    wait_for_generation(&cache, 1).await;

    cache.invalidate(&key());

    let (tx_new, new) = spawn_gated_get(&cache);
    wait_for_generation(&cache, 3).await;

    tx_old.send(vec![1]).unwrap();
    old.await.unwrap().unwrap();

    let snapshot = cache.peek::<Numbers>(&key()).unwrap();
    assert_eq!(snapshot.status, EntryStatus::Loading);
    assert_eq!(snapshot.data, None);

    tx_new.send(vec![2]).unwrap();
    new.await.unwrap().unwrap();
    assert_eq!(
      cache.peek::<Numbers>(&key()).unwrap().data,
      Some(Numbers(vec![2]))
    );
  }

  #[tokio::test]
  async fn test_error_is_stored_and_next_get_retries() {
    let cache = QueryCache::new();

    let err = cache
      .get(&key(), || async { Err::<Numbers, _>("store unavailable") })
      .await
      .unwrap_err();
    assert_eq!(err, CacheError::Fetch("store unavailable".to_string()));

    let snapshot = cache.peek::<Numbers>(&key()).unwrap();
    assert_eq!(snapshot.status, EntryStatus::Errored);
    assert_eq!(snapshot.error.as_deref(), Some("store unavailable"));

    let result = cache
      .get(&key(), || async { Ok::<_, String>(Numbers(vec![4])) })
      .await
      .unwrap();
    assert_eq!(result.source, CacheSource::Network);

    let snapshot = cache.peek::<Numbers>(&key()).unwrap();
    assert_eq!(snapshot.status, EntryStatus::Ready);
    assert_eq!(snapshot.error, None);
  }

  #[tokio::test]
  async fn test_panicking_fetch_is_an_error_and_next_get_retries() {
    let cache = QueryCache::new();

    let err = cache
      .get(&key(), || async {
        if true {
          panic!("store client bug");
        }
        Ok::<_, String>(Numbers(Vec::new()))
      })
      .await
      .unwrap_err();
    assert_eq!(err, CacheError::Fetch("fetch panicked".to_string()));
    assert_eq!(cache.status(&key()), EntryStatus::Errored);

    let calls = Arc::new(AtomicU32::new(0));
    let counted = calls.clone();
    let result = cache
      .get(&key(), move || async move {
        counted.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(Numbers(vec![7]))
      })
      .await
      .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.source, CacheSource::Network);
    assert_eq!(result.data, Numbers(vec![7]));
    assert_eq!(cache.status(&key()), EntryStatus::Ready);
  }

  #[tokio::test]
  async fn test_fetcher_panicking_before_its_future_does_not_wedge_the_key() {
    let cache = QueryCache::new();

    let reader = cache.clone();
    let outcome = tokio::spawn(async move {
      reader
        .get(&key(), || -> futures::future::Ready<Result<Numbers, String>> {
          panic!("could not build request")
        })
        .await
    })
    .await;
    assert!(outcome.is_err());
    assert_eq!(cache.status(&key()), EntryStatus::Errored);

    let result = cache
      .get(&key(), || async { Ok::<_, String>(Numbers(vec![8])) })
      .await
      .unwrap();
    assert_eq!(result.source, CacheSource::Network);
  }

  #[tokio::test]
  async fn test_dropping_interest_does_not_cancel_fetch() {
    let cache = QueryCache::new();
    let (tx, rx) = oneshot::channel::<Vec<u32>>();

    let abandoned = cache
      .get(&key(), move || async move {
        rx.await.map(Numbers).map_err(|e| e.to_string())
      })
      .now_or_never();
    assert!(abandoned.is_none());
    assert_eq!(cache.status(&key()), EntryStatus::Loading);

    tx.send(vec![9]).unwrap();
    for _ in 0..1000 {
      if cache.status(&key()) == EntryStatus::Ready {
        break;
      }
      tokio::task::yield_now().await;
    }

    assert_eq!(
      cache.peek::<Numbers>(&key()).unwrap().data,
      Some(Numbers(vec![9]))
    );
  }

  #[tokio::test]
  async fn test_prefix_invalidation() {
    let cache = QueryCache::new();
    for id in ["a", "b"] {
      cache
        .get(&CacheKey::with_id("numbers", id), || async {
          Ok::<_, String>(Numbers(vec![]))
        })
        .await
        .unwrap();
    }
    cache
      .get(&CacheKey::new("other"), || async {
        Ok::<_, String>(Numbers(vec![]))
      })
      .await
      .unwrap();

    assert_eq!(cache.invalidate(&CacheKey::new("numbers")), 2);
    assert_eq!(cache.invalidate(&CacheKey::with_id("numbers", "a")), 1);
    assert_eq!(cache.invalidate(&CacheKey::new("missing")), 0);
  }

  #[tokio::test]
  async fn test_reading_with_wrong_type_is_an_error() {
    let cache = QueryCache::new();
    cache
      .get(&key(), || async { Ok::<_, String>(Numbers(vec![1])) })
      .await
      .unwrap();

    #[derive(Debug, Clone)]
    struct Other;
    impl Cacheable for Other {
      fn entity_type() -> &'static str {
        "other"
      }
    }

    let err = cache
      .get(&key(), || async { Ok::<_, String>(Other) })
      .await
      .unwrap_err();
    assert!(matches!(err, CacheError::TypeMismatch { .. }));
    assert!(cache.peek::<Other>(&key()).unwrap().data.is_none());
  }
}
