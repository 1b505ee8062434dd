//! Poll-driven query handle for views running an event loop.
//!
//! A `Query<T>` wraps one read from the directory client with its
//! loading/success/error state. The read itself goes through the shared
//! query cache, so several handles for the same resource share one fetch.
//!
//! # Example
//!
//! ```ignore
//! let directory = client.clone();
//! let ready = client.clone();
//! let mut query = Query::new(move || {
//!     let directory = directory.clone();
//!     async move { directory.list_entrepreneurs().await }
//! })
//! .enabled_when(move || ready.is_ready());
//!
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

use crate::error::SyncError;

/// The state of a query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// The precondition for fetching does not hold yet
  NotReady,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, QueryState::Success(_))
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, SyncError>> + Send>>;

type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

type Precondition = Box<dyn Fn() -> bool + Send + Sync>;

/// View-side handle over one read.
///
/// Query<T> encapsulates:
/// - The read (via a closure)
/// - An optional precondition checked before every fetch
/// - Loading/success/error states
/// - Async result handling via channels
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  enabled: Option<Precondition>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, SyncError>>>,
}

impl<T: Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is called each time `fetch()` or `refetch()` starts a read.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, SyncError>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      enabled: None,
      receiver: None,
    }
  }

  /// Only fetch while `precondition` holds; otherwise move to `NotReady`.
  pub fn enabled_when<P>(mut self, precondition: P) -> Self
  where
    P: Fn() -> bool + Send + Sync + 'static,
  {
    self.enabled = Some(Box::new(precondition));
    self
  }

  /// Get the current state of the query.
  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  pub fn is_success(&self) -> bool {
    self.state.is_success()
  }

  pub fn is_error(&self) -> bool {
    self.state.is_error()
  }

  pub fn error(&self) -> Option<&str> {
    self.state.error()
  }

  /// Start fetching data if not already loading.
  pub fn fetch(&mut self) {
    if self.state.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Start a new read even if one is outstanding.
  ///
  /// The outstanding read is only abandoned by this handle; the cache
  /// still commits its result for other readers.
  pub fn refetch(&mut self) {
    self.receiver = None;
    self.start_fetch();
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the state changed (data arrived, error occurred, or
  /// a gated query started fetching because its precondition now holds).
  /// Call this in your event loop tick handler.
  pub fn poll(&mut self) -> bool {
    if matches!(self.state, QueryState::NotReady) && self.receiver.is_none() && self.precondition_holds() {
      self.start_fetch();
      return true;
    }

    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.receiver = None;
        true
      }
      Ok(Err(SyncError::GatewayNotReady)) => {
        self.state = QueryState::NotReady;
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error.to_string());
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending - treat as error
        self.state = QueryState::Error("Query was cancelled".to_string());
        self.receiver = None;
        true
      }
    }
  }

  /// Only gated queries re-arm themselves; an ungated query that came back
  /// not ready waits for an explicit `fetch()`.
  fn precondition_holds(&self) -> bool {
    self.enabled.as_ref().is_some_and(|enabled| enabled())
  }

  fn start_fetch(&mut self) {
    if let Some(enabled) = &self.enabled {
      if !enabled() {
        self.receiver = None;
        self.state = QueryState::NotReady;
        return;
      }
    }

    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(result);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("gated", &self.enabled.is_some())
      .finish_non_exhaustive()
  }
}
