//! In-memory gateway for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::directory::{CommunityPost, Entrepreneur, Principal, SuccessStory, TrainingResource};

use super::{GatewayError, GatewayResult, RemoteDataGateway};

/// Mock gateway for tests.
///
/// Holds collections in memory, counts calls per operation and can be
/// told to fail reads or writes. With a gate, every call waits for one
/// permit before completing.
#[derive(Default)]
pub(crate) struct MockGateway {
  entrepreneurs: Mutex<Vec<Entrepreneur>>,
  stories: Mutex<Vec<SuccessStory>>,
  resources: Mutex<Vec<TrainingResource>>,
  posts: Mutex<Vec<CommunityPost>>,
  calls: Mutex<HashMap<&'static str, u32>>,
  fail_reads: AtomicBool,
  fail_writes: AtomicBool,
  latency: Duration,
  gate: Option<Arc<Semaphore>>,
}

impl MockGateway {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_entrepreneurs(self, entrepreneurs: Vec<Entrepreneur>) -> Self {
    *self.entrepreneurs.lock().unwrap() = entrepreneurs;
    self
  }

  pub fn with_stories(self, stories: Vec<SuccessStory>) -> Self {
    *self.stories.lock().unwrap() = stories;
    self
  }

  pub fn with_posts(self, posts: Vec<CommunityPost>) -> Self {
    *self.posts.lock().unwrap() = posts;
    self
  }

  /// Delay every call, so concurrent callers overlap.
  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = latency;
    self
  }

  /// Hold every call until a permit is added to `gate`.
  pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
    self.gate = Some(gate);
    self
  }

  pub fn set_fail_reads(&self, fail: bool) {
    self.fail_reads.store(fail, Ordering::SeqCst);
  }

  pub fn set_fail_writes(&self, fail: bool) {
    self.fail_writes.store(fail, Ordering::SeqCst);
  }

  /// Number of times `operation` was called.
  pub fn call_count(&self, operation: &str) -> u32 {
    self
      .calls
      .lock()
      .unwrap()
      .get(operation)
      .copied()
      .unwrap_or(0)
  }

  async fn enter(&self, operation: &'static str, write: bool) -> GatewayResult<()> {
    *self.calls.lock().unwrap().entry(operation).or_default() += 1;
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }
    if let Some(gate) = &self.gate {
      gate
        .acquire()
        .await
        .map_err(|_| GatewayError::Transport("gate closed".to_string()))?
        .forget();
    }

    let failing = if write {
      &self.fail_writes
    } else {
      &self.fail_reads
    };
    if failing.load(Ordering::SeqCst) {
      return Err(GatewayError::Rejected(format!("{} refused", operation)));
    }
    Ok(())
  }
}

#[async_trait]
impl RemoteDataGateway for MockGateway {
  async fn list_entrepreneurs(&self) -> GatewayResult<Vec<Entrepreneur>> {
    self.enter("list_entrepreneurs", false).await?;
    Ok(self.entrepreneurs.lock().unwrap().clone())
  }

  async fn get_entrepreneur(&self, id: &Principal) -> GatewayResult<Entrepreneur> {
    self.enter("get_entrepreneur", false).await?;
    self
      .entrepreneurs
      .lock()
      .unwrap()
      .iter()
      .find(|e| &e.id == id)
      .cloned()
      .ok_or_else(|| GatewayError::Rejected(format!("no entrepreneur {}", id)))
  }

  async fn register_entrepreneur(&self, entrepreneur: Entrepreneur) -> GatewayResult<()> {
    self.enter("register_entrepreneur", true).await?;
    self.entrepreneurs.lock().unwrap().push(entrepreneur);
    Ok(())
  }

  async fn list_success_stories(&self) -> GatewayResult<Vec<SuccessStory>> {
    self.enter("list_success_stories", false).await?;
    Ok(self.stories.lock().unwrap().clone())
  }

  async fn add_success_story(&self, story: SuccessStory) -> GatewayResult<()> {
    self.enter("add_success_story", true).await?;
    self.stories.lock().unwrap().push(story);
    Ok(())
  }

  async fn list_training_resources(&self) -> GatewayResult<Vec<TrainingResource>> {
    self.enter("list_training_resources", false).await?;
    Ok(self.resources.lock().unwrap().clone())
  }

  async fn add_training_resource(&self, resource: TrainingResource) -> GatewayResult<()> {
    self.enter("add_training_resource", true).await?;
    self.resources.lock().unwrap().push(resource);
    Ok(())
  }

  async fn list_community_posts(&self) -> GatewayResult<Vec<CommunityPost>> {
    self.enter("list_community_posts", false).await?;
    Ok(self.posts.lock().unwrap().clone())
  }

  async fn add_community_post(&self, post: CommunityPost) -> GatewayResult<()> {
    self.enter("add_community_post", true).await?;
    self.posts.lock().unwrap().push(post);
    Ok(())
  }
}
