//! Writes against the remote store, followed by targeted invalidation.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

use crate::cache::CacheKey;
use crate::error::{SyncError, SyncResult};

use super::client::DirectoryClient;
use super::keys::DirectoryKey;
use super::types::{CommunityPost, Entrepreneur, SuccessStory, TrainingResource};

/// A single write, carrying its payload
#[derive(Debug, Clone)]
pub enum Mutation {
  RegisterEntrepreneur(Entrepreneur),
  AddSuccessStory(SuccessStory),
  AddTrainingResource(TrainingResource),
  AddCommunityPost(CommunityPost),
}

impl Mutation {
  pub fn kind(&self) -> MutationKind {
    match self {
      Mutation::RegisterEntrepreneur(_) => MutationKind::RegisterEntrepreneur,
      Mutation::AddSuccessStory(_) => MutationKind::AddSuccessStory,
      Mutation::AddTrainingResource(_) => MutationKind::AddTrainingResource,
      Mutation::AddCommunityPost(_) => MutationKind::AddCommunityPost,
    }
  }
}

/// The kind of a write, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
  RegisterEntrepreneur,
  AddSuccessStory,
  AddTrainingResource,
  AddCommunityPost,
}

impl MutationKind {
  /// Cache keys whose data a successful write of this kind changes.
  pub fn invalidates(self) -> Vec<CacheKey> {
    let keys = match self {
      // A registration can also replace the caller's own profile
      MutationKind::RegisterEntrepreneur => {
        vec![DirectoryKey::Entrepreneurs, DirectoryKey::AnyEntrepreneur]
      }
      MutationKind::AddSuccessStory => vec![DirectoryKey::SuccessStories],
      MutationKind::AddTrainingResource => vec![DirectoryKey::TrainingResources],
      MutationKind::AddCommunityPost => vec![DirectoryKey::CommunityPosts],
    };
    keys.iter().map(DirectoryKey::cache_key).collect()
  }
}

impl fmt::Display for MutationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      MutationKind::RegisterEntrepreneur => "register entrepreneur",
      MutationKind::AddSuccessStory => "add success story",
      MutationKind::AddTrainingResource => "add training resource",
      MutationKind::AddCommunityPost => "add community post",
    };
    f.write_str(name)
  }
}

type PendingCounts = Arc<Mutex<HashMap<MutationKind, usize>>>;

/// Marks a write of one kind as outstanding for as long as it lives.
struct PendingGuard {
  counts: PendingCounts,
  kind: MutationKind,
}

impl PendingGuard {
  fn enter(counts: &PendingCounts, kind: MutationKind) -> Self {
    *counts
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .entry(kind)
      .or_default() += 1;
    Self {
      counts: Arc::clone(counts),
      kind,
    }
  }
}

impl Drop for PendingGuard {
  fn drop(&mut self) {
    let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(count) = counts.get_mut(&self.kind) {
      *count = count.saturating_sub(1);
      if *count == 0 {
        counts.remove(&self.kind);
      }
    }
  }
}

/// Executes writes and invalidates the cache entries they affect.
///
/// Writes are not idempotent, so nothing is ever retried here. Callers
/// should keep the triggering control disabled while `is_pending` is true.
#[derive(Clone)]
pub struct MutationCoordinator {
  client: DirectoryClient,
  pending: PendingCounts,
}

impl MutationCoordinator {
  pub fn new(client: DirectoryClient) -> Self {
    Self {
      client,
      pending: Arc::default(),
    }
  }

  /// Whether a write of `kind` is still outstanding.
  pub fn is_pending(&self, kind: MutationKind) -> bool {
    self
      .pending
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .contains_key(&kind)
  }

  /// Run `mutation` once. On success the affected keys are invalidated
  /// before this returns; on failure the cache is left untouched.
  pub async fn execute(&self, mutation: Mutation) -> SyncResult<()> {
    let gateway = self.client.gateway().ok_or(SyncError::GatewayNotReady)?;
    let kind = mutation.kind();
    let _pending = PendingGuard::enter(&self.pending, kind);

    let result = match mutation {
      Mutation::RegisterEntrepreneur(entrepreneur) => gateway.register_entrepreneur(entrepreneur).await,
      Mutation::AddSuccessStory(story) => gateway.add_success_story(story).await,
      Mutation::AddTrainingResource(resource) => gateway.add_training_resource(resource).await,
      Mutation::AddCommunityPost(post) => gateway.add_community_post(post).await,
    };

    match result {
      Ok(()) => {
        for key in kind.invalidates() {
          self.client.cache().invalidate(&key);
        }
        info!(%kind, "write succeeded");
        Ok(())
      }
      Err(e) => {
        warn!(%kind, error = %e, "write failed");
        Err(SyncError::MutationFailure(e))
      }
    }
  }

  pub async fn register_entrepreneur(&self, entrepreneur: Entrepreneur) -> SyncResult<()> {
    self.execute(Mutation::RegisterEntrepreneur(entrepreneur)).await
  }

  pub async fn add_success_story(&self, story: SuccessStory) -> SyncResult<()> {
    self.execute(Mutation::AddSuccessStory(story)).await
  }

  pub async fn add_training_resource(&self, resource: TrainingResource) -> SyncResult<()> {
    self.execute(Mutation::AddTrainingResource(resource)).await
  }

  pub async fn add_community_post(&self, post: CommunityPost) -> SyncResult<()> {
    self.execute(Mutation::AddCommunityPost(post)).await
  }
}
