//! Directory client that reads through the query cache.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::cache::QueryCache;
use crate::error::{SyncError, SyncResult};
use crate::gateway::RemoteDataGateway;
use crate::views::sorting::newest_first;

use super::keys::DirectoryKey;
use super::types::{CommunityPost, Entrepreneur, Principal, SuccessStory, TrainingResource};

type GatewaySlot = Option<Arc<dyn RemoteDataGateway>>;

/// Read facade used by views.
///
/// Every read goes through the shared `QueryCache`. The gateway slot starts
/// empty; until a gateway is connected, list reads return empty collections
/// and point reads fail with `GatewayNotReady`.
#[derive(Clone)]
pub struct DirectoryClient {
  slot: Arc<watch::Sender<GatewaySlot>>,
  cache: QueryCache,
}

impl DirectoryClient {
  /// Create a client with no gateway connected yet.
  pub fn new(cache: QueryCache) -> Self {
    let (slot, _) = watch::channel(None);
    Self {
      slot: Arc::new(slot),
      cache,
    }
  }

  /// Create a client that is ready immediately.
  pub fn connected(cache: QueryCache, gateway: Arc<dyn RemoteDataGateway>) -> Self {
    let client = Self::new(cache);
    client.connect(gateway);
    client
  }

  /// Install the gateway and wake everything waiting for readiness.
  pub fn connect(&self, gateway: Arc<dyn RemoteDataGateway>) {
    info!("gateway connected");
    self.slot.send_replace(Some(gateway));
  }

  /// Drop the gateway, returning the client to the not-ready state.
  pub fn disconnect(&self) {
    info!("gateway disconnected");
    self.slot.send_replace(None);
  }

  pub fn is_ready(&self) -> bool {
    self.slot.borrow().is_some()
  }

  /// Resolve once a gateway is connected.
  pub async fn wait_ready(&self) {
    let mut receiver = self.slot.subscribe();
    // The sender lives in `self`, so the channel cannot close while we wait
    let _ = receiver.wait_for(|slot| slot.is_some()).await;
  }

  pub fn cache(&self) -> &QueryCache {
    &self.cache
  }

  pub(crate) fn gateway(&self) -> Option<Arc<dyn RemoteDataGateway>> {
    self.slot.borrow().clone()
  }

  /// Get all entrepreneurs, empty while the gateway is not ready.
  pub async fn list_entrepreneurs(&self) -> SyncResult<Vec<Entrepreneur>> {
    let Some(gateway) = self.gateway() else {
      debug!("gateway not ready, no entrepreneurs yet");
      return Ok(Vec::new());
    };

    let result = self
      .cache
      .get(&DirectoryKey::Entrepreneurs.cache_key(), move || async move {
        gateway.list_entrepreneurs().await
      })
      .await?;

    Ok(result.data)
  }

  /// Get a single entrepreneur by identity.
  ///
  /// Fails while the gateway is not ready, since an empty answer would
  /// hide an entity that exists.
  pub async fn get_entrepreneur(&self, id: &Principal) -> SyncResult<Entrepreneur> {
    let gateway = self.gateway().ok_or(SyncError::GatewayNotReady)?;
    let key = DirectoryKey::Entrepreneur { id: id.clone() };
    let id = id.clone();

    let result = self
      .cache
      .get(&key.cache_key(), move || async move {
        gateway.get_entrepreneur(&id).await
      })
      .await?;

    Ok(result.data)
  }

  /// Get all success stories, newest first.
  pub async fn list_success_stories(&self) -> SyncResult<Vec<SuccessStory>> {
    let Some(gateway) = self.gateway() else {
      debug!("gateway not ready, no success stories yet");
      return Ok(Vec::new());
    };

    let result = self
      .cache
      .get(&DirectoryKey::SuccessStories.cache_key(), move || async move {
        gateway.list_success_stories().await
      })
      .await?;

    Ok(newest_first(result.data))
  }

  /// Get all training resources in store order.
  pub async fn list_training_resources(&self) -> SyncResult<Vec<TrainingResource>> {
    let Some(gateway) = self.gateway() else {
      debug!("gateway not ready, no training resources yet");
      return Ok(Vec::new());
    };

    let result = self
      .cache
      .get(&DirectoryKey::TrainingResources.cache_key(), move || async move {
        gateway.list_training_resources().await
      })
      .await?;

    Ok(result.data)
  }

  /// Get all community posts, newest first.
  pub async fn list_community_posts(&self) -> SyncResult<Vec<CommunityPost>> {
    let Some(gateway) = self.gateway() else {
      debug!("gateway not ready, no community posts yet");
      return Ok(Vec::new());
    };

    let result = self
      .cache
      .get(&DirectoryKey::CommunityPosts.cache_key(), move || async move {
        gateway.list_community_posts().await
      })
      .await?;

    Ok(newest_first(result.data))
  }
}
