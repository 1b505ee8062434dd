//! Boundary to the remote data store.
//!
//! This module defines the `RemoteDataGateway` trait - the nine operations
//! the synchronization layer consumes - and the error they may fail with.

mod http;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use crate::directory::{CommunityPost, Entrepreneur, Principal, SuccessStory, TrainingResource};

pub use http::HttpGateway;

/// Failure reported by a gateway call.
///
/// The remote store gives no typed detail beyond a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
  /// The request never produced a usable response
  #[error("transport error: {0}")]
  Transport(String),

  /// The remote store answered and refused the request
  #[error("rejected by remote store: {0}")]
  Rejected(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Read and write operations against the remote entity collections.
///
/// Identities are assigned by the store; writes return nothing.
#[async_trait]
pub trait RemoteDataGateway: Send + Sync {
  async fn list_entrepreneurs(&self) -> GatewayResult<Vec<Entrepreneur>>;

  async fn get_entrepreneur(&self, id: &Principal) -> GatewayResult<Entrepreneur>;

  async fn register_entrepreneur(&self, entrepreneur: Entrepreneur) -> GatewayResult<()>;

  async fn list_success_stories(&self) -> GatewayResult<Vec<SuccessStory>>;

  async fn add_success_story(&self, story: SuccessStory) -> GatewayResult<()>;

  async fn list_training_resources(&self) -> GatewayResult<Vec<TrainingResource>>;

  async fn add_training_resource(&self, resource: TrainingResource) -> GatewayResult<()>;

  async fn list_community_posts(&self) -> GatewayResult<Vec<CommunityPost>>;

  async fn add_community_post(&self, post: CommunityPost) -> GatewayResult<()>;
}
