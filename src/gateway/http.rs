use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::{Config, GatewayConfig};
use crate::directory::{CommunityPost, Entrepreneur, Principal, SuccessStory, TrainingResource};

use super::{GatewayError, GatewayResult, RemoteDataGateway};

/// Remote store client speaking JSON over HTTP
#[derive(Clone)]
pub struct HttpGateway {
  client: reqwest::Client,
  base: Url,
  token: Option<String>,
}

impl HttpGateway {
  pub fn new(config: &GatewayConfig) -> Result<Self> {
    let base = Url::parse(&config.url)
      .map_err(|e| eyre!("Invalid gateway URL {}: {}", config.url, e))?;
    if base.cannot_be_a_base() {
      return Err(eyre!("Gateway URL {} cannot be used as a base", config.url));
    }

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      client,
      base,
      token: Config::get_gateway_token(),
    })
  }

  /// Build the URL for a path below the base URL
  fn endpoint(&self, segments: &[&str]) -> GatewayResult<Url> {
    let mut url = self.base.clone();
    url
      .path_segments_mut()
      .map_err(|_| GatewayError::Transport(format!("{} cannot be a base URL", self.base)))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match &self.token {
      Some(token) => request.bearer_auth(token),
      None => request,
    }
  }

  async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> GatewayResult<T> {
    let url = self.endpoint(segments)?;
    debug!(%url, "GET");

    let response = self
      .authorize(self.client.get(url.clone()))
      .send()
      .await
      .map_err(|e| GatewayError::Transport(format!("Failed to reach {}: {}", url, e)))?;

    let response = check_status(response).await?;
    response
      .json::<T>()
      .await
      .map_err(|e| GatewayError::Transport(format!("Failed to decode response from {}: {}", url, e)))
  }

  async fn post_json<B: Serialize + Sync>(&self, segments: &[&str], body: &B) -> GatewayResult<()> {
    let url = self.endpoint(segments)?;
    debug!(%url, "POST");

    let response = self
      .authorize(self.client.post(url.clone()).json(body))
      .send()
      .await
      .map_err(|e| GatewayError::Transport(format!("Failed to reach {}: {}", url, e)))?;

    check_status(response).await?;
    Ok(())
  }
}

/// Turn a non-success status into a rejection carrying the response body
async fn check_status(response: reqwest::Response) -> GatewayResult<reqwest::Response> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let body = response.text().await.unwrap_or_default();
  let detail = if body.trim().is_empty() {
    status.to_string()
  } else {
    format!("{}: {}", status, body.trim())
  };
  Err(GatewayError::Rejected(detail))
}

#[async_trait]
impl RemoteDataGateway for HttpGateway {
  async fn list_entrepreneurs(&self) -> GatewayResult<Vec<Entrepreneur>> {
    self.get_json(&["entrepreneurs"]).await
  }

  async fn get_entrepreneur(&self, id: &Principal) -> GatewayResult<Entrepreneur> {
    self.get_json(&["entrepreneurs", id.as_str()]).await
  }

  async fn register_entrepreneur(&self, entrepreneur: Entrepreneur) -> GatewayResult<()> {
    self.post_json(&["entrepreneurs"], &entrepreneur).await
  }

  async fn list_success_stories(&self) -> GatewayResult<Vec<SuccessStory>> {
    self.get_json(&["stories"]).await
  }

  async fn add_success_story(&self, story: SuccessStory) -> GatewayResult<()> {
    self.post_json(&["stories"], &story).await
  }

  async fn list_training_resources(&self) -> GatewayResult<Vec<TrainingResource>> {
    self.get_json(&["resources"]).await
  }

  async fn add_training_resource(&self, resource: TrainingResource) -> GatewayResult<()> {
    self.post_json(&["resources"], &resource).await
  }

  async fn list_community_posts(&self) -> GatewayResult<Vec<CommunityPost>> {
    self.get_json(&["posts"]).await
  }

  async fn add_community_post(&self, post: CommunityPost) -> GatewayResult<()> {
    self.post_json(&["posts"], &post).await
  }
}
