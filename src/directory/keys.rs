//! Caching implementations for directory types.

use crate::cache::{CacheKey, Cacheable};

use super::types::{CommunityPost, Entrepreneur, Principal, SuccessStory, TrainingResource};

// ============================================================================
// Cacheable implementations
// ============================================================================

impl Cacheable for Entrepreneur {
  fn entity_type() -> &'static str {
    "entrepreneur"
  }
}

impl Cacheable for SuccessStory {
  fn entity_type() -> &'static str {
    "success_story"
  }
}

impl Cacheable for TrainingResource {
  fn entity_type() -> &'static str {
    "training_resource"
  }
}

impl Cacheable for CommunityPost {
  fn entity_type() -> &'static str {
    "community_post"
  }
}

// ============================================================================
// Query key types
// ============================================================================

const ENTREPRENEURS: &str = "entrepreneurs";
const ENTREPRENEUR: &str = "entrepreneur";
const SUCCESS_STORIES: &str = "success_stories";
const TRAINING_RESOURCES: &str = "training_resources";
const COMMUNITY_POSTS: &str = "community_posts";

/// Logical resources the directory reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectoryKey {
  /// Every registered entrepreneur
  Entrepreneurs,
  /// One entrepreneur by identity
  Entrepreneur { id: Principal },
  /// Every point lookup of an entrepreneur, as an invalidation prefix
  AnyEntrepreneur,
  SuccessStories,
  TrainingResources,
  CommunityPosts,
}

impl DirectoryKey {
  pub fn cache_key(&self) -> CacheKey {
    match self {
      Self::Entrepreneurs => CacheKey::new(ENTREPRENEURS),
      Self::Entrepreneur { id } => CacheKey::with_id(ENTREPRENEUR, id.as_str()),
      Self::AnyEntrepreneur => CacheKey::new(ENTREPRENEUR),
      Self::SuccessStories => CacheKey::new(SUCCESS_STORIES),
      Self::TrainingResources => CacheKey::new(TRAINING_RESOURCES),
      Self::CommunityPosts => CacheKey::new(COMMUNITY_POSTS),
    }
  }
}
