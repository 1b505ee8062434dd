//! Filter predicates and facet values for the list views.

use std::collections::BTreeSet;

use crate::directory::{
  BusinessCategory, CommunityPost, Entrepreneur, ResourceCategory, ResourceType, SuccessStory,
  TrainingResource,
};

/// A predicate over one kind of entity
pub trait Filter<T> {
  fn matches(&self, item: &T) -> bool;

  /// Items that match, in their original order
  fn apply<'a>(&self, items: &'a [T]) -> Vec<&'a T> {
    items.iter().filter(|item| self.matches(item)).collect()
  }
}

/// `None` means "all"
fn accepts<T: PartialEq>(wanted: &Option<T>, actual: &T) -> bool {
  wanted.as_ref().map_or(true, |w| w == actual)
}

/// Directory filter: free-text search plus exact location and category.
#[derive(Debug, Clone, Default)]
pub struct EntrepreneurFilter {
  /// Case-insensitive substring of name, village, panchayat or district
  pub search: String,
  pub state: Option<String>,
  pub district: Option<String>,
  pub category: Option<BusinessCategory>,
}

impl Filter<Entrepreneur> for EntrepreneurFilter {
  fn matches(&self, e: &Entrepreneur) -> bool {
    let query = self.search.trim().to_lowercase();
    let matches_search = query.is_empty()
      || [&e.full_name, &e.village, &e.panchayat, &e.district]
        .iter()
        .any(|field| field.to_lowercase().contains(&query));

    matches_search
      && accepts(&self.state, &e.state)
      && accepts(&self.district, &e.district)
      && accepts(&self.category, &e.business_category)
  }
}

#[derive(Debug, Clone, Default)]
pub struct StoryFilter {
  pub category: Option<BusinessCategory>,
  pub village: Option<String>,
}

impl Filter<SuccessStory> for StoryFilter {
  fn matches(&self, story: &SuccessStory) -> bool {
    accepts(&self.category, &story.category) && accepts(&self.village, &story.village)
  }
}

#[derive(Debug, Clone, Default)]
pub struct PostFilter {
  pub category: Option<BusinessCategory>,
  pub panchayat: Option<String>,
}

impl Filter<CommunityPost> for PostFilter {
  fn matches(&self, post: &CommunityPost) -> bool {
    accepts(&self.category, &post.category) && accepts(&self.panchayat, &post.panchayat)
  }
}

#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
  pub category: Option<ResourceCategory>,
  pub resource_type: Option<ResourceType>,
}

impl Filter<TrainingResource> for ResourceFilter {
  fn matches(&self, resource: &TrainingResource) -> bool {
    accepts(&self.category, &resource.category)
      && accepts(&self.resource_type, &resource.resource_type)
  }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
  values
    .collect::<BTreeSet<_>>()
    .into_iter()
    .map(String::from)
    .collect()
}

/// Distinct states, sorted
pub fn states(entrepreneurs: &[Entrepreneur]) -> Vec<String> {
  distinct_sorted(entrepreneurs.iter().map(|e| e.state.as_str()))
}

/// Distinct districts, sorted, limited to `state` when one is selected
pub fn districts(entrepreneurs: &[Entrepreneur], state: Option<&str>) -> Vec<String> {
  distinct_sorted(
    entrepreneurs
      .iter()
      .filter(|e| state.map_or(true, |s| e.state == s))
      .map(|e| e.district.as_str()),
  )
}

pub fn story_villages(stories: &[SuccessStory]) -> Vec<String> {
  distinct_sorted(stories.iter().map(|s| s.village.as_str()))
}

pub fn post_panchayats(posts: &[CommunityPost]) -> Vec<String> {
  distinct_sorted(posts.iter().map(|p| p.panchayat.as_str()))
}
