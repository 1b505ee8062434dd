//! Entity builders shared by tests.

use super::category::{BusinessCategory, Gender};
use super::types::{CommunityPost, Entrepreneur, Principal, SuccessStory, Time};

pub(crate) fn entrepreneur(
  id: &str,
  panchayat: &str,
  district: &str,
  state: &str,
  category: BusinessCategory,
) -> Entrepreneur {
  Entrepreneur {
    id: Principal::new(id),
    full_name: format!("Entrepreneur {}", id),
    age: 30,
    gender: Gender::Female,
    contact_info: String::new(),
    village: format!("{} village", panchayat),
    panchayat: panchayat.to_string(),
    district: district.to_string(),
    state: state.to_string(),
    business_category: category,
    skills: Vec::new(),
    bio: String::new(),
  }
}

pub(crate) fn story(id: u64, date: Time) -> SuccessStory {
  SuccessStory {
    id,
    title: format!("Story {}", id),
    content: String::new(),
    author_name: "Meena".to_string(),
    village: "Hosahalli".to_string(),
    category: BusinessCategory::Agriculture,
    date,
  }
}

pub(crate) fn post(id: u64, timestamp: Time) -> CommunityPost {
  CommunityPost {
    id,
    author: Principal::new("author"),
    village: "Hosahalli".to_string(),
    panchayat: "Kasaba".to_string(),
    message: format!("Post {}", id),
    category: BusinessCategory::Food,
    timestamp,
  }
}
