use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::{BusinessCategory, Gender, ResourceCategory, ResourceType};

/// Nanoseconds since the Unix epoch, as issued by the remote store
pub type Time = i64;

/// Opaque identity token issued by the external identity system.
///
/// Only ever compared and used as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
  pub fn new(text: impl Into<String>) -> Self {
    Self(text.into())
  }

  /// Placeholder identity for entities whose identity the store assigns
  pub fn anonymous() -> Self {
    Self::new("2vxsx-fae")
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Principal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A registered village entrepreneur
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entrepreneur {
  pub id: Principal,
  pub full_name: String,
  pub age: u32,
  pub gender: Gender,
  pub contact_info: String,
  pub village: String,
  pub panchayat: String,
  pub district: String,
  pub state: String,
  pub business_category: BusinessCategory,
  #[serde(default)]
  pub skills: Vec<String>,
  pub bio: String,
}

/// A published success story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessStory {
  pub id: u64,
  pub title: String,
  pub content: String,
  pub author_name: String,
  pub village: String,
  pub category: BusinessCategory,
  pub date: Time,
}

/// A link to external training material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingResource {
  pub id: u64,
  pub url: String,
  pub title: String,
  pub description: String,
  pub resource_type: ResourceType,
  pub category: ResourceCategory,
}

/// A message on the community board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityPost {
  pub id: u64,
  pub author: Principal,
  pub village: String,
  pub panchayat: String,
  pub message: String,
  pub category: BusinessCategory,
  pub timestamp: Time,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_entrepreneur_wire_format() {
    let json = serde_json::json!({
      "id": "aaaaa-aa",
      "fullName": "Lakshmi Devi",
      "age": 34,
      "gender": "female",
      "contactInfo": "98450 00000",
      "village": "Hosahalli",
      "panchayat": "Kasaba",
      "district": "Mandya",
      "state": "Karnataka",
      "businessCategory": "agriculture",
      "skills": ["organic farming"],
      "bio": "Grows millets"
    });

    let entrepreneur: Entrepreneur = serde_json::from_value(json).unwrap();
    assert_eq!(entrepreneur.id, Principal::new("aaaaa-aa"));
    assert_eq!(entrepreneur.business_category, BusinessCategory::Agriculture);
    assert_eq!(entrepreneur.skills, vec!["organic farming".to_string()]);
  }

  #[test]
  fn test_missing_skills_defaults_to_empty() {
    let json = serde_json::json!({
      "id": "p",
      "fullName": "Ravi",
      "age": 40,
      "gender": "male",
      "contactInfo": "",
      "village": "V",
      "panchayat": "P",
      "district": "D",
      "state": "S",
      "businessCategory": "food",
      "bio": ""
    });

    let entrepreneur: Entrepreneur = serde_json::from_value(json).unwrap();
    assert!(entrepreneur.skills.is_empty());
  }
}
