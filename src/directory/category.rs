//! Closed enumerations used by directory entities, with their display mappings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a category name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
  kind: &'static str,
  value: String,
}

/// Line of business an entrepreneur, story or post belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessCategory {
  Agriculture,
  Food,
  Environment,
  Sustainability,
  Other,
}

impl BusinessCategory {
  /// Every category, in display order
  pub const ALL: [BusinessCategory; 5] = [
    BusinessCategory::Agriculture,
    BusinessCategory::Food,
    BusinessCategory::Environment,
    BusinessCategory::Sustainability,
    BusinessCategory::Other,
  ];

  /// Position of this category within `ALL`
  pub fn index(self) -> usize {
    match self {
      BusinessCategory::Agriculture => 0,
      BusinessCategory::Food => 1,
      BusinessCategory::Environment => 2,
      BusinessCategory::Sustainability => 3,
      BusinessCategory::Other => 4,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      BusinessCategory::Agriculture => "agriculture",
      BusinessCategory::Food => "food",
      BusinessCategory::Environment => "environment",
      BusinessCategory::Sustainability => "sustainability",
      BusinessCategory::Other => "other",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      BusinessCategory::Agriculture => "Agriculture",
      BusinessCategory::Food => "Food",
      BusinessCategory::Environment => "Environment",
      BusinessCategory::Sustainability => "Sustainability",
      BusinessCategory::Other => "Other",
    }
  }

  /// Compact label for dashboard breakdowns
  pub fn short_label(self) -> &'static str {
    match self {
      BusinessCategory::Agriculture => "Agri",
      BusinessCategory::Food => "Food",
      BusinessCategory::Environment => "Env",
      BusinessCategory::Sustainability => "Sustain",
      BusinessCategory::Other => "Other",
    }
  }

  pub fn icon(self) -> &'static str {
    match self {
      BusinessCategory::Agriculture => "🌾",
      BusinessCategory::Food => "🍱",
      BusinessCategory::Environment => "🌿",
      BusinessCategory::Sustainability => "♻️",
      BusinessCategory::Other => "💡",
    }
  }
}

impl fmt::Display for BusinessCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for BusinessCategory {
  type Err = ParseEnumError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lower = s.trim().to_lowercase();
    BusinessCategory::ALL
      .into_iter()
      .find(|c| c.as_str() == lower)
      .ok_or(ParseEnumError {
        kind: "business category",
        value: s.to_string(),
      })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Female,
  Male,
  Other,
}

impl Gender {
  pub const ALL: [Gender; 3] = [Gender::Female, Gender::Male, Gender::Other];

  pub fn as_str(self) -> &'static str {
    match self {
      Gender::Female => "female",
      Gender::Male => "male",
      Gender::Other => "other",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Gender::Female => "Female",
      Gender::Male => "Male",
      Gender::Other => "Other",
    }
  }
}

impl FromStr for Gender {
  type Err = ParseEnumError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lower = s.trim().to_lowercase();
    Gender::ALL
      .into_iter()
      .find(|g| g.as_str() == lower)
      .ok_or(ParseEnumError {
        kind: "gender",
        value: s.to_string(),
      })
  }
}

/// Format of a training resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
  Video,
  Tool,
  Guide,
  Course,
}

impl ResourceType {
  pub const ALL: [ResourceType; 4] = [
    ResourceType::Course,
    ResourceType::Guide,
    ResourceType::Tool,
    ResourceType::Video,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      ResourceType::Video => "video",
      ResourceType::Tool => "tool",
      ResourceType::Guide => "guide",
      ResourceType::Course => "course",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      ResourceType::Video => "Video",
      ResourceType::Tool => "Tool",
      ResourceType::Guide => "Guide",
      ResourceType::Course => "Course",
    }
  }
}

impl FromStr for ResourceType {
  type Err = ParseEnumError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lower = s.trim().to_lowercase();
    ResourceType::ALL
      .into_iter()
      .find(|t| t.as_str() == lower)
      .ok_or(ParseEnumError {
        kind: "resource type",
        value: s.to_string(),
      })
  }
}

/// Topic of a training resource. Unlike `BusinessCategory` it has a
/// catch-all `General` topic instead of `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
  Agriculture,
  Food,
  Environment,
  Sustainability,
  General,
}

impl ResourceCategory {
  pub const ALL: [ResourceCategory; 5] = [
    ResourceCategory::Agriculture,
    ResourceCategory::Food,
    ResourceCategory::Environment,
    ResourceCategory::Sustainability,
    ResourceCategory::General,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      ResourceCategory::Agriculture => "agriculture",
      ResourceCategory::Food => "food",
      ResourceCategory::Environment => "environment",
      ResourceCategory::Sustainability => "sustainability",
      ResourceCategory::General => "general",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      ResourceCategory::Agriculture => "Agriculture",
      ResourceCategory::Food => "Food",
      ResourceCategory::Environment => "Environment",
      ResourceCategory::Sustainability => "Sustainability",
      ResourceCategory::General => "General",
    }
  }
}

impl FromStr for ResourceCategory {
  type Err = ParseEnumError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lower = s.trim().to_lowercase();
    ResourceCategory::ALL
      .into_iter()
      .find(|c| c.as_str() == lower)
      .ok_or(ParseEnumError {
        kind: "resource category",
        value: s.to_string(),
      })
  }
}
