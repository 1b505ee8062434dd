//! Entrepreneur registration form and the checks it must pass before submission.

use std::ops::RangeInclusive;

use super::category::{BusinessCategory, Gender};
use super::types::{Entrepreneur, Principal};

/// Ages accepted for registration
pub const AGE_RANGE: RangeInclusive<u32> = 14..=40;

/// Registration rejected before reaching the store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid registration: {}", .problems.join(", "))]
pub struct RegistrationError {
  pub problems: Vec<&'static str>,
}

/// Fields a new entrepreneur fills in.
#[derive(Debug, Clone)]
pub struct Registration {
  pub full_name: String,
  pub age: u32,
  pub gender: Gender,
  pub contact_info: String,
  pub village: String,
  pub panchayat: String,
  pub district: String,
  pub state: String,
  pub business_category: BusinessCategory,
  pub skills: Vec<String>,
  pub bio: String,
}

impl Registration {
  /// Everything wrong with the form, empty when it can be submitted.
  pub fn problems(&self) -> Vec<&'static str> {
    let required = [
      (&self.full_name, "full name is required"),
      (&self.village, "village is required"),
      (&self.panchayat, "panchayat is required"),
      (&self.district, "district is required"),
      (&self.state, "state is required"),
      (&self.contact_info, "contact info is required"),
      (&self.bio, "bio is required"),
    ];

    let mut problems: Vec<&'static str> = required
      .into_iter()
      .filter(|(value, _)| value.trim().is_empty())
      .map(|(_, problem)| problem)
      .collect();

    if !AGE_RANGE.contains(&self.age) {
      problems.push("age must be between 14 and 40");
    }
    if self.skills.iter().all(|skill| skill.trim().is_empty()) {
      problems.push("add at least one skill");
    }
    problems
  }

  /// Build the entity to submit. The store assigns the real identity.
  pub fn into_entrepreneur(self) -> Result<Entrepreneur, RegistrationError> {
    let problems = self.problems();
    if !problems.is_empty() {
      return Err(RegistrationError { problems });
    }

    let mut skills: Vec<String> = Vec::new();
    for skill in self.skills.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
      if !skills.iter().any(|existing| existing == skill) {
        skills.push(skill.to_string());
      }
    }

    Ok(Entrepreneur {
      id: Principal::anonymous(),
      full_name: self.full_name.trim().to_string(),
      age: self.age,
      gender: self.gender,
      contact_info: self.contact_info.trim().to_string(),
      village: self.village.trim().to_string(),
      panchayat: self.panchayat.trim().to_string(),
      district: self.district.trim().to_string(),
      state: self.state.trim().to_string(),
      business_category: self.business_category,
      skills,
      bio: self.bio.trim().to_string(),
    })
  }
}
