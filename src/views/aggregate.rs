//! Regional progress statistics derived from the entrepreneur list.
//!
//! Everything here is a pure function of its input and is recomputed on
//! every read; nothing is cached.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;

use crate::directory::{BusinessCategory, Entrepreneur};

/// Registrations each region aims for
pub const DEFAULT_TARGET: NonZeroU32 = match NonZeroU32::new(1000) {
  Some(target) => target,
  None => panic!("target must be non-zero"),
};

/// Grouping key: a panchayat within its district and state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionKey {
  pub panchayat: String,
  pub district: String,
  pub state: String,
}

impl RegionKey {
  fn of(entrepreneur: &Entrepreneur) -> Self {
    Self {
      panchayat: entrepreneur.panchayat.clone(),
      district: entrepreneur.district.clone(),
      state: entrepreneur.state.clone(),
    }
  }
}

/// Count per business category; every category is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts([u32; BusinessCategory::ALL.len()]);

impl CategoryCounts {
  pub fn get(&self, category: BusinessCategory) -> u32 {
    self.0[category.index()]
  }

  fn increment(&mut self, category: BusinessCategory) {
    self.0[category.index()] += 1;
  }

  /// Pairs in `BusinessCategory::ALL` order, zero counts included
  pub fn iter(&self) -> impl Iterator<Item = (BusinessCategory, u32)> + '_ {
    BusinessCategory::ALL
      .into_iter()
      .map(move |category| (category, self.get(category)))
  }

  pub fn sum(&self) -> u32 {
    self.0.iter().sum()
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionGroup {
  pub key: RegionKey,
  pub total: u32,
  pub categories: CategoryCounts,
  /// Percentage of the target reached, clamped to 100
  pub progress: f64,
}

/// Dashboard figures over the whole entrepreneur list
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
  pub regions: Vec<RegionGroup>,
  pub total_entrepreneurs: usize,
  pub total_regions: usize,
  pub total_states: usize,
}

/// Percentage of `target` reached by `total`, never above 100.
pub fn progress(total: u32, target: NonZeroU32) -> f64 {
  (f64::from(total) / f64::from(target.get()) * 100.0).min(100.0)
}

/// Group entrepreneurs by exact (panchayat, district, state).
///
/// Groups are ordered by total descending; ties keep the order in which
/// their region first appears in `entrepreneurs`.
pub fn aggregate(entrepreneurs: &[Entrepreneur], target: NonZeroU32) -> Vec<RegionGroup> {
  let mut positions: HashMap<RegionKey, usize> = HashMap::new();
  let mut groups: Vec<RegionGroup> = Vec::new();

  for entrepreneur in entrepreneurs {
    let key = RegionKey::of(entrepreneur);
    let position = *positions.entry(key).or_insert_with_key(|key| {
      groups.push(RegionGroup {
        key: key.clone(),
        total: 0,
        categories: CategoryCounts::default(),
        progress: 0.0,
      });
      groups.len() - 1
    });

    let group = &mut groups[position];
    group.total += 1;
    group.categories.increment(entrepreneur.business_category);
  }

  for group in &mut groups {
    group.progress = progress(group.total, target);
  }

  // Stable, so equal totals stay in first-appearance order
  groups.sort_by(|a, b| b.total.cmp(&a.total));
  groups
}

/// Regional groups plus overall counts for the dashboard header.
pub fn summarize(entrepreneurs: &[Entrepreneur], target: NonZeroU32) -> DashboardSummary {
  let regions = aggregate(entrepreneurs, target);
  let total_states = entrepreneurs
    .iter()
    .map(|e| e.state.as_str())
    .collect::<HashSet<_>>()
    .len();

  DashboardSummary {
    total_entrepreneurs: entrepreneurs.len(),
    total_regions: regions.len(),
    total_states,
    regions,
  }
}
