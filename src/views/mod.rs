//! Presentation-ready views derived from cached collections.

pub mod aggregate;
pub mod display;
pub mod filters;
pub mod sorting;

pub use aggregate::{aggregate, summarize, CategoryCounts, DashboardSummary, RegionGroup, RegionKey};
pub use filters::{EntrepreneurFilter, Filter, PostFilter, ResourceFilter, StoryFilter};
pub use sorting::{newest_first, Timestamped};
