use chrono::{DateTime, Utc};

use crate::directory::Time;

fn to_datetime(timestamp: Time) -> Option<DateTime<Utc>> {
  (timestamp > 0).then(|| DateTime::from_timestamp_nanos(timestamp))
}

/// Calendar date of a story, e.g. "14 Nov 2023". Empty for unset timestamps.
pub fn story_date(timestamp: Time) -> String {
  to_datetime(timestamp)
    .map(|dt| dt.format("%-d %b %Y").to_string())
    .unwrap_or_default()
}

/// Date and time of a community post, "Just now" for unset timestamps.
pub fn post_time(timestamp: Time) -> String {
  to_datetime(timestamp)
    .map(|dt| dt.format("%-d %b %Y, %H:%M").to_string())
    .unwrap_or_else(|| "Just now".to_string())
}
