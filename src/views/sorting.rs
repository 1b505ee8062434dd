use crate::directory::{CommunityPost, SuccessStory, Time};

/// Entities that carry a creation timestamp
pub trait Timestamped {
  fn timestamp(&self) -> Time;
}

impl Timestamped for SuccessStory {
  fn timestamp(&self) -> Time {
    self.date
  }
}

impl Timestamped for CommunityPost {
  fn timestamp(&self) -> Time {
    self.timestamp
  }
}

/// Order `items` most recent first.
///
/// The remote store returns collections in no particular order; entries
/// with equal timestamps keep their input order.
pub fn newest_first<T: Timestamped>(mut items: Vec<T>) -> Vec<T> {
  // slice::sort_by is stable
  items.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
  items
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::directory::fixtures::story;

  #[test]
  fn test_equal_timestamps_keep_input_order() {
    let stories = vec![story(1, 5), story(2, 3), story(3, 3), story(4, 1)];

    let sorted = newest_first(stories);

    assert_eq!(sorted.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
  }

  #[test]
  fn test_reverses_ascending_input() {
    let stories = vec![story(1, 1), story(2, 3), story(3, 3), story(4, 5)];

    let sorted = newest_first(stories);

    assert_eq!(sorted.iter().map(|s| s.id).collect::<Vec<_>>(), vec![4, 2, 3, 1]);
  }

  #[test]
  fn test_empty() {
    assert!(newest_first(Vec::<SuccessStory>::new()).is_empty());
  }
}
