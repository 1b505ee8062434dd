use std::fmt;

/// Name of a logical resource, optionally parameterized by an entity id.
///
/// A key without an id doubles as a prefix when invalidating: it matches
/// itself and every id-parameterized key of the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
  resource: &'static str,
  id: Option<String>,
}

impl CacheKey {
  pub fn new(resource: &'static str) -> Self {
    Self { resource, id: None }
  }

  pub fn with_id(resource: &'static str, id: impl Into<String>) -> Self {
    Self {
      resource,
      id: Some(id.into()),
    }
  }

  pub fn resource(&self) -> &'static str {
    self.resource
  }

  pub fn id(&self) -> Option<&str> {
    self.id.as_deref()
  }

  /// Whether `other` is covered by this key used as an invalidation target.
  pub fn matches(&self, other: &CacheKey) -> bool {
    if self.resource != other.resource {
      return false;
    }
    match &self.id {
      None => true,
      Some(id) => other.id.as_deref() == Some(id.as_str()),
    }
  }
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.id {
      Some(id) => write!(f, "{}/{}", self.resource, id),
      None => f.write_str(self.resource),
    }
  }
}
