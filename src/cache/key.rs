//! Hierarchical cache keys.
//!
//! A key is an ordered token sequence (`["staff", "list", "<filter>"]`).
//! Nesting makes invalidation scopable: invalidating the `["staff", "list"]`
//! prefix hits every cached staff list regardless of its filter, without
//! enumerating the filters.

use serde::Serialize;

/// The ordered token sequence addressing one cached read result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
  /// Root key for a resource (`staff`, `jobs`, ...).
  pub fn root(resource: &str) -> Self {
    Self(vec![resource.to_string()])
  }

  /// Extend the key with one more token.
  pub fn push(mut self, token: impl Into<String>) -> Self {
    self.0.push(token.into());
    self
  }

  /// Extend the key with the canonical serialization of a filter.
  ///
  /// Serialization is `serde_json::to_string`, which is deterministic for
  /// structs (declaration order), so two value-equal filters always yield
  /// the same token and any differing field yields a different one.
  pub fn push_filter<F: Serialize>(self, filter: &F) -> Self {
    let token = serde_json::to_string(filter).unwrap_or_default();
    self.push(token)
  }

  /// Token-prefix containment: `self` is `prefix` or nested under it.
  pub fn starts_with(&self, prefix: &QueryKey) -> bool {
    self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
  }

  pub fn tokens(&self) -> &[String] {
    &self.0
  }
}

impl std::fmt::Display for QueryKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0.join("/"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Serialize, Clone)]
  #[serde(rename_all = "camelCase")]
  struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
  }

  fn list_key(filter: &Filter) -> QueryKey {
    QueryKey::root("staff").push("list").push_filter(filter)
  }

  #[test]
  fn test_value_equal_filters_produce_identical_keys() {
    let f1 = Filter {
      location: Some("NY".to_string()),
      skills: vec!["rust".to_string()],
      page: Some(1),
    };
    let f2 = f1.clone();
    assert_eq!(list_key(&f1), list_key(&f2));
  }

  #[test]
  fn test_any_differing_field_produces_different_keys() {
    let base = Filter {
      location: Some("NY".to_string()),
      skills: vec!["rust".to_string()],
      page: Some(1),
    };

    let location = Filter {
      location: Some("SF".to_string()),
      ..base.clone()
    };
    let skills = Filter {
      skills: vec!["rust".to_string(), "go".to_string()],
      ..base.clone()
    };
    let page = Filter {
      page: Some(2),
      ..base.clone()
    };
    let unset = Filter {
      location: None,
      ..base.clone()
    };

    assert_ne!(list_key(&base), list_key(&location));
    assert_ne!(list_key(&base), list_key(&skills));
    assert_ne!(list_key(&base), list_key(&page));
    assert_ne!(list_key(&base), list_key(&unset));
  }

  #[test]
  fn test_prefix_containment() {
    let filter = Filter {
      location: None,
      skills: Vec::new(),
      page: Some(3),
    };
    let root = QueryKey::root("staff");
    let lists = QueryKey::root("staff").push("list");
    let list = list_key(&filter);
    let detail = QueryKey::root("staff").push("detail").push("42");

    assert!(list.starts_with(&root));
    assert!(list.starts_with(&lists));
    assert!(detail.starts_with(&root));
    assert!(!detail.starts_with(&lists));
    assert!(!lists.starts_with(&list));
    assert!(!list.starts_with(&QueryKey::root("jobs")));
  }
}
