// lambda_pipeline/src/core/frozen.rs

//! Defines `FrozenMap<K, V>`, the immutable key/value container used for payloads
//! and dependency bags.
//!
//! A `FrozenMap` offers no way to change its entries once built. There is no `&mut`
//! access, no `insert`, no `remove`, and no `IndexMut`, so an attempted mutation is
//! rejected at compile time:
//!
//! ```compile_fail
//! use lambda_pipeline::FrozenMap;
//!
//! let map: FrozenMap<String, i64> = [("foo".to_string(), 1)].into_iter().collect();
//! map.insert("bar".to_string(), 2);
//! ```
//!
//! ```compile_fail
//! use lambda_pipeline::FrozenMap;
//!
//! let mut map: FrozenMap<String, i64> = [("foo".to_string(), 1)].into_iter().collect();
//! map["foo"] = 2;
//! ```
//!
//! Callers that need a mutable copy take a `snapshot()`, which never affects the map.

use crate::error::PipelineError;
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;
use std::sync::Arc;

/// Immutable, insertion-ordered map whose equality and hash ignore insertion order.
///
/// The hash is the XOR of the per-entry hashes. It is computed on first use and cached,
/// so two maps built from the same entries in any order are interchangeable as keys of
/// a `HashMap` or `HashSet`.
pub struct FrozenMap<K, V> {
  entries: Arc<IndexMap<K, V>>,
  hash: OnceCell<u64>,
}

impl<K, V> FrozenMap<K, V> {
  /// An empty map.
  pub fn new() -> Self {
    Self {
      entries: Arc::new(IndexMap::new()),
      hash: OnceCell::new(),
    }
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Iterates `(key, value)` pairs in insertion order.
  pub fn iter(&self) -> indexmap::map::Iter<'_, K, V> {
    self.entries.iter()
  }

  pub fn keys(&self) -> indexmap::map::Keys<'_, K, V> {
    self.entries.keys()
  }

  pub fn values(&self) -> indexmap::map::Values<'_, K, V> {
    self.entries.values()
  }
}

impl<K: Hash + Eq, V> FrozenMap<K, V> {
  pub fn get<Q>(&self, key: &Q) -> Option<&V>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.entries.get(key)
  }

  /// Like [`FrozenMap::get`], but an absent key is a `PipelineError::MissingKey`.
  pub fn try_get<Q>(&self, key: &Q) -> Result<&V, PipelineError>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + fmt::Debug + ?Sized,
  {
    self.entries.get(key).ok_or_else(|| PipelineError::MissingKey {
      key: format!("{:?}", key),
    })
  }

  pub fn contains_key<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.entries.contains_key(key)
  }
}

impl<K: Hash + Eq + Clone, V: Clone> FrozenMap<K, V> {
  /// Builds a new map from this one's entries followed by `entries`.
  /// Later entries win on key collisions. `self` is left untouched.
  pub fn with_entries<I>(&self, entries: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
  {
    let mut combined = self.snapshot();
    combined.extend(entries);
    Self::from(combined)
  }

  /// A plain, mutable copy of the entries. Changes to it never reach this map.
  pub fn snapshot(&self) -> IndexMap<K, V> {
    (*self.entries).clone()
  }
}

impl<K: Hash, V: Hash> FrozenMap<K, V> {
  /// The order-independent hash of this map. O(n) on the first call, cached afterwards.
  pub fn fingerprint(&self) -> u64 {
    *self.hash.get_or_init(|| {
      self
        .entries
        .iter()
        .fold(0u64, |acc, (key, value)| acc ^ entry_hash(key, value))
    })
  }
}

fn entry_hash<K: Hash, V: Hash>(key: &K, value: &V) -> u64 {
  let mut hasher = DefaultHasher::new();
  key.hash(&mut hasher);
  value.hash(&mut hasher);
  hasher.finish()
}

// Clone shares the entry store; the copy can never diverge because neither side can mutate it.
impl<K, V> Clone for FrozenMap<K, V> {
  fn clone(&self) -> Self {
    Self {
      entries: Arc::clone(&self.entries),
      hash: self.hash.clone(),
    }
  }
}

impl<K, V> Default for FrozenMap<K, V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K: Hash + Eq, V: PartialEq> PartialEq for FrozenMap<K, V> {
  fn eq(&self, other: &Self) -> bool {
    // IndexMap equality is already order-independent.
    Arc::ptr_eq(&self.entries, &other.entries) || *self.entries == *other.entries
  }
}

impl<K: Hash + Eq, V: Eq> Eq for FrozenMap<K, V> {}

impl<K: Hash, V: Hash> Hash for FrozenMap<K, V> {
  fn hash<H: Hasher>(&self, state: &mut H) {
    state.write_u64(self.fingerprint());
  }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for FrozenMap<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_map().entries(self.entries.iter()).finish()
  }
}

impl<K, Q, V> Index<&Q> for FrozenMap<K, V>
where
  K: Hash + Eq + Borrow<Q>,
  Q: Hash + Eq + ?Sized,
{
  type Output = V;

  /// Panics if the key is absent, like `HashMap`'s `Index`.
  fn index(&self, key: &Q) -> &V {
    self.entries.get(key).expect("FrozenMap: key not found")
  }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for FrozenMap<K, V> {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self::from(iter.into_iter().collect::<IndexMap<K, V>>())
  }
}

impl<K: Hash + Eq, V> From<IndexMap<K, V>> for FrozenMap<K, V> {
  fn from(entries: IndexMap<K, V>) -> Self {
    Self {
      entries: Arc::new(entries),
      hash: OnceCell::new(),
    }
  }
}

impl<K: Hash + Eq, V> From<HashMap<K, V>> for FrozenMap<K, V> {
  fn from(entries: HashMap<K, V>) -> Self {
    entries.into_iter().collect()
  }
}

impl<K: Hash + Eq, V, const N: usize> From<[(K, V); N]> for FrozenMap<K, V> {
  fn from(entries: [(K, V); N]) -> Self {
    entries.into_iter().collect()
  }
}

impl<'a, K, V> IntoIterator for &'a FrozenMap<K, V> {
  type Item = (&'a K, &'a V);
  type IntoIter = indexmap::map::Iter<'a, K, V>;

  fn into_iter(self) -> Self::IntoIter {
    self.entries.iter()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  fn entries() -> Vec<(String, i64)> {
    vec![("a".to_string(), 1), ("b".to_string(), 2), ("c".to_string(), 3)]
  }

  #[test]
  fn permutations_are_equal_and_hash_equal() {
    let forward: FrozenMap<String, i64> = entries().into_iter().collect();
    let backward: FrozenMap<String, i64> = entries().into_iter().rev().collect();
    let rotated: FrozenMap<String, i64> = vec![
      ("b".to_string(), 2),
      ("c".to_string(), 3),
      ("a".to_string(), 1),
    ]
    .into_iter()
    .collect();

    assert_eq!(forward, backward);
    assert_eq!(forward, rotated);
    assert_eq!(forward.fingerprint(), backward.fingerprint());
    assert_eq!(forward.fingerprint(), rotated.fingerprint());
  }

  #[test]
  fn permutations_collapse_in_a_hash_set() {
    let mut set = HashSet::new();
    set.insert(entries().into_iter().collect::<FrozenMap<String, i64>>());
    set.insert(entries().into_iter().rev().collect::<FrozenMap<String, i64>>());
    assert_eq!(set.len(), 1);
  }

  #[test]
  fn different_entries_are_not_equal() {
    let one: FrozenMap<String, i64> = entries().into_iter().collect();
    let other = one.with_entries([("a".to_string(), 100)]);
    assert_ne!(one, other);
    assert_ne!(one.fingerprint(), other.fingerprint());
  }

  #[test]
  fn fingerprint_is_cached() {
    let map: FrozenMap<String, i64> = entries().into_iter().collect();
    assert!(map.hash.get().is_none());
    let first = map.fingerprint();
    assert_eq!(map.hash.get(), Some(&first));
    assert_eq!(map.fingerprint(), first);
  }

  #[test]
  fn empty_map_hashes_to_zero() {
    let map: FrozenMap<String, i64> = FrozenMap::new();
    assert!(map.is_empty());
    assert_eq!(map.fingerprint(), 0);
  }

  #[test]
  fn lookups() {
    let map: FrozenMap<String, i64> = entries().into_iter().collect();
    assert_eq!(map.len(), 3);
    assert_eq!(map.get("b"), Some(&2));
    assert_eq!(map["c"], 3);
    assert!(map.contains_key("a"));
    assert!(!map.contains_key("z"));
    assert_eq!(map.get("z"), None);
    match map.try_get("z") {
      Err(PipelineError::MissingKey { key }) => assert_eq!(key, "\"z\""),
      other => panic!("Expected MissingKey, got {:?}", other),
    }
  }

  #[test]
  fn iteration_follows_insertion_order() {
    let map: FrozenMap<String, i64> = entries().into_iter().rev().collect();
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["c", "b", "a"]);
    // Stable across repeated iterations.
    let again: Vec<&str> = map.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, again);
  }

  #[test]
  fn snapshot_changes_do_not_reach_the_map() {
    let map: FrozenMap<String, i64> = entries().into_iter().collect();
    let before = map.fingerprint();

    let mut copy = map.snapshot();
    copy.insert("d".to_string(), 4);
    copy.shift_remove("a");

    assert_eq!(map.len(), 3);
    assert_eq!(map.get("a"), Some(&1));
    assert!(!map.contains_key("d"));
    assert_eq!(map.fingerprint(), before);
  }

  #[test]
  fn with_entries_builds_a_new_map_and_keeps_the_base() {
    let base: FrozenMap<String, i64> = entries().into_iter().collect();
    let extended = base.with_entries([("d".to_string(), 4), ("a".to_string(), 10)]);

    assert_eq!(extended.len(), 4);
    assert_eq!(extended["a"], 10);
    assert_eq!(extended["d"], 4);
    assert_eq!(base.len(), 3);
    assert_eq!(base["a"], 1);
  }

  #[test]
  fn clones_compare_equal() {
    let map: FrozenMap<String, i64> = entries().into_iter().collect();
    let copy = map.clone();
    assert_eq!(map, copy);
    assert_eq!(map.fingerprint(), copy.fingerprint());
  }
}
