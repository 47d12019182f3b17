//! Hierarchy - per-node point counts, discovered page by page.
//!
//! An absent key and a key mapped to zero points are the same thing: callers
//! only ever see [`Hierarchy::count`], which answers 0 for both.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::error::{EptError, Result};
use crate::octree::{DAabb3, Key};

/// Point count per octree key, shareable across pool tasks.
///
/// All access goes through one internal lock, so concurrent merges are never
/// lost. Two merges of the same key resolve last-writer-wins.
#[derive(Debug, Default)]
pub struct Hierarchy {
  counts: Mutex<BTreeMap<Key, u64>>,
}

impl Hierarchy {
  pub fn new() -> Self {
    Self::default()
  }

  /// Points in `key`, or 0 if the key has not been seen.
  pub fn count(&self, key: &Key) -> u64 {
    self.counts().get(key).copied().unwrap_or(0)
  }

  /// Insert or overwrite the count for `key`.
  pub fn merge(&self, key: Key, count: u64) {
    self.counts().insert(key, count);
  }

  /// Merge every point entry of `page`, attaching bounds derived from
  /// `root`. Returns the keys whose subtree lives in a separate page and
  /// still has to be fetched, in key order.
  pub fn merge_page(&self, root: &DAabb3, page: &HierarchyPage) -> Result<Vec<Key>> {
    let mut subtrees = Vec::new();
    let mut merged = 0usize;

    let mut counts = self.counts();
    for (key, entry) in &page.entries {
      let key = Key::descend(*root, key.d, key.x, key.y, key.z)?;
      match entry {
        PageEntry::Points(n) => {
          counts.insert(key, *n);
          merged += 1;
        }
        PageEntry::Subtree => subtrees.push(key),
      }
    }
    drop(counts);

    tracing::debug!(merged, subtrees = subtrees.len(), "merged hierarchy page");
    Ok(subtrees)
  }

  /// Number of known keys.
  pub fn len(&self) -> usize {
    self.counts().len()
  }

  pub fn is_empty(&self) -> bool {
    self.counts().is_empty()
  }

  /// Sum of all known counts.
  pub fn total_points(&self) -> u64 {
    self.counts().values().sum()
  }

  /// Known keys in canonical order.
  pub fn keys(&self) -> Vec<Key> {
    self.counts().keys().copied().collect()
  }

  /// Copy of the current contents.
  pub fn snapshot(&self) -> BTreeMap<Key, u64> {
    self.counts().clone()
  }

  // A panicking writer cannot leave the map half-updated, so a poisoned
  // lock still guards consistent data.
  fn counts(&self) -> MutexGuard<'_, BTreeMap<Key, u64>> {
    self.counts.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl FromIterator<(Key, u64)> for Hierarchy {
  fn from_iter<I: IntoIterator<Item = (Key, u64)>>(iter: I) -> Self {
    Self {
      counts: Mutex::new(iter.into_iter().collect()),
    }
  }
}

// =============================================================================
// HierarchyPage - one `ept-hierarchy/<key>.json` document
// =============================================================================

/// Value of one hierarchy page entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageEntry {
  /// The node holds this many points.
  Points(u64),
  /// Encoded as `-1`: the node's subtree is described by its own page.
  Subtree,
}

/// Parsed hierarchy page: `{ "d-x-y-z": count, ... }`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HierarchyPage {
  pub entries: BTreeMap<Key, PageEntry>,
}

impl HierarchyPage {
  pub fn parse(text: &str) -> Result<Self> {
    let value: Value = serde_json::from_str(text)?;
    Self::from_json(&value)
  }

  pub fn from_json(value: &Value) -> Result<Self> {
    let object = value
      .as_object()
      .ok_or_else(|| EptError::InvalidHierarchy(format!("expected an object, got {value}")))?;

    let mut entries = BTreeMap::new();
    for (name, count) in object {
      let key: Key = name.parse()?;
      let entry = match count.as_i64() {
        Some(-1) => PageEntry::Subtree,
        Some(n) if n >= 0 => PageEntry::Points(n as u64),
        _ => match count.as_u64() {
          Some(n) => PageEntry::Points(n),
          None => return Err(EptError::InvalidHierarchy(format!("{name}: {count}"))),
        },
      };
      entries.insert(key, entry);
    }

    Ok(Self { entries })
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[cfg(test)]
#[path = "hierarchy_test.rs"]
mod hierarchy_test;
