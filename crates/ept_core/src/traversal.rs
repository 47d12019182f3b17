//! Hierarchy loading and node selection.
//!
//! # Flow
//!
//! ```text
//! Caller                          Pool workers
//! ┌──────────────────┐
//! │ pending = [root] │
//! └────────┬─────────┘
//!          │ submit one task per pending page
//!          ▼
//!                                 ┌──────────────────────┐
//!                                 │ fetch_page(key)      │
//!                                 │ HierarchyPage::parse │
//!                                 │ merge_page() ────────┼──► Hierarchy
//!                                 │ collect `-1` subtrees│
//!                                 └──────────┬───────────┘
//! ┌──────────────────┐                       │
//! │ await_idle()     │◄──────────────────────┘
//! │ pending = subtrees
//! └────────┬─────────┘
//!          └── repeat until no subtree is left
//! ```
//!
//! Only the calling thread submits, so workers never block on a full queue
//! they are themselves responsible for draining. Each page is fetched at most
//! once, so pages that point back at themselves or at each other still end.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;

use crate::error::{EptError, Result};
use crate::hierarchy::{Hierarchy, HierarchyPage};
use crate::octree::{DAabb3, Key};
use crate::pool::Pool;

/// Remote store holding `ept-hierarchy/<key>.json` pages.
///
/// Transport, retries and caching are up to the implementor.
pub trait HierarchySource: Send + Sync {
  /// Text of the hierarchy page rooted at `key`.
  fn fetch_page(&self, key: &Key) -> anyhow::Result<String>;
}

impl<F> HierarchySource for F
where
  F: Fn(&Key) -> anyhow::Result<String> + Send + Sync,
{
  fn fetch_page(&self, key: &Key) -> anyhow::Result<String> {
    self(key)
  }
}

/// Fetch every hierarchy page reachable from the root page and merge the
/// counts into `hierarchy`.
///
/// A failing page does not stop the others; when any page failed the call
/// returns [`EptError::TaskFailures`] with their messages after everything
/// reachable has been loaded.
pub fn load_hierarchy<S>(pool: &Pool, source: Arc<S>, root: &DAabb3, hierarchy: Arc<Hierarchy>) -> Result<()>
where
  S: HierarchySource + ?Sized + 'static,
{
  let _span = tracing::info_span!("load_hierarchy").entered();

  let errors_before = pool.errors().len();
  let discovered = Arc::new(Mutex::new(Vec::new()));
  let mut fetched = HashSet::new();
  let mut pending = vec![Key::root(*root)];

  while !pending.is_empty() {
    pending.retain(|key| {
      let fresh = fetched.insert(*key);
      if !fresh {
        tracing::debug!(%key, "hierarchy page already fetched");
      }
      fresh
    });
    if pending.is_empty() {
      break;
    }
    tracing::debug!(pages = pending.len(), "fetching hierarchy round");

    for key in pending.drain(..) {
      let source = Arc::clone(&source);
      let hierarchy = Arc::clone(&hierarchy);
      let discovered = Arc::clone(&discovered);
      let root = *root;

      pool.submit(move || {
        let text = source
          .fetch_page(&key)
          .with_context(|| format!("fetching hierarchy page {key}"))?;
        let page = HierarchyPage::parse(&text).with_context(|| format!("parsing hierarchy page {key}"))?;
        let subtrees = hierarchy.merge_page(&root, &page)?;

        discovered
          .lock()
          .unwrap_or_else(PoisonError::into_inner)
          .extend(subtrees);
        Ok(())
      })?;
    }

    pool.await_idle();
    pending = std::mem::take(&mut *discovered.lock().unwrap_or_else(PoisonError::into_inner));
  }

  let errors = pool.errors();
  let failures = errors.get(errors_before..).unwrap_or_default();
  tracing::info!(
    pages = fetched.len(),
    nodes = hierarchy.len(),
    failed = failures.len(),
    "hierarchy loaded"
  );

  if failures.is_empty() {
    Ok(())
  } else {
    Err(EptError::TaskFailures(failures.to_vec()))
  }
}

/// Keys worth fetching: those with points, overlapping `query` (if any),
/// no deeper than `max_depth` (if any). Returned in key order.
///
/// Bisection stops at the first key with no points, since nothing below it
/// can hold any either, and at [`Key::MAX_DEPTH`].
pub fn select_nodes(hierarchy: &Hierarchy, root: &Key, query: Option<&DAabb3>, max_depth: Option<u64>) -> Vec<Key> {
  let _span = tracing::info_span!("select_nodes").entered();

  let mut selected = Vec::new();
  let mut stack = vec![*root];

  while let Some(key) = stack.pop() {
    if hierarchy.count(&key) == 0 {
      continue;
    }
    if query.is_some_and(|q| !q.overlaps(&key.bounds)) {
      continue;
    }

    selected.push(key);
    if key.d < Key::MAX_DEPTH && max_depth.map_or(true, |max| key.d < max) {
      stack.extend(key.children());
    }
  }

  selected.sort();
  tracing::debug!(nodes = selected.len(), "selected nodes");
  selected
}

#[cfg(test)]
#[path = "traversal_test.rs"]
mod traversal_test;
