//! Key - depth/X/Y/Z address of an EPT data node plus its bounds.
//!
//! Depth 0 is the root and covers the whole dataset cube. Each level halves
//! the cell along every axis, so at depth `d` the grid coordinates run over
//! `0..2^d`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use super::DAabb3;
use crate::error::{EptError, Result};

/// Octree node key - immutable value type.
///
/// Identity (equality, ordering, hashing) is `(d, x, y, z)` only; the bounds
/// are derived data and never take part in comparisons. Keys order by depth,
/// then x, then y, then z.
#[derive(Clone, Copy, Debug, Default)]
pub struct Key {
  /// Depth in the octree (0 = root)
  pub d: u64,
  /// Grid X position at this depth
  pub x: u64,
  /// Grid Y position at this depth
  pub y: u64,
  /// Grid Z position at this depth
  pub z: u64,
  /// Spatial extent of the node
  pub bounds: DAabb3,
}

impl Key {
  /// Deepest level [`Key::descend`] accepts. A `u64` coordinate cannot
  /// address the grid below it.
  pub const MAX_DEPTH: u64 = 63;

  /// Key with the given address and empty bounds.
  pub fn new(d: u64, x: u64, y: u64, z: u64) -> Self {
    Self {
      d,
      x,
      y,
      z,
      bounds: DAabb3::default(),
    }
  }

  /// The `0-0-0-0` key covering `bounds`.
  pub fn root(bounds: DAabb3) -> Self {
    Self {
      bounds,
      ..Self::default()
    }
  }

  /// Key for `d-x-y-z` with bounds derived from the root cube by walking the
  /// same bisection path [`Key::bisect`] would take, so the result is
  /// bit-identical to a key reached by recursion.
  pub fn descend(root: DAabb3, d: u64, x: u64, y: u64, z: u64) -> Result<Self> {
    if d > Self::MAX_DEPTH {
      return Err(EptError::InvalidKey(format!(
        "{d}-{x}-{y}-{z} is deeper than {}",
        Self::MAX_DEPTH
      )));
    }
    if (x | y | z) >> d != 0 {
      return Err(EptError::InvalidKey(format!(
        "{d}-{x}-{y}-{z} lies outside the depth {d} grid"
      )));
    }

    let bit = |v: u64, level: u64| (v >> level) & 1;

    let mut key = Self::root(root);
    for level in (0..d).rev() {
      let direction = bit(x, level) | bit(y, level) << 1 | bit(z, level) << 2;
      key = key.bisect(direction as u8);
    }
    Ok(key)
  }

  /// Bounds component at logical index `0..6` (min x/y/z, max x/y/z).
  pub fn bound_at(&self, i: usize) -> Result<f64> {
    self.bounds.get(i)
  }

  /// Grid coordinate at logical index `0..3` (x/y/z).
  pub fn id_at(&self, i: usize) -> Result<u64> {
    match i {
      0 => Ok(self.x),
      1 => Ok(self.y),
      2 => Ok(self.z),
      _ => Err(EptError::InvalidIndex { accessor: "Key::id_at", index: i }),
    }
  }

  /// Mutable grid coordinate at logical index `0..3`.
  pub fn id_at_mut(&mut self, i: usize) -> Result<&mut u64> {
    match i {
      0 => Ok(&mut self.x),
      1 => Ok(&mut self.y),
      2 => Ok(&mut self.z),
      _ => Err(EptError::InvalidIndex { accessor: "Key::id_at", index: i }),
    }
  }

  /// Child key one level deeper.
  ///
  /// Direction: 0-7 where bits select the upper half of each axis:
  /// - bit 0: X
  /// - bit 1: Y
  /// - bit 2: Z
  ///
  /// Only the low three bits of `direction` are read.
  ///
  /// The child bounds are the exact half-split of this key's bounds, so the
  /// eight directions tile the parent with no gap or overlap. Coordinates
  /// double at every level, so a key must be at most [`Key::MAX_DEPTH`] deep
  /// to be bisected; the child of a deeper key has truncated coordinates.
  pub fn bisect(&self, direction: u8) -> Self {
    let direction = direction & 0b111;

    let mut ids = [self.x, self.y, self.z];
    let mut min = self.bounds.min;
    let mut max = self.bounds.max;

    for axis in 0..3 {
      ids[axis] <<= 1;
      let mid = min[axis] + (max[axis] - min[axis]) / 2.0;
      if direction & (1 << axis) != 0 {
        min[axis] = mid;
        ids[axis] += 1;
      } else {
        max[axis] = mid;
      }
    }

    Self {
      d: self.d + 1,
      x: ids[0],
      y: ids[1],
      z: ids[2],
      bounds: DAabb3 { min, max },
    }
  }

  /// All eight children, indexed by direction.
  pub fn children(&self) -> [Self; 8] {
    std::array::from_fn(|direction| self.bisect(direction as u8))
  }

  fn address(&self) -> (u64, u64, u64, u64) {
    (self.d, self.x, self.y, self.z)
  }
}

impl PartialEq for Key {
  fn eq(&self, other: &Self) -> bool {
    self.address() == other.address()
  }
}

impl Eq for Key {}

impl Ord for Key {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .d
      .cmp(&other.d)
      .then(self.x.cmp(&other.x))
      .then(self.y.cmp(&other.y))
      .then(self.z.cmp(&other.z))
  }
}

impl PartialOrd for Key {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Hash for Key {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.address().hash(state);
  }
}

impl fmt::Display for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}-{}-{}", self.d, self.x, self.y, self.z)
  }
}

impl FromStr for Key {
  type Err = EptError;

  /// Parse `"<d>-<x>-<y>-<z>"`. Bounds are left empty; use
  /// [`Key::descend`] to attach them.
  fn from_str(s: &str) -> Result<Self> {
    let invalid = || EptError::InvalidKey(s.to_string());

    let tokens: Vec<&str> = s.split('-').collect();
    let [d, x, y, z] = tokens[..] else {
      return Err(invalid());
    };
    // Plain decimal digits only: no sign, no whitespace.
    let parse = |t: &str| {
      if t.is_empty() || !t.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
      }
      t.parse::<u64>().map_err(|_| invalid())
    };

    Ok(Self::new(parse(d)?, parse(x)?, parse(y)?, parse(z)?))
  }
}

#[cfg(test)]
#[path = "key_test.rs"]
mod key_test;
