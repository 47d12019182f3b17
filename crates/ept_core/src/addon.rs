//! Addon - one supplemental dimension stored next to (not inside) the base
//! dataset, with its own source and its own hierarchy.

use std::sync::Arc;

use crate::dimension::{DimId, DimType};
use crate::error::{EptError, Result};
use crate::hierarchy::Hierarchy;
use crate::layout::DimensionCatalog;
use crate::octree::Key;

/// Descriptor for a supplemental attribute.
///
/// Everything but the hierarchy is fixed at construction. The hierarchy is
/// filled independently of the base dataset's, so an addon may have no
/// points for a node the base data covers.
#[derive(Debug)]
pub struct Addon {
  endpoint: String,
  id: DimId,
  dim_type: DimType,
  size: usize,
  name: String,
  hierarchy: Arc<Hierarchy>,
}

impl Addon {
  /// Resolve `id` against `catalog` to learn its type, size and name.
  pub fn new(catalog: &impl DimensionCatalog, endpoint: impl Into<String>, id: DimId) -> Result<Self> {
    let missing = || EptError::UnknownDimension(id);

    Ok(Self {
      endpoint: endpoint.into(),
      id,
      dim_type: catalog.dim_type(id).ok_or_else(missing)?,
      size: catalog.dim_size(id).ok_or_else(missing)?,
      name: catalog.dim_name(id).ok_or_else(missing)?.to_string(),
      hierarchy: Arc::default(),
    })
  }

  /// Location of the addon's own `ept-addon.json` tree.
  pub fn endpoint(&self) -> &str {
    &self.endpoint
  }

  pub fn id(&self) -> DimId {
    self.id
  }

  pub fn dim_type(&self) -> DimType {
    self.dim_type
  }

  /// Bytes per value.
  pub fn size(&self) -> usize {
    self.size
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Shared handle so pool tasks can merge pages into it.
  pub fn hierarchy(&self) -> &Arc<Hierarchy> {
    &self.hierarchy
  }

  /// Addon points stored for `key` (0 if unknown).
  pub fn points(&self, key: &Key) -> u64 {
    self.hierarchy.count(key)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::layout::FixedPointLayout;

  fn catalog() -> (FixedPointLayout, DimId) {
    let mut layout = FixedPointLayout::new();
    layout.register("X", DimType::Double).unwrap();
    let id = layout.register("Classification", DimType::Unsigned8).unwrap();
    (layout, id)
  }

  #[test]
  fn test_resolves_dimension_from_catalog() {
    let (layout, id) = catalog();
    let addon = Addon::new(&layout, "s3://bucket/addons/class", id).unwrap();

    assert_eq!(addon.endpoint(), "s3://bucket/addons/class");
    assert_eq!(addon.id(), id);
    assert_eq!(addon.name(), "Classification");
    assert_eq!(addon.dim_type(), DimType::Unsigned8);
    assert_eq!(addon.size(), 1);
  }

  #[test]
  fn test_unknown_dimension_fails() {
    let (layout, _) = catalog();
    assert!(matches!(
      Addon::new(&layout, "addon", DimId(42)),
      Err(EptError::UnknownDimension(DimId(42)))
    ));
  }

  #[test]
  fn test_points_come_from_own_hierarchy() {
    let (layout, id) = catalog();
    let addon = Addon::new(&layout, "addon", id).unwrap();
    let key = Key::new(1, 0, 1, 0);

    assert_eq!(addon.points(&key), 0);
    addon.hierarchy().merge(key, 77);
    assert_eq!(addon.points(&key), 77);
    assert_eq!(addon.points(&Key::new(1, 1, 1, 0)), 0);
  }
}
