//! FixedPointLayout - dimension catalog whose byte layout never reorders.
//!
//! Remote EPT binary data arrives with its dimensions packed in schema
//! order. A layout that is mapped directly over such bytes must therefore
//! assign offsets strictly in first-registration order.

use crate::dimension::{DimId, DimType};
use crate::error::{EptError, Result};

/// Lookup of dimension properties by id.
///
/// [`Addon`](crate::addon::Addon) resolves its dimension against one of
/// these.
pub trait DimensionCatalog {
  fn find(&self, name: &str) -> Option<DimId>;
  fn dim_type(&self, id: DimId) -> Option<DimType>;
  fn dim_size(&self, id: DimId) -> Option<usize>;
  fn dim_name(&self, id: DimId) -> Option<&str>;
}

/// Registered dimension and where it lives inside a point.
#[derive(Clone, Debug, PartialEq)]
pub struct DimDetail {
  pub id: DimId,
  pub name: String,
  pub dim_type: DimType,
  /// Byte offset from the start of the point
  pub offset: usize,
}

impl DimDetail {
  pub fn size(&self) -> usize {
    self.dim_type.size()
  }
}

/// Order-preserving point layout.
#[derive(Clone, Debug, Default)]
pub struct FixedPointLayout {
  dims: Vec<DimDetail>,
  point_size: usize,
  finalized: bool,
}

impl FixedPointLayout {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a dimension, placing it after every dimension registered so
  /// far. Registering a known name again returns the existing id and leaves
  /// the layout unchanged.
  pub fn register(&mut self, name: &str, dim_type: DimType) -> Result<DimId> {
    if let Some(id) = self.find(name) {
      return Ok(id);
    }
    if self.finalized {
      return Err(EptError::LayoutFinalized(name.to_string()));
    }

    let id = DimId(self.dims.len() as u32);
    self.dims.push(DimDetail {
      id,
      name: name.to_string(),
      dim_type,
      offset: self.point_size,
    });
    self.point_size += dim_type.size();
    Ok(id)
  }

  /// Lock the layout; later registrations of new names fail.
  pub fn finalize(&mut self) {
    self.finalized = true;
  }

  pub fn is_finalized(&self) -> bool {
    self.finalized
  }

  /// Bytes per point.
  pub fn point_size(&self) -> usize {
    self.point_size
  }

  pub fn detail(&self, id: DimId) -> Option<&DimDetail> {
    self.dims.get(id.0 as usize)
  }

  pub fn offset(&self, id: DimId) -> Option<usize> {
    self.detail(id).map(|d| d.offset)
  }

  /// Dimensions in registration (and byte) order.
  pub fn dims(&self) -> &[DimDetail] {
    &self.dims
  }
}

impl DimensionCatalog for FixedPointLayout {
  fn find(&self, name: &str) -> Option<DimId> {
    self.dims.iter().find(|d| d.name == name).map(|d| d.id)
  }

  fn dim_type(&self, id: DimId) -> Option<DimType> {
    self.detail(id).map(|d| d.dim_type)
  }

  fn dim_size(&self, id: DimId) -> Option<usize> {
    self.detail(id).map(DimDetail::size)
  }

  fn dim_name(&self, id: DimId) -> Option<&str> {
    self.detail(id).map(|d| d.name.as_str())
  }
}
