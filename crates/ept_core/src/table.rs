//! ShallowPointTable - point access over a caller-owned byte buffer.
//!
//! Decoded node data is handed over as one contiguous block whose per-point
//! layout matches a [`FixedPointLayout`]. The table only views that block:
//! it never allocates, and it cannot grow.

use crate::dimension::DimId;
use crate::error::{EptError, Result};
use crate::layout::{DimDetail, FixedPointLayout};

/// Non-owning, fixed-capacity view of packed points.
pub struct ShallowPointTable<'a> {
  layout: &'a FixedPointLayout,
  data: &'a mut [u8],
}

impl<'a> ShallowPointTable<'a> {
  /// Trailing bytes that do not fill a whole point are ignored.
  pub fn new(layout: &'a FixedPointLayout, data: &'a mut [u8]) -> Self {
    Self { layout, data }
  }

  pub fn layout(&self) -> &FixedPointLayout {
    self.layout
  }

  /// Capacity in points: `buffer_len / point_size`.
  pub fn num_points(&self) -> usize {
    match self.layout.point_size() {
      0 => 0,
      size => self.data.len() / size,
    }
  }

  /// Raw bytes of point `index`.
  pub fn point(&self, index: usize) -> Result<&[u8]> {
    let start = self.point_start(index)?;
    Ok(&self.data[start..start + self.layout.point_size()])
  }

  /// Raw bytes of dimension `id` at point `index`.
  pub fn field(&self, id: DimId, index: usize) -> Result<&[u8]> {
    let (start, size) = self.field_range(id, index)?;
    Ok(&self.data[start..start + size])
  }

  /// Overwrite dimension `id` at point `index`. `value` must be exactly the
  /// dimension's size.
  pub fn set_field(&mut self, id: DimId, index: usize, value: &[u8]) -> Result<()> {
    let (start, size) = self.field_range(id, index)?;
    if value.len() != size {
      return Err(EptError::FieldSize {
        expected: size,
        actual: value.len(),
      });
    }
    self.data[start..start + size].copy_from_slice(value);
    Ok(())
  }

  /// Always fails: the buffer is borrowed and has a fixed length.
  pub fn add_point(&mut self) -> Result<usize> {
    Err(EptError::AppendUnsupported)
  }

  fn point_start(&self, index: usize) -> Result<usize> {
    let capacity = self.num_points();
    if index >= capacity {
      return Err(EptError::PointOutOfRange { index, capacity });
    }
    Ok(index * self.layout.point_size())
  }

  fn field_range(&self, id: DimId, index: usize) -> Result<(usize, usize)> {
    let detail: &DimDetail = self.layout.detail(id).ok_or(EptError::UnknownDimension(id))?;
    let start = self.point_start(index)? + detail.offset;
    Ok((start, detail.size()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dimension::DimType;

  fn layout() -> (FixedPointLayout, DimId, DimId) {
    let mut layout = FixedPointLayout::new();
    let x = layout.register("X", DimType::Signed32).unwrap();
    let class = layout.register("Classification", DimType::Unsigned8).unwrap();
    layout.finalize();
    (layout, x, class)
  }

  #[test]
  fn test_capacity_from_buffer_length() {
    let (layout, _, _) = layout();
    let mut data = vec![0u8; 5 * 3 + 2];
    let table = ShallowPointTable::new(&layout, &mut data);
    assert_eq!(table.num_points(), 3);
  }

  #[test]
  fn test_reads_existing_bytes_by_offset() {
    let (layout, x, class) = layout();
    let mut data = Vec::new();
    for (xv, cv) in [(-7i32, 2u8), (1024, 6)] {
      data.extend_from_slice(&xv.to_le_bytes());
      data.push(cv);
    }

    let table = ShallowPointTable::new(&layout, &mut data);
    assert_eq!(table.field(x, 0).unwrap(), (-7i32).to_le_bytes());
    assert_eq!(table.field(class, 0).unwrap(), [2]);
    assert_eq!(table.field(x, 1).unwrap(), 1024i32.to_le_bytes());
    assert_eq!(table.point(1).unwrap(), [0, 4, 0, 0, 6]);
  }

  #[test]
  fn test_writes_land_in_caller_buffer() {
    let (layout, x, class) = layout();
    let mut data = vec![0u8; 10];
    {
      let mut table = ShallowPointTable::new(&layout, &mut data);
      table.set_field(class, 1, &[9]).unwrap();
      table.set_field(x, 1, &42i32.to_le_bytes()).unwrap();
    }
    assert_eq!(data, [0, 0, 0, 0, 0, 42, 0, 0, 0, 9]);
  }

  #[test]
  fn test_bounds_and_size_checks() {
    let (layout, x, _) = layout();
    let mut data = vec![0u8; 10];
    let mut table = ShallowPointTable::new(&layout, &mut data);

    assert!(matches!(
      table.field(x, 2),
      Err(EptError::PointOutOfRange { index: 2, capacity: 2 })
    ));
    assert!(matches!(
      table.set_field(x, 0, &[1, 2]),
      Err(EptError::FieldSize { expected: 4, actual: 2 })
    ));
    assert!(matches!(table.field(DimId(5), 0), Err(EptError::UnknownDimension(_))));
  }

  #[test]
  fn test_append_is_rejected() {
    let (layout, _, _) = layout();
    let mut data = vec![0u8; 5];
    let mut table = ShallowPointTable::new(&layout, &mut data);
    assert!(matches!(table.add_point(), Err(EptError::AppendUnsupported)));
    assert_eq!(table.num_points(), 1);
  }
}
