//! Point dimension identity and storage types.

use serde::Deserialize;

/// Opaque dimension identifier handed out by a
/// [`DimensionCatalog`](crate::layout::DimensionCatalog).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimId(pub u32);

/// Storage type of one point dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum DimType {
  /// No usable type; the schema entry could not be mapped.
  #[default]
  None,
  Signed8,
  Signed16,
  Signed32,
  Signed64,
  Unsigned8,
  Unsigned16,
  Unsigned32,
  Unsigned64,
  Float,
  Double,
}

impl DimType {
  /// Map an EPT schema triple to a storage type.
  ///
  /// A scaled dimension is always read as `Double`, whatever its declared
  /// size. Unknown kinds and sizes map to [`DimType::None`].
  pub fn from_schema(kind: &str, size: u64, scaled: bool) -> Self {
    if scaled {
      return Self::Double;
    }

    match (kind, size) {
      ("signed", 1) => Self::Signed8,
      ("signed", 2) => Self::Signed16,
      ("signed", 4) => Self::Signed32,
      ("signed", 8) => Self::Signed64,
      ("unsigned", 1) => Self::Unsigned8,
      ("unsigned", 2) => Self::Unsigned16,
      ("unsigned", 4) => Self::Unsigned32,
      ("unsigned", 8) => Self::Unsigned64,
      ("float", 4) => Self::Float,
      ("float", 8) => Self::Double,
      _ => Self::None,
    }
  }

  /// Size in bytes of one value.
  pub fn size(self) -> usize {
    match self {
      Self::None => 0,
      Self::Signed8 | Self::Unsigned8 => 1,
      Self::Signed16 | Self::Unsigned16 => 2,
      Self::Signed32 | Self::Unsigned32 | Self::Float => 4,
      Self::Signed64 | Self::Unsigned64 | Self::Double => 8,
    }
  }
}

/// One entry of the `schema` array in `ept.json`.
///
/// Missing fields default to empty/zero, which maps to [`DimType::None`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SchemaDim {
  #[serde(default)]
  pub name: String,
  /// `signed`, `unsigned` or `float`
  #[serde(rename = "type", default)]
  pub kind: String,
  #[serde(default)]
  pub size: u64,
  #[serde(default)]
  pub scale: Option<f64>,
  #[serde(default)]
  pub offset: Option<f64>,
}

impl SchemaDim {
  /// Type the dimension is read as; scaled dimensions become `Double`.
  pub fn dim_type(&self) -> DimType {
    DimType::from_schema(&self.kind, self.size, self.scale.is_some())
  }

  /// Type of the raw stored value, ignoring any scale.
  pub fn storage_type(&self) -> DimType {
    DimType::from_schema(&self.kind, self.size, false)
  }
}
