//! EptInfo - dataset-level metadata read from `ept.json`.

use serde::Deserialize;
use serde_json::Value;

use crate::dimension::SchemaDim;
use crate::error::{EptError, Result};
use crate::layout::FixedPointLayout;
use crate::octree::{DAabb3, Key};

/// Encoding of node point data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
  /// `"laszip"`: compressed LAZ node files
  Laszip,
  /// `"binary"`: raw packed points in schema order
  Binary,
}

impl DataType {
  pub fn parse(name: &str) -> Result<Self> {
    match name {
      "laszip" => Ok(Self::Laszip),
      "binary" => Ok(Self::Binary),
      other => Err(EptError::UnrecognizedDataType(other.to_string())),
    }
  }
}

/// Immutable snapshot of dataset metadata.
#[derive(Clone, Debug)]
pub struct EptInfo {
  info: Value,
  bounds: DAabb3,
  points: u64,
  // Length of one side of the octree grid, e.g. 256 for a 256^3 grid.
  span: u64,
  data_type: DataType,
  srs: String,
  schema: Vec<SchemaDim>,
}

impl EptInfo {
  /// Parse the text of an `ept.json` document.
  pub fn parse(text: &str) -> Result<Self> {
    Self::from_json(serde_json::from_str(text)?)
  }

  /// Build from an already parsed document. Fails if `bounds` is not a
  /// valid six-number box or `dataType` is not one this crate can read.
  ///
  /// The schema is read leniently: missing fields take their defaults and an
  /// unreadable schema is logged and left empty. [`EptInfo::layout`] is where
  /// an unusable dimension becomes an error.
  pub fn from_json(info: Value) -> Result<Self> {
    let bounds = DAabb3::from_json(&info["bounds"])?;
    let data_type = DataType::parse(info["dataType"].as_str().unwrap_or_default())?;
    let schema = match &info["schema"] {
      Value::Null => Vec::new(),
      schema => Vec::<SchemaDim>::deserialize(schema).unwrap_or_else(|err| {
        tracing::warn!("ignoring unreadable schema: {err}");
        Vec::new()
      }),
    };

    let parsed = Self {
      bounds,
      points: info["points"].as_u64().unwrap_or(0),
      span: info["span"].as_u64().unwrap_or(0),
      data_type,
      srs: srs_string(&info["srs"]),
      schema,
      info,
    };

    tracing::debug!(
      points = parsed.points,
      span = parsed.span,
      data_type = ?parsed.data_type,
      dims = parsed.schema.len(),
      "opened EPT metadata"
    );
    Ok(parsed)
  }

  pub fn bounds(&self) -> &DAabb3 {
    &self.bounds
  }

  /// Total point count of the dataset.
  pub fn points(&self) -> u64 {
    self.points
  }

  pub fn span(&self) -> u64 {
    self.span
  }

  pub fn data_type(&self) -> DataType {
    self.data_type
  }

  /// Spatial reference: the WKT if present, else `authority:horizontal`
  /// with an optional `+vertical` suffix.
  pub fn srs(&self) -> &str {
    &self.srs
  }

  pub fn schema(&self) -> &[SchemaDim] {
    &self.schema
  }

  /// First schema entry named `name`.
  pub fn dim(&self, name: &str) -> Option<&SchemaDim> {
    self.schema.iter().find(|d| d.name == name)
  }

  /// Number of source files the dataset was built from (0 if unlisted).
  pub fn sources(&self) -> u64 {
    self.info["sources"].as_u64().unwrap_or(0)
  }

  /// The root key, covering the dataset bounds.
  pub fn root_key(&self) -> Key {
    Key::root(self.bounds)
  }

  /// Layout of one point as stored in `binary` node files: raw storage
  /// types, dimensions in schema order.
  ///
  /// The layout is returned unfinalized so addon dimensions can still be
  /// appended.
  pub fn layout(&self) -> Result<FixedPointLayout> {
    let mut layout = FixedPointLayout::new();
    for dim in &self.schema {
      let dim_type = dim.storage_type();
      if dim_type.size() == 0 {
        return Err(EptError::UnknownDimensionType {
          name: dim.name.clone(),
          kind: dim.kind.clone(),
          size: dim.size,
        });
      }
      layout.register(&dim.name, dim_type)?;
    }
    Ok(layout)
  }

  /// The document this snapshot was built from.
  pub fn json(&self) -> &Value {
    &self.info
  }
}

fn srs_string(srs: &Value) -> String {
  let text = |v: &Value| match v {
    Value::String(s) => s.clone(),
    Value::Null => String::new(),
    other => other.to_string(),
  };

  let wkt = text(&srs["wkt"]);
  if !wkt.is_empty() {
    return wkt;
  }

  let mut composed = String::new();
  if !srs["authority"].is_null() && !srs["horizontal"].is_null() {
    composed = format!("{}:{}", text(&srs["authority"]), text(&srs["horizontal"]));
  }
  if !srs["vertical"].is_null() {
    composed.push('+');
    composed.push_str(&text(&srs["vertical"]));
  }
  composed
}

#[cfg(test)]
#[path = "info_test.rs"]
mod info_test;
