use glam::DVec3;
use serde_json::json;

use super::*;
use crate::dimension::DimType;
use crate::layout::DimensionCatalog;

fn document() -> Value {
  json!({
    "bounds": [0, 0, 0, 100, 100, 100],
    "boundsConforming": [1, 2, 3, 99, 98, 97],
    "dataType": "laszip",
    "hierarchyType": "json",
    "points": 10653336,
    "schema": [
      {"name": "X", "type": "signed", "size": 4, "scale": 0.01, "offset": 50},
      {"name": "Y", "type": "signed", "size": 4, "scale": 0.01, "offset": 50},
      {"name": "Z", "type": "signed", "size": 4, "scale": 0.01, "offset": 50},
      {"name": "Intensity", "type": "unsigned", "size": 2},
      {"name": "Classification", "type": "unsigned", "size": 1},
      {"name": "GpsTime", "type": "float", "size": 8}
    ],
    "span": 128,
    "srs": {"authority": "EPSG", "horizontal": "3857", "wkt": ""},
    "version": "1.0.0"
  })
}

#[test]
fn test_laszip_dataset_opens() {
  let info = EptInfo::from_json(document()).expect("valid metadata");

  assert_eq!(info.data_type(), DataType::Laszip);
  assert_eq!(info.points(), 10653336);
  assert_eq!(info.span(), 128);
  assert_eq!(info.bounds().min, DVec3::ZERO);
  assert_eq!(info.bounds().max, DVec3::splat(100.0));
  assert_eq!(info.sources(), 0);

  let root = info.root_key();
  assert_eq!(root.to_string(), "0-0-0-0");
  assert_eq!(root.bounds, *info.bounds());
}

#[test]
fn test_binary_dataset_opens_from_text() {
  let mut doc = document();
  doc["dataType"] = json!("binary");
  let info = EptInfo::parse(&doc.to_string()).unwrap();
  assert_eq!(info.data_type(), DataType::Binary);
}

#[test]
fn test_unrecognized_data_type_is_fatal() {
  let mut doc = document();
  doc["dataType"] = json!("xyz");
  assert!(matches!(
    EptInfo::from_json(doc),
    Err(EptError::UnrecognizedDataType(name)) if name == "xyz"
  ));

  let mut doc = document();
  doc.as_object_mut().unwrap().remove("dataType");
  assert!(matches!(EptInfo::from_json(doc), Err(EptError::UnrecognizedDataType(_))));
}

#[test]
fn test_bad_bounds_are_rejected() {
  let mut doc = document();
  doc["bounds"] = json!([0, 0, 0, 100, 100]);
  assert!(matches!(EptInfo::from_json(doc), Err(EptError::InvalidBounds(_))));

  let mut doc = document();
  doc.as_object_mut().unwrap().remove("bounds");
  assert!(matches!(EptInfo::from_json(doc), Err(EptError::InvalidBounds(_))));
}

#[test]
fn test_reversed_bounds_are_rejected() {
  let mut doc = document();
  doc["bounds"] = json!([100, 0, 0, 0, 100, 100]);
  assert!(matches!(EptInfo::from_json(doc), Err(EptError::InvalidBounds(_))));
}

#[test]
fn test_invalid_json_text() {
  assert!(matches!(EptInfo::parse("{\"bounds\": "), Err(EptError::Json(_))));
}

// =========================================================================
// Spatial reference
// =========================================================================

#[test]
fn test_srs_prefers_wkt() {
  let mut doc = document();
  doc["srs"]["wkt"] = json!("PROJCS[\"WGS 84 / Pseudo-Mercator\"]");
  let info = EptInfo::from_json(doc).unwrap();
  assert_eq!(info.srs(), "PROJCS[\"WGS 84 / Pseudo-Mercator\"]");
}

#[test]
fn test_srs_composed_from_codes() {
  let info = EptInfo::from_json(document()).unwrap();
  assert_eq!(info.srs(), "EPSG:3857");

  let mut doc = document();
  doc["srs"]["vertical"] = json!("5703");
  let info = EptInfo::from_json(doc).unwrap();
  assert_eq!(info.srs(), "EPSG:3857+5703");
}

#[test]
fn test_srs_missing() {
  let mut doc = document();
  doc.as_object_mut().unwrap().remove("srs");
  let info = EptInfo::from_json(doc).unwrap();
  assert_eq!(info.srs(), "");
}

// =========================================================================
// Schema
// =========================================================================

#[test]
fn test_dim_lookup() {
  let info = EptInfo::from_json(document()).unwrap();
  assert_eq!(info.schema().len(), 6);

  let x = info.dim("X").expect("X is in the schema");
  assert_eq!(x.scale, Some(0.01));
  assert_eq!(x.dim_type(), DimType::Double);
  assert_eq!(info.dim("Intensity").unwrap().dim_type(), DimType::Unsigned16);
  assert!(info.dim("Red").is_none());
}

#[test]
fn test_missing_schema_is_empty() {
  let mut doc = document();
  doc.as_object_mut().unwrap().remove("schema");
  let info = EptInfo::from_json(doc).unwrap();
  assert!(info.schema().is_empty());
  assert!(info.dim("X").is_none());
}

#[test]
fn test_layout_uses_storage_types_in_schema_order() {
  let info = EptInfo::from_json(document()).unwrap();
  let layout = info.layout().unwrap();

  assert_eq!(layout.point_size(), 4 + 4 + 4 + 2 + 1 + 8);
  let intensity = layout.find("Intensity").unwrap();
  assert_eq!(layout.offset(intensity), Some(12));
  assert_eq!(layout.dim_type(layout.find("X").unwrap()), Some(DimType::Signed32));
  assert!(!layout.is_finalized());
}

#[test]
fn test_layout_rejects_untyped_dimension() {
  let mut doc = document();
  doc["schema"][3] = json!({"name": "Intensity", "type": "unsigned", "size": 3});
  let info = EptInfo::from_json(doc).unwrap();
  assert!(matches!(
    info.layout(),
    Err(EptError::UnknownDimensionType { size: 3, .. })
  ));
}

#[test]
fn test_incomplete_schema_entry_does_not_fail_open() {
  let mut doc = document();
  doc["schema"][3] = json!({"name": "Intensity", "type": "unsigned"});
  doc["schema"][4] = json!({"name": "Classification", "size": 1});
  let info = EptInfo::from_json(doc).unwrap();

  assert_eq!(info.schema().len(), 6);
  assert_eq!(info.dim("Intensity").unwrap().dim_type(), DimType::None);
  assert!(matches!(
    info.layout(),
    Err(EptError::UnknownDimensionType { size: 0, .. })
  ));
}

#[test]
fn test_unreadable_schema_is_left_empty() {
  let mut doc = document();
  doc["schema"] = json!("X,Y,Z");
  let info = EptInfo::from_json(doc).unwrap();
  assert!(info.schema().is_empty());
  assert_eq!(info.json()["schema"], "X,Y,Z");
}
