//! Error type shared by every synchronous entry point of the crate.

use thiserror::Error;

use crate::dimension::DimId;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EptError>;

/// Everything that can go wrong while addressing, describing or reading an
/// EPT dataset.
///
/// Task bodies run by [`Pool`](crate::pool::Pool) do not use this type
/// directly; their failures are reduced to strings and collected by the pool.
#[derive(Debug, Error)]
pub enum EptError {
  /// Key text did not split into exactly four integer tokens.
  #[error("Invalid EPT key: {0}")]
  InvalidKey(String),

  /// Logical index outside the range of a key accessor.
  #[error("Invalid {accessor} index: {index}")]
  InvalidIndex {
    accessor: &'static str,
    index: usize,
  },

  /// Metadata bounds were not a 6-element numeric array.
  #[error("Invalid bounds specification: {0}")]
  InvalidBounds(String),

  /// The dataset declares an encoding this crate cannot read.
  #[error("Unrecognized EPT dataType: {0}")]
  UnrecognizedDataType(String),

  #[error("Attempted to add a task to a stopped Pool")]
  StoppedPool,

  #[error("Failed to spawn pool worker: {0}")]
  Spawn(#[from] std::io::Error),

  #[error("Error during parsing: {0}")]
  Json(#[from] serde_json::Error),

  /// A hierarchy page held something other than `"d-x-y-z": count`.
  #[error("Invalid hierarchy entry: {0}")]
  InvalidHierarchy(String),

  #[error("Dimension {0:?} is not registered in the layout")]
  UnknownDimension(DimId),

  #[error("Dimension {name} has no type for {kind}/{size}")]
  UnknownDimensionType {
    name: String,
    kind: String,
    size: u64,
  },

  #[error("Cannot register dimension {0}: layout is finalized")]
  LayoutFinalized(String),

  #[error("Point {index} is out of range for a table of {capacity} points")]
  PointOutOfRange { index: usize, capacity: usize },

  #[error("Field value is {actual} bytes, dimension holds {expected}")]
  FieldSize { expected: usize, actual: usize },

  #[error("Cannot add points to ShallowPointTable")]
  AppendUnsupported,

  /// One or more pool tasks failed; messages are in no particular order.
  #[error("{} task(s) failed: {}", .0.len(), .0.join("; "))]
  TaskFailures(Vec<String>),
}
