//! Octree addressing for EPT datasets.
//!
//! Nodes are named by depth and integer grid coordinates (`d-x-y-z`). The
//! tree itself is implicit: children are derived from a parent by bisection,
//! and the only stored state is the per-key point count kept in a
//! [`Hierarchy`](crate::hierarchy::Hierarchy).
//!
//! # Depth Convention
//!
//! Depth 0 = root (the whole dataset cube), higher depth = finer.
//!
//! ```text
//! Cell Size = root_size / 2^depth
//! Grid Range = 0..2^depth per axis
//! ```
//!
//! # Module Structure
//!
//! - [`bounds`]: `DAabb3` - double-precision box with indexed components
//! - [`key`]: `Key` - immutable, totally ordered node address

pub mod bounds;
pub mod key;

// Re-exports
pub use bounds::DAabb3;
pub use key::Key;
