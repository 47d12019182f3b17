//! ept_core - Entwine Point Tile addressing, hierarchy and fetch scheduling
//!
//! This crate holds the pieces of an EPT reader that do not depend on a
//! transport or a point codec: naming octree nodes, tracking how many points
//! each node holds, describing the dataset, and running many node fetches
//! concurrently without unbounded queuing.
//!
//! # Features
//!
//! - **Node keys**: `d-x-y-z` addresses with exact bisection bounds and a
//!   total order usable as a map key
//! - **Hierarchy**: lock-guarded point counts, merged page by page
//! - **Addons**: supplemental dimensions with their own hierarchy
//! - **Metadata**: `ept.json` parsing with fail-fast validation
//! - **Pool**: fixed worker threads over a bounded FIFO queue, collecting
//!   task failures instead of aborting
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ept_core::{load_hierarchy, select_nodes, EptInfo, Hierarchy, Pool};
//!
//! let info = EptInfo::parse(&fetch("ept.json")?)?;
//! let pool = Pool::new(8, 16)?;
//! let hierarchy = Arc::new(Hierarchy::new());
//!
//! load_hierarchy(&pool, source, info.bounds(), Arc::clone(&hierarchy))?;
//! for key in select_nodes(&hierarchy, &info.root_key(), None, None) {
//!     pool.submit(move || read_node(key))?;
//! }
//! pool.await_idle();
//! ```

pub mod addon;
pub mod dimension;
pub mod error;
pub mod hierarchy;
pub mod info;
pub mod layout;
pub mod table;

// Re-export commonly used items
pub use addon::Addon;
pub use dimension::{DimId, DimType, SchemaDim};
pub use error::{EptError, Result};
pub use hierarchy::{Hierarchy, HierarchyPage, PageEntry};
pub use info::{DataType, EptInfo};
pub use layout::{DimensionCatalog, FixedPointLayout};
pub use table::ShallowPointTable;

// Octree addressing
pub mod octree;
pub use octree::{DAabb3, Key};

// Bounded worker pool for node-level tasks
pub mod pool;
pub use pool::{Pool, PoolConfig, Task};

// Hierarchy loading and node selection
pub mod traversal;
pub use traversal::{load_hierarchy, select_nodes, HierarchySource};
