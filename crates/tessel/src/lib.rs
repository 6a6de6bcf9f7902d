//! Tessel: sparse homogeneous spatial trees.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Tessel sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use tessel::prelude::*;
//!
//! let mut tree = QuadTree::new(4, 0u8).unwrap();
//! for coord in [[0, 0], [1, 0], [0, 1], [1, 1]] {
//!     tree.set_value(coord, 1).unwrap();
//! }
//! // The filled quadrant collapsed back into a single stub.
//! assert_eq!(tree.branch_count(), 1);
//! assert_eq!(tree.get_value([2, 0]).unwrap(), 0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`pool`] | `tessel-pool` | `NodePool`, `PoolHandle`, `PoolError` |
//! | [`tree`] | `tessel-tree` | `SpatialTree`, aliases, config, regions, errors |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Fixed-record node pools (`tessel-pool`).
pub use tessel_pool as pool;

/// Spatial trees, configuration and region math (`tessel-tree`).
pub use tessel_tree as tree;

/// Common imports for typical Tessel usage.
///
/// ```rust
/// use tessel::prelude::*;
/// ```
pub mod prelude {
    pub use tessel_pool::PoolError;
    pub use tessel_tree::{
        HexTree, Leaf, OctTree, QuadTree, Region, SpatialTree, TreeConfig, TreeError,
    };
}
