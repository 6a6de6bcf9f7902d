//! Sparse homogeneous quadtrees and octrees.
//!
//! A [`SpatialTree`] stores one value per integer cell of a power-of-two
//! cube and keeps itself compressed: any orthant whose cells all agree is
//! a single stub, and the tree splits stubs only where a write makes cells
//! diverge. Every mutation restores the invariant that no branch has `2^D`
//! equal stub children (the root excepted).
//!
//! # Architecture
//!
//! ```text
//! SpatialTree<T, D>
//! ├── TreeConfig (edge length, pool limits)
//! ├── root: Node::Branch (never collapses)
//! └── NodePools
//!     ├── stubs:    NodePool<T>
//!     └── branches: NodePool<SmallVec<[Node<T>; 16]>>
//! ```
//!
//! Regions are implicit: each level halves the parent's edge length and
//! selects an orthant by comparing the coordinate against the center.
//!
//! # Aliases
//!
//! - [`QuadTree`]: `D = 2`, four children per branch
//! - [`OctTree`]: `D = 3`, eight children per branch
//! - [`HexTree`]: `D = 4`, sixteen children per branch

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
mod node;
pub mod region;
pub mod tree;

pub use config::TreeConfig;
pub use error::TreeError;
pub use region::{CoordIter, Region};
pub use tree::{HexTree, Leaf, OctTree, QuadTree, SpatialTree};
