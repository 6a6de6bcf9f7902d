//! Tree configuration parameters.

use crate::error::TreeError;

/// Configuration for a [`SpatialTree`](crate::SpatialTree).
///
/// Controls the region size and the node pool limits. Validated at
/// construction; immutable afterwards except through
/// [`SpatialTree::copy_from`](crate::SpatialTree::copy_from), which adopts
/// the source tree's edge length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeConfig {
    /// Edge length of the root region in cells.
    ///
    /// Must be a power of two, at least 2 and at most
    /// [`MAX_EDGE_LENGTH`](Self::MAX_EDGE_LENGTH).
    pub edge_length: u32,

    /// Maximum number of live stub (leaf) records.
    ///
    /// Default: [`DEFAULT_MAX_RECORDS`](Self::DEFAULT_MAX_RECORDS).
    pub max_stubs: u32,

    /// Maximum number of live branch records.
    ///
    /// Default: [`DEFAULT_MAX_RECORDS`](Self::DEFAULT_MAX_RECORDS).
    pub max_branches: u32,

    /// Records pre-allocated in each pool at construction.
    pub initial_capacity: u32,
}

impl TreeConfig {
    /// Largest supported edge length. Keeps every coordinate and region
    /// center inside `i32`.
    pub const MAX_EDGE_LENGTH: u32 = 1 << 30;

    /// Default edge length used by [`TreeConfig::default`].
    pub const DEFAULT_EDGE_LENGTH: u32 = 16;

    /// Default per-pool record limit: the whole handle space.
    pub const DEFAULT_MAX_RECORDS: u32 = u32::MAX;

    /// Default number of records pre-allocated per pool.
    pub const DEFAULT_INITIAL_CAPACITY: u32 = 64;

    /// Create a config for the given edge length with default pool limits.
    pub fn new(edge_length: u32) -> Self {
        Self {
            edge_length,
            max_stubs: Self::DEFAULT_MAX_RECORDS,
            max_branches: Self::DEFAULT_MAX_RECORDS,
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
        }
    }

    /// Check the edge length and that the pools can hold a root branch
    /// with `children` stubs.
    pub fn validate(&self, children: usize) -> Result<(), TreeError> {
        let edge_length = self.edge_length;
        if edge_length < 2 || !edge_length.is_power_of_two() || edge_length > Self::MAX_EDGE_LENGTH
        {
            return Err(TreeError::InvalidEdgeLength { edge_length });
        }
        if self.max_branches == 0 {
            return Err(TreeError::InvalidConfig {
                reason: "max_branches must allow the root branch".into(),
            });
        }
        if (self.max_stubs as usize) < children {
            return Err(TreeError::InvalidConfig {
                reason: format!(
                    "max_stubs is {}, the root branch needs {children}",
                    self.max_stubs
                ),
            });
        }
        Ok(())
    }

    /// Number of subdivision levels below the root region.
    pub fn levels(&self) -> u32 {
        self.edge_length.trailing_zeros()
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_EDGE_LENGTH)
    }
}
