//! Error types for tree construction and cell access.

use std::error::Error;
use std::fmt;

use tessel_pool::PoolError;

/// Errors arising from tree construction or cell access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// The configured edge length is not a power of two in the supported
    /// range.
    InvalidEdgeLength {
        /// The rejected edge length.
        edge_length: u32,
    },
    /// A configuration value other than the edge length is unusable.
    InvalidConfig {
        /// What went wrong.
        reason: String,
    },
    /// A coordinate component lies outside `[0, edge_length)`.
    CoordOutOfRange {
        /// The offending coordinate.
        coord: Vec<i32>,
        /// Edge length of the tree that rejected it.
        edge_length: u32,
    },
    /// A node pool could not grow to hold the nodes a write needs.
    ResourceExhausted(PoolError),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEdgeLength { edge_length } => {
                write!(
                    f,
                    "invalid edge length {edge_length}: must be a power of two in [2, 2^30]"
                )
            }
            Self::InvalidConfig { reason } => write!(f, "invalid tree config: {reason}"),
            Self::CoordOutOfRange { coord, edge_length } => {
                write!(
                    f,
                    "coordinate {coord:?} out of range: every component must lie in [0, {edge_length})"
                )
            }
            Self::ResourceExhausted(e) => write!(f, "node storage exhausted: {e}"),
        }
    }
}

impl Error for TreeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ResourceExhausted(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PoolError> for TreeError {
    fn from(e: PoolError) -> Self {
        Self::ResourceExhausted(e)
    }
}
