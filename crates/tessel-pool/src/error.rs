//! Pool-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur while growing a [`NodePool`](crate::NodePool).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// The pool would hold more live records than its configured limit.
    CapacityExceeded {
        /// Number of live records the operation needed.
        requested: usize,
        /// Maximum number of live records the pool accepts.
        capacity: usize,
    },
    /// The allocator refused to grow the backing storage.
    AllocationFailed {
        /// Number of additional slots that were requested.
        requested: usize,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "pool capacity exceeded: requested {requested} records, capacity {capacity} records"
                )
            }
            Self::AllocationFailed { requested } => {
                write!(f, "pool allocation failed while growing by {requested} slots")
            }
        }
    }
}

impl Error for PoolError {}
