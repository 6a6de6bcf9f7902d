//! Typed owning handles into a [`NodePool`](crate::NodePool).

use std::fmt;
use std::marker::PhantomData;

/// Owning reference to one record inside a [`NodePool`](crate::NodePool).
///
/// Handles are neither `Copy` nor `Clone`: exactly one handle
/// exists per live record, and giving it back through
/// [`NodePool::remove`](crate::NodePool::remove) is the only way to free
/// the slot. Dropping a handle without removing it leaks the slot until the
/// pool itself is cleared or dropped.
///
/// The record type is part of the handle type, so a branch handle can never
/// be passed to a stub pool.
#[must_use]
pub struct PoolHandle<R> {
    index: u32,
    _record: PhantomData<fn() -> R>,
}

impl<R> PoolHandle<R> {
    pub(crate) fn new(index: u32) -> Self {
        Self {
            index,
            _record: PhantomData,
        }
    }

    /// Slot index within the owning pool.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl<R> PartialEq for PoolHandle<R> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<R> Eq for PoolHandle<R> {}

impl<R> fmt::Debug for PoolHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolHandle({})", self.index)
    }
}
