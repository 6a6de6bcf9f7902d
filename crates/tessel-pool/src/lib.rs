//! Fixed-record node pools for Tessel spatial trees.
//!
//! A [`NodePool`] stores records of exactly one kind in a slot vector with
//! a LIFO free list, so a tree that splits and merges nodes constantly
//! reuses storage instead of going through the general-purpose allocator
//! on every change.
//!
//! # Ownership
//!
//! Every [`NodePool::insert`] returns a move-only [`PoolHandle`]. The only
//! way to free a slot is [`NodePool::remove`], which consumes the handle
//! and hands the record back. Allocation and construction happen in one
//! call, as do destruction and release, so they cannot be reordered.
//!
//! ```text
//! NodePool<R>
//! ├── slots: Vec<Slot<R>>   (Occupied(R) | Vacant)
//! └── free:  Vec<u32>       (vacant slot indices, reused LIFO)
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod handle;
pub mod pool;

pub use error::PoolError;
pub use handle::PoolHandle;
pub use pool::NodePool;
