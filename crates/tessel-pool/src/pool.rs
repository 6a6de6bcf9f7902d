//! Slot storage with free-list reuse.
//!
//! [`NodePool`] hands out one slot per record. Removed slots go on a free
//! list and are reused before the backing vector grows, so a steady
//! split/merge workload settles at a fixed footprint.

use crate::error::PoolError;
use crate::handle::PoolHandle;

/// One storage cell of a [`NodePool`].
#[derive(Clone, Debug)]
enum Slot<R> {
    Occupied(R),
    Vacant,
}

/// Fixed-record allocator for one node kind.
///
/// The pool enforces a limit on the number of live records. Callers that
/// must not fail halfway through a multi-record change call
/// [`reserve`](Self::reserve) for the whole change first; every
/// [`insert`](Self::insert) covered by a successful reservation is then
/// guaranteed to succeed without reallocating.
#[derive(Debug)]
pub struct NodePool<R> {
    /// All slots, live and vacant.
    slots: Vec<Slot<R>>,
    /// Indices of vacant slots available for reuse.
    free: Vec<u32>,
    /// Number of occupied slots.
    live: usize,
    /// Maximum number of occupied slots.
    max_records: u32,
}

impl<R> NodePool<R> {
    /// Create an empty pool with room for `initial_capacity` records
    /// (clamped to `max_records`).
    pub fn with_capacity(initial_capacity: u32, max_records: u32) -> Self {
        let initial = initial_capacity.min(max_records) as usize;
        Self {
            slots: Vec::with_capacity(initial),
            free: Vec::new(),
            live: 0,
            max_records,
        }
    }

    /// Create an empty pool that may hold up to `max_records` live records.
    pub fn new(max_records: u32) -> Self {
        Self::with_capacity(0, max_records)
    }

    /// Make sure the next `additional` inserts can succeed.
    ///
    /// Vacant slots on the free list count towards the reservation; only
    /// the remainder grows the backing vector.
    pub fn reserve(&mut self, additional: usize) -> Result<(), PoolError> {
        let requested = self.live.saturating_add(additional);
        if requested > self.max_records as usize {
            return Err(PoolError::CapacityExceeded {
                requested,
                capacity: self.max_records as usize,
            });
        }

        let fresh = additional.saturating_sub(self.free.len());
        let spare = self.slots.capacity() - self.slots.len();
        if fresh > spare {
            let before = self.slots.capacity();
            self.slots
                .try_reserve(fresh)
                .map_err(|_| PoolError::AllocationFailed { requested: fresh })?;
            tracing::debug!(
                from = before,
                to = self.slots.capacity(),
                live = self.live,
                "node pool grew"
            );
        }
        Ok(())
    }

    /// Store `record` and return the handle that owns it.
    ///
    /// Reuses the most recently freed slot if one exists.
    pub fn insert(&mut self, record: R) -> Result<PoolHandle<R>, PoolError> {
        if let Some(index) = self.free.pop() {
            self.slots[index as usize] = Slot::Occupied(record);
            self.live += 1;
            return Ok(PoolHandle::new(index));
        }

        self.reserve(1)?;
        // The reservation above bounds `slots.len()` by `max_records`.
        let index = self.slots.len() as u32;
        self.slots.push(Slot::Occupied(record));
        self.live += 1;
        Ok(PoolHandle::new(index))
    }

    /// Free the slot owned by `handle` and return its record.
    ///
    /// # Panics
    ///
    /// Panics if `handle` was issued by a different pool and points at a
    /// vacant or nonexistent slot.
    pub fn remove(&mut self, handle: PoolHandle<R>) -> R {
        let index = handle.index();
        let slot = std::mem::replace(&mut self.slots[index as usize], Slot::Vacant);
        match slot {
            Slot::Occupied(record) => {
                self.free.push(index);
                self.live -= 1;
                record
            }
            Slot::Vacant => panic!("pool handle {index} refers to a vacant slot"),
        }
    }

    /// Shared access to the record owned by `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` was issued by a different pool and points at a
    /// vacant or nonexistent slot.
    pub fn get(&self, handle: &PoolHandle<R>) -> &R {
        match &self.slots[handle.index() as usize] {
            Slot::Occupied(record) => record,
            Slot::Vacant => panic!("pool handle {} refers to a vacant slot", handle.index()),
        }
    }

    /// Mutable access to the record owned by `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` was issued by a different pool and points at a
    /// vacant or nonexistent slot.
    pub fn get_mut(&mut self, handle: &PoolHandle<R>) -> &mut R {
        match &mut self.slots[handle.index() as usize] {
            Slot::Occupied(record) => record,
            Slot::Vacant => panic!("pool handle {} refers to a vacant slot", handle.index()),
        }
    }

    /// Drop every record and forget all outstanding handles.
    ///
    /// Backing storage is kept for reuse. Handles issued before the call
    /// must not be used afterwards.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the pool holds no live records.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots the backing storage can hold without growing.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of vacant slots waiting on the free list.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Maximum number of live records.
    pub fn max_records(&self) -> u32 {
        self.max_records
    }

    /// Memory used by the slot and free-list storage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.slots.capacity() * std::mem::size_of::<Slot<R>>()
            + self.free.capacity() * std::mem::size_of::<u32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut pool = NodePool::new(16);
        let h = pool.insert(7u32).unwrap();
        assert_eq!(*pool.get(&h), 7);
        assert_eq!(pool.len(), 1);
        assert!(!pool.is_empty());
    }

    #[test]
    fn get_mut_writes_through() {
        let mut pool = NodePool::new(16);
        let h = pool.insert(1u32).unwrap();
        *pool.get_mut(&h) = 9;
        assert_eq!(*pool.get(&h), 9);
    }

    #[test]
    fn remove_returns_record_and_frees_slot() {
        let mut pool = NodePool::new(16);
        let h = pool.insert(String::from("stub")).unwrap();
        assert_eq!(pool.remove(h), "stub");
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.free_count(), 1);
    }

    #[test]
    fn freed_slot_is_reused_lifo() {
        let mut pool = NodePool::new(16);
        let a = pool.insert(1u8).unwrap();
        let b = pool.insert(2u8).unwrap();
        let b_index = b.index();
        pool.remove(a);
        pool.remove(b);

        let c = pool.insert(3u8).unwrap();
        assert_eq!(c.index(), b_index);
        assert_eq!(pool.free_count(), 1);
    }

    #[test]
    fn insert_past_limit_is_capacity_exceeded() {
        let mut pool = NodePool::new(2);
        let _a = pool.insert(1u8).unwrap();
        let _b = pool.insert(2u8).unwrap();
        let err = pool.insert(3u8).unwrap_err();
        assert_eq!(
            err,
            PoolError::CapacityExceeded {
                requested: 3,
                capacity: 2
            }
        );
    }

    #[test]
    fn reserve_counts_free_slots() {
        let mut pool = NodePool::new(4);
        let handles: Vec<_> = (0..4u8).map(|v| pool.insert(v).unwrap()).collect();
        for h in handles {
            pool.remove(h);
        }
        let capacity = pool.capacity();
        pool.reserve(4).unwrap();
        assert_eq!(pool.capacity(), capacity, "free slots cover the reservation");
        assert!(pool.reserve(5).is_err());
    }

    #[test]
    fn reserved_inserts_do_not_reallocate() {
        let mut pool = NodePool::with_capacity(0, 1024);
        pool.reserve(100).unwrap();
        let capacity = pool.capacity();
        for v in 0..100u32 {
            let _ = pool.insert(v).unwrap();
        }
        assert_eq!(pool.capacity(), capacity);
    }

    #[test]
    fn initial_capacity_clamped_to_limit() {
        let pool: NodePool<u64> = NodePool::with_capacity(1000, 8);
        assert!(pool.capacity() >= 8);
        assert!(pool.capacity() < 1000);
    }

    #[test]
    fn clear_resets_everything() {
        let mut pool = NodePool::new(8);
        let a = pool.insert(1u8).unwrap();
        let _b = pool.insert(2u8).unwrap();
        pool.remove(a);
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.free_count(), 0);
        let c = pool.insert(3u8).unwrap();
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn memory_bytes_tracks_capacity() {
        let mut pool: NodePool<u64> = NodePool::new(1024);
        assert_eq!(pool.memory_bytes(), 0);
        pool.reserve(10).unwrap();
        assert!(pool.memory_bytes() >= 10 * std::mem::size_of::<u64>());
    }

    #[test]
    #[should_panic(expected = "vacant slot")]
    fn foreign_handle_to_vacant_slot_panics() {
        let mut a = NodePool::new(8);
        let mut b = NodePool::new(8);
        let h = a.insert(1u8).unwrap();
        let stale = b.insert(2u8).unwrap();
        let index = stale.index();
        b.remove(stale);
        assert_eq!(h.index(), index);
        // `h` came from `a`; its index is vacant in `b`.
        let _ = b.get(&h);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn live_count_matches_model(
                ops in proptest::collection::vec(any::<bool>(), 1..200),
            ) {
                let mut pool = NodePool::new(u32::MAX);
                let mut handles = Vec::new();
                for (i, insert) in ops.into_iter().enumerate() {
                    if insert || handles.is_empty() {
                        handles.push((pool.insert(i).unwrap(), i));
                    } else {
                        let (h, expected) = handles.swap_remove(i % handles.len());
                        prop_assert_eq!(pool.remove(h), expected);
                    }
                    prop_assert_eq!(pool.len(), handles.len());
                }
                for (h, expected) in &handles {
                    prop_assert_eq!(pool.get(h), expected);
                }
            }

            #[test]
            fn slot_count_bounded_by_peak_live(
                rounds in proptest::collection::vec(1usize..32, 1..20),
            ) {
                let mut pool = NodePool::new(u32::MAX);
                let mut peak = 0;
                for n in rounds {
                    let handles: Vec<_> = (0..n).map(|v| pool.insert(v).unwrap()).collect();
                    peak = peak.max(pool.len());
                    for h in handles {
                        pool.remove(h);
                    }
                }
                prop_assert_eq!(pool.free_count(), peak);
            }
        }
    }
}
