//! Stub/branch nodes and the collapse/expand write path.
//!
//! A [`Node`] is either a stub (one value covering its whole region) or a
//! branch (exactly `2^D` children, one per orthant). Nodes are plain
//! handles into the two [`NodePools`]; each handle is owned by exactly one
//! parent slot, and freeing a node goes through [`Node::release`].

use smallvec::SmallVec;
use tessel_pool::{NodePool, PoolError, PoolHandle};

use crate::config::TreeConfig;
use crate::region::Region;

/// Child slots of a branch.
///
/// Inline up to sixteen children so that no dimension sends a branch
/// record to the global allocator. Quadtree branches pay for twelve unused
/// slots in exchange.
pub(crate) type Children<T> = SmallVec<[Node<T>; 16]>;

/// A tree node, owned by exactly one slot.
#[derive(Debug)]
pub(crate) enum Node<T> {
    /// Every cell of the region holds this value.
    Stub(PoolHandle<T>),
    /// One child per orthant.
    Branch(PoolHandle<Children<T>>),
}

/// What a write asks of the slot that owns the written node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum WriteOutcome<T> {
    /// Nothing for the parent to do.
    Unchanged,
    /// The node is a branch whose children are all stubs holding this
    /// value; the parent should replace it with a single stub.
    CollapseRequested(T),
}

/// The stub and branch pools of one tree.
#[derive(Debug)]
pub(crate) struct NodePools<T> {
    pub(crate) stubs: NodePool<T>,
    pub(crate) branches: NodePool<Children<T>>,
}

impl<T> NodePools<T> {
    pub(crate) fn new(config: &TreeConfig) -> Self {
        Self {
            stubs: NodePool::with_capacity(config.initial_capacity, config.max_stubs),
            branches: NodePool::with_capacity(config.initial_capacity, config.max_branches),
        }
    }

    /// Reserve room for `expansions` stub-to-branch splits, so the write
    /// that follows cannot fail halfway.
    ///
    /// Each split holds the old stub until its replacement branch is built,
    /// so the peak is `children` new stubs per split. Collapses reuse a
    /// child stub and need nothing.
    pub(crate) fn reserve_write(
        &mut self,
        expansions: usize,
        children: usize,
    ) -> Result<(), PoolError> {
        self.stubs.reserve(expansions * children)?;
        self.branches.reserve(expansions)?;
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.stubs.clear();
        self.branches.clear();
    }

    pub(crate) fn memory_bytes(&self) -> usize {
        self.stubs.memory_bytes() + self.branches.memory_bytes()
    }
}

impl<T: Clone + PartialEq> Node<T> {
    /// A branch whose `2^D` children are stubs holding `value`.
    pub(crate) fn uniform_branch<const D: usize>(
        pools: &mut NodePools<T>,
        value: T,
    ) -> Result<Self, PoolError> {
        // With both reservations held no insert below can fail partway.
        pools.stubs.reserve(Region::<D>::CHILDREN)?;
        pools.branches.reserve(1)?;

        let mut children = Children::with_capacity(Region::<D>::CHILDREN);
        for _ in 1..Region::<D>::CHILDREN {
            children.push(Node::Stub(pools.stubs.insert(value.clone())?));
        }
        children.push(Node::Stub(pools.stubs.insert(value)?));
        Ok(Node::Branch(pools.branches.insert(children)?))
    }

    /// Value of the cell at `coord` inside `region`.
    pub(crate) fn value_at<'a, const D: usize>(
        &'a self,
        pools: &'a NodePools<T>,
        mut region: Region<D>,
        coord: &[i32; D],
    ) -> &'a T {
        let mut node = self;
        loop {
            match node {
                Node::Stub(stub) => return pools.stubs.get(stub),
                Node::Branch(branch) => {
                    let index = region.child_index(coord);
                    region = region.child(index);
                    node = &pools.branches.get(branch)[index];
                }
            }
        }
    }

    /// Number of splits a write of `value` at `coord` would perform.
    ///
    /// Zero unless the write lands in a stub wider than one cell holding a
    /// different value, in which case it is one per level down to the cell.
    pub(crate) fn expansions_for<const D: usize>(
        &self,
        pools: &NodePools<T>,
        mut region: Region<D>,
        coord: &[i32; D],
        value: &T,
    ) -> usize {
        let mut node = self;
        loop {
            match node {
                Node::Stub(stub) => {
                    if region.is_cell() || pools.stubs.get(stub) == value {
                        return 0;
                    }
                    return region.edge_length().trailing_zeros() as usize;
                }
                Node::Branch(branch) => {
                    let index = region.child_index(coord);
                    region = region.child(index);
                    node = &pools.branches.get(branch)[index];
                }
            }
        }
    }

    /// Write `value` at `coord` inside `region`, splitting and merging
    /// nodes so that no branch of equal stubs remains below this one.
    ///
    /// A stub that has to split replaces itself with a branch in place.
    /// A branch reports [`WriteOutcome::CollapseRequested`] when the write
    /// left all of its children as equal stubs; acting on that is the
    /// parent's job.
    pub(crate) fn write<const D: usize>(
        &mut self,
        pools: &mut NodePools<T>,
        region: Region<D>,
        coord: &[i32; D],
        value: T,
    ) -> Result<WriteOutcome<T>, PoolError> {
        match self {
            Node::Stub(stub) => {
                let current = pools.stubs.get_mut(stub);
                if region.is_cell() {
                    *current = value;
                    return Ok(WriteOutcome::Unchanged);
                }
                if *current == value {
                    return Ok(WriteOutcome::Unchanged);
                }
                let previous = current.clone();
                self.expand(pools, previous, region, coord, value)?;
                Ok(WriteOutcome::Unchanged)
            }
            Node::Branch(branch) => {
                let index = region.child_index(coord);
                let mut children = std::mem::take(pools.branches.get_mut(branch));
                let written = children[index]
                    .write(pools, region.child(index), coord, value)
                    .map(|outcome| {
                        if let WriteOutcome::CollapseRequested(common) = outcome {
                            children[index].collapse(pools, common, region.child(index));
                        }
                    });
                let outcome = written.map(|()| match uniform_value(&children, pools) {
                    Some(common) => WriteOutcome::CollapseRequested(common),
                    None => WriteOutcome::Unchanged,
                });
                *pools.branches.get_mut(branch) = children;
                outcome
            }
        }
    }

    /// Replace this stub with a branch of `previous`-valued stubs and
    /// route the write into it.
    fn expand<const D: usize>(
        &mut self,
        pools: &mut NodePools<T>,
        previous: T,
        region: Region<D>,
        coord: &[i32; D],
        value: T,
    ) -> Result<(), PoolError> {
        let mut branch = Node::uniform_branch::<D>(pools, previous)?;
        if let Err(e) = branch.write(pools, region, coord, value) {
            branch.release(pools);
            return Err(e);
        }
        std::mem::replace(self, branch).release(pools);
        tracing::trace!(
            origin = ?region.origin(),
            edge_length = region.edge_length(),
            "stub expanded"
        );
        Ok(())
    }

    /// Replace this branch of equal stubs with one of those stubs, now
    /// covering the whole region.
    fn collapse<const D: usize>(
        &mut self,
        pools: &mut NodePools<T>,
        common: T,
        region: Region<D>,
    ) {
        let Node::Branch(branch) = self else {
            return;
        };
        let mut children = std::mem::take(pools.branches.get_mut(branch));
        let Some(Node::Stub(kept)) = children.pop() else {
            unreachable!("collapse requested by a branch with a branch child");
        };
        *pools.stubs.get_mut(&kept) = common;
        release_all(children, pools);
        std::mem::replace(self, Node::Stub(kept)).release(pools);
        tracing::trace!(
            origin = ?region.origin(),
            edge_length = region.edge_length(),
            "branch collapsed"
        );
    }
}

impl<T> Node<T> {
    /// Free this node and everything below it.
    pub(crate) fn release(self, pools: &mut NodePools<T>) {
        match self {
            Node::Stub(stub) => {
                pools.stubs.remove(stub);
            }
            Node::Branch(branch) => {
                let children = pools.branches.remove(branch);
                release_all(children, pools);
            }
        }
    }

    /// Number of branch levels from this node down to its deepest stub.
    pub(crate) fn depth(&self, pools: &NodePools<T>) -> usize {
        match self {
            Node::Stub(_) => 0,
            Node::Branch(branch) => {
                1 + pools
                    .branches
                    .get(branch)
                    .iter()
                    .map(|child| child.depth(pools))
                    .max()
                    .unwrap_or(0)
            }
        }
    }
}

fn release_all<T>(children: Children<T>, pools: &mut NodePools<T>) {
    for child in children {
        child.release(pools);
    }
}

/// The shared value of `children` if every one is a stub and all values
/// are equal.
fn uniform_value<T: Clone + PartialEq>(children: &Children<T>, pools: &NodePools<T>) -> Option<T> {
    let mut values = children.iter().map(|child| match child {
        Node::Stub(stub) => Some(pools.stubs.get(stub)),
        Node::Branch(_) => None,
    });
    let first = values.next()??;
    for value in values {
        if value? != first {
            return None;
        }
    }
    Some(first.clone())
}
