//! The public spatial tree.

use std::fmt;
use std::ops::Index;

use crate::config::TreeConfig;
use crate::error::TreeError;
use crate::node::{Node, NodePools};
use crate::region::{CoordIter, Region};

/// A sparse, self-compressing grid of `edge_length^D` cells.
///
/// Regions whose cells all hold the same value are stored as one stub;
/// writes split stubs on demand and merge branches back as soon as their
/// children agree again. The root is always a branch.
///
/// `D` must be 2, 3 or 4; other values fail to compile when a tree is
/// constructed.
///
/// ```rust
/// use tessel_tree::QuadTree;
///
/// let mut tree = QuadTree::new(4, 0u8).unwrap();
/// tree.set_value([0, 0], 1).unwrap();
/// assert_eq!(tree.get_value([0, 0]).unwrap(), 1);
/// assert_eq!(tree.get_value([1, 0]).unwrap(), 0);
/// ```
pub struct SpatialTree<T, const D: usize> {
    config: TreeConfig,
    default_value: T,
    root: Node<T>,
    pools: NodePools<T>,
}

/// Two-dimensional tree: four children per branch.
pub type QuadTree<T> = SpatialTree<T, 2>;

/// Three-dimensional tree: eight children per branch.
pub type OctTree<T> = SpatialTree<T, 3>;

/// Four-dimensional tree: sixteen children per branch.
pub type HexTree<T> = SpatialTree<T, 4>;

/// A stub as seen from outside the tree: a uniform cube of cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaf<'a, T, const D: usize> {
    /// Minimum corner of the cube.
    pub origin: [i32; D],
    /// Edge length of the cube in cells.
    pub edge_length: u32,
    /// Value of every cell in the cube.
    pub value: &'a T,
}

impl<T: Clone + PartialEq, const D: usize> SpatialTree<T, D> {
    const DIMENSION_CHECK: () = assert!(
        D >= 2 && D <= 4,
        "SpatialTree supports 2, 3 or 4 dimensions"
    );

    /// Create a tree of `edge_length^D` cells, all holding `default_value`.
    ///
    /// `edge_length` must be a power of two and at least 2.
    pub fn new(edge_length: u32, default_value: T) -> Result<Self, TreeError> {
        Self::with_config(TreeConfig::new(edge_length), default_value)
    }

    /// Create a tree from an explicit configuration.
    pub fn with_config(config: TreeConfig, default_value: T) -> Result<Self, TreeError> {
        #[allow(clippy::let_unit_value)]
        let () = Self::DIMENSION_CHECK;
        config.validate(Region::<D>::CHILDREN)?;

        let mut pools = NodePools::new(&config);
        let root = Node::uniform_branch::<D>(&mut pools, default_value.clone())?;
        tracing::debug!(
            edge_length = config.edge_length,
            dims = D,
            "spatial tree created"
        );
        Ok(Self {
            config,
            default_value,
            root,
            pools,
        })
    }

    /// Borrow the value of the cell at `coord`.
    pub fn get(&self, coord: [i32; D]) -> Result<&T, TreeError> {
        self.check_coord(&coord)?;
        Ok(self.cell(&coord))
    }

    /// Value of the cell at `coord`.
    pub fn get_value(&self, coord: [i32; D]) -> Result<T, TreeError> {
        self.get(coord).cloned()
    }

    /// Set the cell at `coord` to `value`.
    ///
    /// The nodes the write needs are reserved before anything changes, so
    /// on [`TreeError::ResourceExhausted`] the tree is left as it was.
    pub fn set_value(&mut self, coord: [i32; D], value: T) -> Result<(), TreeError> {
        self.check_coord(&coord)?;
        let region = self.root_region();
        let expansions = self
            .root
            .expansions_for(&self.pools, region, &coord, &value);
        self.pools
            .reserve_write(expansions, Region::<D>::CHILDREN)?;

        // The root never collapses; a request from it is dropped.
        let _ = self.root.write(&mut self.pools, region, &coord, value)?;
        Ok(())
    }

    /// Reset every cell to `value`, discarding all nodes but a fresh root.
    ///
    /// The default value is not changed.
    pub fn set_all(&mut self, value: T) {
        self.pools.clear();
        self.root = Node::uniform_branch::<D>(&mut self.pools, value)
            .expect("cleared pools keep room for the root branch");
        tracing::debug!(edge_length = self.config.edge_length, "tree reset");
    }

    /// Make this tree a cell-for-cell copy of `other`.
    ///
    /// Adopts `other`'s edge length and default value, then writes every
    /// cell of `other` in turn. This costs `O(edge_length^D)` writes and
    /// leaves the copy at least as compact as `other`. On error the copy is
    /// incomplete.
    pub fn copy_from(&mut self, other: &Self) -> Result<(), TreeError> {
        self.config.edge_length = other.config.edge_length;
        self.default_value = other.default_value.clone();
        self.set_all(other.default_value.clone());
        self.rebuild_from(other)
    }

    /// Build a new tree with the same configuration and cell values.
    ///
    /// Fails only if the configured pool limits cannot hold the copy.
    pub fn try_clone(&self) -> Result<Self, TreeError> {
        let mut copy = Self::with_config(self.config.clone(), self.default_value.clone())?;
        copy.rebuild_from(self)?;
        Ok(copy)
    }

    fn rebuild_from(&mut self, other: &Self) -> Result<(), TreeError> {
        for coord in other.coords() {
            self.set_value(coord, other.cell(&coord).clone())?;
        }
        tracing::debug!(
            edge_length = self.config.edge_length,
            stubs = self.stub_count(),
            branches = self.branch_count(),
            "tree rebuilt from copy"
        );
        Ok(())
    }

    fn cell(&self, coord: &[i32; D]) -> &T {
        self.root.value_at(&self.pools, self.root_region(), coord)
    }
}

impl<T, const D: usize> SpatialTree<T, D> {
    fn root_region(&self) -> Region<D> {
        Region::root(self.config.edge_length)
    }

    fn check_coord(&self, coord: &[i32; D]) -> Result<(), TreeError> {
        if self.root_region().contains(coord) {
            Ok(())
        } else {
            Err(TreeError::CoordOutOfRange {
                coord: coord.to_vec(),
                edge_length: self.config.edge_length,
            })
        }
    }

    /// Edge length of the whole tree in cells.
    pub fn edge_length(&self) -> u32 {
        self.config.edge_length
    }

    /// The value the tree was created with.
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    /// The configuration this tree was built from.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Number of live stub nodes.
    pub fn stub_count(&self) -> usize {
        self.pools.stubs.len()
    }

    /// Number of live branch nodes, root included.
    pub fn branch_count(&self) -> usize {
        self.pools.branches.len()
    }

    /// Number of live nodes of either kind.
    pub fn node_count(&self) -> usize {
        self.stub_count() + self.branch_count()
    }

    /// Branch levels on the longest root-to-stub path. A fully collapsed
    /// tree has depth 1.
    pub fn depth(&self) -> usize {
        self.root.depth(&self.pools)
    }

    /// Bytes held by the tree and its node pools.
    pub fn memory_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.pools.memory_bytes()
    }

    /// Number of cells, `edge_length^D`.
    pub fn cell_count(&self) -> u128 {
        self.root_region().cell_count()
    }

    /// Every coordinate of the tree, axis 0 varying fastest.
    pub fn coords(&self) -> CoordIter<D> {
        self.root_region().coords()
    }

    /// Every stub as a uniform cube, depth first in child-index order.
    pub fn leaves(&self) -> Vec<Leaf<'_, T, D>> {
        let mut out = Vec::with_capacity(self.stub_count());
        self.collect_leaves(&self.root, self.root_region(), &mut out);
        out
    }

    fn collect_leaves<'a>(
        &'a self,
        node: &'a Node<T>,
        region: Region<D>,
        out: &mut Vec<Leaf<'a, T, D>>,
    ) {
        match node {
            Node::Stub(stub) => out.push(Leaf {
                origin: region.origin(),
                edge_length: region.edge_length(),
                value: self.pools.stubs.get(stub),
            }),
            Node::Branch(branch) => {
                for (index, child) in self.pools.branches.get(branch).iter().enumerate() {
                    self.collect_leaves(child, region.child(index), out);
                }
            }
        }
    }

    fn fmt_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: &Node<T>,
        region: Region<D>,
        indent: usize,
    ) -> fmt::Result
    where
        T: fmt::Debug,
    {
        let pad = indent * 2;
        match node {
            Node::Stub(stub) => writeln!(
                f,
                "{:pad$}stub {:?} x{} = {:?}",
                "",
                region.origin(),
                region.edge_length(),
                self.pools.stubs.get(stub)
            ),
            Node::Branch(branch) => {
                writeln!(
                    f,
                    "{:pad$}branch {:?} x{}",
                    "",
                    region.origin(),
                    region.edge_length()
                )?;
                for (index, child) in self.pools.branches.get(branch).iter().enumerate() {
                    self.fmt_node(f, child, region.child(index), indent + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl<T: Clone + PartialEq, const D: usize> Clone for SpatialTree<T, D> {
    /// Rebuild cell by cell, like [`SpatialTree::copy_from`].
    ///
    /// # Panics
    ///
    /// The copy's pools are not limited, so this panics only if a pool
    /// cannot grow its storage. Use [`SpatialTree::try_clone`] to get that
    /// failure as an error.
    fn clone(&self) -> Self {
        let config = TreeConfig {
            max_stubs: TreeConfig::DEFAULT_MAX_RECORDS,
            max_branches: TreeConfig::DEFAULT_MAX_RECORDS,
            ..self.config.clone()
        };
        let mut copy = Self::with_config(config, self.default_value.clone())
            .expect("a validated config with unlimited pools always builds");
        copy.rebuild_from(self)
            .expect("unlimited pools fail only when the allocator does");
        copy
    }
}

impl<T: Clone + PartialEq, const D: usize> Index<[i32; D]> for SpatialTree<T, D> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `coord` is out of range; use [`SpatialTree::get`] to handle
    /// that case.
    fn index(&self, coord: [i32; D]) -> &T {
        match self.get(coord) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T: fmt::Debug, const D: usize> fmt::Debug for SpatialTree<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "SpatialTree<{}> edge_length={} stubs={} branches={}",
            D,
            self.config.edge_length,
            self.stub_count(),
            self.branch_count()
        )?;
        self.fmt_node(f, &self.root, self.root_region(), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tree_is_uniform_root_branch() {
        let tree = QuadTree::new(8, 3u8).unwrap();
        assert_eq!(tree.edge_length(), 8);
        assert_eq!(*tree.default_value(), 3);
        assert_eq!(tree.branch_count(), 1);
        assert_eq!(tree.stub_count(), 4);
        assert_eq!(tree.depth(), 1);
        for coord in tree.coords() {
            assert_eq!(tree.get_value(coord).unwrap(), 3);
        }
    }

    #[test]
    fn octree_root_has_eight_stubs() {
        let tree = OctTree::new(4, 0i32).unwrap();
        assert_eq!(tree.stub_count(), 8);
        assert_eq!(tree.cell_count(), 64);
    }

    #[test]
    fn hextree_root_has_sixteen_stubs() {
        let mut tree = HexTree::new(2, false).unwrap();
        assert_eq!(tree.stub_count(), 16);
        tree.set_value([1, 0, 1, 1], true).unwrap();
        assert!(tree.get_value([1, 0, 1, 1]).unwrap());
        assert!(!tree.get_value([1, 1, 1, 1]).unwrap());
    }

    #[test]
    fn invalid_edge_length_reported() {
        for edge_length in [0, 1, 3, 12] {
            assert!(matches!(
                QuadTree::new(edge_length, 0u8),
                Err(TreeError::InvalidEdgeLength { .. })
            ));
        }
    }

    #[test]
    fn out_of_range_reported_for_reads_and_writes() {
        let mut tree = QuadTree::new(4, 0u8).unwrap();
        for coord in [[4, 0], [0, 4], [-1, 0], [0, i32::MIN]] {
            assert_eq!(
                tree.get(coord),
                Err(TreeError::CoordOutOfRange {
                    coord: coord.to_vec(),
                    edge_length: 4
                })
            );
            assert!(matches!(
                tree.set_value(coord, 1),
                Err(TreeError::CoordOutOfRange { .. })
            ));
        }
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn write_then_read_single_cell() {
        let mut tree = QuadTree::new(4, 0u8).unwrap();
        tree.set_value([0, 0], 1).unwrap();
        assert_eq!(tree.get_value([0, 0]).unwrap(), 1);
        assert_eq!(tree.get_value([1, 0]).unwrap(), 0);
        assert_eq!(tree[[0, 0]], 1);
    }

    #[test]
    fn quadrant_fill_collapses_to_stub() {
        let mut tree = QuadTree::new(4, 0u8).unwrap();
        tree.set_value([0, 0], 1).unwrap();
        assert_eq!(tree.branch_count(), 2);

        tree.set_value([1, 0], 1).unwrap();
        tree.set_value([0, 1], 1).unwrap();
        tree.set_value([1, 1], 1).unwrap();
        assert_eq!(tree.branch_count(), 1);
        assert_eq!(tree.stub_count(), 4);
        assert_eq!(tree.get_value([2, 0]).unwrap(), 0);

        let leaves = tree.leaves();
        assert_eq!(
            leaves[0],
            Leaf {
                origin: [0, 0],
                edge_length: 2,
                value: &1
            }
        );
    }

    #[test]
    fn idempotent_write() {
        let mut once = QuadTree::new(8, 0u8).unwrap();
        let mut twice = QuadTree::new(8, 0u8).unwrap();
        once.set_value([5, 2], 7).unwrap();
        twice.set_value([5, 2], 7).unwrap();
        twice.set_value([5, 2], 7).unwrap();
        assert_eq!(once.stub_count(), twice.stub_count());
        assert_eq!(once.branch_count(), twice.branch_count());
        for coord in once.coords() {
            assert_eq!(once.get(coord).unwrap(), twice.get(coord).unwrap());
        }
    }

    #[test]
    fn set_all_resets_cells_and_nodes() {
        let mut tree = OctTree::new(8, 0u16).unwrap();
        tree.set_value([1, 2, 3], 9).unwrap();
        tree.set_value([7, 7, 7], 4).unwrap();
        tree.set_all(5);
        assert_eq!(tree.branch_count(), 1);
        assert_eq!(tree.stub_count(), 8);
        assert_eq!(tree.get_value([1, 2, 3]).unwrap(), 5);
        assert_eq!(*tree.default_value(), 0);
    }

    #[test]
    fn copy_from_adopts_size_and_cells() {
        let mut source = QuadTree::new(8, 2u8).unwrap();
        source.set_value([3, 6], 5).unwrap();
        let mut target = QuadTree::new(4, 0u8).unwrap();
        target.copy_from(&source).unwrap();
        assert_eq!(target.edge_length(), 8);
        assert_eq!(*target.default_value(), 2);
        for coord in source.coords() {
            assert_eq!(target.get(coord).unwrap(), source.get(coord).unwrap());
        }
    }

    #[test]
    fn try_clone_respects_limits() {
        let mut config = TreeConfig::new(8);
        config.max_branches = 1;
        let tree = QuadTree::with_config(config, 0u8).unwrap();
        let copy = tree.try_clone().unwrap();
        assert_eq!(copy.config(), tree.config());
    }

    #[test]
    fn pool_limit_leaves_tree_unchanged() {
        let mut config = TreeConfig::new(16);
        config.max_branches = 2;
        let mut tree = QuadTree::with_config(config, 0u8).unwrap();

        let err = tree.set_value([0, 0], 1).unwrap_err();
        assert!(matches!(err, TreeError::ResourceExhausted(_)));
        assert_eq!(tree.branch_count(), 1);
        assert_eq!(tree.stub_count(), 4);
        assert_eq!(tree.get_value([0, 0]).unwrap(), 0);

        // A write that needs only one split still fits.
        tree.set_value([0, 0], 0).unwrap();
        let mut config = TreeConfig::new(4);
        config.max_branches = 2;
        let mut small = QuadTree::with_config(config, 0u8).unwrap();
        small.set_value([3, 3], 1).unwrap();
        assert_eq!(small.branch_count(), 2);
    }

    #[test]
    fn split_fits_stub_limit_exactly() {
        // Four root stubs plus four for the split, the old stub still live.
        let config = TreeConfig {
            max_stubs: 8,
            ..TreeConfig::new(4)
        };
        let mut tree = QuadTree::with_config(config, 0u8).unwrap();
        tree.set_value([0, 0], 1).unwrap();
        assert_eq!(tree.stub_count(), 7);
        assert_eq!(tree.branch_count(), 2);
        assert_eq!(tree.get_value([0, 0]).unwrap(), 1);

        // Filling the quadrant collapses it without a spare stub.
        for coord in [[1, 0], [0, 1], [1, 1]] {
            tree.set_value(coord, 1).unwrap();
        }
        assert_eq!(tree.stub_count(), 4);
        assert_eq!(tree.branch_count(), 1);
    }

    #[test]
    fn multi_level_split_fits_stub_limit_exactly() {
        let config = TreeConfig {
            max_stubs: 4 + 2 * 4,
            ..TreeConfig::new(8)
        };
        let mut tree = QuadTree::with_config(config, 0u8).unwrap();
        tree.set_value([0, 0], 1).unwrap();
        assert_eq!(tree.branch_count(), 3);
        assert_eq!(tree.stub_count(), 10);
        assert_eq!(tree.get_value([0, 0]).unwrap(), 1);
        assert_eq!(tree.get_value([1, 0]).unwrap(), 0);
    }

    #[test]
    fn split_one_stub_past_limit_is_exhausted() {
        let config = TreeConfig {
            max_stubs: 4 + 2 * 4 - 1,
            ..TreeConfig::new(8)
        };
        let mut tree = QuadTree::with_config(config, 0u8).unwrap();
        let err = tree.set_value([0, 0], 1).unwrap_err();
        assert!(matches!(err, TreeError::ResourceExhausted(_)));
        assert_eq!(tree.stub_count(), 4);
        assert_eq!(tree.branch_count(), 1);
    }

    #[test]
    fn debug_outline_lists_nodes() {
        let mut tree = QuadTree::new(4, 0u8).unwrap();
        tree.set_value([3, 3], 1).unwrap();
        let text = format!("{tree:?}");
        assert!(text.starts_with("SpatialTree<2> edge_length=4 stubs=7 branches=2"));
        assert!(text.contains("  branch [0, 0] x4"));
        assert!(text.contains("    stub [0, 0] x2 = 0"));
        assert!(text.contains("      stub [3, 3] x1 = 1"));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn index_panics_out_of_range() {
        let tree = QuadTree::new(4, 0u8).unwrap();
        let _ = tree[[4, 4]];
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use tessel_test_utils::DenseGrid;

        fn owned_leaves(tree: &QuadTree<u8>) -> Vec<([i32; 2], u32, u8)> {
            tree.leaves()
                .into_iter()
                .map(|leaf| (leaf.origin, leaf.edge_length, *leaf.value))
                .collect()
        }

        proptest! {
            #[test]
            fn write_changes_only_its_cell(
                writes in proptest::collection::vec((0i32..8, 0i32..8, 0u8..3), 1..100),
            ) {
                let mut tree = QuadTree::new(8, 0u8).unwrap();
                let mut dense = DenseGrid::<u8, 2>::new(8, 0);
                for (x, y, v) in writes {
                    tree.set_value([x, y], v).unwrap();
                    dense.set([x, y], v);
                    for (coord, expected) in dense.iter() {
                        prop_assert_eq!(tree.get(coord).unwrap(), expected);
                    }
                }
            }

            #[test]
            fn repeated_write_is_idempotent(
                writes in proptest::collection::vec((0i32..8, 0i32..8, 0u8..3), 0..100),
                x in 0i32..8,
                y in 0i32..8,
                v in 0u8..3,
            ) {
                let mut tree = QuadTree::new(8, 0u8).unwrap();
                for (wx, wy, wv) in writes {
                    tree.set_value([wx, wy], wv).unwrap();
                }
                tree.set_value([x, y], v).unwrap();
                let once = owned_leaves(&tree);
                let nodes = tree.node_count();
                tree.set_value([x, y], v).unwrap();
                prop_assert_eq!(owned_leaves(&tree), once);
                prop_assert_eq!(tree.node_count(), nodes);
            }

            #[test]
            fn leaves_tile_the_tree(
                writes in proptest::collection::vec((0i32..16, 0i32..16, 0u8..2), 0..200),
            ) {
                let mut tree = QuadTree::new(16, 0u8).unwrap();
                for (x, y, v) in writes {
                    tree.set_value([x, y], v).unwrap();
                }
                let covered: u128 = tree
                    .leaves()
                    .iter()
                    .map(|leaf| (leaf.edge_length as u128).pow(2))
                    .sum();
                prop_assert_eq!(covered, tree.cell_count());
                prop_assert_eq!(tree.leaves().len(), tree.stub_count());
            }
        }
    }
}
