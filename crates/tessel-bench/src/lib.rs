//! Benchmark workloads for the Tessel spatial trees.
//!
//! - [`scattered_quadtree`]: seeded random writes over the whole tree
//! - [`clustered_quadtree`]: seeded writes confined to one corner
//! - [`checkerboard_quadtree`]: worst case, every cell its own stub

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tessel_test_utils::WriteSequence;
use tessel_tree::QuadTree;

/// A quadtree after `writes` seeded random writes from a two-value palette.
pub fn scattered_quadtree(edge_length: u32, writes: usize, seed: u64) -> QuadTree<u32> {
    let mut tree = QuadTree::new(edge_length, 0).expect("benchmark edge length is valid");
    for write in WriteSequence::<2>::new(seed, edge_length, 2).take(writes) {
        tree.set_value(write.coord, write.value)
            .expect("generated coordinates are in range");
    }
    tree
}

/// A quadtree whose writes all land in the `corner^2` cells at the origin.
pub fn clustered_quadtree(
    edge_length: u32,
    corner: u32,
    writes: usize,
    seed: u64,
) -> QuadTree<u32> {
    let mut tree = QuadTree::new(edge_length, 0).expect("benchmark edge length is valid");
    let sequence = WriteSequence::<2>::new(seed, edge_length, 2).confined_to(corner);
    for write in sequence.take(writes) {
        tree.set_value(write.coord, write.value)
            .expect("generated coordinates are in range");
    }
    tree
}

/// A fully expanded quadtree: alternating values in every cell.
pub fn checkerboard_quadtree(edge_length: u32) -> QuadTree<u32> {
    let mut tree = QuadTree::new(edge_length, 0).expect("benchmark edge length is valid");
    let coords: Vec<_> = tree.coords().collect();
    for [x, y] in coords {
        tree.set_value([x, y], ((x + y) % 2) as u32)
            .expect("tree coordinates are in range");
    }
    tree
}
