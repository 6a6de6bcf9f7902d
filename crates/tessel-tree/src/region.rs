//! Axis-aligned power-of-two regions and orthant selection.
//!
//! A [`Region`] is never stored in the tree. It is recomputed on the way
//! down from the root: each branch halves its region along every axis and
//! hands one orthant to each child. Child index bit `i` is set when the
//! child lies on the upper half of axis `i`.

/// A cube of cells identified by its minimum corner and edge length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region<const D: usize> {
    origin: [i32; D],
    edge_length: u32,
}

impl<const D: usize> Region<D> {
    /// Number of orthants a region splits into.
    pub const CHILDREN: usize = 1 << D;

    /// Region at `origin` with the given edge length.
    pub fn new(origin: [i32; D], edge_length: u32) -> Self {
        debug_assert!(edge_length.is_power_of_two());
        Self {
            origin,
            edge_length,
        }
    }

    /// Region anchored at the all-zero coordinate.
    pub fn root(edge_length: u32) -> Self {
        Self::new([0; D], edge_length)
    }

    /// Minimum corner of the region.
    pub fn origin(&self) -> [i32; D] {
        self.origin
    }

    /// Edge length in cells.
    pub fn edge_length(&self) -> u32 {
        self.edge_length
    }

    /// Whether the region is a single cell.
    pub fn is_cell(&self) -> bool {
        self.edge_length == 1
    }

    /// First coordinate of the upper half along every axis.
    pub fn center(&self) -> [i32; D] {
        let half = (self.edge_length / 2) as i32;
        self.origin.map(|o| o + half)
    }

    /// Index of the orthant containing `coord`.
    ///
    /// `coord` must lie inside the region; the result is meaningless
    /// otherwise.
    pub fn child_index(&self, coord: &[i32; D]) -> usize {
        debug_assert!(self.contains(coord), "{coord:?} not in {self:?}");
        let center = self.center();
        let mut index = 0;
        for axis in 0..D {
            if coord[axis] >= center[axis] {
                index |= 1 << axis;
            }
        }
        index
    }

    /// The orthant with the given child index.
    pub fn child(&self, index: usize) -> Self {
        debug_assert!(index < Self::CHILDREN);
        let half = self.edge_length / 2;
        let mut origin = self.origin;
        for (axis, o) in origin.iter_mut().enumerate() {
            if index & (1 << axis) != 0 {
                *o += half as i32;
            }
        }
        Self::new(origin, half)
    }

    /// Whether `coord` lies inside the region.
    pub fn contains(&self, coord: &[i32; D]) -> bool {
        let edge = self.edge_length as i64;
        coord
            .iter()
            .zip(self.origin.iter())
            .all(|(&c, &o)| (c as i64) >= (o as i64) && (c as i64) < (o as i64) + edge)
    }

    /// Number of cells in the region.
    pub fn cell_count(&self) -> u128 {
        (self.edge_length as u128).pow(D as u32)
    }

    /// Iterate every coordinate in the region, axis 0 varying fastest.
    pub fn coords(&self) -> CoordIter<D> {
        CoordIter {
            region: *self,
            next: Some(self.origin),
        }
    }
}

/// Iterator over the coordinates of a [`Region`].
///
/// Produced by [`Region::coords`].
#[derive(Clone, Debug)]
pub struct CoordIter<const D: usize> {
    region: Region<D>,
    next: Option<[i32; D]>,
}

impl<const D: usize> Iterator for CoordIter<D> {
    type Item = [i32; D];

    fn next(&mut self) -> Option<[i32; D]> {
        let current = self.next?;
        let mut advanced = current;
        let end = self.region.edge_length as i32;
        self.next = None;
        for axis in 0..D {
            let offset = advanced[axis] - self.region.origin[axis] + 1;
            if offset < end {
                advanced[axis] += 1;
                self.next = Some(advanced);
                break;
            }
            advanced[axis] = self.region.origin[axis];
        }
        Some(current)
    }
}
