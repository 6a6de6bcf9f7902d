//! Test utilities for Tessel development.
//!
//! Provides a dense reference grid ([`DenseGrid`]) to mirror tree writes
//! against, and a seeded write generator ([`WriteSequence`]) for
//! randomized equivalence tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod sequence;

pub use sequence::{Write, WriteSequence};

/// Flat `edge_length^D` array addressed by `[i32; D]`, axis 0 fastest.
///
/// The obvious-and-slow model every tree must agree with.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseGrid<T, const D: usize> {
    edge_length: u32,
    cells: Vec<T>,
}

impl<T: Clone, const D: usize> DenseGrid<T, D> {
    pub fn new(edge_length: u32, fill: T) -> Self {
        let len = (edge_length as usize).pow(D as u32);
        Self {
            edge_length,
            cells: vec![fill; len],
        }
    }

    pub fn edge_length(&self) -> u32 {
        self.edge_length
    }

    pub fn get(&self, coord: [i32; D]) -> &T {
        &self.cells[self.offset(coord)]
    }

    pub fn set(&mut self, coord: [i32; D], value: T) {
        let i = self.offset(coord);
        self.cells[i] = value;
    }

    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }

    /// Every coordinate paired with its value, axis 0 fastest.
    pub fn iter(&self) -> impl Iterator<Item = ([i32; D], &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| (self.coord_of(i), v))
    }

    fn offset(&self, coord: [i32; D]) -> usize {
        let edge = self.edge_length as usize;
        let mut offset = 0;
        for axis in (0..D).rev() {
            let c = coord[axis];
            assert!(
                c >= 0 && (c as usize) < edge,
                "coordinate {coord:?} outside dense grid of edge {edge}"
            );
            offset = offset * edge + c as usize;
        }
        offset
    }

    fn coord_of(&self, mut offset: usize) -> [i32; D] {
        let edge = self.edge_length as usize;
        let mut coord = [0; D];
        for c in coord.iter_mut() {
            *c = (offset % edge) as i32;
            offset /= edge;
        }
        coord
    }
}
