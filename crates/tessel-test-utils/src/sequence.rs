//! Deterministic random write sequences.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// One generated write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Write<const D: usize> {
    pub coord: [i32; D],
    pub value: u32,
}

/// Endless stream of seeded writes inside an `edge_length^D` cube.
///
/// Values are drawn from `0..palette`. A small palette makes neighbouring
/// cells agree often, which exercises collapsing as much as splitting.
/// Identical seeds yield identical sequences.
#[derive(Clone, Debug)]
pub struct WriteSequence<const D: usize> {
    rng: ChaCha8Rng,
    edge_length: u32,
    palette: u32,
    confine: Option<u32>,
}

impl<const D: usize> WriteSequence<D> {
    pub fn new(seed: u64, edge_length: u32, palette: u32) -> Self {
        assert!(palette > 0, "palette must hold at least one value");
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            edge_length,
            palette,
            confine: None,
        }
    }

    /// Confine every write to the cube `[0, edge)^D`, so runs of writes
    /// cover a small region densely instead of the whole tree sparsely.
    pub fn confined_to(mut self, edge: u32) -> Self {
        assert!(edge > 0 && edge <= self.edge_length);
        self.confine = Some(edge);
        self
    }
}

impl<const D: usize> Iterator for WriteSequence<D> {
    type Item = Write<D>;

    fn next(&mut self) -> Option<Write<D>> {
        let bound = self.confine.unwrap_or(self.edge_length) as i32;
        let mut coord = [0; D];
        for c in coord.iter_mut() {
            *c = self.rng.random_range(0..bound);
        }
        let value = self.rng.random_range(0..self.palette);
        Some(Write { coord, value })
    }
}
