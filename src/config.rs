#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use crate::vertex::Vertex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Pass limit used when none is configured.
pub const DEFAULT_MAX_ENFORCEMENT_PASSES: usize = 99;

/// The order in which sites are fed to the subdivision.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum InsertionOrder {
    /// As given, skipping consecutive duplicates.
    AsGiven,
    /// Sorted by x, then y.
    Sorted,
    /// A reproducible random permutation.
    Shuffled { seed: u64 },
}

impl Default for InsertionOrder {
    fn default() -> Self {
        InsertionOrder::AsGiven
    }
}

impl InsertionOrder {
    /// Reorder `vertices` in place.
    pub fn arrange<D>(&self, vertices: &mut [Vertex<D>]) {
        match *self {
            InsertionOrder::AsGiven => (),
            InsertionOrder::Sorted => vertices.sort_by(|a, b| a.cmp_xy(b)),
            InsertionOrder::Shuffled { seed } => {
                log::debug!("shuffling {} sites with seed {}", vertices.len(), seed);
                let mut rng = StdRng::seed_from_u64(seed);
                vertices.shuffle(&mut rng);
            }
        }
    }
}

/// Parameters shared by the builders and the conforming triangulator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TriangulationConfig {
    /// Sites closer than this are merged, and a site closer than this to an
    /// edge splits that edge.
    pub tolerance: f64,
    pub max_enforcement_passes: usize,
    /// Fraction of the larger side of the data bounds added on every side
    /// before the frame is built.
    pub bounds_padding: f64,
    pub insertion_order: InsertionOrder,
}

impl Default for TriangulationConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.0,
            max_enforcement_passes: DEFAULT_MAX_ENFORCEMENT_PASSES,
            bounds_padding: 0.2,
            insertion_order: InsertionOrder::AsGiven,
        }
    }
}

impl TriangulationConfig {
    /// Creates the default configuration: no tolerance, 99 enforcement
    /// passes, 20% padding, sites inserted as given.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_enforcement_passes(mut self, passes: usize) -> Self {
        self.max_enforcement_passes = passes;
        self
    }

    pub fn with_bounds_padding(mut self, padding: f64) -> Self {
        self.bounds_padding = padding;
        self
    }

    pub fn with_insertion_order(mut self, order: InsertionOrder) -> Self {
        self.insertion_order = order;
        self
    }
}
