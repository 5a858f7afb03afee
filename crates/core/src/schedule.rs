//! Random activation scheduler
//!
//! Each pass activates every registered cell exactly once, in an order freshly
//! shuffled from the simulation RNG. Order only matters for single-phase cells;
//! two-phase cells never read state written earlier in the same pass.

use crate::grid::Grid;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

/// Shuffled-order activation of grid cells.
#[derive(Debug, Clone, Default)]
pub struct RandomActivation {
    order: Vec<(usize, usize)>,
    passes: u32,
}

impl RandomActivation {
    /// Scheduler over every occupied slot of `grid`.
    pub fn for_grid(grid: &Grid) -> Self {
        Self {
            order: grid.occupied_positions(),
            passes: 0,
        }
    }

    /// Number of registered cells.
    pub fn agent_count(&self) -> usize {
        self.order.len()
    }

    /// Completed passes.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Run one pass: shuffle, then step every registered cell.
    pub fn step<R: Rng + ?Sized>(&mut self, grid: &mut Grid, rng: &mut R) {
        self.order.shuffle(rng);
        for &(x, y) in &self.order {
            grid.step_cell(x, y, rng);
        }
        self.passes += 1;
        trace!(pass = self.passes, cells = self.order.len(), "scheduler pass complete");
    }
}
