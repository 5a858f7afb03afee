//! Fixed-size rectangular grid of cell slots
//!
//! Slots are stored row-major. A slot is either vacant or holds exactly one
//! [`TreeCell`] whose own position equals the slot key. Adjacency is the
//! von Neumann neighbourhood (no diagonals) and the edges never wrap.

use crate::cell::{Condition, Spread, Tree, TreeCell};
use crate::error::FireSimError;
use rand::Rng;

/// Orthogonal offsets: west, east, south, north.
const VON_NEUMANN: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Rectangular array of optional tree cells.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    slots: Vec<Option<TreeCell>>,
}

impl Grid {
    /// Create a grid with every slot vacant.
    pub fn new(width: usize, height: usize) -> Result<Self, FireSimError> {
        if width == 0 || height == 0 {
            return Err(FireSimError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            slots: vec![None; width * height],
        })
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    fn out_of_bounds(&self, x: usize, y: usize) -> FireSimError {
        FireSimError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    /// Occupant of `(x, y)`, or `None` for vacant or out-of-range slots.
    pub fn get(&self, x: usize, y: usize) -> Option<&TreeCell> {
        self.index(x, y).and_then(|i| self.slots[i].as_ref())
    }

    /// Mutable occupant of `(x, y)`.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut TreeCell> {
        let i = self.index(x, y)?;
        self.slots[i].as_mut()
    }

    /// Place `cell` at `(x, y)`, returning the previous occupant.
    ///
    /// The cell's own position must match the slot.
    pub fn set(&mut self, x: usize, y: usize, cell: TreeCell) -> Result<Option<TreeCell>, FireSimError> {
        let i = self.index(x, y).ok_or_else(|| self.out_of_bounds(x, y))?;
        let (cell_x, cell_y) = cell.position();
        if (cell_x, cell_y) != (x, y) {
            return Err(FireSimError::SlotMismatch {
                x,
                y,
                cell_x,
                cell_y,
            });
        }
        Ok(self.slots[i].replace(cell))
    }

    /// Vacate `(x, y)`, returning the previous occupant.
    pub fn remove(&mut self, x: usize, y: usize) -> Option<TreeCell> {
        let i = self.index(x, y)?;
        self.slots[i].take()
    }

    /// In-range orthogonal neighbour coordinates of `(x, y)`.
    pub fn neighbor_positions(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
        let (width, height) = (self.width, self.height);
        VON_NEUMANN.into_iter().filter_map(move |(dx, dy)| {
            let nx = x.checked_add_signed(dx)?;
            let ny = y.checked_add_signed(dy)?;
            (nx < width && ny < height).then_some((nx, ny))
        })
    }

    /// Occupied orthogonal neighbours of `(x, y)`. Edge slots yield fewer.
    pub fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = &TreeCell> + '_ {
        self.neighbor_positions(x, y)
            .filter_map(move |(nx, ny)| self.get(nx, ny))
    }

    /// Occupied cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &TreeCell> + '_ {
        self.slots.iter().flatten()
    }

    /// Coordinates of every occupied slot in row-major order.
    pub fn occupied_positions(&self) -> Vec<(usize, usize)> {
        self.cells().map(Tree::position).collect()
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.cells().count()
    }

    /// Number of cells currently in `condition`.
    pub fn count(&self, condition: Condition) -> usize {
        self.cells().filter(|cell| cell.condition() == condition).count()
    }

    /// Activate the occupant of `(x, y)` and ignite its neighbours if it spreads.
    ///
    /// Neighbours are ignited immediately, so a single-phase neighbour activated
    /// later in the same pass sees the new fire.
    pub fn step_cell<R: Rng + ?Sized>(&mut self, x: usize, y: usize, rng: &mut R) {
        let spread = match self.get_mut(x, y) {
            Some(cell) => cell.step(rng),
            None => return,
        };
        if spread == Spread::ToNeighbors {
            let targets: Vec<(usize, usize)> = self.neighbor_positions(x, y).collect();
            for (nx, ny) in targets {
                if let Some(neighbor) = self.get_mut(nx, ny) {
                    neighbor.set_on_fire();
                }
            }
        }
    }
}
