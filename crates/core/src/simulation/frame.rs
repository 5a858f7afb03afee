//! Renderable snapshot of the grid between passes

use crate::cell::{Condition, Tree};
use crate::grid::Grid;
use serde::Serialize;

/// One occupied slot in a [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameCell {
    pub x: usize,
    pub y: usize,
    pub condition: Condition,
}

/// Read-only copy of every cell's condition after a completed pass.
///
/// Renderers map each condition to a colour via [`Condition::color`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Passes completed when the frame was taken.
    pub pass: u32,
    pub width: usize,
    pub height: usize,
    /// Occupied slots in row-major order.
    pub cells: Vec<FrameCell>,
}

impl Frame {
    /// Capture `grid` as it stands after `pass` passes.
    pub fn capture(grid: &Grid, pass: u32) -> Self {
        let cells = grid
            .cells()
            .map(|cell| {
                let (x, y) = cell.position();
                FrameCell {
                    x,
                    y,
                    condition: cell.condition(),
                }
            })
            .collect();
        Self {
            pass,
            width: grid.width(),
            height: grid.height(),
            cells,
        }
    }

    /// Condition at `(x, y)`, `None` for vacant or out-of-range slots.
    pub fn condition_at(&self, x: usize, y: usize) -> Option<Condition> {
        self.cells
            .iter()
            .find(|cell| cell.x == x && cell.y == y)
            .map(|cell| cell.condition)
    }
}
