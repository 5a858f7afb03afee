//! Per-pass aggregate counts

use crate::cell::{Condition, Tree};
use crate::grid::Grid;
use serde::Serialize;

/// Number of cells in each condition at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConditionCounts {
    counts: [usize; Condition::COUNT],
}

impl ConditionCounts {
    /// Count every occupied slot of `grid`.
    pub fn sample(grid: &Grid) -> Self {
        let mut counts = [0; Condition::COUNT];
        for cell in grid.cells() {
            counts[cell.condition().index()] += 1;
        }
        Self { counts }
    }

    /// Cells in `condition`.
    pub fn get(&self, condition: Condition) -> usize {
        self.counts[condition.index()]
    }

    /// Cells counted across all conditions.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(condition, count)` pairs in [`Condition::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Condition, usize)> + '_ {
        Condition::ALL.into_iter().map(move |condition| (condition, self.get(condition)))
    }
}

/// Time series of [`ConditionCounts`], one sample per pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConditionCollector {
    samples: Vec<ConditionCounts>,
}

impl ConditionCollector {
    /// Append the sample for the pass that just completed.
    pub fn collect(&mut self, counts: ConditionCounts) {
        self.samples.push(counts);
    }

    /// All samples in pass order.
    pub fn samples(&self) -> &[ConditionCounts] {
        &self.samples
    }

    /// Count of `condition` after each pass.
    pub fn series(&self, condition: Condition) -> Vec<usize> {
        self.samples.iter().map(|counts| counts.get(condition)).collect()
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<&ConditionCounts> {
        self.samples.last()
    }

    /// Number of samples collected.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
