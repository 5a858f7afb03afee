//! Forest fire simulation driving the grid pass by pass
//!
//! `FireSimulation` owns:
//! - the [`Grid`] filled with one cell per slot of the configured family
//! - the [`RandomActivation`] scheduler
//! - a seeded `StdRng` consumed by cell construction, shuffles and cell draws
//! - a [`ConditionCollector`] sampled after every pass
//!
//! A simulation is Running until a pass leaves no cell On Fire or the pass cap is
//! reached, after which it is Halted and `step` does nothing.

pub mod collector;
pub mod config;
pub mod frame;

pub use collector::{ConditionCollector, ConditionCounts};
pub use config::{CellVariant, DrosselSchwablConfig, SimulationConfig, DEFAULT_MAX_PASSES};
pub use frame::{Frame, FrameCell};

use crate::cell::{
    Condition, DrosselSchwablTree, SimpleTree, SingleSpreadTree, Tree, TreeCell,
};
use crate::error::FireSimError;
use crate::grid::Grid;
use crate::schedule::RandomActivation;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// A single forest fire run.
#[derive(Debug, Clone)]
pub struct FireSimulation {
    config: SimulationConfig,
    seed: u64,
    grid: Grid,
    schedule: RandomActivation,
    collector: ConditionCollector,
    rng: StdRng,
    running: bool,
}

impl FireSimulation {
    /// Validate `config` and plant the forest.
    ///
    /// Every slot receives a cell whose initial condition is drawn from the
    /// simulation RNG.
    pub fn new(config: SimulationConfig) -> Result<Self, FireSimError> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut grid = Grid::new(config.width, config.height)?;
        for x in 0..config.width {
            for y in 0..config.height {
                let position = (x, y);
                let cell: TreeCell = match &config.variant {
                    CellVariant::Simple => SimpleTree::new(position, config.density, &mut rng).into(),
                    CellVariant::SingleSpread => {
                        SingleSpreadTree::new(position, config.density, &mut rng).into()
                    }
                    CellVariant::DrosselSchwabl(ds) => {
                        let rates = ds.resolve(config.density);
                        DrosselSchwablTree::new(position, config.density, rates, &mut rng).into()
                    }
                };
                grid.set(x, y, cell)?;
            }
        }

        let schedule = RandomActivation::for_grid(&grid);
        debug!(
            "Forest planted: {}x{} {} grid, density={:.2}, seed={}, {} burning",
            config.width,
            config.height,
            config.variant.kind(),
            config.density,
            seed,
            grid.count(Condition::OnFire)
        );

        Ok(Self {
            config,
            seed,
            grid,
            schedule,
            collector: ConditionCollector::default(),
            rng,
            running: true,
        })
    }

    /// Run one scheduler pass and sample the counts.
    ///
    /// Two-phase families need two calls per simulated tick. No-op once halted.
    pub fn step(&mut self) {
        if !self.running {
            return;
        }

        self.schedule.step(&mut self.grid, &mut self.rng);
        let counts = ConditionCounts::sample(&self.grid);
        self.collector.collect(counts);

        let passes = self.schedule.passes();
        let burnt_out = counts.get(Condition::OnFire) == 0;
        let capped = self.config.max_passes.is_some_and(|max| passes >= max);
        if burnt_out || capped {
            self.running = false;
            debug!(
                "Simulation halted after {} passes ({}): fine={}, burned_out={}",
                passes,
                if burnt_out { "fire out" } else { "pass cap" },
                counts.get(Condition::Fine),
                counts.get(Condition::BurnedOut)
            );
        }
    }

    /// Step until halted. Returns the number of passes run by this call.
    ///
    /// Without a pass cap, a Drossel-Schwabl forest with regrowth and ignition
    /// may never halt.
    pub fn run(&mut self) -> u32 {
        let start = self.passes();
        while self.running {
            self.step();
        }
        self.passes() - start
    }

    /// Set the cell at `(x, y)` alight.
    ///
    /// Returns whether the cell caught fire (only Fine trees do).
    pub fn ignite(&mut self, x: usize, y: usize) -> Result<bool, FireSimError> {
        let (width, height) = (self.grid.width(), self.grid.height());
        let cell = self
            .grid
            .get_mut(x, y)
            .ok_or(FireSimError::OutOfBounds {
                x,
                y,
                width,
                height,
            })?;
        let before = cell.condition();
        cell.ignite();
        Ok(before != cell.condition())
    }

    /// Whether the caller should keep stepping.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Completed scheduler passes.
    pub fn passes(&self) -> u32 {
        self.schedule.passes()
    }

    /// Seed actually used, including one drawn from entropy.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Number of cells in `condition` right now.
    pub fn count(&self, condition: Condition) -> usize {
        self.grid.count(condition)
    }

    /// Live counts for every condition.
    pub fn counts(&self) -> ConditionCounts {
        ConditionCounts::sample(&self.grid)
    }

    /// Number of cells in the forest.
    pub fn cell_count(&self) -> usize {
        self.schedule.agent_count()
    }

    /// Per-pass time series.
    pub fn collector(&self) -> &ConditionCollector {
        &self.collector
    }

    /// Snapshot for renderers.
    pub fn frame(&self) -> Frame {
        Frame::capture(&self.grid, self.passes())
    }
}
