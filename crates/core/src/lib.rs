//! Forest Fire Core Library
//!
//! Cellular-automaton forest fire simulation for studying how ignition and
//! regrowth probabilities affect the fraction of forest that burns.
//!
//! ## Model
//!
//! - A rectangular [`Grid`] of tree cells with von Neumann adjacency and hard edges
//! - Three cell families: [`SimpleTree`], [`SingleSpreadTree`] and [`DrosselSchwablTree`]
//! - A [`RandomActivation`] scheduler that shuffles activation order every pass
//! - [`FireSimulation`] stepping pass by pass until the fire dies out or a pass cap
//! - [`sweep`] for batch runs over Cartesian products of parameters

pub mod cell;
pub mod error;
pub mod grid;
pub mod schedule;
pub mod simulation;
pub mod sweep;

pub use cell::{
    CellKind, Condition, DrosselSchwablRates, DrosselSchwablTree, Phase, SimpleTree,
    SingleSpreadTree, Spread, Tree, TreeCell,
};
pub use error::FireSimError;
pub use grid::Grid;
pub use schedule::RandomActivation;
pub use simulation::{
    CellVariant, ConditionCollector, ConditionCounts, DrosselSchwablConfig, FireSimulation, Frame,
    FrameCell, SimulationConfig, DEFAULT_MAX_PASSES,
};
pub use sweep::{ParameterAxis, Reporter, SweepParameter, SweepRow, SweepRunner, SweepTable};
