//! Tree cells and their per-pass transition rules
//!
//! Every grid slot holds one [`TreeCell`], a closed sum over three rule families:
//! - [`SimpleTree`]: single-phase. A burning tree ignites its neighbours and burns
//!   out in the same activation, so fire may cascade within one pass depending on
//!   activation order.
//! - [`SingleSpreadTree`]: two-phase. Fire advances exactly one ring per tick.
//! - [`DrosselSchwablTree`]: two-phase with regrowth (`p`) and spontaneous
//!   ignition (`f`), after Drossel & Schwabl (1992).
//!
//! The two-phase families alternate an *advance* half, which reads only the
//! snapshot taken in the previous *stabilize* half, with the stabilize half
//! itself, which refreshes the snapshot. Activation order within a pass therefore
//! cannot leak freshly written state into a neighbour's decision.

mod drossel_schwabl;
mod simple;
mod single_spread;

pub use drossel_schwabl::{DrosselSchwablRates, DrosselSchwablTree};
pub use simple::SimpleTree;
pub use single_spread::SingleSpreadTree;

use crate::error::FireSimError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Enumerated state of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Condition {
    /// No tree. Can regrow under Drossel-Schwabl rules.
    Empty = 0,
    /// Tree immune to ignition.
    Protected = 1,
    /// Living tree that can catch fire.
    Fine = 2,
    /// Burning tree. Spreads to orthogonal neighbours on its next activation.
    OnFire = 3,
    /// Burned tree. Absorbing unless regrowth is enabled.
    BurnedOut = 4,
}

impl Condition {
    /// Number of distinct conditions.
    pub const COUNT: usize = 5;

    /// All conditions in index order.
    pub const ALL: [Condition; Self::COUNT] = [
        Condition::Empty,
        Condition::Protected,
        Condition::Fine,
        Condition::OnFire,
        Condition::BurnedOut,
    ];

    /// Dense index used for per-condition count arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Display name used in reports and table headers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Condition::Empty => "Empty",
            Condition::Protected => "Protected",
            Condition::Fine => "Fine",
            Condition::OnFire => "On Fire",
            Condition::BurnedOut => "Burned Out",
        }
    }

    /// Portrayal colour for renderers.
    ///
    /// Closed table: neutral for Empty, alive for Fine, burning for On Fire,
    /// dead for Burned Out and shielded for Protected.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Condition::Empty => "white",
            Condition::Protected => "cyan",
            Condition::Fine => "green",
            Condition::OnFire => "red",
            Condition::BurnedOut => "black",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Half of a two-phase tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Act on the snapshot: spread, burn out, regrow, ignite.
    Advance,
    /// Copy the live condition into the snapshot.
    Stabilize,
}

impl Phase {
    /// The half that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Phase::Advance => Phase::Stabilize,
            Phase::Stabilize => Phase::Advance,
        }
    }
}

/// Outcome of stepping a cell, telling the grid whether to ignite neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Spread {
    /// Nothing leaves this cell.
    Contained,
    /// Every occupied orthogonal neighbour receives `set_on_fire`.
    ToNeighbors,
}

/// Capabilities shared by every cell family.
pub trait Tree {
    /// Grid coordinate, used as the cell's identity.
    fn position(&self) -> (usize, usize);

    /// Current (live) condition.
    fn condition(&self) -> Condition;

    /// Fine becomes On Fire. Every other condition is unaffected.
    fn set_on_fire(&mut self);

    /// External ignition (driver or test harness).
    ///
    /// Two-phase cells at a tick boundary also refresh their snapshot so the
    /// next advance half sees the fire.
    fn ignite(&mut self) {
        self.set_on_fire();
    }

    /// One activation by the scheduler.
    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Spread;
}

/// The cell family selected for a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Simple,
    SingleSpread,
    DrosselSchwabl,
}

impl CellKind {
    /// Canonical kebab-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CellKind::Simple => "simple",
            CellKind::SingleSpread => "single-spread",
            CellKind::DrosselSchwabl => "drossel-schwabl",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CellKind {
    type Err = FireSimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "simple" => Ok(CellKind::Simple),
            "single-spread" | "singlespread" => Ok(CellKind::SingleSpread),
            "drossel-schwabl" | "drosselschwabl" | "ds" => Ok(CellKind::DrosselSchwabl),
            _ => Err(FireSimError::UnknownVariant(s.to_string())),
        }
    }
}

/// A grid cell of one of the three families.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeCell {
    Simple(SimpleTree),
    SingleSpread(SingleSpreadTree),
    DrosselSchwabl(DrosselSchwablTree),
}

impl TreeCell {
    /// Family this cell belongs to.
    #[must_use]
    pub const fn kind(&self) -> CellKind {
        match self {
            TreeCell::Simple(_) => CellKind::Simple,
            TreeCell::SingleSpread(_) => CellKind::SingleSpread,
            TreeCell::DrosselSchwabl(_) => CellKind::DrosselSchwabl,
        }
    }

    /// Snapshot condition for two-phase cells, `None` for single-phase ones.
    #[must_use]
    pub fn last_condition(&self) -> Option<Condition> {
        match self {
            TreeCell::Simple(_) => None,
            TreeCell::SingleSpread(tree) => Some(tree.last_condition()),
            TreeCell::DrosselSchwabl(tree) => Some(tree.last_condition()),
        }
    }

    /// Pending half for two-phase cells, `None` for single-phase ones.
    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        match self {
            TreeCell::Simple(_) => None,
            TreeCell::SingleSpread(tree) => Some(tree.phase()),
            TreeCell::DrosselSchwabl(tree) => Some(tree.phase()),
        }
    }
}

impl Tree for TreeCell {
    fn position(&self) -> (usize, usize) {
        match self {
            TreeCell::Simple(tree) => tree.position(),
            TreeCell::SingleSpread(tree) => tree.position(),
            TreeCell::DrosselSchwabl(tree) => tree.position(),
        }
    }

    fn condition(&self) -> Condition {
        match self {
            TreeCell::Simple(tree) => tree.condition(),
            TreeCell::SingleSpread(tree) => tree.condition(),
            TreeCell::DrosselSchwabl(tree) => tree.condition(),
        }
    }

    fn set_on_fire(&mut self) {
        match self {
            TreeCell::Simple(tree) => tree.set_on_fire(),
            TreeCell::SingleSpread(tree) => tree.set_on_fire(),
            TreeCell::DrosselSchwabl(tree) => tree.set_on_fire(),
        }
    }

    fn ignite(&mut self) {
        match self {
            TreeCell::Simple(tree) => tree.ignite(),
            TreeCell::SingleSpread(tree) => tree.ignite(),
            TreeCell::DrosselSchwabl(tree) => tree.ignite(),
        }
    }

    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Spread {
        match self {
            TreeCell::Simple(tree) => tree.step(rng),
            TreeCell::SingleSpread(tree) => tree.step(rng),
            TreeCell::DrosselSchwabl(tree) => tree.step(rng),
        }
    }
}

impl From<SimpleTree> for TreeCell {
    fn from(tree: SimpleTree) -> Self {
        TreeCell::Simple(tree)
    }
}

impl From<SingleSpreadTree> for TreeCell {
    fn from(tree: SingleSpreadTree) -> Self {
        TreeCell::SingleSpread(tree)
    }
}

impl From<DrosselSchwablTree> for TreeCell {
    fn from(tree: DrosselSchwablTree) -> Self {
        TreeCell::DrosselSchwabl(tree)
    }
}

/// Live condition, snapshot and phase clock shared by the two-phase families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TwoPhaseState {
    pub(crate) condition: Condition,
    pub(crate) last_condition: Condition,
    pub(crate) phase: Phase,
}

impl TwoPhaseState {
    pub(crate) const fn new(condition: Condition) -> Self {
        Self {
            condition,
            last_condition: condition,
            phase: Phase::Advance,
        }
    }

    pub(crate) fn set_on_fire(&mut self) {
        if self.condition == Condition::Fine {
            self.condition = Condition::OnFire;
        }
    }

    pub(crate) fn ignite(&mut self) {
        self.set_on_fire();
        if self.phase == Phase::Advance {
            self.last_condition = self.condition;
        }
    }

    /// Stabilize half: the snapshot catches up with the live condition.
    pub(crate) fn stabilize(&mut self) {
        self.last_condition = self.condition;
    }

    /// Run the half selected by the phase clock, then flip it.
    pub(crate) fn step(&mut self, advance: impl FnOnce(&mut Self) -> Spread) -> Spread {
        let spread = match self.phase {
            Phase::Advance => advance(self),
            Phase::Stabilize => {
                self.stabilize();
                Spread::Contained
            }
        };
        self.phase = self.phase.next();
        spread
    }
}

/// Fine with probability `density`, Empty otherwise.
pub(crate) fn draw_tree<R: Rng + ?Sized>(density: f64, rng: &mut R) -> Condition {
    if rng.random::<f64>() < density {
        Condition::Fine
    } else {
        Condition::Empty
    }
}
