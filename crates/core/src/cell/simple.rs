use super::{draw_tree, Condition, Spread, Tree};
use rand::Rng;

/// Single-phase tree.
///
/// A burning tree ignites its neighbours and burns out in the same activation.
/// Because the scheduler shuffles activation order, a neighbour set alight earlier
/// in a pass may still be activated later in that pass and carry the fire further.
/// The distance fire travels per pass is therefore order-dependent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleTree {
    position: (usize, usize),
    condition: Condition,
}

impl SimpleTree {
    /// Plant a tree with probability `density`; trees in column 0 start burning.
    pub fn new<R: Rng + ?Sized>(position: (usize, usize), density: f64, rng: &mut R) -> Self {
        let mut tree = Self::with_condition(position, draw_tree(density, rng));
        if position.0 == 0 {
            tree.set_on_fire();
        }
        tree
    }

    /// Cell with an explicit starting condition.
    pub const fn with_condition(position: (usize, usize), condition: Condition) -> Self {
        Self { position, condition }
    }
}

impl Tree for SimpleTree {
    fn position(&self) -> (usize, usize) {
        self.position
    }

    fn condition(&self) -> Condition {
        self.condition
    }

    fn set_on_fire(&mut self) {
        if self.condition == Condition::Fine {
            self.condition = Condition::OnFire;
        }
    }

    fn step<R: Rng + ?Sized>(&mut self, _rng: &mut R) -> Spread {
        if self.condition == Condition::OnFire {
            self.condition = Condition::BurnedOut;
            Spread::ToNeighbors
        } else {
            Spread::Contained
        }
    }
}
