use super::{draw_tree, Condition, Phase, Spread, Tree, TwoPhaseState};
use rand::Rng;

/// Two-phase tree without regrowth or spontaneous ignition.
///
/// Fire only leaves a cell whose snapshot says it was burning at the last tick
/// boundary, so the front advances exactly one ring per tick (two passes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleSpreadTree {
    position: (usize, usize),
    state: TwoPhaseState,
}

impl SingleSpreadTree {
    /// Plant a tree with probability `density`; trees in column 0 start burning.
    pub fn new<R: Rng + ?Sized>(position: (usize, usize), density: f64, rng: &mut R) -> Self {
        let mut tree = Self::with_condition(position, draw_tree(density, rng));
        if position.0 == 0 {
            tree.ignite();
        }
        tree
    }

    /// Cell with an explicit starting condition, snapshot equal to it.
    pub const fn with_condition(position: (usize, usize), condition: Condition) -> Self {
        Self {
            position,
            state: TwoPhaseState::new(condition),
        }
    }

    /// Condition captured by the last stabilize half.
    pub const fn last_condition(&self) -> Condition {
        self.state.last_condition
    }

    /// Half that the next activation runs.
    pub const fn phase(&self) -> Phase {
        self.state.phase
    }
}

/// Advance half: a tree burning at the last boundary ignites its neighbours.
fn advance(state: &mut TwoPhaseState) -> Spread {
    if state.last_condition == Condition::OnFire {
        state.condition = Condition::BurnedOut;
        Spread::ToNeighbors
    } else {
        Spread::Contained
    }
}

impl Tree for SingleSpreadTree {
    fn position(&self) -> (usize, usize) {
        self.position
    }

    fn condition(&self) -> Condition {
        self.state.condition
    }

    fn set_on_fire(&mut self) {
        self.state.set_on_fire();
    }

    fn ignite(&mut self) {
        self.state.ignite();
    }

    fn step<R: Rng + ?Sized>(&mut self, _rng: &mut R) -> Spread {
        self.state.step(advance)
    }
}
