use super::{Condition, Phase, Spread, Tree, TwoPhaseState};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Resolved per-cell probabilities for the Drossel-Schwabl rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrosselSchwablRates {
    /// Probability a slot starts Protected.
    pub protection: f64,
    /// Per-tick probability `p` that Empty or Burned Out regrows to Fine.
    pub regrowth: f64,
    /// Per-tick probability `f` that a Fine tree ignites on its own.
    pub ignition: f64,
}

/// Two-phase tree with regrowth and spontaneous ignition.
///
/// Based on the forest-fire model of Drossel & Schwabl (1992). The advance half
/// reads only the snapshot from the previous stabilize half:
/// - Empty / Burned Out regrow to Fine with probability `p`
/// - On Fire ignites every neighbour and burns out
/// - Fine ignites with probability `f`
///
/// Protected trees never change.
#[derive(Debug, Clone, PartialEq)]
pub struct DrosselSchwablTree {
    position: (usize, usize),
    state: TwoPhaseState,
    regrowth: f64,
    ignition: f64,
}

impl DrosselSchwablTree {
    /// Draw the starting condition from a single uniform value `r`.
    ///
    /// Empty by default, Fine when `r < density`, then Protected when
    /// `r > 1 - protection`. The Protected band is checked last and wins where
    /// the two bands overlap.
    pub fn new<R: Rng + ?Sized>(
        position: (usize, usize),
        density: f64,
        rates: DrosselSchwablRates,
        rng: &mut R,
    ) -> Self {
        let r = rng.random::<f64>();
        let mut condition = Condition::Empty;
        if r < density {
            condition = Condition::Fine;
        }
        if r > 1.0 - rates.protection {
            condition = Condition::Protected;
        }
        Self::with_condition(position, condition, rates)
    }

    /// Cell with an explicit starting condition, snapshot equal to it.
    pub const fn with_condition(
        position: (usize, usize),
        condition: Condition,
        rates: DrosselSchwablRates,
    ) -> Self {
        Self {
            position,
            state: TwoPhaseState::new(condition),
            regrowth: rates.regrowth,
            ignition: rates.ignition,
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

/// Advance half. Writes only the live condition.
fn advance<R: Rng + ?Sized>(
    state: &mut TwoPhaseState,
    regrowth: f64,
    ignition: f64,
    rng: &mut R,
) -> Spread {
    let last = state.last_condition;

    if matches!(last, Condition::Empty | Condition::BurnedOut) && rng.random::<f64>() < regrowth {
        state.condition = Condition::Fine;
    }

    let mut spread = Spread::Contained;
    if last == Condition::OnFire {
        state.condition = Condition::BurnedOut;
        spread = Spread::ToNeighbors;
    }

    if last == Condition::Fine && rng.random::<f64>() < ignition {
        state.condition = Condition::OnFire;
    }

    spread
}

impl Tree for DrosselSchwablTree {
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

    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Spread {
        let (regrowth, ignition) = (self.regrowth, self.ignition);
        self.state
            .step(|state| advance(state, regrowth, ignition, rng))
    }
}
