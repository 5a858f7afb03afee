//! Reducers turning a finished simulation into one scalar

use crate::cell::Condition;
use crate::simulation::FireSimulation;
use std::fmt;
use std::sync::Arc;

type Reduce = dyn Fn(&FireSimulation) -> f64 + Send + Sync;

/// Named reducer evaluated on each halted run of a sweep.
#[derive(Clone)]
pub struct Reporter {
    name: String,
    reduce: Arc<Reduce>,
}

impl Reporter {
    /// Custom reducer.
    pub fn new(
        name: impl Into<String>,
        reduce: impl Fn(&FireSimulation) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            reduce: Arc::new(reduce),
        }
    }

    /// Burned Out count divided by Fine count, named `BurntFine`.
    ///
    /// Plain IEEE division: a run with no Fine trees left reports infinity
    /// (or NaN if nothing burned either).
    pub fn burnt_fine_ratio() -> Self {
        Self::new("BurntFine", |sim| {
            sim.count(Condition::BurnedOut) as f64 / sim.count(Condition::Fine) as f64
        })
    }

    /// Share of all cells in `condition`, e.g. `BurnedOutFraction`.
    pub fn fraction(condition: Condition) -> Self {
        Self::new(format!("{}Fraction", compact(condition)), move |sim| {
            sim.count(condition) as f64 / sim.cell_count() as f64
        })
    }

    /// Final number of cells in `condition`, e.g. `OnFire`.
    pub fn final_count(condition: Condition) -> Self {
        Self::new(compact(condition), move |sim| sim.count(condition) as f64)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the reducer.
    pub fn evaluate(&self, sim: &FireSimulation) -> f64 {
        (self.reduce)(sim)
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Condition name without spaces, usable as a column header.
fn compact(condition: Condition) -> String {
    condition.name().replace(' ', "")
}
