//! Batch parameter sweeps
//!
//! A sweep runs one simulation per point of the Cartesian product of its axes,
//! optionally repeated with different seeds, and reduces each halted run through
//! its [`Reporter`]s. Runs are independent and fanned out with rayon; each gets a
//! seed derived from the sweep seed and its run index, so results do not depend
//! on thread scheduling.
//!
//! # Example
//!
//! ```rust,no_run
//! use forest_fire_core::sweep::{ParameterAxis, Reporter, SweepParameter, SweepRunner};
//! use forest_fire_core::{CellVariant, DrosselSchwablConfig, SimulationConfig};
//!
//! let base = SimulationConfig::new(
//!     50,
//!     50,
//!     0.5,
//!     CellVariant::DrosselSchwabl(DrosselSchwablConfig {
//!         protection: Some(0.0),
//!         ..Default::default()
//!     }),
//! );
//! let table = SweepRunner::new(base)
//!     .axis(ParameterAxis::linspace(SweepParameter::Regrowth, 0.0, 1.0, 11).skip_leading(1))
//!     .axis(ParameterAxis::linspace(SweepParameter::Ignition, 0.0, 1.0, 11).skip_leading(1))
//!     .reporter(Reporter::burnt_fine_ratio())
//!     .seed(2024)
//!     .run()
//!     .unwrap();
//! println!("{table}");
//! ```

mod reporter;
mod table;

pub use reporter::Reporter;
pub use table::{SweepRow, SweepTable};

use crate::error::FireSimError;
use crate::simulation::{
    CellVariant, DrosselSchwablConfig, FireSimulation, SimulationConfig, DEFAULT_MAX_PASSES,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Spreads run indices across the seed space before mixing.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Construction parameter that a sweep axis varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SweepParameter {
    Density,
    /// Drossel-Schwabl only.
    Protection,
    /// Regrowth probability `p`. Drossel-Schwabl only.
    Regrowth,
    /// Spontaneous ignition probability `f`. Drossel-Schwabl only.
    Ignition,
}

impl SweepParameter {
    /// Column header.
    pub const fn name(self) -> &'static str {
        match self {
            SweepParameter::Density => "density",
            SweepParameter::Protection => "protection",
            SweepParameter::Regrowth => "p",
            SweepParameter::Ignition => "f",
        }
    }

    /// Write `value` into `config`.
    ///
    /// Range checks are left to [`SimulationConfig::validate`].
    pub fn apply(self, config: &mut SimulationConfig, value: f64) -> Result<(), FireSimError> {
        match self {
            SweepParameter::Density => config.density = value,
            SweepParameter::Protection => drossel_schwabl_mut(config, self)?.protection = Some(value),
            SweepParameter::Regrowth => drossel_schwabl_mut(config, self)?.regrowth = value,
            SweepParameter::Ignition => drossel_schwabl_mut(config, self)?.ignition = value,
        }
        Ok(())
    }
}

fn drossel_schwabl_mut(
    config: &mut SimulationConfig,
    parameter: SweepParameter,
) -> Result<&mut DrosselSchwablConfig, FireSimError> {
    let variant = config.variant.kind().name();
    match &mut config.variant {
        CellVariant::DrosselSchwabl(ds) => Ok(ds),
        _ => Err(FireSimError::ParameterNotApplicable {
            parameter: parameter.name(),
            variant,
        }),
    }
}

/// Ordered sample points for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterAxis {
    pub parameter: SweepParameter,
    pub values: Vec<f64>,
}

impl ParameterAxis {
    pub fn new(parameter: SweepParameter, values: impl Into<Vec<f64>>) -> Self {
        Self {
            parameter,
            values: values.into(),
        }
    }

    /// `count` evenly spaced values from `start` to `stop` inclusive.
    pub fn linspace(parameter: SweepParameter, start: f64, stop: f64, count: usize) -> Self {
        let values = match count {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (stop - start) / (count - 1) as f64;
                (0..count).map(|i| start + step * i as f64).collect()
            }
        };
        Self { parameter, values }
    }

    /// Drop the first `n` values, e.g. to exclude a zero probability.
    pub fn skip_leading(mut self, n: usize) -> Self {
        self.values.drain(..n.min(self.values.len()));
        self
    }
}

/// Builder and executor for a parameter sweep.
#[derive(Debug, Clone)]
pub struct SweepRunner {
    base: SimulationConfig,
    axes: Vec<ParameterAxis>,
    iterations: u32,
    seed: u64,
    reporters: Vec<Reporter>,
}

impl SweepRunner {
    /// Sweep over `base`, one iteration per combination, entropy seed.
    pub fn new(base: SimulationConfig) -> Self {
        Self {
            base,
            axes: Vec::new(),
            iterations: 1,
            seed: rand::random(),
            reporters: Vec::new(),
        }
    }

    /// Add an axis. Earlier axes vary slowest.
    pub fn axis(mut self, axis: ParameterAxis) -> Self {
        self.axes.push(axis);
        self
    }

    /// Runs per combination; the reported value is their mean.
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Seed all run seeds are derived from.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Add a reducer column.
    pub fn reporter(mut self, reporter: Reporter) -> Self {
        self.reporters.push(reporter);
        self
    }

    pub fn sweep_seed(&self) -> u64 {
        self.seed
    }

    /// Cartesian product of the axis values, first axis varying slowest.
    pub fn combinations(&self) -> Vec<Vec<f64>> {
        self.axes.iter().fold(vec![Vec::new()], |prefixes, axis| {
            prefixes
                .iter()
                .flat_map(|prefix| {
                    axis.values.iter().map(move |&value| {
                        let mut combination = prefix.clone();
                        combination.push(value);
                        combination
                    })
                })
                .collect()
        })
    }

    /// Seed for iteration `iteration` of combination `combination`.
    ///
    /// Pure function of the sweep seed, so a single run can be reproduced
    /// outside the sweep with `SimulationConfig::with_seed`.
    pub fn run_seed(&self, combination: usize, iteration: u32) -> u64 {
        let index = combination as u64 * u64::from(self.iterations) + u64::from(iteration);
        StdRng::seed_from_u64(self.seed ^ index.wrapping_mul(SEED_STRIDE)).random()
    }

    /// Base config with `values` applied in axis order.
    ///
    /// Without an explicit cap the default pass cap is applied so every run halts.
    pub fn config_for(&self, values: &[f64]) -> Result<SimulationConfig, FireSimError> {
        let mut config = self.base.clone();
        for (axis, &value) in self.axes.iter().zip(values) {
            axis.parameter.apply(&mut config, value)?;
        }
        if config.max_passes.is_none() {
            config.max_passes = Some(DEFAULT_MAX_PASSES);
        }
        Ok(config)
    }

    fn validate(&self) -> Result<(), FireSimError> {
        if self.reporters.is_empty() {
            return Err(FireSimError::NoReporters);
        }
        if self.iterations == 0 {
            return Err(FireSimError::NoIterations);
        }
        for (i, axis) in self.axes.iter().enumerate() {
            if axis.values.is_empty() {
                return Err(FireSimError::EmptyAxis(axis.parameter.name()));
            }
            if self.axes[..i].iter().any(|earlier| earlier.parameter == axis.parameter) {
                return Err(FireSimError::DuplicateAxis(axis.parameter.name()));
            }
        }
        // Records key parameters and reporters in one map.
        let mut columns: FxHashSet<&str> = self.axes.iter().map(|axis| axis.parameter.name()).collect();
        for reporter in &self.reporters {
            if !columns.insert(reporter.name()) {
                return Err(FireSimError::DuplicateColumn(reporter.name().to_string()));
            }
        }
        Ok(())
    }

    /// Run one simulation to halt and reduce it.
    fn run_once(&self, values: &[f64], combination: usize, iteration: u32) -> Result<Vec<f64>, FireSimError> {
        let config = self
            .config_for(values)?
            .with_seed(self.run_seed(combination, iteration));
        let mut sim = FireSimulation::new(config)?;
        sim.run();
        Ok(self.reporters.iter().map(|reporter| reporter.evaluate(&sim)).collect())
    }

    /// Execute every run and build the table.
    ///
    /// Fails only for a malformed sweep; a combination whose config is invalid
    /// becomes a rejected row and the rest of the sweep continues.
    pub fn run(&self) -> Result<SweepTable, FireSimError> {
        self.validate()?;

        let combinations = self.combinations();
        let iterations = self.iterations as usize;
        info!(
            "Starting sweep: {} combinations x {} iterations, seed={}",
            combinations.len(),
            iterations,
            self.seed
        );

        let jobs: Vec<(usize, u32)> = (0..combinations.len())
            .flat_map(|combination| (0..self.iterations).map(move |iteration| (combination, iteration)))
            .collect();
        let outcomes: Vec<Result<Vec<f64>, FireSimError>> = jobs
            .into_par_iter()
            .map(|(combination, iteration)| {
                self.run_once(&combinations[combination], combination, iteration)
            })
            .collect();

        let rows: Vec<SweepRow> = combinations
            .into_iter()
            .zip(outcomes.chunks(iterations))
            .map(|(parameters, runs)| {
                let outcome = mean_of(runs, self.reporters.len());
                if let Err(err) = &outcome {
                    warn!("Sweep combination {:?} rejected: {}", parameters, err);
                }
                SweepRow { parameters, outcome }
            })
            .collect();

        let table = SweepTable {
            parameter_names: self.axes.iter().map(|axis| axis.parameter.name().to_string()).collect(),
            reporter_names: self.reporters.iter().map(|reporter| reporter.name().to_string()).collect(),
            iterations: self.iterations,
            seed: self.seed,
            rows,
        };
        info!(
            "Sweep complete: {} rows, {} rejected",
            table.rows.len(),
            table.rejected()
        );
        Ok(table)
    }
}

/// Column-wise arithmetic mean of the runs of one combination.
fn mean_of(runs: &[Result<Vec<f64>, FireSimError>], columns: usize) -> Result<Vec<f64>, FireSimError> {
    let mut sums = vec![0.0; columns];
    for run in runs {
        let values = run.as_ref().map_err(Clone::clone)?;
        for (sum, value) in sums.iter_mut().zip(values) {
            *sum += value;
        }
    }
    let n = runs.len() as f64;
    Ok(sums.into_iter().map(|sum| sum / n).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds_base() -> SimulationConfig {
        SimulationConfig::new(
            8,
            8,
            0.5,
            CellVariant::DrosselSchwabl(DrosselSchwablConfig {
                protection: Some(0.0),
                regrowth: 0.1,
                ignition: 0.1,
            }),
        )
    }

    #[test]
    fn test_linspace_matches_numpy_layout() {
        let axis = ParameterAxis::linspace(SweepParameter::Regrowth, 0.0, 1.0, 11).skip_leading(1);
        assert_eq!(axis.values.len(), 10);
        approx::assert_relative_eq!(axis.values[0], 0.1);
        approx::assert_relative_eq!(axis.values[9], 1.0);

        assert_eq!(
            ParameterAxis::linspace(SweepParameter::Density, 0.3, 0.9, 1).values,
            vec![0.3]
        );
        assert!(ParameterAxis::linspace(SweepParameter::Density, 0.0, 1.0, 2)
            .skip_leading(5)
            .values
            .is_empty());
    }

    #[test]
    fn test_column_names_must_be_unique() {
        let shadowing = SweepRunner::new(ds_base())
            .axis(ParameterAxis::new(SweepParameter::Regrowth, [0.1]))
            .reporter(Reporter::new("p", |sim| sim.passes() as f64));
        assert_eq!(
            shadowing.run().unwrap_err(),
            FireSimError::DuplicateColumn("p".to_string())
        );

        let twice = SweepRunner::new(ds_base())
            .reporter(Reporter::burnt_fine_ratio())
            .reporter(Reporter::burnt_fine_ratio());
        assert_eq!(
            twice.run().unwrap_err(),
            FireSimError::DuplicateColumn("BurntFine".to_string())
        );
    }

    #[test]
    fn test_combinations_first_axis_slowest() {
        let runner = SweepRunner::new(ds_base())
            .axis(ParameterAxis::new(SweepParameter::Regrowth, [0.1, 0.2]))
            .axis(ParameterAxis::new(SweepParameter::Ignition, [0.5, 0.6, 0.7]));
        assert_eq!(
            runner.combinations(),
            vec![
                vec![0.1, 0.5],
                vec![0.1, 0.6],
                vec![0.1, 0.7],
                vec![0.2, 0.5],
                vec![0.2, 0.6],
                vec![0.2, 0.7],
            ]
        );
    }

    #[test]
    fn test_no_axes_is_one_combination() {
        let runner = SweepRunner::new(ds_base());
        assert_eq!(runner.combinations(), vec![Vec::<f64>::new()]);
    }

    #[test]
    fn test_apply_rejects_foreign_parameters() {
        let mut config = SimulationConfig::new(5, 5, 0.5, CellVariant::Simple);
        assert_eq!(
            SweepParameter::Regrowth.apply(&mut config, 0.3),
            Err(FireSimError::ParameterNotApplicable {
                parameter: "p",
                variant: "simple",
            })
        );
        assert!(SweepParameter::Density.apply(&mut config, 0.3).is_ok());
        assert_eq!(config.density, 0.3);
    }

    #[test]
    fn test_config_for_applies_values_and_cap() {
        let runner = SweepRunner::new(ds_base().with_max_passes(None))
            .axis(ParameterAxis::new(SweepParameter::Regrowth, [0.4]))
            .axis(ParameterAxis::new(SweepParameter::Protection, [0.2]));
        let config = runner.config_for(&[0.4, 0.2]).unwrap();
        let rates = config.drossel_schwabl_rates().unwrap();
        assert_eq!(rates.regrowth, 0.4);
        assert_eq!(rates.protection, 0.2);
        assert_eq!(config.max_passes, Some(DEFAULT_MAX_PASSES));
    }

    #[test]
    fn test_run_seeds_are_distinct_and_stable() {
        let runner = SweepRunner::new(ds_base()).iterations(3).seed(99);
        let seeds: Vec<u64> = (0..4)
            .flat_map(|c| (0..3).map(move |i| (c, i)))
            .map(|(c, i)| runner.run_seed(c, i))
            .collect();
        let mut unique = seeds.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), seeds.len());
        assert_eq!(runner.run_seed(2, 1), runner.clone().run_seed(2, 1));
    }

    #[test]
    fn test_malformed_sweeps_fail_fast() {
        let no_reporters = SweepRunner::new(ds_base());
        assert_eq!(no_reporters.run().unwrap_err(), FireSimError::NoReporters);

        let no_iterations = SweepRunner::new(ds_base())
            .reporter(Reporter::burnt_fine_ratio())
            .iterations(0);
        assert_eq!(no_iterations.run().unwrap_err(), FireSimError::NoIterations);

        let empty_axis = SweepRunner::new(ds_base())
            .reporter(Reporter::burnt_fine_ratio())
            .axis(ParameterAxis::new(SweepParameter::Ignition, Vec::new()));
        assert_eq!(empty_axis.run().unwrap_err(), FireSimError::EmptyAxis("f"));

        let duplicate = SweepRunner::new(ds_base())
            .reporter(Reporter::burnt_fine_ratio())
            .axis(ParameterAxis::new(SweepParameter::Ignition, [0.1]))
            .axis(ParameterAxis::new(SweepParameter::Ignition, [0.2]));
        assert_eq!(duplicate.run().unwrap_err(), FireSimError::DuplicateAxis("f"));
    }

    #[test]
    fn test_mean_of_runs() {
        let runs: Vec<Result<Vec<f64>, FireSimError>> =
            vec![Ok(vec![1.0, 10.0]), Ok(vec![2.0, 20.0]), Ok(vec![3.0, 60.0])];
        assert_eq!(mean_of(&runs, 2), Ok(vec![2.0, 30.0]));

        let runs: Vec<Result<Vec<f64>, FireSimError>> =
            vec![Ok(vec![1.0]), Err(FireSimError::NoIterations)];
        assert_eq!(mean_of(&runs, 1), Err(FireSimError::NoIterations));
    }
}
