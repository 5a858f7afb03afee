//! Batch sweeps against directly driven simulations

use approx::assert_relative_eq;
use forest_fire_core::{
    CellVariant, Condition, DrosselSchwablConfig, FireSimError, FireSimulation, ParameterAxis,
    Reporter, SimulationConfig, SweepParameter, SweepRunner,
};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn forest() -> SimulationConfig {
    SimulationConfig::new(
        12,
        12,
        0.6,
        CellVariant::DrosselSchwabl(DrosselSchwablConfig {
            protection: Some(0.05),
            ..DrosselSchwablConfig::default()
        }),
    )
}

fn direct(runner: &SweepRunner, values: &[f64], combination: usize, iteration: u32) -> FireSimulation {
    let config = runner
        .config_for(values)
        .unwrap()
        .with_seed(runner.run_seed(combination, iteration));
    let mut sim = FireSimulation::new(config).unwrap();
    sim.run();
    sim
}

#[test]
fn test_single_run_sweep_matches_direct_run() {
    let runner = SweepRunner::new(forest())
        .axis(ParameterAxis::new(SweepParameter::Regrowth, [0.3]))
        .axis(ParameterAxis::new(SweepParameter::Ignition, [0.2]))
        .seed(42)
        .reporter(Reporter::fraction(Condition::BurnedOut))
        .reporter(Reporter::final_count(Condition::Fine));

    let table = runner.run().unwrap();
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].parameters, vec![0.3, 0.2]);

    let sim = direct(&runner, &[0.3, 0.2], 0, 0);
    let expected = vec![
        sim.count(Condition::BurnedOut) as f64 / sim.cell_count() as f64,
        sim.count(Condition::Fine) as f64,
    ];
    assert_eq!(table.rows[0].values(), Some(expected.as_slice()));
}

#[test]
fn test_reported_value_is_mean_over_iterations() {
    let runner = SweepRunner::new(forest())
        .axis(ParameterAxis::new(SweepParameter::Ignition, [0.05, 0.4]))
        .iterations(3)
        .seed(7)
        .reporter(Reporter::fraction(Condition::BurnedOut));

    let table = runner.run().unwrap();
    assert_eq!(table.rows.len(), 2);

    for (combination, values) in [[0.05], [0.4]].iter().enumerate() {
        let mean = (0..3)
            .map(|iteration| {
                let sim = direct(&runner, values, combination, iteration);
                sim.count(Condition::BurnedOut) as f64 / sim.cell_count() as f64
            })
            .sum::<f64>()
            / 3.0;
        let reported = table.value(combination, "BurnedOutFraction").unwrap();
        assert_relative_eq!(reported, mean, epsilon = 1e-12);
    }
}

#[test]
fn test_invalid_combination_is_rejected_without_aborting() {
    let runner = SweepRunner::new(SimulationConfig::new(8, 8, 0.5, CellVariant::Simple))
        .axis(ParameterAxis::new(SweepParameter::Density, [0.5, 1.5, 0.9]))
        .seed(3)
        .reporter(Reporter::fraction(Condition::BurnedOut));

    let table = runner.run().unwrap();
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rejected(), 1);
    assert!(table.rows[0].outcome.is_ok());
    assert!(matches!(
        table.rows[1].outcome,
        Err(FireSimError::OutOfRange { .. })
    ));
    assert!(table.rows[2].outcome.is_ok());
    assert_eq!(table.records().len(), 2);
}

#[test]
fn test_rate_axis_rejected_for_simple_family() {
    let runner = SweepRunner::new(SimulationConfig::new(8, 8, 0.5, CellVariant::Simple))
        .axis(ParameterAxis::new(SweepParameter::Regrowth, [0.1, 0.2]))
        .seed(3)
        .reporter(Reporter::burnt_fine_ratio());

    let table = runner.run().unwrap();
    assert_eq!(table.rejected(), 2);
    for row in &table.rows {
        assert!(matches!(
            row.outcome,
            Err(FireSimError::ParameterNotApplicable { .. })
        ));
    }
}

#[test]
fn test_malformed_sweep_fails_up_front() {
    let no_reporters = SweepRunner::new(forest()).seed(1);
    assert_eq!(no_reporters.run().unwrap_err(), FireSimError::NoReporters);

    let empty_axis = SweepRunner::new(forest())
        .axis(ParameterAxis::new(SweepParameter::Ignition, Vec::<f64>::new()))
        .reporter(Reporter::burnt_fine_ratio());
    assert_eq!(empty_axis.run().unwrap_err(), FireSimError::EmptyAxis("f"));

    let duplicate = SweepRunner::new(forest())
        .axis(ParameterAxis::new(SweepParameter::Ignition, [0.1]))
        .axis(ParameterAxis::new(SweepParameter::Ignition, [0.2]))
        .reporter(Reporter::burnt_fine_ratio());
    assert_eq!(duplicate.run().unwrap_err(), FireSimError::DuplicateAxis("f"));
}

#[test]
fn test_sweep_is_reproducible_from_its_seed() {
    let build = || {
        SweepRunner::new(forest())
            .axis(ParameterAxis::linspace(SweepParameter::Regrowth, 0.0, 0.5, 3))
            .axis(ParameterAxis::linspace(SweepParameter::Ignition, 0.0, 0.5, 4).skip_leading(1))
            .iterations(2)
            .seed(0xF1E5)
            .reporter(Reporter::fraction(Condition::BurnedOut))
            .reporter(Reporter::final_count(Condition::Fine))
    };

    let first = build().run().unwrap();
    let second = build().run().unwrap();
    assert_eq!(first.rows.len(), 9);
    assert_eq!(first.rows, second.rows);

    // Axis order: p varies slowest.
    assert_eq!(first.rows[0].parameters[0], first.rows[2].parameters[0]);
    assert!(first.rows[3].parameters[0] > first.rows[0].parameters[0]);
}
