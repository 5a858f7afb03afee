use clap::{Parser, Subcommand, ValueEnum};
use forest_fire_core::{
    CellKind, CellVariant, Condition, DrosselSchwablConfig, FireSimError, FireSimulation, Frame,
    ParameterAxis, Reporter, SimulationConfig, SweepParameter, SweepRunner, SweepTable,
};
use std::io::{self, Write};
use thiserror::Error;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Forest fire cellular automaton driver
#[derive(Parser, Debug)]
#[command(name = "forest-fire")]
#[command(about = "Forest fire cellular automaton", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one simulation and print per-pass condition counts
    Run(RunArgs),
    /// Sweep regrowth and ignition probabilities and report burnt/fine ratios
    Sweep(SweepArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Grid width in cells
    #[arg(long, default_value_t = 100)]
    width: usize,

    /// Grid height in cells
    #[arg(long, default_value_t = 100)]
    height: usize,

    /// Probability a slot starts as a living tree
    #[arg(short, long, default_value_t = 0.65)]
    density: f64,

    /// Cell family (simple, single-spread, drossel-schwabl)
    #[arg(short, long, default_value = "simple")]
    variant: CellKind,

    /// Protected fraction (drossel-schwabl only, default 1 - density)
    #[arg(long)]
    protection: Option<f64>,

    /// Regrowth probability p (drossel-schwabl only)
    #[arg(short, long)]
    p: Option<f64>,

    /// Lightning ignition probability f (drossel-schwabl only)
    #[arg(short, long)]
    f: Option<f64>,

    /// RNG seed (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Halt after this many passes
    #[arg(long, default_value_t = forest_fire_core::DEFAULT_MAX_PASSES)]
    max_passes: u32,

    /// Print the grid as ASCII
    #[arg(short, long)]
    render: bool,

    /// Render every Nth pass
    #[arg(long, default_value_t = 1)]
    every: u32,
}

#[derive(clap::Args, Debug)]
struct SweepArgs {
    /// Square grid side in cells
    #[arg(long, default_value_t = 50)]
    size: usize,

    /// Probability a slot starts as a living tree
    #[arg(short, long, default_value_t = 0.65)]
    density: f64,

    /// Cell family (only drossel-schwabl understands p and f)
    #[arg(short, long, default_value = "drossel-schwabl")]
    variant: CellKind,

    /// Protected fraction (default 1 - density)
    #[arg(long)]
    protection: Option<f64>,

    /// Values per axis: linspace(0, 1, steps + 1) without the leading zero
    #[arg(long, default_value_t = 10)]
    steps: usize,

    /// Runs averaged per combination
    #[arg(short, long, default_value_t = 5)]
    iterations: u32,

    /// Sweep seed (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output layout (json writes non-finite values as null)
    #[arg(long, value_enum, default_value_t = OutputFormat::Grouped)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// One line per combination, blank line between p groups
    Grouped,
    /// Aligned columns
    Table,
    Csv,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let result = match args.command {
        Command::Run(run) => run_simulation(&run).map_err(CliError::from),
        Command::Sweep(sweep) => run_sweep(&sweep),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

/// Variant for `kind`, rejecting p/f/protection for families that ignore them.
fn variant(
    kind: CellKind,
    protection: Option<f64>,
    p: Option<f64>,
    f: Option<f64>,
) -> Result<CellVariant, FireSimError> {
    if kind != CellKind::DrosselSchwabl {
        let given = [("protection", protection), ("p", p), ("f", f)];
        if let Some((parameter, _)) = given.into_iter().find(|(_, value)| value.is_some()) {
            return Err(FireSimError::ParameterNotApplicable {
                parameter,
                variant: kind.name(),
            });
        }
        return Ok(kind.into());
    }

    let defaults = DrosselSchwablConfig::default();
    Ok(CellVariant::DrosselSchwabl(DrosselSchwablConfig {
        protection,
        regrowth: p.unwrap_or(defaults.regrowth),
        ignition: f.unwrap_or(defaults.ignition),
    }))
}

fn run_simulation(args: &RunArgs) -> Result<(), FireSimError> {
    let variant = variant(args.variant, args.protection, args.p, args.f)?;
    let mut config = SimulationConfig::new(args.width, args.height, args.density, variant)
        .with_max_passes(Some(args.max_passes));
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut sim = FireSimulation::new(config)?;
    println!("=== Forest Fire ===\n");
    println!(
        "{}x{} {} forest, density {:.2}, seed {}",
        args.width,
        args.height,
        args.variant,
        args.density,
        sim.seed()
    );
    if let Some(rates) = sim.config().drossel_schwabl_rates() {
        println!(
            "protection {:.3}, p {:.3}, f {:.3}",
            rates.protection, rates.regrowth, rates.ignition
        );
    }
    println!("{} trees planted\n", sim.cell_count());

    let every = args.every.max(1);
    if args.render {
        print_frame(&sim.frame());
    }

    print_header();
    print_counts(&sim);
    while sim.is_running() {
        sim.step();
        print_counts(&sim);
        if args.render && (sim.passes() % every == 0 || !sim.is_running()) {
            print_frame(&sim.frame());
        }
    }

    println!("\n=== Simulation Complete ===");
    println!("Passes: {}", sim.passes());
    for (condition, count) in sim.counts().iter() {
        println!("{condition:>10}: {count}");
    }
    let burnt = Reporter::burnt_fine_ratio().evaluate(&sim);
    println!("Burnt/fine ratio: {burnt:.4}");
    Ok(())
}

fn print_header() {
    let names: Vec<String> = Condition::ALL.iter().map(|c| format!("{:>10}", c.name())).collect();
    println!("  Pass |{}", names.join(" |"));
    println!("-------|{}", vec!["-----------"; Condition::COUNT].join("|"));
}

fn print_counts(sim: &FireSimulation) {
    let counts: Vec<String> = sim.counts().iter().map(|(_, n)| format!("{n:>10}")).collect();
    println!("{:>6} |{}", sim.passes(), counts.join(" |"));
}

const fn glyph(condition: Condition) -> char {
    match condition {
        Condition::Empty => '.',
        Condition::Protected => '#',
        Condition::Fine => 'T',
        Condition::OnFire => '*',
        Condition::BurnedOut => '_',
    }
}

fn print_frame(frame: &Frame) {
    let mut rows = vec![vec![' '; frame.width]; frame.height];
    for cell in &frame.cells {
        rows[cell.y][cell.x] = glyph(cell.condition);
    }
    println!("\npass {}", frame.pass);
    // Row 0 at the bottom.
    for row in rows.iter().rev() {
        println!("{}", row.iter().collect::<String>());
    }
    println!();
}

fn run_sweep(args: &SweepArgs) -> Result<(), CliError> {
    let variant = variant(args.variant, args.protection, None, None)?;
    let base = SimulationConfig::new(args.size, args.size, args.density, variant);

    let mut runner = SweepRunner::new(base)
        .axis(ParameterAxis::linspace(SweepParameter::Regrowth, 0.0, 1.0, args.steps + 1).skip_leading(1))
        .axis(ParameterAxis::linspace(SweepParameter::Ignition, 0.0, 1.0, args.steps + 1).skip_leading(1))
        .iterations(args.iterations)
        .reporter(Reporter::burnt_fine_ratio());
    if let Some(seed) = args.seed {
        runner = runner.seed(seed);
    }

    let table = runner.run()?;
    info!(
        "Sweep finished: {} rows, {} rejected",
        table.rows.len(),
        table.rejected()
    );

    write_table(&table, args.format, io::stdout().lock())
}

/// Errors surfaced by the driver.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Simulation(#[from] FireSimError),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Render `table` in `format`.
///
/// JSON has no infinity or NaN, so a non-finite reporter value (e.g. BurntFine
/// once no Fine tree is left) is written as `null`.
fn write_table<W: Write>(table: &SweepTable, format: OutputFormat, mut out: W) -> Result<(), CliError> {
    match format {
        OutputFormat::Grouped => write_grouped(table, &mut out)?,
        OutputFormat::Table => write!(out, "{table}")?,
        OutputFormat::Csv => table.write_csv(&mut out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, table)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn write_grouped<W: Write>(table: &SweepTable, out: &mut W) -> io::Result<()> {
    writeln!(out, "seed {}, {} iterations per combination", table.seed, table.iterations)?;
    let mut current_p = None;
    for row in &table.rows {
        let &[p, f] = row.parameters.as_slice() else {
            continue;
        };
        if current_p.is_some_and(|last| last != p) {
            writeln!(out)?;
        }
        current_p = Some(p);
        match row.values() {
            Some(values) => writeln!(out, "p={p:.2} f={f:.2} b={:.4}", values[0])?,
            None => writeln!(out, "p={p:.2} f={f:.2} rejected")?,
        }
    }
    Ok(())
}
