use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lotka_core::{AdaptiveSolver, Comparison, Dop853Solver, Dopri5Solver, Scenario};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser)]
#[command(name = "lotka")]
#[command(
    about = "Prey-predator model: forward Euler vs. adaptive high-order integration",
    long_about = None
)]
struct Cli {
    /// JSON scenario file; flags below override its values
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Initial prey population (N1)
    #[arg(long)]
    prey: Option<f64>,
    /// Initial predator population (N2)
    #[arg(long)]
    predator: Option<f64>,
    /// Prey growth rate
    #[arg(short = 'a', long = "growth")]
    a: Option<f64>,
    /// Predation rate
    #[arg(short = 'b', long = "predation")]
    b: Option<f64>,
    /// Predator death rate
    #[arg(short = 'c', long = "death")]
    c: Option<f64>,
    /// Predator growth per unit of predation
    #[arg(short = 'd', long = "conversion")]
    d: Option<f64>,
    /// Fixed step size, also the adaptive step ceiling
    #[arg(long)]
    dt: Option<f64>,
    /// Final time
    #[arg(long)]
    t_final: Option<f64>,
    /// Adaptive solver
    #[arg(long, value_enum, default_value_t = SolverKind::Dop853)]
    solver: SolverKind,
    /// Relative tolerance of the adaptive solver
    #[arg(long)]
    rtol: Option<f64>,
    /// Absolute tolerance of the adaptive solver
    #[arg(long)]
    atol: Option<f64>,
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,
    /// Rows printed per trajectory in table output
    #[arg(long, default_value_t = 21)]
    samples: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum SolverKind {
    Dop853,
    Dopri5,
}

impl SolverKind {
    fn label(self) -> &'static str {
        match self {
            SolverKind::Dop853 => "DOP853",
            SolverKind::Dopri5 => "DOPRI5",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let scenario = build_scenario(&cli)?;
    tracing::info!(?scenario, "running prey-predator scenario");

    let comparison = match cli.solver {
        SolverKind::Dop853 => {
            let defaults = Dop853Solver::default();
            compare(
                &scenario,
                &Dop853Solver::with_tolerances(
                    cli.rtol.unwrap_or(defaults.rtol),
                    cli.atol.unwrap_or(defaults.atol),
                ),
            )
        }
        SolverKind::Dopri5 => {
            let defaults = Dopri5Solver::default();
            compare(
                &scenario,
                &Dopri5Solver::with_tolerances(
                    cli.rtol.unwrap_or(defaults.rtol),
                    cli.atol.unwrap_or(defaults.atol),
                ),
            )
        }
    }
    .context("Integration failed")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, &comparison)
                .context("Failed to serialize comparison")?;
            writeln!(out)?;
        }
        Format::Table => {
            render::write_table(&mut out, &comparison, cli.solver.label(), cli.samples)?
        }
    }
    Ok(())
}

fn compare<A: AdaptiveSolver>(scenario: &Scenario, solver: &A) -> Result<Comparison> {
    Ok(scenario.compare_with(solver)?)
}

fn build_scenario(cli: &Cli) -> Result<Scenario> {
    let mut scenario = match &cli.scenario {
        Some(path) => load_scenario(path)?,
        None => Scenario::default(),
    };

    let params = &mut scenario.parameters;
    params.a = cli.a.unwrap_or(params.a);
    params.b = cli.b.unwrap_or(params.b);
    params.c = cli.c.unwrap_or(params.c);
    params.d = cli.d.unwrap_or(params.d);
    scenario.initial.prey = cli.prey.unwrap_or(scenario.initial.prey);
    scenario.initial.predator = cli.predator.unwrap_or(scenario.initial.predator);
    scenario.dt = cli.dt.unwrap_or(scenario.dt);
    scenario.t_final = cli.t_final.unwrap_or(scenario.t_final);
    Ok(scenario)
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse scenario file {}", path.display()))
}
