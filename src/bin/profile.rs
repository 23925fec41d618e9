use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mazestep::{
    Result,
    app::{AnimationState, Controller, ControllerConfig, Metrics},
    solvers::Solver,
};

/// Run every solver headless on a series of mazes and report the metrics.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Maze side length.
    #[arg(long, default_value_t = 200)]
    size: usize,

    /// Number of mazes to solve.
    #[arg(long, default_value_t = 10)]
    iterations: u64,

    /// Seed of the first maze; later mazes use the following seeds.
    #[arg(long)]
    seed: Option<u64>,
}

/// Steps as fast as the host can tick.
const UNTHROTTLED: ControllerConfig = ControllerConfig {
    base_interval: Duration::ZERO,
    decay_rate: 0.5,
    min_interval: Duration::ZERO,
};

fn solve(controller: &mut Controller, solver: Solver) -> Result<Metrics> {
    controller.solve(solver)?;
    while controller.state() == AnimationState::Running {
        controller.tick();
    }
    Ok(controller.metrics())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut totals = [(0usize, 0usize, 0u64); 3];

    for i in 0..args.iterations {
        let seed = args.seed.map(|s| s.wrapping_add(i));
        let mut controller = Controller::generate(args.size, seed, UNTHROTTLED)?;
        for (solver, total) in Solver::ALL.into_iter().zip(totals.iter_mut()) {
            let metrics = solve(&mut controller, solver)?;
            tracing::info!(iteration = i, %solver, %metrics, "Solved");
            total.0 += metrics.steps.unwrap_or(0);
            total.1 += metrics.expansions;
            total.2 += metrics.elapsed_ms;
        }
    }

    let runs = args.iterations.max(1) as usize;
    println!(
        "{} maze(s) of {}x{}, averages per solve:",
        args.iterations, args.size, args.size
    );
    for (solver, (steps, expansions, elapsed_ms)) in Solver::ALL.into_iter().zip(totals) {
        println!(
            "  {:<28} steps: {:>6}  expansions: {:>6}  time: {:>5} ms",
            solver.to_string(),
            steps / runs,
            expansions / runs,
            elapsed_ms / runs as u64
        );
    }
    Ok(())
}
