use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use mazestep::{
    Result,
    app::{App, AppConfig, ControllerConfig},
    solvers::Solver,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Watch BFS, DFS and A* explore a random perfect maze")]
struct Cli {
    /// Maze side length, even and between 2 and 200.
    #[arg(long, default_value_t = 40)]
    size: usize,

    /// Animation speed between 1 (slowest) and 100 (fastest).
    #[arg(long, default_value_t = 60)]
    speed: u8,

    /// Seed for the first maze.
    #[arg(long)]
    seed: Option<u64>,

    /// Solver shown in the status line before the first solve.
    #[arg(long, value_enum, default_value_t = Solver::AStar)]
    solver: Solver,

    /// Directory for the log file.
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,
}

/// Logs go to a file since the terminal is taken by the visualizer.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(log_dir, "mazestep.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    guard
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(&cli.log_dir);

    // Invalid sizes and speeds are rejected here, before the terminal is taken over
    let mut app = App::new(
        AppConfig {
            size: cli.size,
            speed: cli.speed,
            seed: cli.seed,
            solver: cli.solver,
            ..AppConfig::default()
        },
        ControllerConfig::default(),
    )?;

    let mut stdout = std::io::stdout();
    App::setup_terminal(&mut stdout)?;
    let result = app.run(&mut stdout);
    App::restore_terminal(&mut stdout)?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Visualizer exited with an error");
    }
    result
}
