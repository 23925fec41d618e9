use std::{
    rc::Rc,
    time::{Duration, Instant},
};

use crate::{
    app::metrics::{Metrics, MetricsCollector},
    error::{MazeError, Result},
    generators::generate_maze,
    maze::{Maze, Position},
    solvers::{Snapshot, Solver, StepResult, Stepper},
};

/// Slowest animation speed.
pub const MIN_SPEED: u8 = 1;
/// Fastest animation speed.
pub const MAX_SPEED: u8 = 100;
/// Speed a controller starts with.
pub const DEFAULT_SPEED: u8 = 60;
/// Longest delay between two steps, whatever the configuration.
pub const MAX_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// How a finished solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Found,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    Running,
    Paused,
    Finished(Outcome),
}

impl std::fmt::Display for AnimationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnimationState::Idle => write!(f, "ready"),
            AnimationState::Running => write!(f, "running"),
            AnimationState::Paused => write!(f, "paused"),
            AnimationState::Finished(Outcome::Found) => write!(f, "completed"),
            AnimationState::Finished(Outcome::Exhausted) => write!(f, "no path found"),
        }
    }
}

/// Timing parameters of the animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    /// Interval the exponential curve starts from, before any decay.
    pub base_interval: Duration,
    /// Factor applied to the interval for each speed unit. Must be in `(0, 1)`.
    pub decay_rate: f64,
    /// Floor the interval never goes below.
    pub min_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_millis(500),
            decay_rate: 0.93,
            min_interval: Duration::from_millis(1),
        }
    }
}

impl ControllerConfig {
    /// Delay between two steps at `speed`: `max(min_interval, base_interval * decay_rate^speed)`.
    ///
    /// Low speeds crawl, and the step rate shoots up towards the floor at the high end.
    ///
    /// Out-of-range settings never panic: a negative or NaN product counts as zero,
    /// and the result is capped at [`MAX_INTERVAL`].
    pub fn interval(&self, speed: u8) -> Duration {
        let scaled = self.base_interval.as_secs_f64() * self.decay_rate.powi(speed as i32);
        let interval = if scaled > 0.0 {
            Duration::try_from_secs_f64(scaled).unwrap_or(MAX_INTERVAL)
        } else {
            Duration::ZERO
        };
        interval.max(self.min_interval).min(MAX_INTERVAL)
    }
}

/// Owns the maze and the active search, and advances the search when the host ticks.
///
/// The host calls [`Controller::tick`] at its own cadence. A tick is synchronous
/// and performs at most one step, and only once the interval derived from the
/// current speed has passed since the previous step. Ticks arriving early are
/// dropped rather than queued, so a host that falls behind never gets a burst of
/// catch-up steps.
pub struct Controller {
    maze: Rc<Maze>,
    config: ControllerConfig,
    speed: u8,
    state: AnimationState,
    stepper: Option<Stepper>,
    path: Option<Vec<Position>>,
    /// Earliest instant the next step may run. `None` means the next tick steps.
    next_due: Option<Instant>,
    metrics: MetricsCollector,
}

impl Controller {
    pub fn new(maze: Maze, config: ControllerConfig) -> Self {
        Controller {
            maze: Rc::new(maze),
            config,
            speed: DEFAULT_SPEED,
            state: AnimationState::Idle,
            stepper: None,
            path: None,
            next_due: None,
            metrics: MetricsCollector::new(),
        }
    }

    /// Generates a fresh maze and wraps it in an idle controller.
    pub fn generate(size: usize, seed: Option<u64>, config: ControllerConfig) -> Result<Self> {
        Ok(Controller::new(generate_maze(size, seed)?, config))
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    /// Current delay between steps.
    pub fn interval(&self) -> Duration {
        self.config.interval(self.speed)
    }

    /// The active search, also kept after it finished until the next stop or solve.
    pub fn stepper(&self) -> Option<&Stepper> {
        self.stepper.as_ref()
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.stepper.as_ref().map(Stepper::snapshot)
    }

    /// The solution path once the goal was found.
    pub fn final_path(&self) -> Option<&[Position]> {
        self.path.as_deref()
    }

    /// Latest metrics. While a solve is in progress the elapsed time is live.
    pub fn metrics(&self) -> Metrics {
        let mut metrics = self.metrics.current();
        if matches!(
            self.state,
            AnimationState::Running | AnimationState::Paused
        ) {
            metrics.elapsed_ms = self.metrics.elapsed().as_millis() as u64;
        }
        metrics
    }

    /// Time left until a tick would step, `None` unless running.
    pub fn time_until_next_step(&self, now: Instant) -> Option<Duration> {
        if self.state != AnimationState::Running {
            return None;
        }
        Some(
            self.next_due
                .map_or(Duration::ZERO, |due| due.saturating_duration_since(now)),
        )
    }

    /// Starts a new search with `solver` over the current maze.
    ///
    /// Accepted when idle or finished (the finished run is discarded). Fails
    /// with [`MazeError::SolveInProgress`] while running or paused.
    pub fn solve(&mut self, solver: Solver) -> Result<()> {
        self.ensure_not_solving()?;
        self.stepper = Some(Stepper::for_maze(Rc::clone(&self.maze), solver));
        self.path = None;
        self.next_due = None;
        self.metrics.start();
        self.state = AnimationState::Running;
        tracing::info!(%solver, size = self.maze.size(), "Started solving");
        Ok(())
    }

    /// Freezes the search. Returns `false` if not running.
    pub fn pause(&mut self) -> bool {
        if self.state != AnimationState::Running {
            tracing::debug!(state = %self.state, "Ignoring pause");
            return false;
        }
        self.metrics.pause();
        self.state = AnimationState::Paused;
        tracing::info!("Paused");
        true
    }

    /// Continues a paused search where it left off. Returns `false` if not paused.
    pub fn resume(&mut self) -> bool {
        if self.state != AnimationState::Paused {
            tracing::debug!(state = %self.state, "Ignoring resume");
            return false;
        }
        self.metrics.resume();
        self.next_due = None;
        self.state = AnimationState::Running;
        tracing::info!("Resumed");
        true
    }

    /// Discards the search and its overlays and goes back to idle. Metrics are
    /// kept. Returns `false` if already idle.
    pub fn stop(&mut self) -> bool {
        if self.state == AnimationState::Idle {
            tracing::debug!("Ignoring stop while idle");
            return false;
        }
        if matches!(
            self.state,
            AnimationState::Running | AnimationState::Paused
        ) {
            self.metrics.pause();
        }
        self.stepper = None;
        self.path = None;
        self.next_due = None;
        self.state = AnimationState::Idle;
        tracing::info!("Stopped");
        true
    }

    pub fn set_speed(&mut self, speed: u8) -> Result<()> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(MazeError::InvalidSpeed { speed });
        }
        self.speed = speed;
        tracing::debug!(speed, interval = ?self.interval(), "Speed changed");
        Ok(())
    }

    /// Replaces the maze with a new one of `size`. On error the maze is unchanged.
    /// A finished run is discarded only once the new maze exists.
    pub fn set_size(&mut self, size: usize, seed: Option<u64>) -> Result<()> {
        self.ensure_not_solving()?;
        let maze = generate_maze(size, seed)?;
        if matches!(self.state, AnimationState::Finished(_)) {
            self.stop();
        }
        self.maze = Rc::new(maze);
        Ok(())
    }

    /// Replaces the maze with a new one of the same size.
    pub fn regenerate(&mut self, seed: Option<u64>) -> Result<()> {
        self.set_size(self.maze.size() as usize, seed)
    }

    /// Host tick at the current instant. See [`Controller::tick_at`].
    pub fn tick(&mut self) -> Option<StepResult> {
        self.tick_at(Instant::now())
    }

    /// Performs one step if running and the step is due at `now`.
    ///
    /// Returns the step result, or `None` when no step ran.
    pub fn tick_at(&mut self, now: Instant) -> Option<StepResult> {
        if self.state != AnimationState::Running {
            return None;
        }
        if self.next_due.is_some_and(|due| now < due) {
            return None;
        }
        let result = self.advance()?;
        if self.state == AnimationState::Running {
            self.next_due = Some(now + self.interval());
        }
        Some(result)
    }

    /// Performs exactly one step while paused, for stepping through a search by hand.
    /// Returns `None` if not paused.
    pub fn step_once(&mut self) -> Option<StepResult> {
        if self.state != AnimationState::Paused {
            tracing::debug!(state = %self.state, "Ignoring single step");
            return None;
        }
        self.advance()
    }

    fn advance(&mut self) -> Option<StepResult> {
        let stepper = self.stepper.as_mut()?;
        let result = stepper.step();
        self.metrics.update(stepper);
        if result.is_terminal() {
            self.finish(result);
        }
        Some(result)
    }

    fn finish(&mut self, result: StepResult) {
        let Some(stepper) = self.stepper.as_ref() else {
            return;
        };
        let outcome = match result {
            StepResult::Found => Outcome::Found,
            _ => Outcome::Exhausted,
        };
        self.path = stepper.reconstruct_path().ok();
        self.metrics.finish(stepper, result, self.path.as_deref());
        self.next_due = None;
        self.state = AnimationState::Finished(outcome);

        let metrics = self.metrics.current();
        tracing::info!(
            solver = %stepper.solver(),
            outcome = ?outcome,
            steps = ?metrics.steps,
            expansions = metrics.expansions,
            elapsed_ms = metrics.elapsed_ms,
            "Finished solving"
        );
    }

    /// Errors while a search is in progress.
    fn ensure_not_solving(&self) -> Result<()> {
        match self.state {
            AnimationState::Running | AnimationState::Paused => Err(MazeError::SolveInProgress),
            AnimationState::Idle | AnimationState::Finished(_) => Ok(()),
        }
    }
}
