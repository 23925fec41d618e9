pub mod controller;
pub mod metrics;
pub mod renderer;

use std::{
    io::{Stdout, Write},
    time::{Duration, Instant},
};

use crossterm::{
    cursor,
    event::{self, KeyCode, KeyEvent, KeyEventKind},
    queue,
    terminal::{self, ClearType},
};

pub use controller::{AnimationState, Controller, ControllerConfig, Outcome};
pub use metrics::Metrics;

use crate::{
    app::renderer::Renderer,
    error::{MazeError, Result},
    maze::{MAX_SIZE, MIN_SIZE},
    solvers::{Solver, StepResult},
};

/// Speed change per arrow key press.
const SPEED_STEP: u8 = 5;

/// Commands the user can issue from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Solve(Solver),
    /// Pause when running, resume when paused
    TogglePause,
    /// Single step while paused
    StepForward,
    SpeedUp,
    SlowDown,
    Grow,
    Shrink,
    NewMaze,
    Stop,
    Quit,
}

impl UserCommand {
    /// Maps a key press to a command. Returns `None` for keys without a binding.
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        let command = match key.code {
            KeyCode::Char('b') => UserCommand::Solve(Solver::Bfs),
            KeyCode::Char('d') => UserCommand::Solve(Solver::Dfs),
            KeyCode::Char('a') => UserCommand::Solve(Solver::AStar),
            KeyCode::Enter | KeyCode::Char(' ') => UserCommand::TogglePause,
            KeyCode::Right => UserCommand::StepForward,
            KeyCode::Up => UserCommand::SpeedUp,
            KeyCode::Down => UserCommand::SlowDown,
            KeyCode::Char('+') | KeyCode::Char('=') => UserCommand::Grow,
            KeyCode::Char('-') => UserCommand::Shrink,
            KeyCode::Char('n') => UserCommand::NewMaze,
            KeyCode::Char('s') => UserCommand::Stop,
            KeyCode::Esc | KeyCode::Char('q') => UserCommand::Quit,
            _ => return None,
        };
        Some(command)
    }
}

/// What the screen needs after a command was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Only the status lines changed.
    Status,
    /// The whole maze must be drawn again.
    Redraw,
    /// A search step ran and its delta must be painted.
    Stepped(StepResult),
    Quit,
}

/// Start-up settings of the terminal visualizer.
#[derive(Debug, Clone, Copy)]
pub struct AppConfig {
    /// Maze side length
    pub size: usize,
    /// Animation speed in `[1, 100]`
    pub speed: u8,
    /// Seed of the first maze. Later mazes are random.
    pub seed: Option<u64>,
    /// Solver preselected for the status line
    pub solver: Solver,
    /// How long to wait for input when no step is due
    pub input_poll_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            size: 40,
            speed: controller::DEFAULT_SPEED,
            seed: None,
            solver: Solver::AStar,
            input_poll_timeout: Duration::from_millis(100),
        }
    }
}

/// Terminal host: reads keys, ticks the controller and paints what changed.
pub struct App {
    controller: Controller,
    /// Solver of the current or last solve
    solver: Solver,
    input_poll_timeout: Duration,
    /// Whether the maze is currently hidden behind the "terminal too small" message
    too_small: bool,
}

impl App {
    /// Validates the configuration and generates the first maze.
    pub fn new(config: AppConfig, controller_config: ControllerConfig) -> Result<Self> {
        let mut controller = Controller::generate(config.size, config.seed, controller_config)?;
        controller.set_speed(config.speed)?;
        Ok(App {
            controller,
            solver: config.solver,
            input_poll_timeout: config.input_poll_timeout,
            too_small: false,
        })
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn solver(&self) -> Solver {
        self.solver
    }

    /// Set a panic hook to restore terminal state on panic
    /// This ensures that the terminal is not left in raw mode or alternate screen on panic
    fn set_panic_hook() {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = App::restore_terminal(&mut std::io::stdout()); // ignore any errors as we are already failing
            hook(panic_info);
        }));
    }

    /// Setup terminal in raw mode and enter alternate screen
    /// Also sets a panic hook to restore terminal on panic
    pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        App::set_panic_hook();
        queue!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Restore terminal to original state
    /// Leave alternate screen and disable raw mode
    pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        queue!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
        stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Applies a user command to the controller.
    ///
    /// Commands that do not fit the current state are ignored; rejected
    /// configuration changes are logged and leave everything unchanged.
    pub fn apply(&mut self, command: UserCommand) -> Effect {
        tracing::debug!(?command, state = %self.controller.state(), "Applying command");
        match command {
            UserCommand::Solve(solver) => {
                // Overlays of a finished run are still on screen
                let was_finished = matches!(self.controller.state(), AnimationState::Finished(_));
                match self.controller.solve(solver) {
                    Ok(()) => {
                        self.solver = solver;
                        if was_finished {
                            return Effect::Redraw;
                        }
                        Effect::Status
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Solve rejected");
                        Effect::Status
                    }
                }
            }
            UserCommand::TogglePause => {
                if !self.controller.pause() {
                    self.controller.resume();
                }
                Effect::Status
            }
            UserCommand::StepForward => match self.controller.step_once() {
                Some(result) => Effect::Stepped(result),
                None => Effect::Status,
            },
            UserCommand::SpeedUp => {
                let speed = self
                    .controller
                    .speed()
                    .saturating_add(SPEED_STEP)
                    .min(controller::MAX_SPEED);
                self.change_speed(speed)
            }
            UserCommand::SlowDown => {
                let speed = self
                    .controller
                    .speed()
                    .saturating_sub(SPEED_STEP)
                    .max(controller::MIN_SPEED);
                self.change_speed(speed)
            }
            UserCommand::Grow => {
                let size = (self.controller.maze().size() as usize + 2).min(MAX_SIZE);
                self.change_maze(|c| c.set_size(size, None))
            }
            UserCommand::Shrink => {
                let size = (self.controller.maze().size() as usize)
                    .saturating_sub(2)
                    .max(MIN_SIZE);
                self.change_maze(|c| c.set_size(size, None))
            }
            UserCommand::NewMaze => self.change_maze(|c| c.regenerate(None)),
            UserCommand::Stop => {
                if self.controller.stop() {
                    Effect::Redraw
                } else {
                    Effect::Status
                }
            }
            UserCommand::Quit => Effect::Quit,
        }
    }

    fn change_speed(&mut self, speed: u8) -> Effect {
        if let Err(e) = self.controller.set_speed(speed) {
            tracing::warn!(error = %e, "Speed change rejected");
        }
        Effect::Status
    }

    fn change_maze(&mut self, change: impl FnOnce(&mut Controller) -> Result<()>) -> Effect {
        match change(&mut self.controller) {
            Ok(()) => Effect::Redraw,
            Err(MazeError::SolveInProgress) => {
                tracing::info!("Stop the running solve before changing the maze");
                Effect::Status
            }
            Err(e) => {
                tracing::warn!(error = %e, "Maze change rejected");
                Effect::Status
            }
        }
    }

    /// Draws everything from scratch: maze, search state, path and status.
    fn redraw<W: Write>(&mut self, renderer: &mut Renderer<W>) -> std::io::Result<()> {
        let maze = self.controller.maze();
        self.too_small = !Renderer::<W>::fits(maze.size())?;
        if self.too_small {
            return renderer.draw_too_small(maze.size());
        }
        match self.controller.snapshot() {
            Some(snapshot) => renderer.draw_snapshot(maze, &snapshot)?,
            None => renderer.draw_maze(maze)?,
        }
        if let Some(path) = self.controller.final_path() {
            renderer.draw_path(path)?;
        }
        renderer.draw_status(&self.controller, self.solver)
    }

    /// Paints the delta of the step that just ran, and the path if it was the last one.
    fn paint_step<W: Write>(
        &self,
        renderer: &mut Renderer<W>,
        result: StepResult,
    ) -> std::io::Result<()> {
        if self.too_small {
            return Ok(());
        }
        if let Some(stepper) = self.controller.stepper() {
            renderer.apply_delta(self.controller.maze(), stepper.last_delta())?;
        }
        if result == StepResult::Found {
            if let Some(path) = self.controller.final_path() {
                renderer.draw_path(path)?;
            }
        }
        renderer.draw_status(&self.controller, self.solver)
    }

    /// Main application loop. Returns when the user quits.
    pub fn run(&mut self, stdout: &mut Stdout) -> Result<()> {
        let mut renderer = Renderer::new(stdout);
        self.redraw(&mut renderer)?;
        tracing::info!("Started main app loop");

        loop {
            // Wake up for input, or when the next step is due, whichever comes first
            let timeout = self
                .controller
                .time_until_next_step(Instant::now())
                .map_or(self.input_poll_timeout, |due| due.min(self.input_poll_timeout));

            if event::poll(timeout)? {
                let effect = match event::read()? {
                    event::Event::Key(key) => UserCommand::from_key(&key).map(|c| self.apply(c)),
                    event::Event::Resize(_, _) => Some(Effect::Redraw),
                    _ => None,
                };
                match effect {
                    Some(Effect::Quit) => break,
                    Some(Effect::Redraw) => self.redraw(&mut renderer)?,
                    Some(Effect::Stepped(result)) => self.paint_step(&mut renderer, result)?,
                    Some(Effect::Status) if !self.too_small => {
                        renderer.draw_status(&self.controller, self.solver)?
                    }
                    Some(Effect::Status) | None => {}
                }
            }

            if let Some(result) = self.controller.tick() {
                self.paint_step(&mut renderer, result)?;
            }
        }

        tracing::info!("Exiting main app loop");
        Ok(())
    }
}
