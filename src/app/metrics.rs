use std::time::Duration;

use pausable_clock::{PausableClock, PausableInstant};

use crate::{
    maze::Position,
    solvers::{StepResult, Stepper},
};

/// Latest figures of a solve, kept until the next solve starts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    /// Hops on the final path. `None` until the goal is found.
    pub steps: Option<usize>,
    /// Cells expanded so far.
    pub expansions: usize,
    /// Running time in milliseconds, paused time excluded.
    pub elapsed_ms: u64,
}

impl std::fmt::Display for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.steps {
            Some(steps) => write!(f, "Steps: {steps}")?,
            None => write!(f, "Steps: -")?,
        }
        write!(
            f,
            " (expansions: {}) | Time: {} ms",
            self.expansions, self.elapsed_ms
        )
    }
}

/// Measures a solve and derives [`Metrics`] from the stepper.
///
/// Time runs on a pausable clock, so pausing the animation also pauses the
/// measurement.
pub struct MetricsCollector {
    clock: Option<PausableClock>,
    started: Option<PausableInstant>,
    current: Metrics,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        MetricsCollector {
            clock: None,
            started: None,
            current: Metrics::default(),
        }
    }

    /// Clears the previous figures and starts the clock.
    pub fn start(&mut self) {
        let clock = PausableClock::default();
        self.started = Some(clock.now());
        self.clock = Some(clock);
        self.current = Metrics::default();
    }

    pub fn pause(&mut self) {
        if let Some(clock) = self.clock.as_mut() {
            clock.pause();
        }
    }

    pub fn resume(&mut self) {
        if let Some(clock) = self.clock.as_mut() {
            clock.resume();
        }
    }

    /// Time spent running since [`MetricsCollector::start`].
    pub fn elapsed(&self) -> Duration {
        match (&self.clock, &self.started) {
            (Some(clock), Some(started)) => started.elapsed(clock),
            _ => Duration::ZERO,
        }
    }

    /// Refreshes the live figures while a solve is running.
    pub fn update(&mut self, stepper: &Stepper) {
        self.current.expansions = stepper.expansions();
        self.current.elapsed_ms = self.elapsed().as_millis() as u64;
    }

    /// Records the final figures and stops the clock.
    ///
    /// `path` is the reconstructed path when `outcome` is [`StepResult::Found`].
    pub fn finish(&mut self, stepper: &Stepper, outcome: StepResult, path: Option<&[Position]>) {
        self.update(stepper);
        self.current.steps = match outcome {
            StepResult::Found => path.map(|p| p.len().saturating_sub(1)),
            StepResult::Exhausted | StepResult::Continue => None,
        };
        self.pause();
    }

    /// The most recent figures.
    pub fn current(&self) -> Metrics {
        self.current
    }
}
