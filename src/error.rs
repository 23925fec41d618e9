use thiserror::Error;

use crate::maze::{MAX_SIZE, MIN_SIZE, Position};

/// Convenient result alias for the maze engine.
pub type Result<T> = std::result::Result<T, MazeError>;

/// Errors surfaced by maze construction, solving and animation control.
#[derive(Debug, Error)]
pub enum MazeError {
    /// Maze size is odd or outside the supported range.
    #[error("invalid maze size {size}: must be even and between {MIN_SIZE} and {MAX_SIZE}")]
    InvalidSize { size: usize },

    /// Path reconstruction was requested before the goal was found.
    #[error("no path available: the search has not reached the goal")]
    NoPath,

    /// Animation speed is outside the slider range.
    #[error("invalid animation speed {speed}: must be between 1 and 100")]
    InvalidSpeed { speed: u8 },

    /// A search endpoint lies outside the maze.
    #[error("position {pos:?} is outside the {size}x{size} maze")]
    OutOfBounds { pos: Position, size: u8 },

    /// A solve is running or paused; stop it first.
    #[error("a solve is in progress; stop it before changing the maze or starting another")]
    SolveInProgress,

    /// The given passages do not describe a perfect maze.
    #[error("passages do not form a perfect maze: {reason}")]
    NotPerfect { reason: String },

    /// Wrapper for terminal IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
