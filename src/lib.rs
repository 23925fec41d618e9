//! Perfect maze generation and step-by-step BFS, DFS and A* search, with an
//! animation controller that drives the search at a chosen speed.

pub mod app;
pub mod error;
pub mod generators;
pub mod maze;
pub mod solvers;

pub use error::{MazeError, Result};
