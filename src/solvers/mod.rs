mod frontier;
mod stepper;

pub use stepper::{NodeState, Snapshot, StepDelta, Stepper};

/// Search algorithm driving a [`Stepper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Solver {
    Bfs,
    Dfs,
    #[value(name = "astar")]
    AStar,
}

impl Solver {
    pub const ALL: [Solver; 3] = [Solver::Bfs, Solver::Dfs, Solver::AStar];
}

impl std::fmt::Display for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Solver::Bfs => write!(f, "Breadth-First Search (BFS)"),
            Solver::Dfs => write!(f, "Depth-First Search (DFS)"),
            Solver::AStar => write!(f, "A* Search"),
        }
    }
}

/// Outcome of a single [`Stepper::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// One cell was expanded and the search goes on.
    Continue,
    /// The goal was reached.
    Found,
    /// The frontier ran dry without reaching the goal.
    Exhausted,
}

impl StepResult {
    pub fn is_terminal(self) -> bool {
        !matches!(self, StepResult::Continue)
    }
}

/// Manhattan distance between two cells. Admissible and consistent on a
/// 4-connected grid with unit step cost.
pub fn manhattan(a: (u8, u8), b: (u8, u8)) -> u32 {
    (a.0.abs_diff(b.0) as u32) + (a.1.abs_diff(b.1) as u32)
}
