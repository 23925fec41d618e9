use std::{collections::HashSet, rc::Rc};

use super::{Solver, StepResult, frontier::Frontier, manhattan};
use crate::{
    error::{MazeError, Result},
    maze::{Maze, Position},
};

/// Search state of a single cell.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Not discovered yet.
    #[default]
    Unseen,
    /// Discovered and waiting in the frontier.
    Open,
    /// Expanded. Never reopened.
    Closed,
}

/// Cells that changed during the most recent [`Stepper::step`] call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StepDelta {
    /// The cell expanded by this step.
    pub current: Option<Position>,
    /// Cells newly added to the frontier.
    pub opened: Vec<Position>,
    /// Cells newly closed that are not branch cells.
    pub closed: Vec<Position>,
    /// Cells newly closed that are branch cells.
    pub branches: Vec<Position>,
}

impl StepDelta {
    fn clear(&mut self) {
        self.current = None;
        self.opened.clear();
        self.closed.clear();
        self.branches.clear();
    }
}

/// Read-only view of the whole search state, for painting a full frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub current: Option<Position>,
    pub open: HashSet<Position>,
    pub closed: HashSet<Position>,
}

/// Incremental search over a maze. Every call to [`Stepper::step`] expands exactly
/// one cell, so the search can be animated and paused between calls.
///
/// BFS, DFS and A* share this type; they only differ in the order the frontier
/// hands out positions.
#[derive(Debug)]
pub struct Stepper {
    maze: Rc<Maze>,
    solver: Solver,
    start: Position,
    goal: Position,
    frontier: Frontier,
    /// Best known cost from the start, `u32::MAX` when unseen. Indexed by [`Maze::ravel_index`].
    costs: Box<[u32]>,
    /// Cell each node was reached from. Indexed by [`Maze::ravel_index`].
    parents: Box<[Option<Position>]>,
    states: Box<[NodeState]>,
    current: Option<Position>,
    expansions: usize,
    outcome: Option<StepResult>,
    delta: StepDelta,
}

impl Stepper {
    /// Prepares a search from `start` to `goal` with the start already in the frontier.
    ///
    /// Fails with [`MazeError::OutOfBounds`] if either end lies outside the maze.
    pub fn new(maze: Rc<Maze>, start: Position, goal: Position, solver: Solver) -> Result<Self> {
        for pos in [start, goal] {
            if !maze.is_in_bounds(pos) {
                return Err(MazeError::OutOfBounds {
                    pos,
                    size: maze.size(),
                });
            }
        }
        Ok(Stepper::with_endpoints(maze, start, goal, solver))
    }

    /// Search from the maze's own start to its own goal.
    pub fn for_maze(maze: Rc<Maze>, solver: Solver) -> Self {
        let (start, goal) = (maze.start(), maze.goal());
        Stepper::with_endpoints(maze, start, goal, solver)
    }

    fn with_endpoints(maze: Rc<Maze>, start: Position, goal: Position, solver: Solver) -> Self {
        let cell_count = maze.cell_count();
        let mut stepper = Stepper {
            solver,
            start,
            goal,
            frontier: Frontier::for_solver(solver),
            costs: vec![u32::MAX; cell_count].into_boxed_slice(),
            parents: vec![None; cell_count].into_boxed_slice(),
            states: vec![NodeState::Unseen; cell_count].into_boxed_slice(),
            current: None,
            expansions: 0,
            outcome: None,
            delta: StepDelta::default(),
            maze,
        };

        let idx = stepper.maze.ravel_index(start);
        stepper.costs[idx] = 0;
        stepper.states[idx] = NodeState::Open;
        stepper.frontier.push(start, stepper.heuristic(start));
        stepper.delta.opened.push(start);
        stepper
    }

    fn heuristic(&self, pos: Position) -> u32 {
        match self.solver {
            Solver::AStar => manhattan(pos, self.goal),
            Solver::Bfs | Solver::Dfs => 0,
        }
    }

    /// Performs one expansion.
    ///
    /// Stale frontier entries (cells closed since they were pushed) are skipped
    /// within the same call, so a `Continue` always means exactly one newly closed
    /// cell. Once a terminal result is returned, later calls return it again and
    /// do nothing.
    pub fn step(&mut self) -> StepResult {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        self.delta.clear();

        let maze = Rc::clone(&self.maze);
        loop {
            let Some(current) = self.frontier.pop() else {
                tracing::debug!(solver = %self.solver, expansions = self.expansions, "Frontier exhausted");
                self.outcome = Some(StepResult::Exhausted);
                return StepResult::Exhausted;
            };

            let idx = maze.ravel_index(current);
            if self.states[idx] == NodeState::Closed {
                continue;
            }

            self.current = Some(current);
            self.delta.current = Some(current);
            self.states[idx] = NodeState::Closed;
            if maze.is_branch(current) {
                self.delta.branches.push(current);
            } else {
                self.delta.closed.push(current);
            }

            if current == self.goal {
                tracing::debug!(solver = %self.solver, expansions = self.expansions, "Goal reached");
                self.outcome = Some(StepResult::Found);
                return StepResult::Found;
            }

            self.expansions += 1;
            let next_cost = self.costs[idx] + 1;
            for next in maze.open_neighbors(current) {
                let next_idx = maze.ravel_index(next);
                if self.states[next_idx] == NodeState::Closed || next_cost >= self.costs[next_idx]
                {
                    continue;
                }
                self.costs[next_idx] = next_cost;
                self.parents[next_idx] = Some(current);
                self.frontier.push(next, next_cost + self.heuristic(next));
                if self.states[next_idx] != NodeState::Open {
                    self.states[next_idx] = NodeState::Open;
                    self.delta.opened.push(next);
                }
            }
            return StepResult::Continue;
        }
    }

    /// The path from start to goal, both included.
    ///
    /// Fails with [`MazeError::NoPath`] unless the search has returned
    /// [`StepResult::Found`].
    pub fn reconstruct_path(&self) -> Result<Vec<Position>> {
        if self.outcome != Some(StepResult::Found) {
            return Err(MazeError::NoPath);
        }
        let mut path = vec![self.goal];
        let mut cursor = self.goal;
        while let Some(parent) = self.parents[self.maze.ravel_index(cursor)] {
            path.push(parent);
            cursor = parent;
        }
        path.reverse();
        Ok(path)
    }

    /// Full search state, built from the per-cell states.
    pub fn snapshot(&self) -> Snapshot {
        let size = self.maze.size();
        let mut open = HashSet::new();
        let mut closed = HashSet::new();
        for pos in (0..size).flat_map(|row| (0..size).map(move |col| (row, col))) {
            match self.states[self.maze.ravel_index(pos)] {
                NodeState::Open => {
                    open.insert(pos);
                }
                NodeState::Closed => {
                    closed.insert(pos);
                }
                NodeState::Unseen => {}
            }
        }
        Snapshot {
            current: self.current,
            open,
            closed,
        }
    }

    /// Changes made by the latest step. Before the first step, holds the start
    /// cell as opened.
    pub fn last_delta(&self) -> &StepDelta {
        &self.delta
    }

    pub fn solver(&self) -> Solver {
        self.solver
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn current(&self) -> Option<Position> {
        self.current
    }

    /// Number of cells expanded so far. The goal is closed but not expanded, so it
    /// is not counted.
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    /// Terminal result, if the search is over.
    pub fn outcome(&self) -> Option<StepResult> {
        self.outcome
    }

    /// Number of entries in the frontier, stale ones included.
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn node_state(&self, pos: Position) -> NodeState {
        self.states[self.maze.ravel_index(pos)]
    }

    /// Best known cost from the start, `None` if the cell has not been reached.
    pub fn cost(&self, pos: Position) -> Option<u32> {
        let cost = self.costs[self.maze.ravel_index(pos)];
        (cost != u32::MAX).then_some(cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::Direction;

    /// 2x2 maze shaped like a "U": (0,0)-(1,0)-(1,1)-(0,1).
    fn u_shape() -> Rc<Maze> {
        Rc::new(
            Maze::from_passages(2, &[((0, 0), (1, 0)), ((1, 0), (1, 1)), ((1, 1), (0, 1))])
                .unwrap(),
        )
    }

    fn run(stepper: &mut Stepper) -> StepResult {
        loop {
            match stepper.step() {
                StepResult::Continue => {}
                result => return result,
            }
        }
    }

    #[test]
    fn test_initial_state() {
        let stepper = Stepper::for_maze(u_shape(), Solver::Bfs);
        let snapshot = stepper.snapshot();
        assert_eq!(snapshot.current, None);
        assert_eq!(snapshot.open, HashSet::from([(0, 0)]));
        assert!(snapshot.closed.is_empty());
        assert_eq!(stepper.frontier_len(), 1);
        assert_eq!(stepper.cost((0, 0)), Some(0));
        assert_eq!(stepper.cost((1, 1)), None);
        assert_eq!(stepper.last_delta().opened, vec![(0, 0)]);
        assert!(matches!(stepper.reconstruct_path(), Err(MazeError::NoPath)));
    }

    #[test]
    fn test_single_step_delta() {
        let mut stepper = Stepper::for_maze(u_shape(), Solver::Bfs);
        assert_eq!(stepper.step(), StepResult::Continue);
        let delta = stepper.last_delta();
        assert_eq!(delta.current, Some((0, 0)));
        assert_eq!(delta.opened, vec![(1, 0)]);
        assert_eq!(delta.closed, vec![(0, 0)]);
        assert!(delta.branches.is_empty());
        assert_eq!(stepper.node_state((0, 0)), NodeState::Closed);
        assert_eq!(stepper.node_state((1, 0)), NodeState::Open);
        assert_eq!(stepper.node_state((0, 1)), NodeState::Unseen);
        assert_eq!(stepper.expansions(), 1);
    }

    #[test]
    fn test_solves_u_shape() {
        for solver in Solver::ALL {
            let mut stepper = Stepper::for_maze(u_shape(), solver);
            assert_eq!(run(&mut stepper), StepResult::Found);
            assert_eq!(
                stepper.reconstruct_path().unwrap(),
                vec![(0, 0), (1, 0), (1, 1)]
            );
            assert_eq!(stepper.expansions(), 2);
            assert_eq!(stepper.outcome(), Some(StepResult::Found));
            assert_eq!(stepper.current(), Some((1, 1)));
            // (0, 1) sits behind the goal and is never reached
            assert_eq!(stepper.node_state((0, 1)), NodeState::Unseen);
            assert!(stepper.snapshot().closed.contains(&(1, 1)));
        }
    }

    #[test]
    fn test_terminal_step_is_sticky() {
        let mut stepper = Stepper::for_maze(u_shape(), Solver::AStar);
        run(&mut stepper);
        let snapshot = stepper.snapshot();
        let expansions = stepper.expansions();
        assert_eq!(stepper.step(), StepResult::Found);
        assert_eq!(stepper.step(), StepResult::Found);
        assert_eq!(stepper.snapshot(), snapshot);
        assert_eq!(stepper.expansions(), expansions);
    }

    #[test]
    fn test_reconstruct_path_is_idempotent() {
        let mut stepper = Stepper::for_maze(u_shape(), Solver::Dfs);
        run(&mut stepper);
        assert_eq!(
            stepper.reconstruct_path().unwrap(),
            stepper.reconstruct_path().unwrap()
        );
    }

    #[test]
    fn test_exhausted_when_goal_unreachable() {
        // Every wall standing: nothing beyond the start is reachable
        let maze = Rc::new(Maze::new(2));
        for solver in Solver::ALL {
            let mut stepper = Stepper::for_maze(Rc::clone(&maze), solver);
            assert_eq!(stepper.step(), StepResult::Continue);
            assert_eq!(stepper.step(), StepResult::Exhausted);
            assert_eq!(stepper.step(), StepResult::Exhausted);
            assert_eq!(stepper.expansions(), 1);
            assert!(matches!(stepper.reconstruct_path(), Err(MazeError::NoPath)));
        }
    }

    #[test]
    fn test_start_equals_goal() {
        let mut stepper = Stepper::new(u_shape(), (1, 0), (1, 0), Solver::AStar).unwrap();
        assert_eq!(stepper.step(), StepResult::Found);
        assert_eq!(stepper.reconstruct_path().unwrap(), vec![(1, 0)]);
        assert_eq!(stepper.expansions(), 0);
    }

    #[test]
    fn test_out_of_bounds_endpoints_rejected() {
        assert!(matches!(
            Stepper::new(u_shape(), (0, 0), (2, 1), Solver::Bfs),
            Err(MazeError::OutOfBounds {
                pos: (2, 1),
                size: 2
            })
        ));
        assert!(matches!(
            Stepper::new(u_shape(), (0, 5), (1, 1), Solver::AStar),
            Err(MazeError::OutOfBounds { pos: (0, 5), .. })
        ));
    }

    #[test]
    fn test_branch_cells_reported_separately() {
        // Comb: a spine along row 0 with teeth hanging down each column
        let mut passages = Vec::new();
        for col in 0..3u8 {
            passages.push(((0, col), (0, col + 1)));
        }
        for col in 0..4u8 {
            for row in 0..3u8 {
                passages.push(((row, col), (row + 1, col)));
            }
        }
        let comb = Rc::new(Maze::from_passages(4, &passages).unwrap());
        let mut stepper = Stepper::for_maze(comb, Solver::Bfs);
        stepper.step(); // (0, 0)
        stepper.step(); // (0, 1), first tooth junction
        let delta = stepper.last_delta();
        assert_eq!(delta.current, Some((0, 1)));
        assert_eq!(delta.branches, vec![(0, 1)]);
        assert!(delta.closed.is_empty());
        assert_eq!(delta.opened, vec![(0, 2), (1, 1)]);
    }

    #[test]
    fn test_each_continue_closes_one_cell_on_cyclic_grid() {
        // A fully open grid has cycles, so cheaper routes and stale entries show up
        let mut maze = Maze::new(6);
        for row in 0..6u8 {
            for col in 0..6u8 {
                maze.carve((row, col), Direction::East);
                maze.carve((row, col), Direction::South);
            }
        }
        let maze = Rc::new(maze);
        for solver in Solver::ALL {
            let mut stepper = Stepper::for_maze(Rc::clone(&maze), solver);
            let mut closed = 0;
            loop {
                let result = stepper.step();
                let now_closed = stepper.snapshot().closed.len();
                assert_eq!(now_closed, closed + 1, "{solver} closed more than one cell");
                closed = now_closed;
                if result.is_terminal() {
                    assert_eq!(result, StepResult::Found);
                    break;
                }
            }
            let path = stepper.reconstruct_path().unwrap();
            assert_eq!(path.first(), Some(&(0, 0)));
            assert_eq!(path.last(), Some(&(5, 5)));
            assert!(path.windows(2).all(|w| maze.is_open_between(w[0], w[1])));
            if solver != Solver::Dfs {
                assert_eq!(path.len() - 1, 10);
            }
        }
    }
}
