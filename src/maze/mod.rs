pub mod cell;

use std::collections::{HashSet, VecDeque};

pub use cell::{Cell, Direction};

use crate::error::{MazeError, Result};

/// A cell coordinate as `(row, col)`.
pub type Position = (u8, u8);

/// Smallest supported maze side length.
pub const MIN_SIZE: usize = 2;
/// Largest supported maze side length.
pub const MAX_SIZE: usize = 200;

/// Checks that `size` is even and within `[MIN_SIZE, MAX_SIZE]`.
pub fn validate_size(size: usize) -> Result<u8> {
    if !(MIN_SIZE..=MAX_SIZE).contains(&size) || size % 2 != 0 {
        return Err(MazeError::InvalidSize { size });
    }
    // Fits since MAX_SIZE < u8::MAX
    Ok(size as u8)
}

/// Square maze of `size × size` cells with the start in the top left corner and
/// the goal in the bottom right corner.
///
/// A maze handed out by [`crate::generators::generate_maze`] or
/// [`Maze::from_passages`] is always perfect: exactly one simple path joins any
/// two cells. It is never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Maze {
    cells: Box<[Cell]>,
    size: u8,
    branch_cells: HashSet<Position>,
}

impl Maze {
    /// Creates a maze with every wall standing. Not a perfect maze until carved.
    pub(crate) fn new(size: u8) -> Self {
        let cells = vec![Cell::CLOSED; size as usize * size as usize].into_boxed_slice();
        Maze {
            cells,
            size,
            branch_cells: HashSet::new(),
        }
    }

    /// Builds a maze from an explicit list of carved passages between adjacent cells.
    ///
    /// Fails with [`MazeError::InvalidSize`] on a bad size and with
    /// [`MazeError::NotPerfect`] when a passage is out of bounds, joins
    /// non-adjacent cells, is listed twice, or when the passages do not form a
    /// spanning tree of the grid.
    pub fn from_passages(size: usize, passages: &[(Position, Position)]) -> Result<Self> {
        let size = validate_size(size)?;
        let mut maze = Maze::new(size);
        for &(a, b) in passages {
            if !maze.is_in_bounds(a) || !maze.is_in_bounds(b) {
                return Err(MazeError::NotPerfect {
                    reason: format!("passage {a:?} -> {b:?} is out of bounds"),
                });
            }
            let Some(direction) = direction_between(a, b) else {
                return Err(MazeError::NotPerfect {
                    reason: format!("cells {a:?} and {b:?} are not adjacent"),
                });
            };
            if !maze.carve(a, direction) {
                return Err(MazeError::NotPerfect {
                    reason: format!("passage {a:?} -> {b:?} is carved twice"),
                });
            }
        }
        if !maze.is_perfect() {
            return Err(MazeError::NotPerfect {
                reason: format!(
                    "expected {} connected passages, found {}",
                    maze.cell_count() - 1,
                    maze.open_edge_count()
                ),
            });
        }
        maze.compute_branch_cells();
        Ok(maze)
    }

    /// Side length of the maze in cells.
    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn start(&self) -> Position {
        (0, 0)
    }

    pub fn goal(&self) -> Position {
        (self.size - 1, self.size - 1)
    }

    /// Wall flags of the cell at `(row, col)`, or `None` when out of bounds.
    pub fn cell_at(&self, row: u8, col: u8) -> Option<Cell> {
        self.is_in_bounds((row, col))
            .then(|| self.cells[self.ravel_index((row, col))])
    }

    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.0 < self.size && pos.1 < self.size
    }

    /// Flat index of a position, row-major. Used for index-based node storage.
    pub fn ravel_index(&self, pos: Position) -> usize {
        pos.0 as usize * self.size as usize + pos.1 as usize
    }

    /// The in-bounds cell one step away in `direction`, walls ignored.
    pub fn step(&self, pos: Position, direction: Direction) -> Option<Position> {
        let (dr, dc) = direction.offset();
        let row = pos.0 as i16 + dr;
        let col = pos.1 as i16 + dc;
        let size = self.size as i16;
        ((0..size).contains(&row) && (0..size).contains(&col)).then_some((row as u8, col as u8))
    }

    /// All in-bounds neighbors of a cell, walls ignored.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = (Direction, Position)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |d| self.step(pos, d).map(|n| (d, n)))
    }

    /// Neighbors reachable from `pos` without crossing a wall, in [`Direction::ALL`] order.
    pub fn open_neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        let cell = self[pos];
        self.neighbors(pos)
            .filter(move |&(d, _)| !cell.has_wall(d))
            .map(|(_, n)| n)
    }

    /// Whether `a` and `b` are adjacent with no wall between them.
    pub fn is_open_between(&self, a: Position, b: Position) -> bool {
        if !self.is_in_bounds(a) || !self.is_in_bounds(b) {
            return false;
        }
        direction_between(a, b).is_some_and(|d| !self[a].has_wall(d))
    }

    /// Removes the wall on the `direction` side of `from` and the matching wall of
    /// the neighbor. Returns `false` if there is no neighbor or the wall was already gone.
    pub(crate) fn carve(&mut self, from: Position, direction: Direction) -> bool {
        let Some(to) = self.step(from, direction) else {
            return false;
        };
        let (from_idx, to_idx) = (self.ravel_index(from), self.ravel_index(to));
        let removed = self.cells[from_idx].remove_wall(direction);
        self.cells[to_idx].remove_wall(direction.opposite());
        removed
    }

    /// Number of passages (open edges) in the maze.
    pub fn open_edge_count(&self) -> usize {
        // Each edge is counted once from its north or west end
        self.cells
            .iter()
            .map(|c| usize::from(!c.east()) + usize::from(!c.south()))
            .sum()
    }

    /// Checks the perfect-maze invariant: `size² - 1` passages, every cell reachable from the start.
    pub fn is_perfect(&self) -> bool {
        if self.open_edge_count() != self.cell_count() - 1 {
            return false;
        }
        let mut seen = vec![false; self.cell_count()];
        let mut queue = VecDeque::from([self.start()]);
        seen[self.ravel_index(self.start())] = true;
        let mut reached = 1;
        while let Some(pos) = queue.pop_front() {
            for next in self.open_neighbors(pos) {
                let idx = self.ravel_index(next);
                if !seen[idx] {
                    seen[idx] = true;
                    reached += 1;
                    queue.push_back(next);
                }
            }
        }
        reached == self.cell_count()
    }

    /// Cells with three or more open sides.
    pub fn branch_cells(&self) -> &HashSet<Position> {
        &self.branch_cells
    }

    pub fn is_branch(&self, pos: Position) -> bool {
        self.branch_cells.contains(&pos)
    }

    pub(crate) fn compute_branch_cells(&mut self) {
        let size = self.size;
        self.branch_cells = (0..size)
            .flat_map(|row| (0..size).map(move |col| (row, col)))
            .filter(|&pos| self[pos].open_sides() >= 3)
            .collect();
    }
}

impl std::ops::Index<Position> for Maze {
    type Output = Cell;

    fn index(&self, pos: Position) -> &Self::Output {
        &self.cells[self.ravel_index(pos)]
    }
}

/// Direction leading from `a` to an adjacent `b`, or `None` if they are not adjacent.
pub fn direction_between(a: Position, b: Position) -> Option<Direction> {
    let dr = b.0 as i16 - a.0 as i16;
    let dc = b.1 as i16 - a.1 as i16;
    Direction::ALL.into_iter().find(|d| d.offset() == (dr, dc))
}
