use rand::{Rng, rngs::StdRng};

use crate::maze::{Maze, Position};

/// Carves a perfect maze into a fully walled `maze` with a randomized depth-first
/// walk. An explicit stack replaces recursion so large mazes cannot overflow.
pub fn recursive_backtrack(maze: &mut Maze, rng: &mut StdRng) {
    let size = maze.size();
    if size == 0 {
        return;
    }

    let mut visited = vec![false; maze.cell_count()];

    // Initialize the starting point
    let start: Position = (rng.random_range(0..size), rng.random_range(0..size));
    visited[maze.ravel_index(start)] = true;

    // The stack keeps the current carving branch
    let mut stack = vec![start];

    while let Some(&cell) = stack.last() {
        let unvisited = maze
            .neighbors(cell)
            .filter(|&(_, n)| !visited[maze.ravel_index(n)])
            .collect::<Vec<_>>();

        if unvisited.is_empty() {
            // Dead end, backtrack
            stack.pop();
            continue;
        }

        let (direction, neighbor) = unvisited[rng.random_range(0..unvisited.len())];
        maze.carve(cell, direction);
        visited[maze.ravel_index(neighbor)] = true;
        stack.push(neighbor);
    }
}
