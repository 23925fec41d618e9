use std::{
    cmp::Reverse,
    collections::{BinaryHeap, VecDeque},
};

use super::Solver;
use crate::maze::Position;

/// Positions waiting to be expanded. The variant decides the pop order, which is
/// the only thing that tells the three solvers apart.
#[derive(Debug)]
pub(crate) enum Frontier {
    /// First in, first out.
    Fifo(VecDeque<Position>),
    /// Last in, first out.
    Lifo(Vec<Position>),
    /// Lowest `f` first; among equal `f`, the earliest insertion first.
    Priority {
        heap: BinaryHeap<Reverse<(u32, u64, Position)>>,
        inserted: u64,
    },
}

impl Frontier {
    pub(crate) fn for_solver(solver: Solver) -> Self {
        match solver {
            Solver::Bfs => Frontier::Fifo(VecDeque::new()),
            Solver::Dfs => Frontier::Lifo(Vec::new()),
            Solver::AStar => Frontier::Priority {
                heap: BinaryHeap::new(),
                inserted: 0,
            },
        }
    }

    /// Adds a position. `f` is only used by the priority variant.
    pub(crate) fn push(&mut self, pos: Position, f: u32) {
        match self {
            Frontier::Fifo(queue) => queue.push_back(pos),
            Frontier::Lifo(stack) => stack.push(pos),
            Frontier::Priority { heap, inserted } => {
                // Reverse turns the max-heap into a min-heap on (f, insertion order)
                heap.push(Reverse((f, *inserted, pos)));
                *inserted += 1;
            }
        }
    }

    pub(crate) fn pop(&mut self) -> Option<Position> {
        match self {
            Frontier::Fifo(queue) => queue.pop_front(),
            Frontier::Lifo(stack) => stack.pop(),
            Frontier::Priority { heap, .. } => heap.pop().map(|Reverse((_, _, pos))| pos),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Frontier::Fifo(queue) => queue.len(),
            Frontier::Lifo(stack) => stack.len(),
            Frontier::Priority { heap, .. } => heap.len(),
        }
    }
}
