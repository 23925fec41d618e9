/// One of the four cardinal directions a passage can lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Order in which solvers look at neighbors. Fixed so every run is reproducible.
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    /// Row and column offset of one step in this direction.
    pub fn offset(self) -> (i16, i16) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Direction::North => 0b0001,
            Direction::East => 0b0010,
            Direction::South => 0b0100,
            Direction::West => 0b1000,
        }
    }
}

/// Wall flags of a single maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    walls: u8,
}

impl Cell {
    /// A cell closed on all four sides.
    pub const CLOSED: Cell = Cell { walls: 0b1111 };

    /// Whether a wall stands on the given side of the cell.
    pub fn has_wall(&self, direction: Direction) -> bool {
        self.walls & direction.bit() != 0
    }

    pub fn north(&self) -> bool {
        self.has_wall(Direction::North)
    }

    pub fn east(&self) -> bool {
        self.has_wall(Direction::East)
    }

    pub fn south(&self) -> bool {
        self.has_wall(Direction::South)
    }

    pub fn west(&self) -> bool {
        self.has_wall(Direction::West)
    }

    /// Number of sides without a wall. Boundary sides always keep their wall,
    /// so this equals the number of reachable neighbors.
    pub fn open_sides(&self) -> usize {
        4 - self.walls.count_ones() as usize
    }

    /// Returns `true` if a wall was removed, `false` if the side was already open.
    pub(crate) fn remove_wall(&mut self, direction: Direction) -> bool {
        let had_wall = self.has_wall(direction);
        self.walls &= !direction.bit();
        had_wall
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::CLOSED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_wall() {
        let mut cell = Cell::CLOSED;
        assert_eq!(cell.open_sides(), 0);
        assert!(cell.remove_wall(Direction::East));
        // Removing the same wall again is a no-op
        assert!(!cell.remove_wall(Direction::East));
        assert!(!cell.east());
        assert!(cell.north() && cell.south() && cell.west());
        assert_eq!(cell.open_sides(), 1);
    }

    #[test]
    fn test_opposite_offsets_cancel() {
        for direction in Direction::ALL {
            let (dr, dc) = direction.offset();
            let (or, oc) = direction.opposite().offset();
            assert_eq!((dr + or, dc + oc), (0, 0));
        }
    }
}
