use std::{fmt, io::Write};

use crossterm::{
    QueueableCommand, cursor, queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};

use crate::{
    app::controller::Controller,
    maze::{Direction, Maze, Position},
    solvers::{Snapshot, Solver, StepDelta},
};

/// What a single grid square is painted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Wall,
    Empty,
    Start,
    Goal,
    /// In the frontier.
    Open,
    /// Expanded.
    Closed,
    /// Expanded branch cell.
    Branch,
    /// Cell being expanded.
    Current,
    /// On the final path.
    Path,
}

impl Paint {
    /// The width of each square when rendered, in character widths.
    pub const CELL_WIDTH: u16 = 2;
}

impl fmt::Display for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styled_symbol = match self {
            Paint::Wall => "██".with(Color::White),
            Paint::Empty => "  ".with(Color::Reset),
            Paint::Start => "██".with(Color::Green),
            Paint::Goal => "██".with(Color::DarkRed),
            Paint::Open => "██".with(Color::Rgb {
                r: 0xA7,
                g: 0xC7,
                b: 0xFF,
            }),
            Paint::Closed => "██".with(Color::Rgb {
                r: 0xC2,
                g: 0xC2,
                b: 0xC2,
            }),
            Paint::Branch => "██".with(Color::Rgb {
                r: 0xB3,
                g: 0x9D,
                b: 0xDB,
            }),
            Paint::Current => "██".with(Color::Rgb {
                r: 0xFF,
                g: 0x8C,
                b: 0x00,
            }),
            Paint::Path => "██".with(Color::Rgb {
                r: 0xFF,
                g: 0x45,
                b: 0x00,
            }),
        };

        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            assert_eq!(
                styled_symbol.content().width(),
                Paint::CELL_WIDTH as usize,
                "Each square must occupy exactly two character widths."
            );
        }

        write!(f, "{}", styled_symbol)
    }
}

/// Paints a maze and the search overlays on a terminal.
///
/// The maze is drawn on a `(2n + 1) × (2n + 1)` grid of squares: odd grid
/// coordinates hold cells, the squares between them hold walls or passages.
pub struct Renderer<W: Write> {
    out: W,
    /// Side length of the maze currently on screen
    maze_size: u8,
    /// Cell painted as current and the paint to restore it to
    current: Option<(Position, Paint)>,
}

impl<W: Write> Renderer<W> {
    /// Number of terminal rows reserved below the maze for the status lines.
    pub const NUM_STATUS_ROWS: u16 = 3;

    pub fn new(out: W) -> Self {
        Self {
            out,
            maze_size: 0,
            current: None,
        }
    }

    /// Terminal columns and rows needed to show a maze of `size`, status lines included.
    pub fn required_dims(size: u8) -> (u16, u16) {
        let grid = size as u16 * 2 + 1;
        (grid * Paint::CELL_WIDTH, grid + Self::NUM_STATUS_ROWS)
    }

    /// Whether the terminal is big enough for a maze of `size`.
    pub fn fits(size: u8) -> std::io::Result<bool> {
        let (term_width, term_height) = terminal::size()?;
        let (width, height) = Self::required_dims(size);
        Ok(term_width >= width && term_height >= height)
    }

    fn grid_coord(pos: Position) -> (u16, u16) {
        (pos.1 as u16 * 2 + 1, pos.0 as u16 * 2 + 1)
    }

    fn paint_square(&mut self, grid: (u16, u16), paint: Paint) -> std::io::Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(grid.0 * Paint::CELL_WIDTH, grid.1),
            style::Print(paint)
        )
    }

    fn paint_cell(&mut self, pos: Position, paint: Paint) -> std::io::Result<()> {
        self.paint_square(Self::grid_coord(pos), paint)
    }

    /// Paints the square between two adjacent cells.
    fn paint_passage(&mut self, a: Position, b: Position, paint: Paint) -> std::io::Result<()> {
        let (ax, ay) = Self::grid_coord(a);
        let (bx, by) = Self::grid_coord(b);
        self.paint_square(((ax + bx) / 2, (ay + by) / 2), paint)
    }

    /// Paint a cell settles on once it stops being the current cell.
    fn settled_paint(maze: &Maze, pos: Position) -> Paint {
        if pos == maze.start() {
            Paint::Start
        } else if pos == maze.goal() {
            Paint::Goal
        } else if maze.is_branch(pos) {
            Paint::Branch
        } else {
            Paint::Closed
        }
    }

    /// Clears the screen and draws the bare maze with its start and goal.
    pub fn draw_maze(&mut self, maze: &Maze) -> std::io::Result<()> {
        self.maze_size = maze.size();
        self.current = None;
        queue!(self.out, terminal::Clear(ClearType::All), cursor::Hide)?;

        let grid = maze.size() as u16 * 2 + 1;
        for y in 0..grid {
            self.out.queue(cursor::MoveTo(0, y))?;
            for x in 0..grid {
                let paint = match (x % 2, y % 2) {
                    // Cell
                    (1, 1) => Paint::Empty,
                    // Corner between four cells
                    (0, 0) => Paint::Wall,
                    _ => {
                        let (row, col) = ((y.saturating_sub(1) / 2) as u8, (x.saturating_sub(1) / 2) as u8);
                        // Boundary squares are always walls
                        if x == 0 || y == 0 || x == grid - 1 || y == grid - 1 {
                            Paint::Wall
                        } else if x % 2 == 0 {
                            // Between (row, col) and its east neighbor
                            if maze[(row, col)].has_wall(Direction::East) {
                                Paint::Wall
                            } else {
                                Paint::Empty
                            }
                        } else if maze[(row, col)].has_wall(Direction::South) {
                            Paint::Wall
                        } else {
                            Paint::Empty
                        }
                    }
                };
                self.out.queue(style::Print(paint))?;
            }
        }
        self.paint_cell(maze.start(), Paint::Start)?;
        self.paint_cell(maze.goal(), Paint::Goal)?;
        self.out.flush()
    }

    /// Paints the changes of one search step.
    pub fn apply_delta(&mut self, maze: &Maze, delta: &StepDelta) -> std::io::Result<()> {
        if let Some((pos, paint)) = self.current.take() {
            self.paint_cell(pos, paint)?;
        }
        for &pos in &delta.opened {
            self.paint_cell(pos, Paint::Open)?;
        }
        for &pos in &delta.closed {
            self.paint_cell(pos, Paint::Closed)?;
        }
        for &pos in &delta.branches {
            self.paint_cell(pos, Paint::Branch)?;
        }
        if let Some(pos) = delta.current {
            self.paint_cell(pos, Paint::Current)?;
            self.current = Some((pos, Self::settled_paint(maze, pos)));
        }
        self.out.flush()
    }

    /// Redraws the maze with the whole search state on top, e.g. after a resize.
    pub fn draw_snapshot(&mut self, maze: &Maze, snapshot: &Snapshot) -> std::io::Result<()> {
        self.draw_maze(maze)?;
        for &pos in &snapshot.open {
            self.paint_cell(pos, Paint::Open)?;
        }
        for &pos in &snapshot.closed {
            let paint = if maze.is_branch(pos) {
                Paint::Branch
            } else {
                Paint::Closed
            };
            self.paint_cell(pos, paint)?;
        }
        if let Some(pos) = snapshot.current {
            self.paint_cell(pos, Paint::Current)?;
            self.current = Some((pos, Self::settled_paint(maze, pos)));
        }
        self.out.flush()
    }

    /// Paints the final path over the cells and the passages between them.
    pub fn draw_path(&mut self, path: &[Position]) -> std::io::Result<()> {
        self.current = None;
        for &pos in path {
            self.paint_cell(pos, Paint::Path)?;
        }
        for pair in path.windows(2) {
            self.paint_passage(pair[0], pair[1], Paint::Path)?;
        }
        self.out.flush()
    }

    /// Prints the status lines below the maze.
    pub fn draw_status(&mut self, controller: &Controller, solver: Solver) -> std::io::Result<()> {
        let top = self.maze_size as u16 * 2 + 1;
        let state = format!(
            "Status: {} | Solver: {} | Size: {}x{} | Speed: {}",
            controller.state(),
            solver,
            controller.maze().size(),
            controller.maze().size(),
            controller.speed()
        );
        queue!(
            self.out,
            cursor::MoveTo(0, top),
            terminal::Clear(ClearType::FromCursorDown),
            style::PrintStyledContent(state.with(Color::Yellow).attribute(Attribute::Bold)),
            cursor::MoveTo(0, top + 1),
            style::PrintStyledContent(controller.metrics().to_string().with(Color::Cyan)),
            cursor::MoveTo(0, top + 2),
            style::PrintStyledContent(
                "b/d/a: solve BFS/DFS/A* | Enter: pause | →: step | ↑/↓: speed | +/-: size | n: new | s: stop | Esc: exit"
                    .with(Color::DarkGrey)
            ),
        )?;
        self.out.flush()
    }

    /// Replaces the maze with a message asking for a bigger terminal.
    pub fn draw_too_small(&mut self, size: u8) -> std::io::Result<()> {
        let (width, height) = Self::required_dims(size);
        let msg = format!(
            "Terminal size is too small for a {size}x{size} maze ({width}x{height} needed). \
Resize the terminal or shrink the maze with '-'.\r\n"
        );
        queue!(
            self.out,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0),
            style::PrintStyledContent(msg.with(Color::Yellow).attribute(Attribute::Bold)),
            style::PrintStyledContent("Press Esc to exit...\r\n".with(Color::Blue).attribute(Attribute::Bold))
        )?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
