use rand::{SeedableRng, rngs::StdRng};

mod recur_backtrack;

use recur_backtrack::recursive_backtrack;

use crate::{
    error::Result,
    maze::{Maze, validate_size},
};

/// Get a random number generator, optionally seeded for reproducibility.
pub fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Generates a perfect `size × size` maze with the recursive backtracker.
///
/// `size` must be even and within `[MIN_SIZE, MAX_SIZE]`, otherwise
/// [`crate::MazeError::InvalidSize`] is returned and nothing is generated.
/// The same seed always yields the same maze.
pub fn generate_maze(size: usize, seed: Option<u64>) -> Result<Maze> {
    let size = validate_size(size)?;
    let mut rng = get_rng(seed);

    let mut maze = Maze::new(size);
    recursive_backtrack(&mut maze, &mut rng);
    maze.compute_branch_cells();

    tracing::info!(
        size,
        seed = ?seed,
        branch_cells = maze.branch_cells().len(),
        "Generated maze"
    );
    Ok(maze)
}
