use std::{collections::VecDeque, rc::Rc, time::Instant};

use mazestep::{
    MazeError,
    app::{AnimationState, Controller, ControllerConfig, Outcome},
    generators::generate_maze,
    maze::{Maze, Position},
    solvers::{Solver, StepResult, Stepper},
};

/// Hop distance from the start to every cell, computed without the stepper.
fn distances_from_start(maze: &Maze) -> Vec<Option<usize>> {
    let mut distances = vec![None; maze.cell_count()];
    let mut queue = VecDeque::from([maze.start()]);
    distances[maze.ravel_index(maze.start())] = Some(0);
    while let Some(pos) = queue.pop_front() {
        let next_distance = distances[maze.ravel_index(pos)].map(|d| d + 1);
        for next in maze.open_neighbors(pos) {
            let idx = maze.ravel_index(next);
            if distances[idx].is_none() {
                distances[idx] = next_distance;
                queue.push_back(next);
            }
        }
    }
    distances
}

fn solve(maze: &Rc<Maze>, solver: Solver) -> Stepper {
    let mut stepper = Stepper::for_maze(Rc::clone(maze), solver);
    loop {
        match stepper.step() {
            StepResult::Continue => {}
            StepResult::Found => return stepper,
            StepResult::Exhausted => panic!("{solver} exhausted a perfect maze"),
        }
    }
}

fn assert_simple_path(maze: &Maze, path: &[Position]) {
    assert_eq!(path.first(), Some(&maze.start()));
    assert_eq!(path.last(), Some(&maze.goal()));
    for pair in path.windows(2) {
        assert!(
            maze.is_open_between(pair[0], pair[1]),
            "{:?} -> {:?} crosses a wall",
            pair[0],
            pair[1]
        );
    }
    let mut seen = std::collections::HashSet::new();
    assert!(path.iter().all(|p| seen.insert(*p)), "path repeats a cell");
}

/// 4x4 maze whose only route is the staircase (0,0) → (0,1) → (1,1) → … → (3,3),
/// with every other cell hanging off it as a dead end.
fn staircase() -> Rc<Maze> {
    let passages = [
        // Staircase
        ((0, 0), (0, 1)),
        ((0, 1), (1, 1)),
        ((1, 1), (1, 2)),
        ((1, 2), (2, 2)),
        ((2, 2), (2, 3)),
        ((2, 3), (3, 3)),
        // Dead ends
        ((0, 1), (0, 2)),
        ((0, 2), (0, 3)),
        ((0, 3), (1, 3)),
        ((0, 0), (1, 0)),
        ((1, 0), (2, 0)),
        ((2, 0), (2, 1)),
        ((2, 0), (3, 0)),
        ((3, 0), (3, 1)),
        ((3, 1), (3, 2)),
    ];
    Rc::new(Maze::from_passages(4, &passages).unwrap())
}

#[test]
fn generated_mazes_are_perfect() {
    for size in [2, 4, 8, 16, 50, 120] {
        for seed in 0..5 {
            let maze = generate_maze(size, Some(seed)).unwrap();
            assert_eq!(maze.open_edge_count(), size * size - 1);
            let distances = distances_from_start(&maze);
            assert!(
                distances.iter().all(Option::is_some),
                "size {size} seed {seed} has unreachable cells"
            );
        }
    }
}

#[test]
fn bfs_finds_shortest_path() {
    for seed in 0..15 {
        let maze = Rc::new(generate_maze(24, Some(seed)).unwrap());
        let expected = distances_from_start(&maze)[maze.ravel_index(maze.goal())].unwrap();
        let path = solve(&maze, Solver::Bfs).reconstruct_path().unwrap();
        assert_simple_path(&maze, &path);
        assert_eq!(path.len() - 1, expected);
    }
}

#[test]
fn astar_matches_bfs_with_fewer_expansions() {
    let mut bfs_total = 0;
    let mut astar_total = 0;
    for seed in 0..15 {
        let maze = Rc::new(generate_maze(30, Some(seed)).unwrap());
        let bfs = solve(&maze, Solver::Bfs);
        let astar = solve(&maze, Solver::AStar);
        let astar_path = astar.reconstruct_path().unwrap();
        assert_simple_path(&maze, &astar_path);
        assert_eq!(
            astar_path.len(),
            bfs.reconstruct_path().unwrap().len(),
            "seed {seed}"
        );
        assert!(astar.expansions() <= bfs.expansions(), "seed {seed}");
        bfs_total += bfs.expansions();
        astar_total += astar.expansions();
    }
    assert!(astar_total < bfs_total);
}

#[test]
fn dfs_finds_valid_path() {
    for seed in 0..15 {
        let maze = Rc::new(generate_maze(24, Some(seed)).unwrap());
        let dfs = solve(&maze, Solver::Dfs);
        let path = dfs.reconstruct_path().unwrap();
        assert_simple_path(&maze, &path);
        // A perfect maze has one simple path, so even DFS finds the shortest one
        let bfs_path = solve(&maze, Solver::Bfs).reconstruct_path().unwrap();
        assert_eq!(path, bfs_path);
    }
}

#[test]
fn reconstruction_is_idempotent() {
    let maze = Rc::new(generate_maze(40, Some(99)).unwrap());
    for solver in Solver::ALL {
        let stepper = solve(&maze, solver);
        assert_eq!(
            stepper.reconstruct_path().unwrap(),
            stepper.reconstruct_path().unwrap()
        );
    }
}

#[test]
fn reconstruction_before_found_fails() {
    let maze = Rc::new(generate_maze(10, Some(1)).unwrap());
    let mut stepper = Stepper::for_maze(maze, Solver::AStar);
    assert!(matches!(stepper.reconstruct_path(), Err(MazeError::NoPath)));
    stepper.step();
    assert!(matches!(stepper.reconstruct_path(), Err(MazeError::NoPath)));
}

#[test]
fn astar_is_deterministic() {
    let maze = Rc::new(generate_maze(40, Some(17)).unwrap());
    let order = |maze: &Rc<Maze>| {
        let mut stepper = Stepper::for_maze(Rc::clone(maze), Solver::AStar);
        let mut order = Vec::new();
        while !stepper.step().is_terminal() {
            order.extend(stepper.last_delta().current);
        }
        order
    };
    assert_eq!(order(&maze), order(&maze));
    // Same seed, same maze, same exploration
    let again = Rc::new(generate_maze(40, Some(17)).unwrap());
    assert_eq!(order(&maze), order(&again));
}

#[test]
fn pause_and_resume_do_not_change_the_run() {
    let config = ControllerConfig::default();
    for solver in Solver::ALL {
        let run = |pause_every: Option<usize>| {
            let mut controller = Controller::generate(36, Some(21), config).unwrap();
            controller.solve(solver).unwrap();
            let mut now = Instant::now();
            let mut order = Vec::new();
            let mut ticks = 0;
            while controller.state() == AnimationState::Running {
                if let Some(every) = pause_every {
                    if ticks % every == 0 && controller.pause() {
                        now += std::time::Duration::from_millis(250);
                        assert_eq!(controller.tick_at(now), None);
                        assert!(controller.resume());
                    }
                }
                if controller.tick_at(now).is_some() {
                    order.extend(controller.stepper().unwrap().last_delta().current);
                }
                now += controller.interval();
                ticks += 1;
            }
            assert_eq!(controller.state(), AnimationState::Finished(Outcome::Found));
            (
                order,
                controller.final_path().unwrap().to_vec(),
                controller.metrics().expansions,
            )
        };
        assert_eq!(run(None), run(Some(5)), "{solver}");
    }
}

#[test]
fn staircase_scenario() {
    let maze = staircase();
    for solver in Solver::ALL {
        let stepper = solve(&maze, solver);
        let path = stepper.reconstruct_path().unwrap();
        assert_eq!(path.len() - 1, 6, "{solver}");
        assert_eq!(
            path,
            vec![(0, 0), (0, 1), (1, 1), (1, 2), (2, 2), (2, 3), (3, 3)]
        );
        assert!(stepper.expansions() <= 16);
    }
    let bfs = solve(&maze, Solver::Bfs);
    let astar = solve(&maze, Solver::AStar);
    assert!(astar.expansions() <= bfs.expansions());
}

#[test]
fn smallest_and_invalid_sizes() {
    let maze = Rc::new(generate_maze(2, Some(0)).unwrap());
    assert_eq!(maze.open_edge_count(), 3);
    for solver in Solver::ALL {
        // Start and goal sit on opposite corners, one cell apart on either side
        let path = solve(&maze, solver).reconstruct_path().unwrap();
        assert_eq!(path.len(), 3);
        assert_simple_path(&maze, &path);
    }
    for size in [1, 3] {
        assert!(matches!(
            generate_maze(size, Some(0)),
            Err(MazeError::InvalidSize { size: s }) if s == size
        ));
    }
}

#[test]
fn largest_maze_solves() {
    let maze = Rc::new(generate_maze(200, Some(8)).unwrap());
    let expected = distances_from_start(&maze)[maze.ravel_index(maze.goal())].unwrap();
    for solver in [Solver::Bfs, Solver::AStar] {
        let path = solve(&maze, solver).reconstruct_path().unwrap();
        assert_eq!(path.len() - 1, expected);
    }
}
