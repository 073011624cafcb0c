//! Fluent builder for constructing a [`Sim`].

use agv_core::Coord;
use agv_fleet::TaskBoard;
use agv_grid::{Algorithm, GridMap, PathFinder};

use crate::{Sim, SimConfig, SimError, SimResult};

/// Fluent builder for [`Sim<F>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: counts, policy, battery rates, seed, …
/// - [`GridMap`]: the floor; needs at least two workstations when tasks
///   are generated, and chargers for AGVs to recharge
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                                         |
/// |-------------------|-------------------------------------------------|
/// | `.finder(f)`      | `config.algorithm`                              |
/// | `.positions(v)`   | `GridMap::agent_spawn_points()`                 |
/// | `.tasks(board)`   | `config.task_count` random workstation tasks    |
///
/// # Example
///
/// ```rust,ignore
/// let grid = agv_grid::presets::standard_simulation_floor();
/// let mut sim = SimBuilder::new(SimConfig::default(), grid).build()?;
/// let summary = sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<F: PathFinder = Algorithm> {
    config:    SimConfig,
    grid:      GridMap,
    finder:    F,
    positions: Option<Vec<Coord>>,
    tasks:     Option<TaskBoard>,
}

impl SimBuilder<Algorithm> {
    /// Create a builder searching with `config.algorithm`.
    pub fn new(config: SimConfig, grid: GridMap) -> Self {
        let finder = config.algorithm;
        Self { config, grid, finder, positions: None, tasks: None }
    }
}

impl<F: PathFinder> SimBuilder<F> {
    /// Route with a custom [`PathFinder`] instead of the built-in search.
    pub fn finder<G: PathFinder>(self, finder: G) -> SimBuilder<G> {
        SimBuilder {
            config:    self.config,
            grid:      self.grid,
            finder,
            positions: self.positions,
            tasks:     self.tasks,
        }
    }

    /// Spawn cells, used round-robin in agent order.  Each must be an
    /// in-bounds passable cell.
    pub fn positions(mut self, positions: Vec<Coord>) -> Self {
        self.positions = Some(positions);
        self
    }

    /// Use this board instead of generating tasks.  `reset` restores it;
    /// `apply_scenario` replaces it with generated tasks.
    pub fn tasks(mut self, tasks: TaskBoard) -> Self {
        self.tasks = Some(tasks);
        self
    }

    /// Validate inputs and return a Ready [`Sim`].
    pub fn build(self) -> SimResult<Sim<F>> {
        self.config.validate()?;

        let positions = match self.positions {
            Some(p) => {
                for &c in &p {
                    self.grid.check_bounds(c)?;
                    if self.grid.is_blocked(c) {
                        return Err(SimError::Config(format!("spawn position {c} is an obstacle")));
                    }
                }
                p
            }
            None => self.grid.agent_spawn_points(),
        };

        if let Some(board) = &self.tasks {
            for task in board.iter() {
                self.grid.check_bounds(task.start)?;
                self.grid.check_bounds(task.end)?;
            }
        }

        Sim::assemble(self.config, self.grid, self.finder, positions, self.tasks)
    }
}
