//! Built-in floor layouts.
//!
//! | Function             | Size    | Notes                                          |
//! |----------------------|---------|------------------------------------------------|
//! | [`simulation_floor`] | any ≥12 | default simulation layout, walled with a cross of inner walls |
//! | [`open_floor`]       | 20×20   | editor default: a walled ring around a workstation cluster |
//! | [`warehouse`]        | 25×20   | shelving rows, three chargers                  |
//! | [`factory`]          | 30×25   | 3×3 production cells with corridors            |

use agv_core::Coord;

use crate::cell::CellType::{self, ChargingStation as C, Obstacle as X, Workstation as W};
use crate::grid::{check_size, GridMap};
use crate::GridResult;

/// Smallest floor [`simulation_floor`] can lay out.
pub const MIN_SIMULATION_SIZE: u32 = 12;

/// Look a preset up by name (`simulation`, `default`, `warehouse`, `factory`).
pub fn by_name(name: &str) -> Option<GridMap> {
    match name.trim().to_ascii_lowercase().as_str() {
        "simulation" => Some(standard_simulation_floor()),
        "default" | "open" => Some(open_floor()),
        "warehouse" => Some(warehouse()),
        "factory" => Some(factory()),
        _ => None,
    }
}

fn border(grid: &mut GridMap) {
    let (w, h) = (grid.width(), grid.height());
    for x in 0..w {
        grid.put(x, 0, X);
        grid.put(x, h - 1, X);
    }
    for y in 0..h {
        grid.put(0, y, X);
        grid.put(w - 1, y, X);
    }
}

fn paint(grid: &mut GridMap, cells: &[(u32, u32)], kind: CellType) {
    for &(x, y) in cells {
        grid.put(x, y, kind);
    }
}

/// The 20×20 simulation floor.
pub fn standard_simulation_floor() -> GridMap {
    build_simulation_floor(20, 20)
}

/// The simulation floor scaled to `width × height`.
///
/// Border walls; chargers one cell in from each corner; workstations at the
/// four inner corners and the centre; inner walls along rows 8 and `h-9` and
/// columns 8 and `w-9` with a one-cell opening at index 10.
pub fn simulation_floor(width: u32, height: u32) -> GridResult<GridMap> {
    check_size(width, height, MIN_SIMULATION_SIZE)?;
    Ok(build_simulation_floor(width, height))
}

fn build_simulation_floor(w: u32, h: u32) -> GridMap {
    let mut grid = GridMap::blank(w, h);
    border(&mut grid);
    paint(&mut grid, &[(2, 2), (w - 3, 2), (2, h - 3), (w - 3, h - 3)], C);
    paint(&mut grid, &[(5, 5), (w - 6, 5), (5, h - 6), (w - 6, h - 6), (w / 2, h / 2)], W);
    for i in (3..w - 3).filter(|&i| i != 10) {
        grid.put(i, 8, X);
        grid.put(i, h - 9, X);
    }
    for i in (3..h - 3).filter(|&i| i != 10) {
        grid.put(8, i, X);
        grid.put(w - 9, i, X);
    }
    grid
}

/// Candidate AGV parking spots on a simulation floor, in assignment order.
pub fn agent_start_positions(width: u32, height: u32) -> Vec<Coord> {
    let (w, h) = (width, height);
    let (wr, hr) = (w.saturating_sub(4), h.saturating_sub(4));
    [
        (3, 3),
        (wr, 3),
        (3, hr),
        (wr, hr),
        (3, h / 2),
        (wr, h / 2),
        (w / 2, 3),
        (w / 2, hr),
    ]
    .into_iter()
    .map(Coord::from)
    .collect()
}

/// 20×20 editor default: a wall ring with four gaps around five workstations.
pub fn open_floor() -> GridMap {
    let mut grid = GridMap::blank(20, 20);
    for i in 5..15 {
        grid.put(i, 5, X);
        grid.put(i, 15, X);
        grid.put(5, i, X);
        grid.put(15, i, X);
    }
    paint(&mut grid, &[(5, 10), (15, 10), (10, 5), (10, 15)], CellType::Empty);
    paint(&mut grid, &[(3, 3), (17, 3), (3, 17), (17, 17)], C);
    paint(&mut grid, &[(10, 10), (8, 8), (12, 8), (8, 12), (12, 12)], W);
    grid.start_end(Coord::new(2, 2), Coord::new(18, 18))
}

/// 25×20 warehouse: four columns of four-cell shelves.
pub fn warehouse() -> GridMap {
    let mut grid = GridMap::blank(25, 20);
    border(&mut grid);
    paint(&mut grid, &[(5, 0), (20, 0), (12, 19)], CellType::Empty);
    for x0 in (3..=21).step_by(6) {
        for y in (3..=16).step_by(4) {
            for x in x0..x0 + 4 {
                grid.put(x, y, X);
            }
        }
    }
    paint(&mut grid, &[(2, 1), (22, 1), (2, 18)], C);
    paint(&mut grid, &[(12, 9), (6, 14), (18, 5)], W);
    grid.start_end(Coord::new(5, 1), Coord::new(12, 18))
}

/// 30×25 factory: 3×3 machines, a workstation under each, crossing corridors.
pub fn factory() -> GridMap {
    let mut grid = GridMap::blank(30, 25);
    border(&mut grid);
    paint(&mut grid, &[(10, 0), (20, 24)], CellType::Empty);
    for x0 in (5..=25).step_by(10) {
        for y0 in (5..=20).step_by(5) {
            for y in y0..y0 + 3 {
                for x in x0..x0 + 3 {
                    grid.put(x, y, X);
                }
            }
            if y0 < 20 {
                grid.put(x0 + 1, y0 + 3, W);
            }
        }
    }
    for y in 1..24 {
        grid.put(15, y, CellType::Empty);
    }
    for x in 1..29 {
        grid.put(x, 12, CellType::Empty);
    }
    paint(&mut grid, &[(2, 2), (27, 2), (2, 22), (27, 22)], C);
    grid.start_end(Coord::new(10, 1), Coord::new(20, 23))
}

impl GridMap {
    fn start_end(mut self, start: Coord, end: Coord) -> Self {
        debug_assert!(self.contains(start) && self.contains(end));
        self.set_endpoints_unchecked(start, end);
        self
    }

    /// Passable cells among [`agent_start_positions`]; on floors too small
    /// for those, the first passable cells in row-major order.
    pub fn agent_spawn_points(&self) -> Vec<Coord> {
        let spots: Vec<Coord> = agent_start_positions(self.width(), self.height())
            .into_iter()
            .filter(|c| self.get(*c) == Some(CellType::Empty))
            .collect();
        if !spots.is_empty() {
            return spots;
        }
        self.cells_of_type(CellType::Empty).into_iter().take(8).collect()
    }
}
