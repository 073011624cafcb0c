//! Pathfinding trait and the three built-in grid searches.
//!
//! # Pluggability
//!
//! The scheduler and the simulation call routing through the [`PathFinder`]
//! trait, so a custom search can be dropped in without touching either.  The
//! built-in [`Algorithm`] enum covers Dijkstra, A* and BFS.
//!
//! # Cost units
//!
//! Weighted searches accumulate integer **tenths** (`u32`) using
//! [`CellType::traversal_cost`], so heap ordering is exact.  `PathResult`
//! exposes the total as `f64` units.
//!
//! # Determinism
//!
//! The frontier is a min-heap keyed `(cost, row-major index)`: among equal
//! costs the lowest row, then the lowest column, is expanded first.
//! Neighbours are always generated up, down, left, right.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;
use std::str::FromStr;

use agv_core::Coord;

use crate::grid::GridMap;
use crate::{GridError, GridResult};

/// Sentinel for "no predecessor".
const NO_PREV: u32 = u32::MAX;

// ── PathResult ────────────────────────────────────────────────────────────────

/// Why a search ended the way it did.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStatus {
    Found,
    SameEndpoints,
    BlockedEndpoint,
    Unreachable,
}

/// Outcome of one search.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    /// `start..=end`; `None` when no path exists.
    pub path:    Option<Vec<Coord>>,
    /// Weighted cost (step count for BFS); `f64::INFINITY` on failure.
    pub cost:    f64,
    /// Cells in the order they were first expanded, each listed once.
    pub visited: Vec<Coord>,
    pub status:  PathStatus,
}

impl PathResult {
    fn blocked() -> Self {
        Self { path: None, cost: f64::INFINITY, visited: Vec::new(), status: PathStatus::BlockedEndpoint }
    }

    fn trivial(at: Coord) -> Self {
        Self { path: Some(vec![at]), cost: 0.0, visited: vec![at], status: PathStatus::SameEndpoints }
    }

    fn unreachable(visited: Vec<Coord>) -> Self {
        Self { path: None, cost: f64::INFINITY, visited, status: PathStatus::Unreachable }
    }

    /// `true` whenever a path is present (including the single-cell case).
    #[inline]
    pub fn is_found(&self) -> bool {
        self.path.is_some()
    }

    /// Number of moves along the path.
    pub fn steps(&self) -> Option<usize> {
        self.path.as_ref().map(|p| p.len().saturating_sub(1))
    }

    /// Consume the result, keeping only the path.
    pub fn into_path(self) -> Option<Vec<Coord>> {
        self.path
    }

    pub fn message(&self) -> String {
        match self.status {
            PathStatus::Found => format!(
                "path found: {} cells, cost {:.1}, {} cells explored",
                self.path.as_ref().map_or(0, Vec::len),
                self.cost,
                self.visited.len()
            ),
            PathStatus::SameEndpoints => "path found: start and end are the same cell".to_string(),
            PathStatus::BlockedEndpoint => "no path: blocked endpoint (start or end is an obstacle)".to_string(),
            PathStatus::Unreachable => {
                format!("no path: destination unreachable ({} cells explored)", self.visited.len())
            }
        }
    }
}

// ── PathFinder trait ──────────────────────────────────────────────────────────

/// Pluggable grid search.
///
/// Implementations must be `Send + Sync` so a single finder can be shared by
/// the scheduler and the simulation.
pub trait PathFinder: Send + Sync {
    /// Search from `start` to `end`.
    ///
    /// Returns `Err` only when an endpoint is outside the grid.  A missing
    /// path is a normal [`PathStatus`], not an error.
    fn find_path(&self, grid: &GridMap, start: Coord, end: Coord) -> GridResult<PathResult>;
}

impl<T: PathFinder + ?Sized> PathFinder for Box<T> {
    fn find_path(&self, grid: &GridMap, start: Coord, end: Coord) -> GridResult<PathResult> {
        (**self).find_path(grid, start, end)
    }
}

// ── Algorithm ─────────────────────────────────────────────────────────────────

/// The built-in searches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Dijkstra,
    #[serde(alias = "a*")]
    AStar,
    Bfs,
}

impl PathFinder for Algorithm {
    fn find_path(&self, grid: &GridMap, start: Coord, end: Coord) -> GridResult<PathResult> {
        find_path(grid, start, end, *self)
    }
}

impl FromStr for Algorithm {
    type Err = GridError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dijkstra" => Ok(Algorithm::Dijkstra),
            "astar" | "a*" | "a-star" => Ok(Algorithm::AStar),
            "bfs" => Ok(Algorithm::Bfs),
            other => Err(GridError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::Dijkstra => "dijkstra",
            Algorithm::AStar => "astar",
            Algorithm::Bfs => "bfs",
        })
    }
}

/// Run `algorithm` from `start` to `end`.
///
/// Endpoint checks happen before any search, in this order: obstacle at
/// either end gives `BlockedEndpoint`, then `start == end` gives a one-cell
/// path of cost 0.
pub fn find_path(grid: &GridMap, start: Coord, end: Coord, algorithm: Algorithm) -> GridResult<PathResult> {
    grid.check_bounds(start)?;
    grid.check_bounds(end)?;

    if grid.is_blocked(start) || grid.is_blocked(end) {
        return Ok(PathResult::blocked());
    }
    if start == end {
        return Ok(PathResult::trivial(start));
    }

    let result = match algorithm {
        Algorithm::Dijkstra => weighted_search(grid, start, end, |_| 0),
        // Manhattan distance in tenths.  Not admissible once chargers (0.8)
        // or markers (0.9) lie on the route; kept as an approximation.
        Algorithm::AStar => weighted_search(grid, start, end, |c| c.manhattan(end) * 10),
        Algorithm::Bfs => bfs(grid, start, end),
    };
    log::trace!("{algorithm} {start}->{end}: {:?}, {} expanded", result.status, result.visited.len());
    Ok(result)
}

// ── Weighted search (Dijkstra / A*) ───────────────────────────────────────────

/// Best-first search over destination-cell costs.
///
/// With a zero heuristic this is Dijkstra.  With a non-zero heuristic the
/// heap key is `g + h`, and a node is re-expanded whenever a cheaper `g`
/// reaches it.
fn weighted_search<H>(grid: &GridMap, start: Coord, end: Coord, heuristic: H) -> PathResult
where
    H: Fn(Coord) -> u32,
{
    let n = grid.len();
    let from = grid.index_of(start);
    let to = grid.index_of(end);

    // dist[i] = best known g (tenths) to reach cell i.
    let mut dist = vec![u32::MAX; n];
    // prev[i] = row-major index of the cell that reached i.
    let mut prev = vec![NO_PREV; n];
    let mut visited = Vec::new();
    // A* may expand a cell again on a cheaper g; record it only once.
    let mut seen = vec![false; n];

    dist[from] = 0;

    // Min-heap: (g + h, index).  The index is the deterministic tie-break.
    let mut heap: BinaryHeap<Reverse<(u32, u32)>> = BinaryHeap::new();
    heap.push(Reverse((heuristic(start), from as u32)));

    while let Some(Reverse((key, idx))) = heap.pop() {
        let idx = idx as usize;
        let here = grid.coord_of(idx);
        let g = key - heuristic(here);

        // Skip stale heap entries.
        if g > dist[idx] {
            continue;
        }
        if !seen[idx] {
            seen[idx] = true;
            visited.push(here);
        }

        if idx == to {
            let path = reconstruct(grid, &prev, from, to);
            return PathResult {
                path:    Some(path),
                cost:    g as f64 / 10.0,
                visited,
                status:  PathStatus::Found,
            };
        }

        for next in grid.neighbors(here) {
            let ni = grid.index_of(next);
            let Some(step) = grid.cell_by_index(ni).traversal_cost() else {
                continue;
            };
            let new_g = g.saturating_add(step);
            if new_g < dist[ni] {
                dist[ni] = new_g;
                prev[ni] = idx as u32;
                heap.push(Reverse((new_g.saturating_add(heuristic(next)), ni as u32)));
            }
        }
    }

    PathResult::unreachable(visited)
}

// ── BFS ───────────────────────────────────────────────────────────────────────

fn bfs(grid: &GridMap, start: Coord, end: Coord) -> PathResult {
    let n = grid.len();
    let from = grid.index_of(start);
    let to = grid.index_of(end);

    let mut seen = vec![false; n];
    let mut prev = vec![NO_PREV; n];
    let mut visited = Vec::new();
    let mut queue = VecDeque::new();

    seen[from] = true;
    queue.push_back(from);

    while let Some(idx) = queue.pop_front() {
        let here = grid.coord_of(idx);
        visited.push(here);

        if idx == to {
            let path = reconstruct(grid, &prev, from, to);
            let cost = (path.len() - 1) as f64;
            return PathResult { path: Some(path), cost, visited, status: PathStatus::Found };
        }

        for next in grid.neighbors(here) {
            let ni = grid.index_of(next);
            if !seen[ni] {
                seen[ni] = true;
                prev[ni] = idx as u32;
                queue.push_back(ni);
            }
        }
    }

    PathResult::unreachable(visited)
}

fn reconstruct(grid: &GridMap, prev: &[u32], from: usize, to: usize) -> Vec<Coord> {
    let mut path = vec![grid.coord_of(to)];
    let mut cur = to;
    while cur != from {
        cur = prev[cur] as usize;
        path.push(grid.coord_of(cur));
    }
    path.reverse();
    path
}
