//! Property-based tests for grid pathfinding.
//!
//! Random small floors with obstacles and stations; every search must agree
//! on reachability and return a well-formed path.

use std::collections::HashSet;

use agv_core::Coord;
use agv_grid::{find_path, Algorithm, CellType, GridMap, PathStatus};
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

fn cell_from_roll(roll: u8) -> CellType {
    match roll {
        0..=2 => CellType::Obstacle,
        3 => CellType::ChargingStation,
        4 => CellType::Workstation,
        5 => CellType::PathMarker,
        _ => CellType::Empty,
    }
}

/// A random floor plus two in-bounds endpoints.
fn arb_case() -> impl Strategy<Value = (GridMap, Coord, Coord)> {
    (2u32..=12, 2u32..=12).prop_flat_map(|(w, h)| {
        let n = (w * h) as usize;
        (
            proptest::collection::vec(0u8..10, n),
            0..w,
            0..h,
            0..w,
            0..h,
        )
            .prop_map(move |(rolls, sx, sy, ex, ey)| {
                let rows = rolls
                    .chunks(w as usize)
                    .map(|r| r.iter().copied().map(cell_from_roll).collect())
                    .collect();
                let grid = GridMap::from_rows(rows).unwrap();
                (grid, Coord::new(sx, sy), Coord::new(ex, ey))
            })
    })
}

const ALL: [Algorithm; 3] = [Algorithm::Dijkstra, Algorithm::AStar, Algorithm::Bfs];

fn weighted_cost(grid: &GridMap, path: &[Coord]) -> f64 {
    let tenths: u32 = path[1..]
        .iter()
        .map(|c| grid.get(*c).and_then(CellType::traversal_cost).unwrap())
        .sum();
    tenths as f64 / 10.0
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Paths start at start, end at end, and step between 4-neighbours.
    #[test]
    fn paths_are_well_formed((grid, s, e) in arb_case()) {
        for algo in ALL {
            let r = find_path(&grid, s, e, algo).unwrap();
            if let Some(path) = &r.path {
                prop_assert_eq!(path.first(), Some(&s));
                prop_assert_eq!(path.last(), Some(&e));
                for w in path.windows(2) {
                    prop_assert!(w[0].is_adjacent(w[1]));
                }
                prop_assert!(path.iter().all(|c| !grid.is_blocked(*c)));
            } else {
                prop_assert!(r.cost.is_infinite());
            }
        }
    }

    /// All three searches agree on whether a path exists.
    #[test]
    fn searches_agree_on_reachability((grid, s, e) in arb_case()) {
        let found: Vec<bool> = ALL
            .iter()
            .map(|a| find_path(&grid, s, e, *a).unwrap().is_found())
            .collect();
        prop_assert!(found.iter().all(|f| *f == found[0]));
    }

    /// BFS cost is its step count; weighted cost is the sum of entered cells.
    #[test]
    fn costs_match_paths((grid, s, e) in arb_case()) {
        let bfs = find_path(&grid, s, e, Algorithm::Bfs).unwrap();
        if let Some(path) = &bfs.path {
            prop_assert_eq!(bfs.cost, (path.len() - 1) as f64);
        }
        for algo in [Algorithm::Dijkstra, Algorithm::AStar] {
            let r = find_path(&grid, s, e, algo).unwrap();
            if r.status == PathStatus::Found {
                let path = r.path.as_ref().unwrap();
                prop_assert!((r.cost - weighted_cost(&grid, path)).abs() < 1e-9);
            }
        }
    }

    /// Dijkstra is optimal: neither the A* route nor the BFS route is cheaper.
    #[test]
    fn dijkstra_is_cheapest((grid, s, e) in arb_case()) {
        let d = find_path(&grid, s, e, Algorithm::Dijkstra).unwrap();
        let a = find_path(&grid, s, e, Algorithm::AStar).unwrap();
        let b = find_path(&grid, s, e, Algorithm::Bfs).unwrap();
        if d.is_found() {
            prop_assert!(d.cost <= a.cost + 1e-9);
            let bfs_path = b.path.as_ref().unwrap();
            prop_assert!(d.cost <= weighted_cost(&grid, bfs_path) + 1e-9);
        }
    }

    /// Each explored cell is reported once, even when A* expands it again.
    #[test]
    fn visited_cells_are_unique((grid, s, e) in arb_case()) {
        for algo in ALL {
            let r = find_path(&grid, s, e, algo).unwrap();
            let unique: HashSet<Coord> = r.visited.iter().copied().collect();
            prop_assert_eq!(unique.len(), r.visited.len(), "{} repeated a cell", algo);
        }
    }

    /// Identical inputs give identical results.
    #[test]
    fn searches_are_deterministic((grid, s, e) in arb_case()) {
        for algo in ALL {
            let first = find_path(&grid, s, e, algo).unwrap();
            let second = find_path(&grid, s, e, algo).unwrap();
            prop_assert_eq!(first, second);
        }
    }

    /// Exporting and re-importing reproduces the grid exactly.
    #[test]
    fn document_roundtrip((mut grid, s, e) in arb_case()) {
        grid.set_start(s).unwrap();
        grid.set_end(e).unwrap();
        let doc = grid.to_document("prop");
        let via_json = agv_grid::MapDocument::from_json(&doc.to_json().unwrap()).unwrap();
        let via_csv = agv_grid::MapDocument::from_csv(&doc.to_csv().unwrap()).unwrap();
        prop_assert_eq!(&GridMap::from_document(&via_json).unwrap(), &grid);
        prop_assert_eq!(&GridMap::from_document(&via_csv).unwrap(), &grid);
    }
}
