//! Unit tests for agv-grid.
//!
//! All grids are built by hand so results can be asserted exactly.

#[cfg(test)]
mod helpers {
    use agv_core::Coord;

    use crate::{CellType, GridMap};

    /// 20×20 floor with only the outer walls, one charger at (2,2) and one
    /// workstation at (10,10).
    pub fn walled_20() -> GridMap {
        let mut g = GridMap::new(20, 20).unwrap();
        for i in 0..20 {
            g.set_cell(i, 0, CellType::Obstacle).unwrap();
            g.set_cell(i, 19, CellType::Obstacle).unwrap();
            g.set_cell(0, i, CellType::Obstacle).unwrap();
            g.set_cell(19, i, CellType::Obstacle).unwrap();
        }
        g.set_cell(2, 2, CellType::ChargingStation).unwrap();
        g.set_cell(10, 10, CellType::Workstation).unwrap();
        g
    }

    pub fn c(x: u32, y: u32) -> Coord {
        Coord::new(x, y)
    }

    pub fn assert_valid_path(path: &[Coord], start: Coord, end: Coord, grid: &GridMap) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&end));
        for w in path.windows(2) {
            assert!(w[0].is_adjacent(w[1]), "{} -> {} not adjacent", w[0], w[1]);
        }
        assert!(path.iter().all(|p| !grid.is_blocked(*p)));
    }
}

// ── Cells ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cell {
    use crate::CellType;

    #[test]
    fn codes_roundtrip() {
        for code in [0u8, 1, 2, 3, 9] {
            assert_eq!(CellType::from_code(code).unwrap().code(), code);
        }
        assert!(CellType::from_code(4).is_none());
        assert!(CellType::try_from(7u8).is_err());
    }

    #[test]
    fn traversal_costs_in_tenths() {
        assert_eq!(CellType::Empty.traversal_cost(), Some(10));
        assert_eq!(CellType::ChargingStation.traversal_cost(), Some(8));
        assert_eq!(CellType::Workstation.traversal_cost(), Some(12));
        assert_eq!(CellType::PathMarker.traversal_cost(), Some(9));
        assert_eq!(CellType::Obstacle.traversal_cost(), None);
    }
}

// ── GridMap ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod grid {
    use super::helpers::c;
    use crate::{CellType, GridError, GridMap};

    #[test]
    fn new_is_all_empty() {
        let g = GridMap::new(4, 3).unwrap();
        assert_eq!(g.len(), 12);
        assert_eq!(g.count(CellType::Empty), 12);
        assert_eq!(g.start(), None);
    }

    #[test]
    fn invalid_sizes_rejected() {
        assert!(matches!(GridMap::new(0, 5), Err(GridError::InvalidSize { .. })));
        assert!(matches!(GridMap::new(5, 1025), Err(GridError::InvalidSize { .. })));
        assert!(GridMap::new(1024, 1).is_ok());
    }

    #[test]
    fn cell_access_and_bounds() {
        let mut g = GridMap::new(3, 3).unwrap();
        g.set_cell(1, 2, CellType::Workstation).unwrap();
        assert_eq!(g.cell_at(1, 2).unwrap(), CellType::Workstation);
        assert!(matches!(g.cell_at(3, 0), Err(GridError::OutOfBounds { .. })));
        assert!(g.set_cell(0, 3, CellType::Obstacle).is_err());
    }

    #[test]
    fn out_of_bounds_counts_as_obstacle() {
        let mut g = GridMap::new(2, 2).unwrap();
        g.set_cell(0, 0, CellType::Obstacle).unwrap();
        assert!(g.is_obstacle(0, 0));
        assert!(!g.is_obstacle(1, 1));
        assert!(g.is_obstacle(2, 0));
        assert!(g.is_obstacle(0, 99));
    }

    #[test]
    fn neighbors_fixed_order_and_passable_only() {
        let mut g = GridMap::new(3, 3).unwrap();
        let all: Vec<_> = g.neighbors(c(1, 1)).collect();
        assert_eq!(all, vec![c(1, 0), c(1, 2), c(0, 1), c(2, 1)]);

        g.set_cell(1, 2, CellType::Obstacle).unwrap();
        let some: Vec<_> = g.neighbors(c(1, 1)).collect();
        assert_eq!(some, vec![c(1, 0), c(0, 1), c(2, 1)]);

        let corner: Vec<_> = g.neighbors(c(0, 0)).collect();
        assert_eq!(corner, vec![c(0, 1), c(1, 0)]);
    }

    #[test]
    fn cells_of_type_row_major() {
        let mut g = GridMap::new(4, 4).unwrap();
        g.set_cell(3, 0, CellType::ChargingStation).unwrap();
        g.set_cell(0, 2, CellType::ChargingStation).unwrap();
        g.set_cell(1, 1, CellType::ChargingStation).unwrap();
        assert_eq!(g.cells_of_type(CellType::ChargingStation), vec![c(3, 0), c(1, 1), c(0, 2)]);
    }

    #[test]
    fn resize_keeps_overlap_and_drops_outside_endpoints() {
        let mut g = GridMap::new(5, 5).unwrap();
        g.set_cell(1, 1, CellType::Obstacle).unwrap();
        g.set_cell(4, 4, CellType::Workstation).unwrap();
        g.set_cell(2, 2, CellType::PathMarker).unwrap();
        g.set_start(c(0, 0)).unwrap();
        g.set_end(c(4, 4)).unwrap();

        g.resize(3, 6).unwrap();
        assert_eq!((g.width(), g.height()), (3, 6));
        assert_eq!(g.cell_at(1, 1).unwrap(), CellType::Obstacle);
        assert_eq!(g.cell_at(2, 2).unwrap(), CellType::Empty, "path marks cleared");
        assert_eq!(g.cell_at(2, 5).unwrap(), CellType::Empty);
        assert_eq!(g.start(), Some(c(0, 0)));
        assert_eq!(g.end(), None);
        assert_eq!(g.count(CellType::Workstation), 0);
    }

    #[test]
    fn resize_rejects_bad_size_and_keeps_state() {
        let mut g = GridMap::new(3, 3).unwrap();
        g.set_cell(0, 0, CellType::Obstacle).unwrap();
        assert!(g.resize(0, 3).is_err());
        assert_eq!((g.width(), g.height()), (3, 3));
        assert_eq!(g.cell_at(0, 0).unwrap(), CellType::Obstacle);
    }

    #[test]
    fn endpoints_bounds_checked() {
        let mut g = GridMap::new(3, 3).unwrap();
        assert!(g.set_start(c(3, 3)).is_err());
        g.set_start(c(2, 2)).unwrap();
        g.set_end(c(0, 1)).unwrap();
        g.clear_endpoints();
        assert_eq!((g.start(), g.end()), (None, None));
    }

    #[test]
    fn mark_path_skips_endpoints_and_stations() {
        let mut g = GridMap::new(5, 1).unwrap();
        g.set_cell(2, 0, CellType::ChargingStation).unwrap();
        let path = [c(0, 0), c(1, 0), c(2, 0), c(3, 0), c(4, 0)];
        assert_eq!(g.mark_path(&path), 2);
        let codes: Vec<u8> = g.rows().next().unwrap().iter().map(|c| c.code()).collect();
        assert_eq!(codes, vec![0, 9, 2, 9, 0]);

        assert_eq!(g.clear_path_marks(), 2);
        assert_eq!(g.count(CellType::PathMarker), 0);
        assert_eq!(g.cell_at(2, 0).unwrap(), CellType::ChargingStation);
    }

    #[test]
    fn from_rows_rejects_ragged() {
        let rows = vec![vec![CellType::Empty; 3], vec![CellType::Empty; 2]];
        assert!(matches!(GridMap::from_rows(rows), Err(GridError::Format(_))));
    }
}

// ── Pathfinding ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod pathfinding {
    use super::helpers::{assert_valid_path, c, walled_20};
    use crate::{find_path, Algorithm, CellType, GridError, GridMap, PathFinder, PathStatus};

    #[test]
    fn walled_floor_dijkstra_reaches_workstation() {
        let g = walled_20();
        let r = find_path(&g, c(1, 1), c(10, 10), Algorithm::Dijkstra).unwrap();
        assert_eq!(r.status, PathStatus::Found);
        let path = r.path.as_ref().unwrap();
        assert!(path.len() >= 18, "len {}", path.len());
        assert_valid_path(path, c(1, 1), c(10, 10), &g);
        assert!(r.message().starts_with("path found"));
    }

    #[test]
    fn same_endpoints_trivial() {
        let g = walled_20();
        for algo in [Algorithm::Dijkstra, Algorithm::AStar, Algorithm::Bfs] {
            let r = find_path(&g, c(5, 5), c(5, 5), algo).unwrap();
            assert_eq!(r.status, PathStatus::SameEndpoints);
            assert_eq!(r.path, Some(vec![c(5, 5)]));
            assert_eq!(r.cost, 0.0);
        }
    }

    #[test]
    fn blocked_endpoint_reported() {
        let g = walled_20();
        for (s, e) in [(c(0, 0), c(5, 5)), (c(5, 5), c(19, 3))] {
            let r = find_path(&g, s, e, Algorithm::Dijkstra).unwrap();
            assert_eq!(r.status, PathStatus::BlockedEndpoint);
            assert!(r.path.is_none());
            assert!(r.cost.is_infinite());
            assert!(r.message().contains("blocked endpoint"));
        }
    }

    #[test]
    fn blocked_check_precedes_same_endpoint_check() {
        let g = walled_20();
        let r = find_path(&g, c(0, 0), c(0, 0), Algorithm::Bfs).unwrap();
        assert_eq!(r.status, PathStatus::BlockedEndpoint);
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let g = walled_20();
        let r = find_path(&g, c(1, 1), c(20, 1), Algorithm::AStar);
        assert!(matches!(r, Err(GridError::OutOfBounds { .. })));
    }

    #[test]
    fn unreachable_has_visited_cells() {
        let mut g = GridMap::new(5, 5).unwrap();
        for y in 0..5 {
            g.set_cell(2, y, CellType::Obstacle).unwrap();
        }
        for algo in [Algorithm::Dijkstra, Algorithm::AStar, Algorithm::Bfs] {
            let r = find_path(&g, c(0, 0), c(4, 4), algo).unwrap();
            assert_eq!(r.status, PathStatus::Unreachable);
            assert!(r.path.is_none());
            assert!(r.cost.is_infinite());
            assert_eq!(r.visited.len(), 10, "{algo} explores the whole left side");
        }
    }

    #[test]
    fn dijkstra_tie_break_prefers_lowest_row() {
        let g = GridMap::new(3, 3).unwrap();
        let r = find_path(&g, c(0, 0), c(2, 2), Algorithm::Dijkstra).unwrap();
        assert_eq!(r.path.unwrap(), vec![c(0, 0), c(1, 0), c(2, 0), c(2, 1), c(2, 2)]);
        assert_eq!(r.cost, 4.0);
    }

    #[test]
    fn dijkstra_prefers_marker_over_workstation() {
        // Two 4-step detours around (1,1): over a workstation or a marker.
        let mut g = GridMap::new(3, 3).unwrap();
        g.set_cell(1, 1, CellType::Obstacle).unwrap();
        g.set_cell(1, 0, CellType::Workstation).unwrap();
        g.set_cell(1, 2, CellType::PathMarker).unwrap();
        let r = find_path(&g, c(0, 1), c(2, 1), Algorithm::Dijkstra).unwrap();
        assert_eq!(r.path.unwrap(), vec![c(0, 1), c(0, 2), c(1, 2), c(2, 2), c(2, 1)]);
        assert_eq!(r.cost, 3.9);
    }

    #[test]
    fn astar_matches_dijkstra_on_uniform_floor() {
        let g = GridMap::new(10, 10).unwrap();
        let d = find_path(&g, c(0, 0), c(9, 9), Algorithm::Dijkstra).unwrap();
        let a = find_path(&g, c(0, 0), c(9, 9), Algorithm::AStar).unwrap();
        assert_eq!(d.cost, 18.0);
        assert_eq!(a.cost, 18.0);
        assert!(a.visited.len() <= d.visited.len());
    }

    #[test]
    fn bfs_cost_is_step_count() {
        let g = walled_20();
        let r = find_path(&g, c(1, 1), c(18, 18), Algorithm::Bfs).unwrap();
        let path = r.path.as_ref().unwrap();
        assert_eq!(r.cost, (path.len() - 1) as f64);
        assert_eq!(r.steps(), Some(34));
        assert_valid_path(path, c(1, 1), c(18, 18), &g);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let g = walled_20();
        for algo in [Algorithm::Dijkstra, Algorithm::AStar, Algorithm::Bfs] {
            let a = algo.find_path(&g, c(3, 17), c(16, 2)).unwrap();
            let b = algo.find_path(&g, c(3, 17), c(16, 2)).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn algorithm_parsing() {
        assert_eq!("Dijkstra".parse::<Algorithm>().unwrap(), Algorithm::Dijkstra);
        assert_eq!("a*".parse::<Algorithm>().unwrap(), Algorithm::AStar);
        assert_eq!("astar".parse::<Algorithm>().unwrap(), Algorithm::AStar);
        assert_eq!(" bfs ".parse::<Algorithm>().unwrap(), Algorithm::Bfs);
        assert!(matches!("greedy".parse::<Algorithm>(), Err(GridError::UnknownAlgorithm(_))));
        assert_eq!(Algorithm::AStar.to_string(), "astar");
    }

    #[test]
    fn boxed_finder_is_a_finder() {
        let g = GridMap::new(4, 1).unwrap();
        let finder: Box<dyn PathFinder> = Box::new(Algorithm::Bfs);
        let r = finder.find_path(&g, c(0, 0), c(3, 0)).unwrap();
        assert_eq!(r.steps(), Some(3));
    }
}

// ── Stations ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod stations {
    use super::helpers::c;
    use crate::{CellType, GridMap, StationIndex};

    #[test]
    fn nearest_uses_manhattan_not_euclidean() {
        // (3,3): Manhattan 6, Euclidean 4.2.  (5,0): Manhattan 5, Euclidean 5.
        let idx = StationIndex::from_coords([c(3, 3), c(5, 0)]);
        assert_eq!(idx.nearest(c(0, 0)), Some(c(5, 0)));
    }

    #[test]
    fn ties_go_to_lowest_row() {
        let idx = StationIndex::from_coords([c(6, 5), c(4, 5), c(5, 4), c(5, 6)]);
        assert_eq!(idx.nearest(c(5, 5)), Some(c(5, 4)));
        let order: Vec<_> = idx.by_distance(c(5, 5)).collect();
        assert_eq!(order, vec![c(5, 4), c(4, 5), c(6, 5), c(5, 6)]);
    }

    #[test]
    fn by_distance_matches_full_sort() {
        let stations: Vec<_> = (0..40).map(|i| c((i * 7) % 23, (i * 11) % 17)).collect();
        let idx = StationIndex::from_coords(stations.clone());
        for from in [c(0, 0), c(11, 8), c(22, 16), c(3, 14)] {
            let mut expected = stations.clone();
            expected.sort_by_key(|s| (s.manhattan(from), *s));
            let got: Vec<_> = idx.by_distance(from).collect();
            assert_eq!(got, expected, "from {from}");
        }
    }

    #[test]
    fn empty_index() {
        let idx = StationIndex::build(&GridMap::new(3, 3).unwrap());
        assert!(idx.is_empty());
        assert_eq!(idx.nearest(c(1, 1)), None);
    }

    #[test]
    fn built_from_grid_chargers() {
        let mut g = GridMap::new(10, 10).unwrap();
        g.set_cell(1, 1, CellType::ChargingStation).unwrap();
        g.set_cell(8, 8, CellType::ChargingStation).unwrap();
        g.set_cell(5, 5, CellType::Workstation).unwrap();
        let idx = StationIndex::build(&g);
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.nearest(c(6, 7)), Some(c(8, 8)));
    }
}

// ── Interchange ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod format {
    use super::helpers::c;
    use crate::{presets, CellType, GridError, GridMap, MapDocument};

    fn sample() -> GridMap {
        let mut g = GridMap::new(4, 3).unwrap();
        g.set_cell(1, 0, CellType::Obstacle).unwrap();
        g.set_cell(2, 1, CellType::ChargingStation).unwrap();
        g.set_cell(3, 2, CellType::Workstation).unwrap();
        g.set_cell(0, 2, CellType::PathMarker).unwrap();
        g.set_start(c(0, 0)).unwrap();
        g.set_end(c(3, 1)).unwrap();
        g
    }

    #[test]
    fn document_shape() {
        let doc = sample().to_document("demo");
        assert_eq!((doc.size_x, doc.size_y), (4, 3));
        assert_eq!(doc.grid[0], vec![0, 1, 0, 0]);
        assert_eq!(doc.grid[2], vec![9, 0, 0, 3]);
    }

    #[test]
    fn json_roundtrip_exact() {
        let g = sample();
        let text = g.to_document("demo").to_json().unwrap();
        assert!(text.contains("\"sizeX\": 4"));
        assert!(text.contains("\"startPoint\""));
        let back = GridMap::from_document(&MapDocument::from_json(&text).unwrap()).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn csv_roundtrip_exact() {
        let g = sample();
        let text = g.to_document("demo").to_csv().unwrap();
        assert!(text.starts_with("# Map Name: demo\n# Size: 4x3\n# Start: 0,0\n# End: 3,1\n"));
        let doc = MapDocument::from_csv(&text).unwrap();
        assert_eq!(doc.name, "demo");
        assert_eq!(GridMap::from_document(&doc).unwrap(), g);
    }

    #[test]
    fn csv_without_endpoints_or_size() {
        let doc = MapDocument::from_csv("# Start: none\n0,1\n2,3\n\n").unwrap();
        assert_eq!((doc.size_x, doc.size_y), (2, 2));
        assert_eq!(doc.start_point, None);
        let g = GridMap::from_document(&doc).unwrap();
        assert_eq!(g.cell_at(1, 1).unwrap(), CellType::Workstation);
    }

    #[test]
    fn editor_export_with_extra_keys_imports() {
        let text = r#"{"name":"x","sizeX":2,"sizeY":1,"grid":[[0,2]],
                       "startPoint":[0,0],"endPoint":null,"timestamp":"2024-01-01T00:00:00Z"}"#;
        let g = GridMap::from_document(&MapDocument::from_json(text).unwrap()).unwrap();
        assert_eq!(g.start(), Some(c(0, 0)));
        assert_eq!(g.end(), None);
    }

    #[test]
    fn import_validation() {
        let mut doc = sample().to_document("bad");
        doc.grid[1].pop();
        assert!(matches!(GridMap::from_document(&doc), Err(GridError::Format(_))));

        let mut doc = sample().to_document("bad");
        doc.grid[1][1] = 5;
        assert!(matches!(GridMap::from_document(&doc), Err(GridError::UnknownCellCode { code: 5, .. })));

        let mut doc = sample().to_document("bad");
        doc.end_point = Some(c(9, 9));
        assert!(matches!(GridMap::from_document(&doc), Err(GridError::OutOfBounds { .. })));

        let mut doc = sample().to_document("bad");
        doc.size_y = 4;
        assert!(GridMap::from_document(&doc).is_err());
    }

    #[test]
    fn file_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let g = presets::warehouse();
        for name in ["w.json", "w.csv"] {
            let path = dir.path().join(name);
            g.to_document("warehouse").save(&path).unwrap();
            let back = GridMap::from_document(&MapDocument::load(&path).unwrap()).unwrap();
            assert_eq!(back, g);
        }
        assert!(MapDocument::load(&dir.path().join("w.txt")).is_err());
    }
}

// ── Presets ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod presets {
    use super::helpers::c;
    use crate::presets::{self, agent_start_positions};
    use crate::{find_path, Algorithm, CellType};

    #[test]
    fn simulation_floor_layout() {
        let g = presets::standard_simulation_floor();
        assert_eq!(g.cells_of_type(CellType::ChargingStation), vec![c(2, 2), c(17, 2), c(2, 17), c(17, 17)]);
        assert_eq!(g.count(CellType::Workstation), 5);
        assert_eq!(g.cell_at(10, 10).unwrap(), CellType::Workstation);
        assert!(g.is_obstacle(3, 8));
        assert!(!g.is_obstacle(10, 8), "corridor opening");
        assert!(g.is_obstacle(11, 3));
    }

    #[test]
    fn simulation_floor_stations_connected() {
        let g = presets::standard_simulation_floor();
        let mut stations = g.cells_of_type(CellType::ChargingStation);
        stations.extend(g.cells_of_type(CellType::Workstation));
        for &a in &stations {
            for &b in &stations {
                assert!(find_path(&g, a, b, Algorithm::Bfs).unwrap().is_found(), "{a} -> {b}");
            }
        }
    }

    #[test]
    fn simulation_floor_size_checked() {
        assert!(presets::simulation_floor(11, 20).is_err());
        let g = presets::simulation_floor(30, 24).unwrap();
        assert_eq!(g.count(CellType::ChargingStation), 4);
    }

    #[test]
    fn spawn_points_are_free() {
        let g = presets::standard_simulation_floor();
        assert_eq!(agent_start_positions(20, 20)[1], c(16, 3));
        let spawns = g.agent_spawn_points();
        assert_eq!(spawns.len(), 8);
        assert!(spawns.iter().all(|p| g.cell_at(p.x, p.y).unwrap() == CellType::Empty));
    }

    #[test]
    fn editor_presets_have_reachable_endpoints() {
        for (g, chargers, workstations) in [
            (presets::open_floor(), 4, 5),
            (presets::warehouse(), 3, 3),
            (presets::factory(), 4, 9),
        ] {
            assert_eq!(g.count(CellType::ChargingStation), chargers);
            assert_eq!(g.count(CellType::Workstation), workstations);
            let (s, e) = (g.start().unwrap(), g.end().unwrap());
            assert!(find_path(&g, s, e, Algorithm::AStar).unwrap().is_found());
        }
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(presets::by_name("Warehouse").map(|g| g.width()), Some(25));
        assert!(presets::by_name("moon").is_none());
    }
}
