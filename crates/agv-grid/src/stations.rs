//! Spatial index over charging stations.
//!
//! An R-tree (via `rstar`) answers "which charger is closest to this AGV?"
//! when a low-battery agent must be sent to charge.  The tree orders
//! candidates by Euclidean distance; the answer we want is by Manhattan
//! distance, so queries walk the Euclidean order and hold each candidate
//! back until the Euclidean distance of the rest exceeds its Manhattan one.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::iter;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use agv_core::Coord;

use crate::cell::CellType;
use crate::grid::GridMap;

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct StationEntry {
    point: [i32; 2], // [x, y]
    coord: Coord,
}

impl RTreeObject for StationEntry {
    type Envelope = AABB<[i32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for StationEntry {
    /// Squared Euclidean distance in cell units.
    fn distance_2(&self, point: &[i32; 2]) -> i32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

fn to_point(c: Coord) -> [i32; 2] {
    [c.x as i32, c.y as i32]
}

// ── StationIndex ──────────────────────────────────────────────────────────────

/// Charging-station lookup, bulk-loaded once per run.
pub struct StationIndex {
    tree: RTree<StationEntry>,
}

impl StationIndex {
    /// Index every `ChargingStation` cell of `grid`.
    pub fn build(grid: &GridMap) -> Self {
        Self::from_coords(grid.cells_of_type(CellType::ChargingStation))
    }

    pub fn from_coords(coords: impl IntoIterator<Item = Coord>) -> Self {
        let entries = coords
            .into_iter()
            .map(|coord| StationEntry { point: to_point(coord), coord })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Station with the smallest Manhattan distance to `from`.
    ///
    /// Ties go to the smaller `Coord` (lowest row, then column).  `None` only
    /// when there are no stations.
    pub fn nearest(&self, from: Coord) -> Option<Coord> {
        self.by_distance(from).next()
    }

    /// Stations in order of Manhattan distance from `from`, then by `Coord`.
    ///
    /// Lazy: candidates are pulled from the tree in Euclidean order and one is
    /// released once no unread station can match its Manhattan distance.
    pub fn by_distance(&self, from: Coord) -> impl Iterator<Item = Coord> + '_ {
        let mut unread = self.tree.nearest_neighbor_iter_with_distance_2(&to_point(from)).peekable();
        let mut ready: BinaryHeap<Reverse<(u32, Coord)>> = BinaryHeap::new();
        iter::from_fn(move || {
            loop {
                if let Some(&Reverse((m, coord))) = ready.peek() {
                    // Manhattan >= Euclidean, so unread stations farther than
                    // `m` in a straight line cannot come first.
                    let m2 = i64::from(m) * i64::from(m);
                    if unread.peek().is_none_or(|&(_, d2)| i64::from(d2) > m2) {
                        ready.pop();
                        return Some(coord);
                    }
                }
                let (entry, _) = unread.next()?;
                ready.push(Reverse((entry.coord.manhattan(from), entry.coord)));
            }
        })
    }
}
