//! The warehouse floor as a flat row-major cell array.
//!
//! # Layout
//!
//! Cell `(x, y)` lives at `cells[y * width + x]`.  Pathfinding works on these
//! flat indices directly (distance / predecessor arrays are plain `Vec`s of
//! the same length), so no coordinate hashing happens on the hot path.
//!
//! `cells.len() == width * height` holds for every `GridMap` ever observed
//! outside this module.  A mismatch can only come from a bug here and panics.

use agv_core::Coord;

use crate::cell::CellType;
use crate::error::{GridError, GridResult};

/// Largest accepted width or height.
pub const MAX_DIMENSION: u32 = 1024;

/// Rectangular occupancy grid plus the editor's optional start / end points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    width:  u32,
    height: u32,
    cells:  Vec<CellType>,
    start:  Option<Coord>,
    end:    Option<Coord>,
}

impl GridMap {
    /// An all-Empty grid.  Both dimensions must be in `1..=MAX_DIMENSION`.
    pub fn new(width: u32, height: u32) -> GridResult<Self> {
        check_size(width, height, 1)?;
        Ok(Self::blank(width, height))
    }

    /// Unvalidated constructor for callers that already checked the size.
    pub(crate) fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![CellType::Empty; width as usize * height as usize],
            start: None,
            end: None,
        }
    }

    // ── Dimensions & indexing ─────────────────────────────────────────────

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn contains(&self, c: Coord) -> bool {
        c.x < self.width && c.y < self.height
    }

    /// Row-major index of an in-bounds coordinate.
    #[inline]
    pub fn index_of(&self, c: Coord) -> usize {
        debug_assert!(self.contains(c), "{c} outside {}x{}", self.width, self.height);
        c.y as usize * self.width as usize + c.x as usize
    }

    /// Inverse of [`index_of`](Self::index_of).
    #[inline]
    pub fn coord_of(&self, index: usize) -> Coord {
        let w = self.width as usize;
        Coord::new((index % w) as u32, (index / w) as u32)
    }

    /// `Ok(())` when `c` is in bounds, else `GridError::OutOfBounds`.
    pub fn check_bounds(&self, c: Coord) -> GridResult<()> {
        if self.contains(c) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds { coord: c, width: self.width, height: self.height })
        }
    }

    // ── Cell access ───────────────────────────────────────────────────────

    pub fn cell_at(&self, x: u32, y: u32) -> GridResult<CellType> {
        let c = Coord::new(x, y);
        self.check_bounds(c)?;
        Ok(self.cells[self.index_of(c)])
    }

    /// Cell kind at `c`, `None` when out of bounds.
    #[inline]
    pub fn get(&self, c: Coord) -> Option<CellType> {
        self.contains(c).then(|| self.cells[self.index_of(c)])
    }

    /// Cell kind by flat index.  Panics on an index `>= len()`.
    #[inline]
    pub fn cell_by_index(&self, index: usize) -> CellType {
        self.cells[index]
    }

    /// `true` for obstacles and for anything outside the grid.
    #[inline]
    pub fn is_obstacle(&self, x: u32, y: u32) -> bool {
        self.get(Coord::new(x, y)).is_none_or(|cell| !cell.is_passable())
    }

    #[inline]
    pub fn is_blocked(&self, c: Coord) -> bool {
        self.is_obstacle(c.x, c.y)
    }

    pub fn set_cell(&mut self, x: u32, y: u32, cell: CellType) -> GridResult<()> {
        let c = Coord::new(x, y);
        self.check_bounds(c)?;
        let i = self.index_of(c);
        self.cells[i] = cell;
        Ok(())
    }

    /// In-crate painter for layouts whose coordinates are known in bounds.
    #[inline]
    pub(crate) fn put(&mut self, x: u32, y: u32, cell: CellType) {
        let i = self.index_of(Coord::new(x, y));
        self.cells[i] = cell;
    }

    /// Rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[CellType]> + '_ {
        self.cells.chunks(self.width as usize)
    }

    /// Passable 4-neighbours of `c`, always in the order up, down, left, right.
    pub fn neighbors(&self, c: Coord) -> impl Iterator<Item = Coord> + '_ {
        let up = c.y.checked_sub(1).map(|y| Coord::new(c.x, y));
        let down = Some(Coord::new(c.x, c.y + 1));
        let left = c.x.checked_sub(1).map(|x| Coord::new(x, c.y));
        let right = Some(Coord::new(c.x + 1, c.y));
        [up, down, left, right]
            .into_iter()
            .flatten()
            .filter(move |n| !self.is_blocked(*n))
    }

    /// Every coordinate holding `kind`, in row-major order.
    pub fn cells_of_type(&self, kind: CellType) -> Vec<Coord> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == kind)
            .map(|(i, _)| self.coord_of(i))
            .collect()
    }

    pub fn count(&self, kind: CellType) -> usize {
        self.cells.iter().filter(|cell| **cell == kind).count()
    }

    // ── Resizing ──────────────────────────────────────────────────────────

    /// Change dimensions, keeping the overlapping top-left region.
    ///
    /// Path marks are cleared first, new cells are Empty, and an endpoint
    /// that falls outside the new bounds is dropped.
    pub fn resize(&mut self, width: u32, height: u32) -> GridResult<()> {
        check_size(width, height, 1)?;
        self.clear_path_marks();

        let mut next = GridMap::blank(width, height);
        for y in 0..self.height.min(height) {
            for x in 0..self.width.min(width) {
                let c = Coord::new(x, y);
                next.put(x, y, self.cells[self.index_of(c)]);
            }
        }
        next.start = self.start.filter(|c| next.contains(*c));
        next.end = self.end.filter(|c| next.contains(*c));
        assert_eq!(next.cells.len(), width as usize * height as usize, "resize produced a ragged grid");

        *self = next;
        Ok(())
    }

    // ── Editor endpoints ──────────────────────────────────────────────────

    #[inline]
    pub fn start(&self) -> Option<Coord> {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Option<Coord> {
        self.end
    }

    pub fn set_start(&mut self, c: Coord) -> GridResult<()> {
        self.check_bounds(c)?;
        self.start = Some(c);
        Ok(())
    }

    pub fn set_end(&mut self, c: Coord) -> GridResult<()> {
        self.check_bounds(c)?;
        self.end = Some(c);
        Ok(())
    }

    pub(crate) fn set_endpoints_unchecked(&mut self, start: Coord, end: Coord) {
        self.start = Some(start);
        self.end = Some(end);
    }

    pub fn clear_endpoints(&mut self) {
        self.start = None;
        self.end = None;
    }

    // ── Path marking ──────────────────────────────────────────────────────

    /// Paint the interior of `path` with `PathMarker`.
    ///
    /// The first and last cells, stations and obstacles are left alone.
    /// Returns the number of cells painted.
    pub fn mark_path(&mut self, path: &[Coord]) -> usize {
        if path.len() < 3 {
            return 0;
        }
        let mut painted = 0;
        for &c in &path[1..path.len() - 1] {
            if self.get(c) == Some(CellType::Empty) {
                self.put(c.x, c.y, CellType::PathMarker);
                painted += 1;
            }
        }
        painted
    }

    /// Turn every `PathMarker` back into `Empty`.  Returns the number restored.
    pub fn clear_path_marks(&mut self) -> usize {
        let mut restored = 0;
        for cell in self.cells.iter_mut().filter(|c| **c == CellType::PathMarker) {
            *cell = CellType::Empty;
            restored += 1;
        }
        restored
    }

    // ── Bulk construction ─────────────────────────────────────────────────

    /// Build from rows of cells (top to bottom).  All rows must be equally long.
    pub fn from_rows(rows: Vec<Vec<CellType>>) -> GridResult<Self> {
        let height = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        let width = rows.first().map_or(0, |r| u32::try_from(r.len()).unwrap_or(u32::MAX));
        check_size(width, height, 1)?;
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width as usize) {
            return Err(GridError::Format(format!(
                "row {y} has {} cells, expected {width}",
                row.len()
            )));
        }
        let cells: Vec<CellType> = rows.into_iter().flatten().collect();
        assert_eq!(cells.len(), width as usize * height as usize, "from_rows produced a ragged grid");
        Ok(Self { width, height, cells, start: None, end: None })
    }
}

/// Reject dimensions outside `min..=MAX_DIMENSION`.
pub(crate) fn check_size(width: u32, height: u32, min: u32) -> GridResult<()> {
    let ok = |d: u32| (min..=MAX_DIMENSION).contains(&d);
    if ok(width) && ok(height) {
        Ok(())
    } else {
        Err(GridError::InvalidSize { width, height, min, max: MAX_DIMENSION })
    }
}

impl std::fmt::Display for GridMap {
    /// One text row per grid row, cells as their integer codes.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            let line: Vec<String> = row.iter().map(|c| c.code().to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
