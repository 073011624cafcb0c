//! `agv-grid`: the warehouse floor and everything that moves across it.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`cell`]        | `CellType` and its integer codes / traversal costs        |
//! | [`grid`]        | `GridMap` (flat row-major cells + editor endpoints)       |
//! | [`pathfinding`] | `PathFinder` trait, `Algorithm`, `PathResult`, `find_path`|
//! | [`stations`]    | `StationIndex` (R-tree over charging stations)            |
//! | [`format`]      | `MapDocument` JSON / CSV interchange                      |
//! | [`presets`]     | Built-in floor layouts                                    |
//! | [`error`]       | `GridError`, `GridResult<T>`                              |

pub mod cell;
pub mod error;
pub mod format;
pub mod grid;
pub mod pathfinding;
pub mod presets;
pub mod stations;

#[cfg(test)]
mod tests;

pub use cell::CellType;
pub use error::{GridError, GridResult};
pub use format::MapDocument;
pub use grid::{GridMap, MAX_DIMENSION};
pub use pathfinding::{find_path, Algorithm, PathFinder, PathResult, PathStatus};
pub use stations::StationIndex;
