//! Grid-subsystem error type.

use thiserror::Error;

use agv_core::Coord;

/// Errors produced by `agv-grid`.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid size {width}x{height} outside {min}..={max}")]
    InvalidSize { width: u32, height: u32, min: u32, max: u32 },

    #[error("{coord} is outside the {width}x{height} grid")]
    OutOfBounds { coord: Coord, width: u32, height: u32 },

    #[error("unknown cell code {code} at {coord}")]
    UnknownCellCode { code: u8, coord: Coord },

    #[error("unknown pathfinding algorithm {0:?} (expected dijkstra, astar or bfs)")]
    UnknownAlgorithm(String),

    #[error("malformed map: {0}")]
    Format(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GridResult<T> = Result<T, GridError>;
