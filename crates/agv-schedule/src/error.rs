use agv_fleet::FleetError;
use agv_grid::GridError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("weights must be non-negative and not all zero (urgency {urgency}, distance {distance}, battery {battery})")]
    InvalidWeights { urgency: f64, distance: f64, battery: f64 },

    #[error("unknown policy {0:?} (expected fifo, priority, nearest, deadline or weighted)")]
    UnknownPolicy(String),

    #[error("fleet error: {0}")]
    Fleet(#[from] FleetError),

    #[error("routing error: {0}")]
    Grid(#[from] GridError),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
