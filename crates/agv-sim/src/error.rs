use agv_core::CoreError;
use agv_fleet::FleetError;
use agv_grid::GridError;
use agv_schedule::ScheduleError;
use thiserror::Error;

use crate::RunState;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation in progress: pause or stop before {command}")]
    InProgress { command: &'static str },

    #[error("simulation is {0}, not running")]
    NotRunning(RunState),

    #[error("simulation has stopped; reset or apply a scenario to run again")]
    Finished,

    #[error("no active AGV to target")]
    NoActiveAgent,

    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("unknown event kind {0:?} (expected obstacle, battery, breakdown or high-priority)")]
    UnknownEventKind(String),

    #[error("unknown event target {0:?} (expected random or an id like AGV-001)")]
    UnknownTarget(String),

    #[error("unknown scenario {0:?} (expected basic, high-load or fault-response)")]
    UnknownScenario(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

pub type SimResult<T> = Result<T, SimError>;
