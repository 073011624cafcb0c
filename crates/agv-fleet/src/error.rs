use agv_core::{AgentId, TaskId};
use thiserror::Error;

use crate::{AgentStatus, TaskStatus};

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("{agent} cannot {action} while {from}")]
    InvalidTransition { agent: AgentId, from: AgentStatus, action: &'static str },

    #[error("{task} cannot {action} while {from}")]
    TaskTransition { task: TaskId, from: TaskStatus, action: &'static str },

    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),

    #[error("unknown task {0}")]
    UnknownTask(TaskId),

    #[error("no spawn positions for {0} agents")]
    NoPositions(usize),

    #[error("battery range {lo}..={hi} must lie within 0..=100 with lo <= hi")]
    InvalidBatteryRange { lo: u32, hi: u32 },

    #[error("task generation needs at least two workstations, found {0}")]
    NotEnoughWorkstations(usize),

    #[error("unknown priority {0:?} (expected high, medium or low)")]
    UnknownPriority(String),
}

pub type FleetResult<T> = Result<T, FleetError>;
