//! Perturbation events: random faults and their manually injected twins.

use std::fmt;
use std::str::FromStr;

use agv_core::AgentId;
use serde::{Deserialize, Serialize};

use crate::SimError;

/// Battery lost to a random spike.
pub const RANDOM_SPIKE: f64 = 20.0;
/// Battery lost to an injected spike.
pub const INJECTED_SPIKE: f64 = 30.0;
/// A spike never takes the battery below this.
pub const SPIKE_FLOOR: f64 = 5.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerturbationKind {
    /// An obstacle appears on the target's remaining route.
    Obstacle,
    /// The target loses a chunk of charge.
    BatterySpike,
    /// The target breaks down.
    Breakdown,
    /// A high-priority task is created between two workstations.
    #[serde(alias = "high-priority")]
    EmergencyTask,
}

impl PerturbationKind {
    pub const ALL: [PerturbationKind; 4] = [
        PerturbationKind::Obstacle,
        PerturbationKind::BatterySpike,
        PerturbationKind::Breakdown,
        PerturbationKind::EmergencyTask,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PerturbationKind::Obstacle => "obstacle",
            PerturbationKind::BatterySpike => "battery-spike",
            PerturbationKind::Breakdown => "breakdown",
            PerturbationKind::EmergencyTask => "emergency-task",
        }
    }
}

impl FromStr for PerturbationKind {
    type Err = SimError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "obstacle" => Ok(PerturbationKind::Obstacle),
            "battery" | "battery-spike" => Ok(PerturbationKind::BatterySpike),
            "breakdown" => Ok(PerturbationKind::Breakdown),
            "high-priority" | "highpriority" | "emergency" | "emergency-task" => {
                Ok(PerturbationKind::EmergencyTask)
            }
            other => Err(SimError::UnknownEventKind(other.to_string())),
        }
    }
}

impl fmt::Display for PerturbationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which AGV an injected event hits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// A random Active AGV.
    #[default]
    Random,
    Agent(AgentId),
}

impl FromStr for EventTarget {
    type Err = SimError;

    /// `random`, or a display id such as `AGV-003`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim().to_ascii_uppercase();
        if t == "RANDOM" {
            return Ok(EventTarget::Random);
        }
        t.strip_prefix("AGV-")
            .and_then(|n| n.parse::<u32>().ok())
            .and_then(|n| n.checked_sub(1))
            .map(|n| EventTarget::Agent(AgentId(n)))
            .ok_or_else(|| SimError::UnknownTarget(s.to_string()))
    }
}

impl fmt::Display for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTarget::Random => f.write_str("random"),
            EventTarget::Agent(id) => write!(f, "{id}"),
        }
    }
}
