//! Assignment policies and the weighted-score configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};

/// How pending tasks are paired with available agents.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Oldest task first.
    #[default]
    Fifo,
    /// Highest priority first, oldest first within a priority.
    Priority,
    /// Each agent takes the task whose pickup is closest.
    Nearest,
    /// Earliest deadline first; tasks without one follow in creation order.
    Deadline,
    /// Best composite score of urgency, distance and battery.
    #[serde(alias = "custom")]
    Weighted,
}

impl Policy {
    pub const ALL: [Policy; 5] =
        [Policy::Fifo, Policy::Priority, Policy::Nearest, Policy::Deadline, Policy::Weighted];

    pub fn as_str(self) -> &'static str {
        match self {
            Policy::Fifo => "fifo",
            Policy::Priority => "priority",
            Policy::Nearest => "nearest",
            Policy::Deadline => "deadline",
            Policy::Weighted => "weighted",
        }
    }
}

impl FromStr for Policy {
    type Err = ScheduleError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(Policy::Fifo),
            "priority" => Ok(Policy::Priority),
            "nearest" => Ok(Policy::Nearest),
            "deadline" => Ok(Policy::Deadline),
            "weighted" | "custom" => Ok(Policy::Weighted),
            other => Err(ScheduleError::UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Weights ───────────────────────────────────────────────────────────────────

/// Relative importance of the three score components under
/// [`Policy::Weighted`].  Only the ratios matter.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub urgency:  f64,
    pub distance: f64,
    pub battery:  f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self { urgency: 5.0, distance: 3.0, battery: 4.0 }
    }
}

impl Weights {
    pub fn new(urgency: f64, distance: f64, battery: f64) -> Self {
        Self { urgency, distance, battery }
    }

    pub fn sum(&self) -> f64 {
        self.urgency + self.distance + self.battery
    }

    /// Every weight finite and non-negative, at least one positive.
    pub fn validate(&self) -> ScheduleResult<()> {
        let parts = [self.urgency, self.distance, self.battery];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) || self.sum() <= 0.0 {
            return Err(ScheduleError::InvalidWeights {
                urgency:  self.urgency,
                distance: self.distance,
                battery:  self.battery,
            });
        }
        Ok(())
    }

    /// Weighted mean of the component scores.
    #[inline]
    pub fn combine(&self, urgency: f64, distance: f64, battery: f64) -> f64 {
        (urgency * self.urgency + distance * self.distance + battery * self.battery) / self.sum()
    }
}
