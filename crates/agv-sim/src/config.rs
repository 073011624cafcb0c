//! Run configuration and the three canned scenarios.

use std::fmt;
use std::str::FromStr;

use agv_core::time::SPEED_RANGE;
use agv_core::{check_range, CoreError};
use agv_grid::Algorithm;
use agv_schedule::{Policy, Weights};
use serde::{Deserialize, Serialize};

use crate::{SimError, SimResult};

/// Upper bound on fleet size.
pub const MAX_AGENTS: usize = 64;
/// Upper bound on the initial task count.
pub const MAX_TASKS: usize = 500;
/// Upper bound on `deadline_horizon_hours` (ten years).
pub const MAX_DEADLINE_HORIZON_HOURS: u64 = 87_600;

/// What happens to a carried task when its AGV drops out of service.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterruptPolicy {
    /// Back to the queue for another AGV.
    #[default]
    RevertToPending,
    /// Marked failed.
    Fail,
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Every field has a default, so a TOML file only needs to name what it
/// changes.  Rates are per tick; battery values are percentages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Master seed for fleet batteries, task generation and perturbations.
    pub seed:                   u64,
    pub agent_count:            usize,
    pub task_count:             usize,
    pub policy:                 Policy,
    pub weights:                Weights,
    pub algorithm:              Algorithm,
    /// Chance in percent that a perturbation fires at each event interval.
    pub failure_rate:           f64,
    pub event_interval_ticks:   u64,
    pub battery_drain:          f64,
    pub charge_rate:            f64,
    /// A task carrier below this level heads to a charger.
    pub low_battery:            f64,
    /// An idle AGV needs strictly more than this to take a task.
    pub min_assign_battery:     f64,
    /// Crossing below this level logs a warning.
    pub battery_warning:        f64,
    pub tick_duration_secs:     u32,
    /// Playback multiplier for paced runs.
    pub speed:                  f64,
    pub max_ticks:              Option<u64>,
    pub interrupt_policy:       InterruptPolicy,
    /// Whole-percent range the initial charge is drawn from.
    pub initial_battery:        (u32, u32),
    /// Share of generated tasks that get a deadline, in `[0, 1]`.
    pub deadline_share:         f64,
    /// Deadlines fall uniformly within this many hours of creation.
    pub deadline_horizon_hours: u64,
    /// Emit a snapshot every N ticks; 0 disables snapshots.
    pub snapshot_interval:      u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:                   42,
            agent_count:            5,
            task_count:             10,
            policy:                 Policy::Fifo,
            weights:                Weights::default(),
            algorithm:              Algorithm::Dijkstra,
            failure_rate:           5.0,
            event_interval_ticks:   60,
            battery_drain:          0.2,
            charge_rate:            0.5,
            low_battery:            15.0,
            min_assign_battery:     20.0,
            battery_warning:        20.0,
            tick_duration_secs:     1,
            speed:                  2.0,
            max_ticks:              None,
            interrupt_policy:       InterruptPolicy::RevertToPending,
            initial_battery:        (85, 100),
            deadline_share:         0.0,
            deadline_horizon_hours: 120,
            snapshot_interval:      1,
        }
    }
}

impl SimConfig {
    /// Reject out-of-range settings.  Nothing is modified.
    pub fn validate(&self) -> SimResult<()> {
        check_range("agent_count", self.agent_count, 1..=MAX_AGENTS)?;
        check_range("task_count", self.task_count, 0..=MAX_TASKS)?;
        check_range("failure_rate", self.failure_rate, 0.0..=100.0)?;
        check_range("event_interval_ticks", self.event_interval_ticks, 1..=u64::MAX)?;
        check_range("battery_drain", self.battery_drain, 0.0..=100.0)?;
        check_range("charge_rate", self.charge_rate, 0.0..=100.0)?;
        // A zero rate leaves an AGV driving or charging forever.
        for (what, rate) in [("battery_drain", self.battery_drain), ("charge_rate", self.charge_rate)] {
            if rate <= 0.0 {
                return Err(SimError::Config(format!("{what} must be positive, got {rate}")));
            }
        }
        check_range("low_battery", self.low_battery, 0.0..=100.0)?;
        check_range("min_assign_battery", self.min_assign_battery, 0.0..=100.0)?;
        check_range("battery_warning", self.battery_warning, 0.0..=100.0)?;
        check_range("tick_duration_secs", self.tick_duration_secs, 1..=86_400)?;
        check_range("speed", self.speed, SPEED_RANGE)?;
        check_range("deadline_share", self.deadline_share, 0.0..=1.0)?;
        check_range(
            "deadline_horizon_hours",
            self.deadline_horizon_hours,
            1..=MAX_DEADLINE_HORIZON_HOURS,
        )?;

        let (lo, hi) = self.initial_battery;
        if lo > hi || hi > 100 {
            return Err(CoreError::Config(format!(
                "initial_battery {lo}..={hi} must lie within 0..=100 with lo <= hi"
            ))
            .into());
        }
        if self.max_ticks == Some(0) {
            return Err(SimError::Config("max_ticks must be positive when set".into()));
        }
        self.weights.validate()?;
        Ok(())
    }

    /// Copy a scenario's four settings over this config.
    pub fn apply(&mut self, scenario: &Scenario) {
        self.agent_count = scenario.agent_count;
        self.task_count = scenario.task_count;
        self.policy = scenario.policy;
        self.failure_rate = scenario.failure_rate;
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

/// The settings an `apply_scenario` command changes.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub agent_count:  usize,
    pub task_count:   usize,
    pub policy:       Policy,
    pub failure_rate: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioPreset {
    Basic,
    HighLoad,
    FaultResponse,
}

impl ScenarioPreset {
    pub const ALL: [ScenarioPreset; 3] =
        [ScenarioPreset::Basic, ScenarioPreset::HighLoad, ScenarioPreset::FaultResponse];

    pub fn scenario(self) -> Scenario {
        let (agent_count, task_count, policy, failure_rate) = match self {
            ScenarioPreset::Basic => (5, 10, Policy::Fifo, 5.0),
            ScenarioPreset::HighLoad => (8, 20, Policy::Priority, 10.0),
            ScenarioPreset::FaultResponse => (3, 8, Policy::Nearest, 20.0),
        };
        Scenario { agent_count, task_count, policy, failure_rate }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioPreset::Basic => "basic",
            ScenarioPreset::HighLoad => "high-load",
            ScenarioPreset::FaultResponse => "fault-response",
        }
    }
}

impl From<ScenarioPreset> for Scenario {
    fn from(preset: ScenarioPreset) -> Self {
        preset.scenario()
    }
}

impl FromStr for ScenarioPreset {
    type Err = SimError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "basic" => Ok(ScenarioPreset::Basic),
            "high-load" | "highload" => Ok(ScenarioPreset::HighLoad),
            "fault-response" | "faultresponse" | "fault" => Ok(ScenarioPreset::FaultResponse),
            other => Err(SimError::UnknownScenario(other.to_string())),
        }
    }
}

impl fmt::Display for ScenarioPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
