//! Read-only views handed to the presentation layer.

use std::fmt;

use agv_core::{AgentId, Coord, Event, Severity, TaskId, Tick};
use agv_fleet::{Agent, AgentStatus, Fleet, Priority, Task, TaskBoard, TaskCounts, TaskStatus};
use serde::Serialize;

use crate::perturb::PerturbationKind;

/// Run lifecycle.
///
/// ```text
/// Ready ──start──► Running ──pause──► Paused ──resume──► Running
///   │                 │                  │
///   └─────stop────────┴──────stop────────┴──► Stopped
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Ready,
    Running,
    Paused,
    Stopped,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunState::Ready => "ready",
            RunState::Running => "running",
            RunState::Paused => "paused",
            RunState::Stopped => "stopped",
        })
    }
}

/// Why a run ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndReason {
    /// Every task completed, failed or was cancelled.
    AllTasksDone,
    /// Open tasks remain but every AGV is in maintenance.
    FleetDown,
    /// Nothing is moving, charging or being assigned, so nothing will change.
    Stalled,
    TickLimit,
    /// Explicit stop command.
    Stopped,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EndReason::AllTasksDone => "all tasks done",
            EndReason::FleetDown => "fleet down",
            EndReason::Stalled => "stalled",
            EndReason::TickLimit => "tick limit",
            EndReason::Stopped => "stopped",
        })
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentSnapshot {
    pub id:            AgentId,
    pub position:      Coord,
    pub status:        AgentStatus,
    pub battery:       f64,
    pub current_task:  Option<TaskId>,
    pub charging_trip: bool,
    pub remaining:     usize,
}

impl From<&Agent> for AgentSnapshot {
    fn from(a: &Agent) -> Self {
        Self {
            id:            a.id,
            position:      a.position,
            status:        a.status(),
            battery:       a.battery(),
            current_task:  a.current_task(),
            charging_trip: a.is_charging_trip(),
            remaining:     a.path().len(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskSnapshot {
    pub id:             TaskId,
    pub start:          Coord,
    pub end:            Coord,
    pub status:         TaskStatus,
    pub priority:       Priority,
    pub assigned_agent: Option<AgentId>,
    pub progress:       f64,
    pub deadline:       Option<Tick>,
    pub emergency:      bool,
}

impl From<&Task> for TaskSnapshot {
    fn from(t: &Task) -> Self {
        Self {
            id:             t.id,
            start:          t.start,
            end:            t.end,
            status:         t.status(),
            priority:       t.priority,
            assigned_agent: t.assigned_agent(),
            progress:       t.progress(),
            deadline:       t.deadline,
            emergency:      t.emergency,
        }
    }
}

/// Full state at one tick plus the events logged since the previous
/// snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick:         Tick,
    pub elapsed_secs: u64,
    pub state:        RunState,
    pub agents:       Vec<AgentSnapshot>,
    pub tasks:        Vec<TaskSnapshot>,
    pub events:       Vec<Event>,
}

impl Snapshot {
    pub(crate) fn capture(
        tick: Tick,
        elapsed_secs: u64,
        state: RunState,
        fleet: &Fleet,
        tasks: &TaskBoard,
        events: Vec<Event>,
    ) -> Self {
        Self {
            tick,
            elapsed_secs,
            state,
            agents: fleet.iter().map(AgentSnapshot::from).collect(),
            tasks: tasks.iter().map(TaskSnapshot::from).collect(),
            events,
        }
    }
}

// ── Per-tick report ───────────────────────────────────────────────────────────

/// What one tick did, plus fleet and board totals after it.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub tick:         Tick,
    /// AGVs that advanced one cell.
    pub moved:        usize,
    pub assigned:     usize,
    pub completed:    usize,
    pub failed:       usize,
    pub perturbation: Option<PerturbationKind>,
    pub idle:         usize,
    pub active:       usize,
    pub charging:     usize,
    pub maintenance:  usize,
    pub mean_battery: f64,
    pub tasks:        TaskCounts,
}

impl TickReport {
    pub(crate) fn tally(&mut self, fleet: &Fleet, tasks: &TaskBoard) {
        self.idle = fleet.count(AgentStatus::Idle);
        self.active = fleet.count(AgentStatus::Active);
        self.charging = fleet.count(AgentStatus::Charging);
        self.maintenance = fleet.count(AgentStatus::Maintenance);
        self.mean_battery = if fleet.is_empty() {
            0.0
        } else {
            fleet.iter().map(Agent::battery).sum::<f64>() / fleet.len() as f64
        };
        self.tasks = tasks.counts();
    }
}

// ── Run summary ───────────────────────────────────────────────────────────────

/// End-of-run statistics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub ticks:              u64,
    pub elapsed_secs:       u64,
    pub end_reason:         Option<EndReason>,
    pub total_tasks:        usize,
    pub completed:          usize,
    pub failed:             usize,
    pub cancelled:          usize,
    /// Pending or in progress when the run ended.
    pub open:               usize,
    pub average_wait_ticks: Option<f64>,
    /// Share of agent-ticks spent Active, in percent.
    pub utilization_pct:    f64,
    pub agents:             usize,
    pub in_maintenance:     usize,
    pub warnings:           usize,
    pub errors:             usize,
}

impl RunSummary {
    pub(crate) fn compute(
        ticks: u64,
        elapsed_secs: u64,
        end_reason: Option<EndReason>,
        fleet: &Fleet,
        tasks: &TaskBoard,
        events: &agv_core::EventLog,
    ) -> Self {
        let counts = tasks.counts();
        let agent_ticks = ticks * fleet.len() as u64;
        let utilization_pct = if agent_ticks == 0 {
            0.0
        } else {
            fleet.total_active_ticks() as f64 / agent_ticks as f64 * 100.0
        };
        Self {
            ticks,
            elapsed_secs,
            end_reason,
            total_tasks: counts.total(),
            completed: counts.completed,
            failed: counts.failed,
            cancelled: counts.cancelled,
            open: counts.open(),
            average_wait_ticks: tasks.average_wait_ticks(),
            utilization_pct,
            agents: fleet.len(),
            in_maintenance: fleet.count(AgentStatus::Maintenance),
            warnings: events.count(Severity::Warning),
            errors: events.count(Severity::Error),
        }
    }

    /// Completed share of all tasks, in percent.
    pub fn completion_pct(&self) -> f64 {
        if self.total_tasks == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total_tasks as f64 * 100.0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ticks, {}/{} tasks completed ({:.1}%), {} failed, {} open, utilization {:.1}%",
            self.ticks,
            self.completed,
            self.total_tasks,
            self.completion_pct(),
            self.failed,
            self.open,
            self.utilization_pct,
        )?;
        if let Some(wait) = self.average_wait_ticks {
            write!(f, ", mean wait {wait:.1} ticks")?;
        }
        Ok(())
    }
}
