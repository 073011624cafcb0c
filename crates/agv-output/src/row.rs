//! Flat row types written by output backends.

use agv_core::{Event, Tick};
use agv_sim::{AgentSnapshot, TickReport};

/// One AGV at one snapshot tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSnapshotRow {
    pub tick:          u64,
    /// Display id, e.g. `AGV-001`.
    pub agent:         String,
    pub x:             u32,
    pub y:             u32,
    pub status:        &'static str,
    pub battery:       f64,
    /// Display id of the carried task; empty when none.
    pub task:          String,
    pub charging_trip: bool,
    /// Cells left on the route.
    pub remaining:     usize,
}

impl AgentSnapshotRow {
    pub fn new(tick: Tick, a: &AgentSnapshot) -> Self {
        Self {
            tick:          tick.0,
            agent:         a.id.to_string(),
            x:             a.position.x,
            y:             a.position.y,
            status:        a.status.as_str(),
            battery:       a.battery,
            task:          a.current_task.map(|t| t.to_string()).unwrap_or_default(),
            charging_trip: a.charging_trip,
            remaining:     a.remaining,
        }
    }
}

/// What happened in one tick, plus fleet and board totals after it.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummaryRow {
    pub tick:         u64,
    pub moved:        usize,
    pub assigned:     usize,
    pub completed:    usize,
    pub failed:       usize,
    /// Perturbation that fired this tick; empty when none.
    pub perturbation: &'static str,
    pub idle:         usize,
    pub active:       usize,
    pub charging:     usize,
    pub maintenance:  usize,
    pub mean_battery: f64,
    pub pending:      usize,
    pub in_progress:  usize,
    pub done:         usize,
}

impl From<&TickReport> for TickSummaryRow {
    fn from(r: &TickReport) -> Self {
        Self {
            tick:         r.tick.0,
            moved:        r.moved,
            assigned:     r.assigned,
            completed:    r.completed,
            failed:       r.failed,
            perturbation: r.perturbation.map(|k| k.as_str()).unwrap_or(""),
            idle:         r.idle,
            active:       r.active,
            charging:     r.charging,
            maintenance:  r.maintenance,
            mean_battery: r.mean_battery,
            pending:      r.tasks.pending,
            in_progress:  r.tasks.in_progress,
            done:         r.tasks.completed,
        }
    }
}

/// One event-log line.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub tick:     u64,
    pub severity: &'static str,
    pub message:  String,
}

impl From<&Event> for EventRow {
    fn from(e: &Event) -> Self {
        Self { tick: e.tick.0, severity: e.severity.as_str(), message: e.message.clone() }
    }
}
