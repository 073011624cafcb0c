//! One AGV: position, battery, queued route and lifecycle state.
//!
//! ```text
//!            assign                   route exhausted + complete_errand
//!   Idle ───────────────► Active(Task) ─────────────────────────────► Idle
//!    │                        │
//!    │ begin_charging_trip    │ begin_charging_trip (task handed back)
//!    ▼                        ▼
//!   Active(ChargingTrip) ──start_charging──► Charging ──finish_charging──► Idle
//!
//!   any non-Maintenance state ──break_down──► Maintenance (terminal)
//! ```

use std::collections::VecDeque;
use std::fmt;

use agv_core::{AgentId, Coord, TaskId};

use crate::error::{FleetError, FleetResult};

pub const BATTERY_MAX: f64 = 100.0;

// ── State ─────────────────────────────────────────────────────────────────────

/// Why an agent was taken out of service.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MaintenanceCause {
    BatteryDepleted,
    Breakdown,
}

/// What an Active agent is doing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Errand {
    /// Carrying `task`; `loaded` once the pickup cell has been reached.
    Task { task: TaskId, loaded: bool },
    /// Driving to a charging station.
    ChargingTrip,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentState {
    #[default]
    Idle,
    Active(Errand),
    Charging,
    Maintenance(MaintenanceCause),
}

/// Flat projection of [`AgentState`] for snapshots and counters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AgentStatus {
    Idle,
    Active,
    Charging,
    Maintenance,
}

impl AgentStatus {
    pub const ALL: [AgentStatus; 4] =
        [AgentStatus::Idle, AgentStatus::Active, AgentStatus::Charging, AgentStatus::Maintenance];

    pub fn as_str(self) -> &'static str {
        match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Active => "active",
            AgentStatus::Charging => "charging",
            AgentStatus::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AgentState {
    pub fn status(self) -> AgentStatus {
        match self {
            AgentState::Idle => AgentStatus::Idle,
            AgentState::Active(_) => AgentStatus::Active,
            AgentState::Charging => AgentStatus::Charging,
            AgentState::Maintenance(_) => AgentStatus::Maintenance,
        }
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Agent {
    pub id:           AgentId,
    pub position:     Coord,
    battery:          f64,
    state:            AgentState,
    /// Cells still to visit, next first.  Never contains `position`.
    path:             VecDeque<Coord>,
    /// Route length at assignment (adjusted on re-plan); the progress base.
    route_len:        usize,
    /// Ticks spent Active, for utilization.
    pub active_ticks: u64,
}

impl Agent {
    pub fn new(id: AgentId, position: Coord, battery: f64) -> Self {
        Self {
            id,
            position,
            battery: battery.clamp(0.0, BATTERY_MAX),
            state: AgentState::Idle,
            path: VecDeque::new(),
            route_len: 0,
            active_ticks: 0,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn battery(&self) -> f64 {
        self.battery
    }

    #[inline]
    pub fn state(&self) -> AgentState {
        self.state
    }

    #[inline]
    pub fn status(&self) -> AgentStatus {
        self.state.status()
    }

    pub fn path(&self) -> &VecDeque<Coord> {
        &self.path
    }

    /// Final cell of the queued route.
    pub fn destination(&self) -> Option<Coord> {
        self.path.back().copied()
    }

    pub fn next_cell(&self) -> Option<Coord> {
        self.path.front().copied()
    }

    pub fn current_task(&self) -> Option<TaskId> {
        match self.state {
            AgentState::Active(Errand::Task { task, .. }) => Some(task),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, AgentState::Active(Errand::Task { loaded: true, .. }))
    }

    pub fn is_charging_trip(&self) -> bool {
        self.state == AgentState::Active(Errand::ChargingTrip)
    }

    /// Not in maintenance.
    pub fn is_operational(&self) -> bool {
        !matches!(self.state, AgentState::Maintenance(_))
    }

    /// Idle with strictly more than `min_battery` charge.
    pub fn is_available(&self, min_battery: f64) -> bool {
        self.state == AgentState::Idle && self.battery > min_battery
    }

    /// Share of the current route already driven, in `[0, 100)` while
    /// cells remain.
    pub fn route_progress(&self) -> f64 {
        if self.route_len == 0 {
            return 0.0;
        }
        let driven = self.route_len.saturating_sub(self.path.len());
        driven as f64 / self.route_len as f64 * 100.0
    }

    // ── Transitions ───────────────────────────────────────────────────────

    fn reject(&self, action: &'static str) -> FleetError {
        FleetError::InvalidTransition { agent: self.id, from: self.status(), action }
    }

    fn load_route(&mut self, route: Vec<Coord>) {
        self.route_len = route.len();
        self.path = route.into();
    }

    /// Idle → Active(Task).  `route` excludes the current cell.
    pub fn assign(&mut self, task: TaskId, route: Vec<Coord>, loaded: bool) -> FleetResult<()> {
        if self.state != AgentState::Idle {
            return Err(self.reject("take a task"));
        }
        self.state = AgentState::Active(Errand::Task { task, loaded });
        self.load_route(route);
        Ok(())
    }

    /// Mark the carried task as picked up.
    pub fn load(&mut self) {
        if let AgentState::Active(Errand::Task { loaded, .. }) = &mut self.state {
            *loaded = true;
        }
    }

    /// Idle | Active(Task) → Active(ChargingTrip).
    ///
    /// Returns the task that was interrupted, if any; the caller owns putting
    /// it back on the board.
    pub fn begin_charging_trip(&mut self, route: Vec<Coord>) -> FleetResult<Option<TaskId>> {
        let interrupted = match self.state {
            AgentState::Idle => None,
            AgentState::Active(Errand::Task { task, .. }) => Some(task),
            _ => return Err(self.reject("head to a charger")),
        };
        self.state = AgentState::Active(Errand::ChargingTrip);
        self.load_route(route);
        Ok(interrupted)
    }

    /// Active(ChargingTrip) | Idle → Charging.  The agent must be parked.
    pub fn start_charging(&mut self) -> FleetResult<()> {
        match self.state {
            AgentState::Active(Errand::ChargingTrip) | AgentState::Idle if self.path.is_empty() => {
                self.state = AgentState::Charging;
                self.route_len = 0;
                Ok(())
            }
            _ => Err(self.reject("start charging")),
        }
    }

    /// Charging → Idle.
    pub fn finish_charging(&mut self) -> FleetResult<()> {
        if self.state != AgentState::Charging {
            return Err(self.reject("finish charging"));
        }
        self.state = AgentState::Idle;
        Ok(())
    }

    /// Active(Task) with an exhausted route → Idle.  Returns the delivered task.
    pub fn complete_errand(&mut self) -> FleetResult<TaskId> {
        match self.state {
            AgentState::Active(Errand::Task { task, .. }) if self.path.is_empty() => {
                self.state = AgentState::Idle;
                self.route_len = 0;
                Ok(task)
            }
            _ => Err(self.reject("complete an errand")),
        }
    }

    /// Any state → Maintenance.  Drops the route and returns the carried task.
    ///
    /// Already in maintenance: nothing changes and `None` is returned.
    pub fn break_down(&mut self, cause: MaintenanceCause) -> Option<TaskId> {
        if !self.is_operational() {
            return None;
        }
        let task = self.current_task();
        self.state = AgentState::Maintenance(cause);
        self.path.clear();
        self.route_len = 0;
        task
    }

    /// Replace the remaining route of an Active agent, keeping its errand.
    pub fn reroute(&mut self, route: Vec<Coord>) -> FleetResult<()> {
        if !matches!(self.state, AgentState::Active(_)) {
            return Err(self.reject("re-plan"));
        }
        let driven = self.route_len.saturating_sub(self.path.len());
        self.route_len = driven + route.len();
        self.path = route.into();
        Ok(())
    }

    /// Active → Idle without finishing, e.g. when the route is cut off.
    /// Returns the task that was being carried.
    pub fn abandon_errand(&mut self) -> FleetResult<Option<TaskId>> {
        if !matches!(self.state, AgentState::Active(_)) {
            return Err(self.reject("abandon its errand"));
        }
        let task = self.current_task();
        self.state = AgentState::Idle;
        self.path.clear();
        self.route_len = 0;
        Ok(task)
    }

    // ── Per-tick updates ──────────────────────────────────────────────────

    /// Move one cell along the route.  Only Active agents move.
    pub fn step(&mut self) -> Option<Coord> {
        if !matches!(self.state, AgentState::Active(_)) {
            return None;
        }
        let next = self.path.pop_front()?;
        self.position = next;
        Some(next)
    }

    /// Lose `rate` charge, floored at 0.  Returns the new level.
    pub fn drain(&mut self, rate: f64) -> f64 {
        self.battery = (self.battery - rate).max(0.0);
        self.battery
    }

    /// Gain `rate` charge, capped at 100.  Returns the new level.
    pub fn charge(&mut self, rate: f64) -> f64 {
        self.battery = (self.battery + rate).min(BATTERY_MAX);
        self.battery
    }

    /// Sudden drop by `amount`, never below `floor` (and never upward).
    pub fn battery_spike(&mut self, amount: f64, floor: f64) -> f64 {
        self.battery = (self.battery - amount).max(floor.min(self.battery)).max(0.0);
        self.battery
    }
}
