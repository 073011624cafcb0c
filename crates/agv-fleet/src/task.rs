//! Transport tasks and their lifecycle.
//!
//! ```text
//!   Pending ──start_by──► InProgress ──complete──► Completed
//!     │  ▲                    │
//!     │  └────interrupt───────┤
//!     │                       └──fail──► Failed
//!     ├──fail──► Failed
//!     └──cancel──► Cancelled
//! ```

use std::fmt;
use std::str::FromStr;

use agv_core::{AgentId, Coord, TaskId, Tick};

use crate::error::{FleetError, FleetResult};

// ── Priority ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Ordering key: higher rank is served first.
    #[inline]
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    /// Urgency points used by the weighted scheduler.
    #[inline]
    pub fn points(self) -> f64 {
        match self {
            Priority::High => 10.0,
            Priority::Medium => 5.0,
            Priority::Low => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl FromStr for Priority {
    type Err = FleetError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(FleetError::UnknownPriority(other.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── State ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskState {
    Pending,
    /// `progress` is a percentage in `[0, 100)`.
    InProgress { agent: AgentId, progress: f64 },
    Completed { agent: AgentId, at: Tick },
    Failed { reason: String },
    Cancelled,
}

/// Flat projection of [`TaskState`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TaskState {
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskState::Pending => TaskStatus::Pending,
            TaskState::InProgress { .. } => TaskStatus::InProgress,
            TaskState::Completed { .. } => TaskStatus::Completed,
            TaskState::Failed { .. } => TaskStatus::Failed,
            TaskState::Cancelled => TaskStatus::Cancelled,
        }
    }
}

// ── Task ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    pub id:         TaskId,
    /// Pickup cell.
    pub start:      Coord,
    /// Drop-off cell.
    pub end:        Coord,
    pub priority:   Priority,
    pub created_at: Tick,
    pub deadline:   Option<Tick>,
    /// Injected by a perturbation event rather than generated up front.
    pub emergency:  bool,
    started_at:     Option<Tick>,
    state:          TaskState,
}

impl Task {
    pub fn new(id: TaskId, start: Coord, end: Coord, priority: Priority, created_at: Tick) -> Self {
        Self {
            id,
            start,
            end,
            priority,
            created_at,
            deadline: None,
            emergency: false,
            started_at: None,
            state: TaskState::Pending,
        }
    }

    pub fn with_deadline(mut self, deadline: Tick) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn as_emergency(mut self) -> Self {
        self.emergency = true;
        self
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    pub fn status(&self) -> TaskStatus {
        self.state.status()
    }

    pub fn is_pending(&self) -> bool {
        self.state == TaskState::Pending
    }

    /// Completed, Failed or Cancelled.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            TaskState::Completed { .. } | TaskState::Failed { .. } | TaskState::Cancelled
        )
    }

    pub fn assigned_agent(&self) -> Option<AgentId> {
        match self.state {
            TaskState::InProgress { agent, .. } | TaskState::Completed { agent, .. } => Some(agent),
            _ => None,
        }
    }

    /// Percentage done: 100 once completed, 0 unless in progress.
    pub fn progress(&self) -> f64 {
        match self.state {
            TaskState::InProgress { progress, .. } => progress,
            TaskState::Completed { .. } => 100.0,
            _ => 0.0,
        }
    }

    /// Tick the current (or last successful) assignment began.
    pub fn started_at(&self) -> Option<Tick> {
        self.started_at
    }

    /// Ticks spent waiting before the assignment that is current or finished.
    pub fn wait_ticks(&self) -> Option<u64> {
        self.started_at.map(|t| t.since(self.created_at))
    }

    // ── Transitions ───────────────────────────────────────────────────────

    fn reject(&self, action: &'static str) -> FleetError {
        FleetError::TaskTransition { task: self.id, from: self.status(), action }
    }

    /// Pending → InProgress.
    pub fn start_by(&mut self, agent: AgentId, now: Tick) -> FleetResult<()> {
        if !self.is_pending() {
            return Err(self.reject("be assigned"));
        }
        self.state = TaskState::InProgress { agent, progress: 0.0 };
        self.started_at = Some(now);
        Ok(())
    }

    /// Update the progress of an in-progress task, clamped below 100.
    pub fn set_progress(&mut self, pct: f64) -> FleetResult<()> {
        if let TaskState::InProgress { progress, .. } = &mut self.state {
            *progress = pct.clamp(0.0, 99.9);
            return Ok(());
        }
        Err(self.reject("report progress"))
    }

    /// InProgress → Pending.
    pub fn interrupt(&mut self) -> FleetResult<()> {
        if !matches!(self.state, TaskState::InProgress { .. }) {
            return Err(self.reject("be interrupted"));
        }
        self.state = TaskState::Pending;
        self.started_at = None;
        Ok(())
    }

    /// InProgress → Completed.
    pub fn complete(&mut self, now: Tick) -> FleetResult<()> {
        let TaskState::InProgress { agent, .. } = self.state else {
            return Err(self.reject("complete"));
        };
        self.state = TaskState::Completed { agent, at: now };
        Ok(())
    }

    /// Pending | InProgress → Failed.
    pub fn fail(&mut self, reason: impl Into<String>) -> FleetResult<()> {
        if !matches!(self.state, TaskState::Pending | TaskState::InProgress { .. }) {
            return Err(self.reject("fail"));
        }
        self.state = TaskState::Failed { reason: reason.into() };
        Ok(())
    }

    /// Pending → Cancelled.
    pub fn cancel(&mut self) -> FleetResult<()> {
        if !self.is_pending() {
            return Err(self.reject("be cancelled"));
        }
        self.state = TaskState::Cancelled;
        Ok(())
    }
}
