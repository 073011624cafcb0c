//! The assignment round.

use std::cmp::{Ordering, Reverse};

use agv_core::{AgentId, Coord, SimClock, TaskId, Tick};
use agv_fleet::{Agent, Fleet, Task, TaskBoard};
use agv_grid::{GridMap, PathFinder};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::ScheduleResult;
use crate::policy::{Policy, Weights};

/// Minimum battery (exclusive) for an agent to take new work.
pub const DEFAULT_MIN_BATTERY: f64 = 20.0;
/// Distance at which the weighted distance score bottoms out.
pub const DEFAULT_MAX_DISTANCE: f64 = 100.0;
/// Deadlines closer than this earn full urgency points.
const DEADLINE_URGENT_HOURS: u64 = 24;

// ── Round ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub task:      TaskId,
    pub agent:     AgentId,
    /// Cells queued on the agent.
    pub route_len: usize,
    /// Composite score, set under the weighted policy only.
    pub score:     Option<f64>,
}

/// Outcome of one [`Scheduler::assign`] call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Round {
    pub assignments: Vec<Assignment>,
    /// Pairings skipped because the agent cannot reach the pickup cell.
    pub unreachable: Vec<(TaskId, AgentId)>,
    /// Tasks whose drop-off cannot be reached from their pickup cell.
    pub infeasible:  Vec<TaskId>,
}

impl Round {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty() && self.unreachable.is_empty() && self.infeasible.is_empty()
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Scheduler {
    pub policy:       Policy,
    pub weights:      Weights,
    pub min_battery:  f64,
    pub max_distance: f64,
    /// Deadlines within this many ticks count as urgent.
    urgent_window:    u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(Policy::default())
    }
}

/// The delivery leg of a task, computed once per round.
type LegCache = FxHashMap<TaskId, Option<Vec<Coord>>>;

impl Scheduler {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            weights: Weights::default(),
            min_battery: DEFAULT_MIN_BATTERY,
            max_distance: DEFAULT_MAX_DISTANCE,
            urgent_window: SimClock::new(1).ticks_for_hours(DEADLINE_URGENT_HOURS),
        }
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_min_battery(mut self, min_battery: f64) -> Self {
        self.min_battery = min_battery;
        self
    }

    /// Scale the urgent-deadline window to the clock resolution.
    pub fn with_tick_duration(mut self, tick_duration_secs: u32) -> Self {
        self.urgent_window = SimClock::new(tick_duration_secs).ticks_for_hours(DEADLINE_URGENT_HOURS);
        self
    }

    // ── Scoring ───────────────────────────────────────────────────────────

    /// Deadline urgency points: 10 inside the urgent window, 5 beyond it,
    /// 0 without a deadline.  Overdue counts as urgent.
    pub fn deadline_points(&self, task: &Task, now: Tick) -> f64 {
        match task.deadline {
            Some(d) if d.since(now) <= self.urgent_window => 10.0,
            Some(_) => 5.0,
            None => 0.0,
        }
    }

    /// Composite score of giving `task` to `agent`, in `[0, 10]`.
    pub fn score(&self, task: &Task, agent: &Agent, now: Tick) -> f64 {
        let urgency = (task.priority.points() + self.deadline_points(task, now)) / 2.0;
        let d = agent.position.manhattan(task.start) as f64;
        let distance = (10.0 * (1.0 - d / self.max_distance)).max(0.0);
        let battery = agent.battery() / 10.0;
        self.weights.combine(urgency, distance, battery)
    }

    // ── Round ─────────────────────────────────────────────────────────────

    /// Pair pending tasks with available agents and start each pairing.
    ///
    /// Errors only on an out-of-bounds coordinate or an inconsistent
    /// board/fleet; a round with nothing to do is an empty [`Round`].
    pub fn assign<F>(
        &self,
        tasks: &mut TaskBoard,
        fleet: &mut Fleet,
        grid: &GridMap,
        finder: &F,
        now: Tick,
    ) -> ScheduleResult<Round>
    where
        F: PathFinder + ?Sized,
    {
        let pending = tasks.pending();
        let agents = fleet.available(self.min_battery);
        let mut round = Round::default();
        if pending.is_empty() || agents.is_empty() {
            return Ok(round);
        }

        let mut legs = LegCache::default();
        let mut used_tasks: FxHashSet<TaskId> = FxHashSet::default();
        let mut used_agents: FxHashSet<AgentId> = FxHashSet::default();

        for (task_id, agent_id, score) in self.candidates(tasks, fleet, &pending, &agents, now) {
            if used_tasks.contains(&task_id) || used_agents.contains(&agent_id) {
                continue;
            }
            let task = &tasks[task_id];
            let Some(delivery) = delivery_leg(&mut legs, grid, finder, task)? else {
                if used_tasks.insert(task_id) {
                    round.infeasible.push(task_id);
                }
                continue;
            };
            let agent = &fleet[agent_id];
            let Some(route) = plan_route(grid, finder, agent.position, task.start, delivery)? else {
                round.unreachable.push((task_id, agent_id));
                continue;
            };
            let loaded = agent.position == task.start;

            let route_len = route.len();
            tasks.task_mut(task_id)?.start_by(agent_id, now)?;
            fleet.agent_mut(agent_id)?.assign(task_id, route, loaded)?;
            used_tasks.insert(task_id);
            used_agents.insert(agent_id);
            log::debug!("{} assigned {task_id} to {agent_id} ({route_len} cells)", self.policy);
            round.assignments.push(Assignment { task: task_id, agent: agent_id, route_len, score });
        }
        Ok(round)
    }

    /// Every (task, agent) pairing worth trying, best first.
    fn candidates(
        &self,
        tasks: &TaskBoard,
        fleet: &Fleet,
        pending: &[TaskId],
        agents: &[AgentId],
        now: Tick,
    ) -> Vec<(TaskId, AgentId, Option<f64>)> {
        match self.policy {
            Policy::Fifo | Policy::Priority | Policy::Deadline => {
                let ordered = self.order_tasks(tasks, pending);
                ordered
                    .into_iter()
                    .flat_map(|t| agents.iter().map(move |&a| (t, a, None)))
                    .collect()
            }
            Policy::Nearest => {
                let fifo = self.order_tasks_by(tasks, pending, Policy::Fifo);
                let mut out = Vec::with_capacity(agents.len() * fifo.len());
                for &a in agents {
                    let from = fleet[a].position;
                    let mut by_distance: Vec<(usize, TaskId)> =
                        fifo.iter().enumerate().map(|(i, &t)| (i, t)).collect();
                    by_distance.sort_by_key(|&(i, t)| (from.manhattan(tasks[t].start), i));
                    out.extend(by_distance.into_iter().map(|(_, t)| (t, a, None)));
                }
                out
            }
            Policy::Weighted => {
                let mut scored: Vec<(TaskId, AgentId, f64)> = pending
                    .iter()
                    .flat_map(|&t| agents.iter().map(move |&a| (t, a)))
                    .map(|(t, a)| (t, a, self.score(&tasks[t], &fleet[a], now)))
                    .collect();
                scored.sort_by(|x, y| {
                    y.2.partial_cmp(&x.2)
                        .unwrap_or(Ordering::Equal)
                        .then(x.0.cmp(&y.0))
                        .then(x.1.cmp(&y.1))
                });
                scored.into_iter().map(|(t, a, s)| (t, a, Some(s))).collect()
            }
        }
    }

    fn order_tasks(&self, tasks: &TaskBoard, pending: &[TaskId]) -> Vec<TaskId> {
        self.order_tasks_by(tasks, pending, self.policy)
    }

    fn order_tasks_by(&self, tasks: &TaskBoard, pending: &[TaskId], policy: Policy) -> Vec<TaskId> {
        let mut ordered = pending.to_vec();
        ordered.sort_by_key(|&t| (tasks[t].created_at, t));
        match policy {
            // Stable: creation order survives within a priority.
            Policy::Priority => ordered.sort_by_key(|&t| Reverse(tasks[t].priority.rank())),
            Policy::Deadline => ordered.sort_by_key(|&t| match tasks[t].deadline {
                Some(d) => (0, d),
                None => (1, Tick::ZERO),
            }),
            _ => {}
        }
        ordered
    }
}

// ── Route planning ────────────────────────────────────────────────────────────

/// Pickup → drop-off path of `task`, or `None` when unreachable.
fn delivery_leg<'a, F>(
    cache: &'a mut LegCache,
    grid: &GridMap,
    finder: &F,
    task: &Task,
) -> ScheduleResult<Option<&'a [Coord]>>
where
    F: PathFinder + ?Sized,
{
    if !cache.contains_key(&task.id) {
        let leg = finder.find_path(grid, task.start, task.end)?.into_path();
        if leg.is_none() {
            log::debug!("{} has no route from {} to {}", task.id, task.start, task.end);
        }
        cache.insert(task.id, leg);
    }
    Ok(cache.get(&task.id).and_then(|leg| leg.as_deref()))
}

/// Full route for an agent at `from`: to `pickup`, then along `delivery`.
///
/// The result excludes `from` and repeats no joint cell.  `None` when the
/// pickup cannot be reached.
pub fn plan_route<F>(
    grid: &GridMap,
    finder: &F,
    from: Coord,
    pickup: Coord,
    delivery: &[Coord],
) -> ScheduleResult<Option<Vec<Coord>>>
where
    F: PathFinder + ?Sized,
{
    let Some(approach) = finder.find_path(grid, from, pickup)?.into_path() else {
        return Ok(None);
    };
    let mut route = Vec::with_capacity(approach.len() + delivery.len());
    route.extend(approach.into_iter().skip(1));
    route.extend(delivery.iter().skip(1).copied());
    Ok(Some(route))
}
