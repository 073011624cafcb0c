//! The `TaskBoard`: every task in the run, indexed by `TaskId`.

use std::ops::{Index, IndexMut};

use agv_core::{Coord, SimRng, TaskId, Tick};

use crate::error::{FleetError, FleetResult};
use crate::task::{Priority, Task, TaskStatus};

/// Per-status task totals.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskCounts {
    pub pending:     usize,
    pub in_progress: usize,
    pub completed:   usize,
    pub failed:      usize,
    pub cancelled:   usize,
}

impl TaskCounts {
    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.completed + self.failed + self.cancelled
    }

    /// Pending plus in progress.
    pub fn open(&self) -> usize {
        self.pending + self.in_progress
    }
}

#[derive(Clone, Debug, Default)]
pub struct TaskBoard {
    tasks: Vec<Task>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Id the next added task will receive.
    pub fn next_id(&self) -> TaskId {
        TaskId(self.tasks.len() as u32)
    }

    /// Append a task built from its freshly allocated id.
    pub fn insert(&mut self, build: impl FnOnce(TaskId) -> Task) -> TaskId {
        let id = self.next_id();
        let task = build(id);
        debug_assert_eq!(task.id, id);
        self.tasks.push(task);
        id
    }

    pub fn add(&mut self, start: Coord, end: Coord, priority: Priority, created_at: Tick) -> TaskId {
        self.insert(|id| Task::new(id, start, end, priority, created_at))
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id.index())
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(id.index())
    }

    /// Like [`get_mut`](Self::get_mut) but an unknown id is an error.
    pub fn task_mut(&mut self, id: TaskId) -> FleetResult<&mut Task> {
        self.tasks.get_mut(id.index()).ok_or(FleetError::UnknownTask(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Pending task ids in id (creation) order.
    pub fn pending(&self) -> Vec<TaskId> {
        self.tasks.iter().filter(|t| t.is_pending()).map(|t| t.id).collect()
    }

    pub fn counts(&self) -> TaskCounts {
        let mut c = TaskCounts::default();
        for t in &self.tasks {
            match t.status() {
                TaskStatus::Pending => c.pending += 1,
                TaskStatus::InProgress => c.in_progress += 1,
                TaskStatus::Completed => c.completed += 1,
                TaskStatus::Failed => c.failed += 1,
                TaskStatus::Cancelled => c.cancelled += 1,
            }
        }
        c
    }

    /// Every task finished one way or another (vacuously true when empty).
    pub fn all_terminal(&self) -> bool {
        self.tasks.iter().all(Task::is_terminal)
    }

    /// Mean ticks from creation to the start of the assignment, over tasks
    /// that have one.
    pub fn average_wait_ticks(&self) -> Option<f64> {
        let waits: Vec<u64> = self.tasks.iter().filter_map(Task::wait_ticks).collect();
        if waits.is_empty() {
            return None;
        }
        Some(waits.iter().sum::<u64>() as f64 / waits.len() as f64)
    }

    // ── Generation ────────────────────────────────────────────────────────

    /// Add `count` tasks between random distinct workstations with random
    /// priority, all created at `now`.  Returns the new ids.
    pub fn generate(
        &mut self,
        count: usize,
        workstations: &[Coord],
        now: Tick,
        rng: &mut SimRng,
    ) -> FleetResult<Vec<TaskId>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        if workstations.len() < 2 {
            return Err(FleetError::NotEnoughWorkstations(workstations.len()));
        }
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let Some((start, end)) = rng.choose_pair(workstations) else {
                return Err(FleetError::NotEnoughWorkstations(workstations.len()));
            };
            let priority = *rng.choose(&Priority::ALL).unwrap_or(&Priority::Medium);
            ids.push(self.add(start, end, priority, now));
        }
        log::debug!("generated {count} tasks over {} workstations", workstations.len());
        Ok(ids)
    }

    /// Give each of `ids` a deadline with probability `share`, uniformly
    /// within `horizon_ticks` after its creation.
    pub fn assign_random_deadlines(&mut self, ids: &[TaskId], share: f64, horizon_ticks: u64, rng: &mut SimRng) {
        for &id in ids {
            let Some(task) = self.tasks.get_mut(id.index()) else { continue };
            if rng.gen_bool(share) {
                let offset = rng.gen_range(0..=horizon_ticks);
                task.deadline = Some(task.created_at + offset);
            }
        }
    }
}

impl Index<TaskId> for TaskBoard {
    type Output = Task;
    fn index(&self, id: TaskId) -> &Task {
        &self.tasks[id.index()]
    }
}

impl IndexMut<TaskId> for TaskBoard {
    fn index_mut(&mut self, id: TaskId) -> &mut Task {
        &mut self.tasks[id.index()]
    }
}
