//! `agv-fleet`: the vehicles and the work they carry.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                       |
//! |-----------|----------------------------------------------------------------|
//! | [`agent`] | `Agent`, `AgentState` / `Errand` / `MaintenanceCause`, `AgentStatus` |
//! | [`task`]  | `Task`, `TaskState`, `TaskStatus`, `Priority`                  |
//! | [`fleet`] | `Fleet` (indexed by `AgentId`), `FleetBuilder`                 |
//! | [`board`] | `TaskBoard` (indexed by `TaskId`), `TaskCounts`, task generation |
//! | [`error`] | `FleetError`, `FleetResult<T>`                                 |
//!
//! # State machines
//!
//! Agent and task status are tagged enums: data that only makes sense in
//! one state (the carried task, the completing agent, a failure reason) lives
//! inside that variant.  Every transition is a method that checks the
//! current variant and returns `FleetError` when the move is not allowed.

pub mod agent;
pub mod board;
pub mod error;
pub mod fleet;
pub mod task;

#[cfg(test)]
mod tests;

pub use agent::{Agent, AgentState, AgentStatus, Errand, MaintenanceCause};
pub use board::{TaskBoard, TaskCounts};
pub use error::{FleetError, FleetResult};
pub use fleet::{Fleet, FleetBuilder};
pub use task::{Priority, Task, TaskState, TaskStatus};
