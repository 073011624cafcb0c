//! `agv-core`: foundational types for the AGV warehouse simulator.
//!
//! This crate is a dependency of every other `agv-*` crate.  It has no
//! `agv-*` dependencies and minimal external ones (`rand`, `thiserror`,
//! `log`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `TaskId`                                   |
//! | [`coord`]       | `Coord`, Manhattan distance, 4-adjacency              |
//! | [`time`]        | `Tick`, `SimClock`                                    |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (global)             |
//! | [`event`]       | `Event`, `Severity`, `EventLog`                       |
//! | [`error`]       | `CoreError`, `CoreResult`, `check_range`              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod coord;
pub mod error;
pub mod event;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use coord::Coord;
pub use error::{check_range, CoreError, CoreResult};
pub use event::{Event, EventLog, Severity};
pub use ids::{AgentId, TaskId};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, Tick};
