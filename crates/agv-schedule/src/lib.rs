//! `agv-schedule`: matching pending tasks to idle vehicles.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`policy`]    | `Policy`, `Weights`                                      |
//! | [`scheduler`] | `Scheduler`, `Round`, `Assignment`, route planning       |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                     |
//!
//! # One round
//!
//! ```text
//! eligible tasks  = Pending
//! eligible agents = Idle && battery > min_battery
//! order pairings by policy
//! for each pairing, skipping already-used tasks and agents:
//!     plan agent → pickup → drop-off
//!     start the task, queue the route on the agent
//! ```
//!
//! A round never fails because nothing could be assigned; an empty
//! [`Round`] is returned instead.

pub mod error;
pub mod policy;
pub mod scheduler;


pub use error::{ScheduleError, ScheduleResult};
pub use policy::{Policy, Weights};
pub use scheduler::{plan_route, Assignment, Round, Scheduler, DEFAULT_MAX_DISTANCE, DEFAULT_MIN_BATTERY};
