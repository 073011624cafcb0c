//! `agv-sim`: tick loop and run control for the AGV warehouse simulator.
//!
//! # Tick loop
//!
//! ```text
//! loop while Running:
//!   ① Agents    : in ascending AgentId order:
//!                    Active:   drain battery; at 0 → Maintenance
//!                              move one cell (re-plan if blocked)
//!                              arrival → complete task / start charging
//!                              carrier below low_battery → nearest charger
//!                    Charging: charge; at 100 → Idle
//!                    Idle:     at or below min_assign_battery → charger
//!   ② Scheduler : Scheduler::assign over pending tasks and available AGVs
//!   ③ Events    : every event_interval_ticks, maybe one perturbation
//!   ④ End check : all tasks terminal | fleet down | stalled | max_ticks
//! ```
//!
//! All randomness comes from one seeded `SimRng`, so the same seed and
//! configuration replay the same run.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`config`]   | `SimConfig`, `InterruptPolicy`, `Scenario`, `ScenarioPreset` |
//! | [`sim`]      | `Sim`: commands, `step`, `run`, `run_ticks`, `run_paced`   |
//! | [`perturb`]  | `PerturbationKind`, `EventTarget`                          |
//! | [`snapshot`] | `RunState`, `EndReason`, `Snapshot`, `TickReport`, `RunSummary` |
//! | [`observer`] | `SimObserver`, `NoopObserver`                              |
//! | [`builder`]  | `SimBuilder`                                               |
//! | [`error`]    | `SimError`, `SimResult<T>`                                 |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use agv_grid::presets;
//! use agv_sim::{NoopObserver, SimBuilder, SimConfig};
//!
//! let mut sim = SimBuilder::new(SimConfig::default(), presets::standard_simulation_floor())
//!     .build()?;
//! let summary = sim.run(&mut NoopObserver)?;
//! println!("{summary}");
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod perturb;
pub mod sim;
pub mod snapshot;


pub use builder::SimBuilder;
pub use config::{InterruptPolicy, Scenario, ScenarioPreset, SimConfig};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use perturb::{EventTarget, PerturbationKind};
pub use sim::Sim;
pub use snapshot::{AgentSnapshot, EndReason, RunState, RunSummary, Snapshot, TaskSnapshot, TickReport};
