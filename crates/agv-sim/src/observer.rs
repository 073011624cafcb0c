//! Simulation observer trait for progress reporting and data collection.

use agv_core::Tick;

use crate::{RunSummary, Snapshot, TickReport};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example
///
/// ```rust,ignore
/// struct Progress;
///
/// impl SimObserver for Progress {
///     fn on_tick_end(&mut self, tick: Tick, report: &TickReport) {
///         if report.completed > 0 {
///             println!("{tick}: {} tasks done", report.tasks.completed);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called before the tick is processed.  `tick` is the tick about to run.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after the tick, with what it did.
    fn on_tick_end(&mut self, _tick: Tick, _report: &TickReport) {}

    /// Called every `config.snapshot_interval` ticks.  The snapshot carries
    /// only the events logged since the previous one.
    fn on_snapshot(&mut self, _snapshot: &Snapshot) {}

    /// Called once when the run stops, for whatever reason.
    fn on_sim_end(&mut self, _summary: &RunSummary) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
