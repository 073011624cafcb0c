//! The `OutputWriter` trait.

use crate::{AgentSnapshotRow, EventRow, OutputResult, TickSummaryRow};

/// A sink for simulation output rows.
///
/// The observer calls these from hooks that cannot fail, so errors are kept
/// and surfaced through [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()>;

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()>;

    /// Flush everything.  Calling it again does nothing.
    fn finish(&mut self) -> OutputResult<()>;
}
