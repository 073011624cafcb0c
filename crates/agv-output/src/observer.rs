//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use agv_core::Tick;
use agv_sim::{RunSummary, SimObserver, Snapshot, TickReport};

use crate::row::{AgentSnapshotRow, EventRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes tick summaries, agent snapshots and the
/// event log to any [`OutputWriter`].
///
/// Observer hooks return nothing, so the first write error is stored.  Check
/// it with [`take_error`][Self::take_error] after `sim.run()` returns.
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// The stored write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            log::error!("output write failed: {e}");
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, _tick: Tick, report: &TickReport) {
        let result = self.writer.write_tick_summary(&TickSummaryRow::from(report));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        let rows: Vec<AgentSnapshotRow> =
            snapshot.agents.iter().map(|a| AgentSnapshotRow::new(snapshot.tick, a)).collect();
        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }

        let events: Vec<EventRow> = snapshot.events.iter().map(EventRow::from).collect();
        if !events.is_empty() {
            let result = self.writer.write_events(&events);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _summary: &RunSummary) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
