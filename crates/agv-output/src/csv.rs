//! CSV output backend.
//!
//! Creates three files in the output directory:
//! - `agent_snapshots.csv`
//! - `tick_summaries.csv`
//! - `events.csv`

use std::fs::{self, File};
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, EventRow, OutputResult, TickSummaryRow};

pub const SNAPSHOTS_FILE: &str = "agent_snapshots.csv";
pub const SUMMARIES_FILE: &str = "tick_summaries.csv";
pub const EVENTS_FILE: &str = "events.csv";

pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    events:    Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open the three files and write their headers.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;

        let mut snapshots = Writer::from_path(dir.join(SNAPSHOTS_FILE))?;
        snapshots.write_record([
            "tick", "agent", "x", "y", "status", "battery", "task", "charging_trip", "remaining",
        ])?;

        let mut summaries = Writer::from_path(dir.join(SUMMARIES_FILE))?;
        summaries.write_record([
            "tick", "moved", "assigned", "completed", "failed", "perturbation", "idle", "active",
            "charging", "maintenance", "mean_battery", "pending", "in_progress", "done",
        ])?;

        let mut events = Writer::from_path(dir.join(EVENTS_FILE))?;
        events.write_record(["tick", "severity", "message"])?;

        log::debug!("writing CSV output to {}", dir.display());
        Ok(Self { snapshots, summaries, events, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.tick.to_string(),
                row.agent.clone(),
                row.x.to_string(),
                row.y.to_string(),
                row.status.to_string(),
                format!("{:.1}", row.battery),
                row.task.clone(),
                (row.charging_trip as u8).to_string(),
                row.remaining.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.moved.to_string(),
            row.assigned.to_string(),
            row.completed.to_string(),
            row.failed.to_string(),
            row.perturbation.to_string(),
            row.idle.to_string(),
            row.active.to_string(),
            row.charging.to_string(),
            row.maintenance.to_string(),
            format!("{:.2}", row.mean_battery),
            row.pending.to_string(),
            row.in_progress.to_string(),
            row.done.to_string(),
        ])?;
        Ok(())
    }

    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        for row in rows {
            self.events.write_record([row.tick.to_string().as_str(), row.severity, &row.message])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        self.events.flush()?;
        Ok(())
    }
}
