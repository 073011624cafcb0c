//! Append-only simulation event log.
//!
//! Every append is also forwarded to the `log` facade at the matching level,
//! so a binary that installs a logger sees the same stream a dashboard would.

use std::fmt;

use crate::Tick;

/// How loud an event is.  `Success` logs at `info` level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    fn log_level(self) -> log::Level {
        match self {
            Severity::Info | Severity::Success => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable log line.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    pub tick:     Tick,
    pub severity: Severity,
    pub message:  String,
}

/// Ordered event history with a read cursor for incremental consumers.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    entries: Vec<Event>,
    cursor:  usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: Tick, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        log::log!(target: "agv::events", severity.log_level(), "[{tick}] {message}");
        self.entries.push(Event { tick, severity, message });
    }

    #[inline]
    pub fn info(&mut self, tick: Tick, message: impl Into<String>) {
        self.push(tick, Severity::Info, message);
    }

    #[inline]
    pub fn success(&mut self, tick: Tick, message: impl Into<String>) {
        self.push(tick, Severity::Success, message);
    }

    #[inline]
    pub fn warn(&mut self, tick: Tick, message: impl Into<String>) {
        self.push(tick, Severity::Warning, message);
    }

    #[inline]
    pub fn error(&mut self, tick: Tick, message: impl Into<String>) {
        self.push(tick, Severity::Error, message);
    }

    /// Entries appended since the previous call, advancing the cursor.
    pub fn take_new(&mut self) -> Vec<Event> {
        let fresh = self.entries[self.cursor..].to_vec();
        self.cursor = self.entries.len();
        fresh
    }

    /// Entries not yet returned by [`take_new`](Self::take_new).
    pub fn peek_new(&self) -> &[Event] {
        &self.entries[self.cursor..]
    }

    pub fn entries(&self) -> &[Event] {
        &self.entries
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|e| e.severity == severity).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}
