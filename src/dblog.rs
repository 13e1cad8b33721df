//! Bounded diagnostic log for connection and health events
//!
//! A fixed-capacity FIFO: once 100 entries are reached the oldest are
//! evicted. Entries are mirrored to `tracing` so they also land in the
//! normal log stream.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

const MAX_ENTRIES: usize = 100;

/// One diagnostic event.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub time: DateTime<Utc>,
    pub message: String,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

/// Append-only ring of recent database diagnostics.
///
/// Lock scope is a push/trim or a clone; never held across an await.
#[derive(Debug, Default)]
pub struct DbLog {
    entries: Mutex<VecDeque<LogEntry>>,
}

impl DbLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a timestamped entry, evicting the oldest past capacity.
    pub fn append(&self, message: impl Into<String>, is_error: bool) {
        let message = message.into();
        if is_error {
            tracing::error!(target: "itemsrv::db", "{message}");
        } else {
            tracing::info!(target: "itemsrv::db", "{message}");
        }
        let entry = LogEntry {
            time: Utc::now(),
            message,
            is_error,
        };
        let mut entries = self.entries.lock().expect("db log poisoned");
        entries.push_back(entry);
        while entries.len() > MAX_ENTRIES {
            entries.pop_front();
        }
    }

    /// Defensive copy of the buffer, oldest first. Callers cannot mutate
    /// logged history through it.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .expect("db log poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_snapshot() {
        let log = DbLog::new();
        log.append("connecting", false);
        log.append("boom", true);

        let snap = log.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].message, "connecting");
        assert!(!snap[0].is_error);
        assert!(snap[1].is_error);
    }

    #[test]
    fn never_exceeds_capacity_and_evicts_oldest_first() {
        let log = DbLog::new();
        for i in 0..250 {
            log.append(format!("entry {i}"), false);
        }
        let snap = log.snapshot();
        assert_eq!(snap.len(), MAX_ENTRIES);
        assert_eq!(snap.first().unwrap().message, "entry 150");
        assert_eq!(snap.last().unwrap().message, "entry 249");
    }

    #[test]
    fn snapshot_is_a_copy() {
        let log = DbLog::new();
        log.append("one", false);
        let mut snap = log.snapshot();
        snap.clear();
        assert_eq!(log.snapshot().len(), 1);
    }
}
