//! Log sink service
//!
//! Where the runner writes its human-readable progress messages: state
//! transitions, wait notices and the final outcome. Production code forwards
//! them to `tracing`; the in-memory sink keeps them so they can be inspected.

use lakerun_core::domain::log::{LogEntry, LogLevel};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

/// Destination for runner log entries
///
/// Recording never fails; a sink that cannot deliver an entry drops it.
pub trait LogSink: Send + Sync {
    /// Records a log entry
    ///
    /// # Arguments
    /// * `entry` - The log entry to record
    fn record(&self, entry: LogEntry);
}

/// Sink that emits every entry as a `tracing` event at the entry's level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn record(&self, entry: LogEntry) {
        match entry.level {
            LogLevel::Debug => debug!("{}", entry.message),
            LogLevel::Info => info!("{}", entry.message),
            LogLevel::Warning => warn!("{}", entry.message),
            LogLevel::Error => error!("{}", entry.message),
        }
    }
}

/// In-memory implementation of LogSink
///
/// Uses Arc<Mutex<Vec<LogEntry>>> so clones share one buffer across tasks.
#[derive(Clone, Default)]
pub struct InMemoryLogSink {
    buffer: Arc<Mutex<Vec<LogEntry>>>,
}

impl InMemoryLogSink {
    /// Creates a new in-memory log sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded so far, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.message.clone()).collect()
    }

    /// Drains all log entries from the buffer
    ///
    /// This returns all buffered entries and clears the buffer.
    pub fn drain(&self) -> Vec<LogEntry> {
        self.lock().drain(..).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        // a panicking writer cannot leave a half-pushed entry behind
        self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LogSink for InMemoryLogSink {
    fn record(&self, entry: LogEntry) {
        self.lock().push(entry);
    }
}
