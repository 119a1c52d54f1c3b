//! LogBuffer - bounded audit log shared by all components
//!
//! Appends never fail and hold the lock only long enough to push one entry
//! and evict the oldest when the buffer is full. Losing old entries under
//! pressure is expected behaviour, not an error.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use sharesync_core::config::DEFAULT_LOG_CAPACITY;
use sharesync_core::domain::log_entry::{LogEntry, LogLevel};

/// Thread-safe, fixed-capacity ring of [`LogEntry`] records
///
/// Uses its own lock, independent of connection and job state, so log
/// contention never serializes unrelated operations.
#[derive(Debug)]
pub struct LogBuffer {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
}

impl LogBuffer {
    /// Creates an empty buffer holding at most `capacity` entries
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    // A panic while holding the lock cannot leave the deque inconsistent,
    // so a poisoned lock is recovered rather than propagated.
    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an entry stamped with the current time
    pub fn append(&self, message: impl Into<String>, level: LogLevel) {
        let message = message.into();
        // Stamped under the lock so buffer order matches timestamp order
        let entry = {
            let mut entries = self.lock();
            let entry = LogEntry::new(message, level);
            entries.push_back(entry.clone());
            while entries.len() > self.capacity {
                entries.pop_front();
            }
            entry
        };
        trace_entry(&entry);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.append(message, LogLevel::Info);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.append(message, LogLevel::Success);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.append(message, LogLevel::Warning);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.append(message, LogLevel::Error);
    }

    /// Returns the most recent `min(n, len)` entries, oldest first
    pub fn tail(&self, n: usize) -> Vec<LogEntry> {
        let entries = self.lock();
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    /// Returns the number of entries currently held
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no entries have been appended (or all were evicted)
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns the maximum number of entries kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

fn trace_entry(entry: &LogEntry) {
    let message = entry.message();
    match entry.level() {
        LogLevel::Info => tracing::info!(target: "sharesync::audit", "{message}"),
        LogLevel::Success => tracing::info!(target: "sharesync::audit", outcome = "success", "{message}"),
        LogLevel::Warning => tracing::warn!(target: "sharesync::audit", "{message}"),
        LogLevel::Error => tracing::error!(target: "sharesync::audit", "{message}"),
    }
}
