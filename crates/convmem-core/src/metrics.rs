//! Global atomic counters for memory log observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. when a host process exits).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters.
pub struct Metrics {
    events_appended: AtomicU64,
    append_conflicts: AtomicU64,
    records_skipped: AtomicU64,
    scans: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            events_appended: AtomicU64::new(0),
            append_conflicts: AtomicU64::new(0),
            records_skipped: AtomicU64::new(0),
            scans: AtomicU64::new(0),
        }
    }

    pub fn inc_events_appended(&self) {
        self.events_appended.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "events_appended", "counter incremented");
    }

    pub fn inc_append_conflicts(&self) {
        self.append_conflicts.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "append_conflicts", "counter incremented");
    }

    pub fn inc_records_skipped(&self) {
        self.records_skipped.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "records_skipped", "counter incremented");
    }

    pub fn inc_scans(&self) {
        self.scans.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "scans", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            events_appended = self.events_appended(),
            append_conflicts = self.append_conflicts(),
            records_skipped = self.records_skipped(),
            scans = self.scans(),
        );
    }

    pub fn events_appended(&self) -> u64 {
        self.events_appended.load(Ordering::Relaxed)
    }

    pub fn append_conflicts(&self) -> u64 {
        self.append_conflicts.load(Ordering::Relaxed)
    }

    pub fn records_skipped(&self) -> u64 {
        self.records_skipped.load(Ordering::Relaxed)
    }

    pub fn scans(&self) -> u64 {
        self.scans.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.events_appended.store(0, Ordering::Relaxed);
        self.append_conflicts.store(0, Ordering::Relaxed);
        self.records_skipped.store(0, Ordering::Relaxed);
        self.scans.store(0, Ordering::Relaxed);
    }
}
