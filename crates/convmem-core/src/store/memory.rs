//! In-memory event store (testing and embedding)
//!
//! Satisfies the [`EventStore`] contract without touching the filesystem.
//! Records are keyed by the same name the filesystem store would use, so
//! collision behaviour is identical.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use super::EventStore;
use crate::clock::{Clock, SystemClock};
use crate::domain::{Event, EventDraft, IdStrategy, MemoryError, Result};

/// In-memory event store backed by a `BTreeMap<record name, Event>`.
pub struct MemoryEventStore {
    records: Mutex<BTreeMap<String, Event>>,
    clock: Arc<dyn Clock>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStore for MemoryEventStore {
    fn append(&self, draft: &EventDraft, ids: IdStrategy) -> Result<Event> {
        let timestamp = self.clock.now();
        let event = draft.stamp(ids.generate(&timestamp), timestamp);
        let name = event.record_name();

        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(&name) {
            return Err(MemoryError::Conflict {
                id: event.id,
                path: PathBuf::from(name),
            });
        }
        records.insert(name, event.clone());
        Ok(event)
    }

    fn scan_all(&self) -> Result<Vec<Event>> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.values().cloned().collect())
    }
}
