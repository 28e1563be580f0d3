use std::ffi::OsStr;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::EventStore;
use crate::clock::{Clock, SystemClock};
use crate::domain::error::MalformedRecord;
use crate::domain::{Event, EventDraft, IdStrategy, MemoryError, Result};
use crate::metrics::METRICS;
use crate::obs;

/// Filesystem-backed event log partitioned by calendar month.
///
/// Layout: `<data_dir>/events/<YYYY>/<MM>/event_<id>_<kind>.json`
///
/// Partitions are created on first write. A missing `events` directory
/// scans as empty.
pub struct FsEventStore {
    events_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FsEventStore {
    /// Store rooted at `data_dir`, stamped by a [`SystemClock`].
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::with_clock(data_dir, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(data_dir: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Self {
        Self {
            events_dir: data_dir.as_ref().join("events"),
            clock,
        }
    }

    pub fn events_dir(&self) -> &Path {
        &self.events_dir
    }

    /// Partition directory holding events stamped at `timestamp` (UTC year/month).
    pub fn partition_dir(&self, timestamp: &DateTime<Utc>) -> PathBuf {
        self.events_dir
            .join(format!("{:04}", timestamp.year()))
            .join(format!("{:02}", timestamp.month()))
    }

    /// Full path of the record for `event`.
    pub fn record_path(&self, event: &Event) -> PathBuf {
        self.partition_dir(&event.timestamp).join(event.record_name())
    }

    /// Write `bytes` to `path` only if nothing exists there yet.
    ///
    /// Content goes to a temporary file in the same directory first, so a
    /// reader never sees a partial record.
    fn create_exclusive(&self, event: &Event, path: &Path, bytes: &[u8]) -> Result<()> {
        let dir = path.parent().unwrap_or(self.events_dir.as_path());
        fs::create_dir_all(dir).map_err(|e| MemoryError::storage(dir, e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| MemoryError::storage(dir, e))?;
        tmp.write_all(bytes)
            .map_err(|e| MemoryError::storage(path, e))?;

        tmp.persist_noclobber(path).map_err(|e| {
            if e.error.kind() == ErrorKind::AlreadyExists {
                MemoryError::Conflict {
                    id: event.id.clone(),
                    path: path.to_path_buf(),
                }
            } else {
                MemoryError::storage(path, e.error)
            }
        })?;
        Ok(())
    }
}

impl EventStore for FsEventStore {
    fn append(&self, draft: &EventDraft, ids: IdStrategy) -> Result<Event> {
        let timestamp = self.clock.now();
        let event = draft.stamp(ids.generate(&timestamp), timestamp);
        let path = self.record_path(&event);

        let bytes = serde_json::to_vec_pretty(&event)?;
        self.create_exclusive(&event, &path, &bytes)?;

        debug!(path = %path.display(), "record written");
        Ok(event)
    }

    fn scan_all(&self) -> Result<Vec<Event>> {
        METRICS.inc_scans();

        let root = match fs::read_dir(&self.events_dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(MemoryError::storage(&self.events_dir, e)),
        };

        let mut paths = Vec::new();
        collect_record_paths(root, &mut paths);

        let mut events = Vec::with_capacity(paths.len());
        for path in paths {
            match read_record(&path) {
                Ok(event) => events.push(event),
                Err(reason) => {
                    METRICS.inc_records_skipped();
                    obs::emit_record_skipped(&path, &reason);
                }
            }
        }
        Ok(events)
    }
}

/// Recursively gather `event_*.json` files. Entries that cannot be listed are
/// skipped.
fn collect_record_paths(entries: fs::ReadDir, out: &mut Vec<PathBuf>) {
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping entry with unknown type");
                continue;
            }
        };

        if file_type.is_dir() {
            match fs::read_dir(&path) {
                Ok(children) => collect_record_paths(children, out),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable partition"),
            }
        } else if file_type.is_file() && is_record_name(&entry.file_name()) {
            out.push(path);
        }
    }
}

fn is_record_name(name: &OsStr) -> bool {
    name.to_str()
        .is_some_and(|n| n.starts_with("event_") && n.ends_with(".json"))
}

fn read_record(path: &Path) -> std::result::Result<Event, MalformedRecord> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::domain::{Author, EventKind};
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 28, 23, 59, 59).unwrap()
    }

    fn make_store() -> (tempfile::TempDir, Arc<FixedClock>, FsEventStore) {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(FixedClock::new(t0()));
        let store = FsEventStore::with_clock(dir.path(), clock.clone());
        (dir, clock, store)
    }

    fn hello(conv: &str) -> EventDraft {
        EventDraft::user_message(conv, Some(Author::named("Ana")), "hello")
    }

    #[test]
    fn append_writes_into_month_partition() {
        let (dir, _clock, store) = make_store();
        let event = store.append(&hello("c1"), IdStrategy::Timestamp).unwrap();

        let expected = dir
            .path()
            .join("events")
            .join("2026")
            .join("02")
            .join("event_2026-02-28T23-59-59-000000Z_user_message.json");
        assert!(expected.is_file(), "missing {}", expected.display());
        assert_eq!(store.record_path(&event), expected);
        assert_eq!(event.kind, EventKind::UserMessage);
        assert_eq!(event.timestamp, t0());
    }

    #[test]
    fn record_on_disk_is_pretty_json_of_event() {
        let (_dir, _clock, store) = make_store();
        let event = store.append(&hello("c1"), IdStrategy::Timestamp).unwrap();

        let raw = fs::read_to_string(store.record_path(&event)).unwrap();
        assert!(raw.contains('\n'));
        let parsed: Event = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn same_instant_append_is_conflict_and_keeps_original() {
        let (_dir, _clock, store) = make_store();
        let first = store.append(&hello("c1"), IdStrategy::Timestamp).unwrap();

        let other = EventDraft::user_message("c1", None, "different body");
        match store.append(&other, IdStrategy::Timestamp) {
            Err(MemoryError::Conflict { id, .. }) => assert_eq!(id, first.id),
            other => panic!("expected Conflict, got {other:?}"),
        }

        let events = store.scan_all().unwrap();
        assert_eq!(events, vec![first]);
    }

    #[test]
    fn nonce_strategy_avoids_same_instant_conflict() {
        let (_dir, _clock, store) = make_store();
        let a = store.append(&hello("c1"), IdStrategy::Timestamp).unwrap();
        let b = store.append(&hello("c1"), IdStrategy::TimestampWithNonce).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.scan_all().unwrap().len(), 2);
    }

    #[test]
    fn month_rollover_uses_new_partition() {
        let (dir, clock, store) = make_store();
        store.append(&hello("c1"), IdStrategy::Timestamp).unwrap();
        clock.advance(chrono::Duration::seconds(1));
        store.append(&hello("c1"), IdStrategy::Timestamp).unwrap();

        assert!(dir.path().join("events/2026/02").is_dir());
        assert!(dir.path().join("events/2026/03").is_dir());
        assert_eq!(store.scan_all().unwrap().len(), 2);
    }

    #[test]
    fn scan_of_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsEventStore::new(dir.path().join("never-created"));
        assert!(store.scan_all().unwrap().is_empty());
    }

    #[test]
    fn scan_ignores_non_record_files() {
        let (dir, _clock, store) = make_store();
        let event = store.append(&hello("c1"), IdStrategy::Timestamp).unwrap();

        let partition = dir.path().join("events/2026/02");
        fs::write(partition.join("notes.txt"), "not a record").unwrap();
        fs::write(partition.join(".tmpabc123"), "{").unwrap();
        fs::write(partition.join("event_draft.bak"), "{").unwrap();

        assert_eq!(store.scan_all().unwrap(), vec![event]);
    }

    #[test]
    fn is_record_name_matches_prefix_and_extension() {
        assert!(is_record_name(OsStr::new("event_x_bot_reply.json")));
        assert!(!is_record_name(OsStr::new("event_x_bot_reply.json.tmp")));
        assert!(!is_record_name(OsStr::new("x_event_.json")));
    }
}
