//! Append-only event persistence.
//!
//! - [`FsEventStore`]: month-partitioned JSON records on the local filesystem
//! - [`MemoryEventStore`]: in-process store with the same contract, for tests

pub mod fs;
pub mod memory;

use crate::domain::{Event, EventDraft, IdStrategy, Result};

pub use fs::FsEventStore;
pub use memory::MemoryEventStore;

/// Append-only event store.
///
/// Guarantees:
/// - `append` stamps the draft with the store clock's current instant and
///   derives the id from it using `ids`.
/// - `append` never replaces an existing record; a name collision is
///   `MemoryError::Conflict`.
/// - `scan_all` returns every well-formed record exactly once, in no
///   particular order, and skips records it cannot read.
pub trait EventStore: Send + Sync {
    /// Stamp and persist `draft`, returning the stored event.
    fn append(&self, draft: &EventDraft, ids: IdStrategy) -> Result<Event>;

    /// Every readable event in the store.
    fn scan_all(&self) -> Result<Vec<Event>>;
}
