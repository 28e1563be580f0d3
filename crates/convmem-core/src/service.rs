//! Conversation memory façade: the only entry point a host needs.
//!
//! Composes an [`EventStore`], [`select_recent`] and [`format_recent_memory`]
//! into "record a turn" and "get recent context". Nothing is cached; every
//! read rescans the store, so results always reflect the latest durable
//! state.

use std::path::Path;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::MemoryConfig;
use crate::domain::{Author, Event, EventDraft, EventKind, IdStrategy, MemoryError, Result};
use crate::format::format_recent_memory;
use crate::metrics::METRICS;
use crate::obs::{self, ConversationSpan};
use crate::recency::{select_recent, sort_events, RecencyWindow};
use crate::store::{EventStore, FsEventStore};

/// Shared handle over an event store and a clock. Cheap to clone.
#[derive(Clone)]
pub struct ConversationMemory {
    store: Arc<dyn EventStore>,
    clock: Arc<dyn Clock>,
}

impl ConversationMemory {
    /// `clock` decides "now" for recency; give the store the same clock to
    /// keep stamping and windowing consistent.
    pub fn new(store: Arc<dyn EventStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Filesystem-backed memory rooted at `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        let store = FsEventStore::with_clock(data_dir, Arc::clone(&clock));
        Self::new(Arc::new(store), clock)
    }

    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::open(&config.data_dir)
    }

    /// Log one conversational turn.
    pub fn record_turn(
        &self,
        conversation_id: &str,
        kind: EventKind,
        author: Option<Author>,
        text: &str,
        model_tag: Option<&str>,
    ) -> Result<Event> {
        let draft = EventDraft::new(
            kind,
            conversation_id,
            author,
            text,
            model_tag.map(str::to_string),
        );
        self.append(&draft)
    }

    /// Persist `draft`. On an id collision the write is retried once with a
    /// nonce-suffixed id; a second collision is returned as `Conflict`.
    pub fn append(&self, draft: &EventDraft) -> Result<Event> {
        let _span = ConversationSpan::enter(&draft.conversation_id);

        let event = match self.store.append(draft, IdStrategy::Timestamp) {
            Err(MemoryError::Conflict { id, .. }) => {
                self.note_conflict(&draft.conversation_id, &id);
                match self.store.append(draft, IdStrategy::TimestampWithNonce) {
                    Err(MemoryError::Conflict { id, path }) => {
                        self.note_conflict(&draft.conversation_id, &id);
                        return Err(MemoryError::Conflict { id, path });
                    }
                    other => other?,
                }
            }
            other => other?,
        };

        METRICS.inc_events_appended();
        obs::emit_event_appended(&event.conversation_id, event.kind.as_str(), &event.id);
        Ok(event)
    }

    fn note_conflict(&self, conversation_id: &str, id: &str) {
        METRICS.inc_append_conflicts();
        obs::emit_append_conflict(conversation_id, id);
    }

    /// Events of `conversation_id` inside `window`, oldest first.
    pub fn recent_events(&self, conversation_id: &str, window: RecencyWindow) -> Result<Vec<Event>> {
        let events = self.store.scan_all()?;
        let scanned = events.len();
        let selected = select_recent(events, conversation_id, window, self.clock.now());
        obs::emit_context_assembled(conversation_id, scanned, selected.len());
        Ok(selected)
    }

    /// Formatted memory block for the next reasoning call.
    pub fn recent_context(&self, conversation_id: &str, window: RecencyWindow) -> Result<String> {
        let _span = ConversationSpan::enter(conversation_id);
        let selected = self.recent_events(conversation_id, window)?;
        Ok(format_recent_memory(&selected))
    }

    /// The last `limit` records of `conversation_id` as
    /// `event_<id>_<type>.json @ <ts>`, oldest first. No age cap.
    pub fn recent_record_names(&self, conversation_id: &str, limit: usize) -> Result<Vec<String>> {
        let mut events: Vec<Event> = self
            .store
            .scan_all()?
            .into_iter()
            .filter(|e| e.conversation_id == conversation_id)
            .collect();
        sort_events(&mut events);

        let skip = events.len().saturating_sub(limit);
        Ok(events
            .iter()
            .skip(skip)
            .map(|e| format!("{} @ {}", e.record_name(), e.ts_string()))
            .collect())
    }

    /// [`append`](Self::append) on the blocking thread pool.
    pub async fn append_async(&self, draft: EventDraft) -> Result<Event> {
        let memory = self.clone();
        tokio::task::spawn_blocking(move || memory.append(&draft))
            .await
            .map_err(|e| MemoryError::Background(e.to_string()))?
    }

    /// [`recent_context`](Self::recent_context) on the blocking thread pool.
    pub async fn recent_context_async(
        &self,
        conversation_id: &str,
        window: RecencyWindow,
    ) -> Result<String> {
        let memory = self.clone();
        let conversation_id = conversation_id.to_string();
        tokio::task::spawn_blocking(move || memory.recent_context(&conversation_id, window))
            .await
            .map_err(|e| MemoryError::Background(e.to_string()))?
    }
}
