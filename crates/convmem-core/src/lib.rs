//! convmem core library
//!
//! Bounded conversational memory: an append-only, month-partitioned event
//! log queried per conversation, cut to a recency window and rendered as a
//! compact text block for the next reasoning call.
//!
//! ```ignore
//! let memory = ConversationMemory::open("data");
//! memory.record_turn("conv-1", EventKind::UserMessage, Some(Author::named("Ana")), "Hi", None)?;
//! let context = memory.recent_context("conv-1", RecencyWindow::default())?;
//! ```

pub mod clock;
pub mod config;
pub mod domain;
pub mod format;
pub mod metrics;
pub mod obs;
pub mod recency;
pub mod service;
pub mod store;
pub mod telemetry;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::MemoryConfig;
pub use domain::{
    timestamp_id, Author, Event, EventDraft, EventKind, IdStrategy, MemoryError, Result,
    BOT_AUTHOR_NAME,
};
pub use format::{format_recent_memory, normalize_whitespace, BOT_SPEAKER, NO_PRIOR_MESSAGES};
pub use metrics::METRICS;
pub use obs::{
    emit_append_conflict, emit_context_assembled, emit_event_appended, emit_record_skipped,
    ConversationSpan,
};
pub use recency::{select_recent, sort_events, RecencyWindow};
pub use service::ConversationMemory;
pub use store::{EventStore, FsEventStore, MemoryEventStore};
pub use telemetry::init_tracing;

/// convmem version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
