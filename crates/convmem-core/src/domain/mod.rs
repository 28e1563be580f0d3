//! Domain model for the conversational memory log.
//!
//! - `Event`: one immutable logged turn
//! - `EventDraft`: a turn before the store stamps its id and timestamp
//! - `MemoryError`: the error taxonomy shared by every component

pub mod error;
pub mod event;

pub use error::{MemoryError, Result};
pub use event::{
    timestamp_id, Author, Event, EventDraft, EventKind, IdStrategy, BOT_AUTHOR_NAME,
};
