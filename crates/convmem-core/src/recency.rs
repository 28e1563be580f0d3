//! Recency window selection over logged events.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Event;

/// Default count cap: the last N events.
pub const DEFAULT_MAX_ENTRIES: usize = 10;
/// Default age cap in days.
pub const DEFAULT_MAX_DAYS: u32 = 2;

/// Combined count and age caps for "recent memory".
///
/// Either cap at zero selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecencyWindow {
    pub max_entries: usize,
    pub max_days: u32,
}

impl RecencyWindow {
    pub fn new(max_entries: usize, max_days: u32) -> Self {
        Self {
            max_entries,
            max_days,
        }
    }

    pub fn max_age(&self) -> Duration {
        Duration::days(i64::from(self.max_days))
    }

    /// Oldest timestamp still inside the window at `now`. A window reaching
    /// past the earliest representable instant has no age cap.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.max_age())
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn is_empty(&self) -> bool {
        self.max_entries == 0 || self.max_days == 0
    }
}

impl Default for RecencyWindow {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES, DEFAULT_MAX_DAYS)
    }
}

/// Sort ascending by `(timestamp, id)`.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Select the events of `conversation_id` that fall inside `window` at `now`.
///
/// Rules are applied in order:
/// 1. Scope: only events of `conversation_id`.
/// 2. Order: ascending by `(timestamp, id)`.
/// 3. Age: events older than `now - max_days` are dropped.
/// 4. Count: of the survivors, only the last `max_entries` are kept.
///
/// The age cap runs before the count cap, so an out-of-window event never
/// takes a slot from an in-window one.
pub fn select_recent(
    events: impl IntoIterator<Item = Event>,
    conversation_id: &str,
    window: RecencyWindow,
    now: DateTime<Utc>,
) -> Vec<Event> {
    if window.is_empty() {
        return Vec::new();
    }

    let mut scoped: Vec<Event> = events
        .into_iter()
        .filter(|e| e.conversation_id == conversation_id)
        .collect();
    sort_events(&mut scoped);

    let cutoff = window.cutoff(now);
    scoped.retain(|e| e.timestamp >= cutoff);

    let skip = scoped.len().saturating_sub(window.max_entries);
    scoped.drain(..skip);
    scoped
}
