//! Structured observability hooks for the memory log.
//!
//! This module provides:
//! - Conversation-scoped tracing spans via the `ConversationSpan` RAII guard
//! - Emission functions for append, conflict, skipped records and context assembly
//!
//! Verbosity follows `RUST_LOG`. For JSON output pass `json = true` to
//! [`init_tracing`](crate::telemetry::init_tracing).

use std::path::Path;

use tracing::{debug, info, warn};

/// RAII guard that enters a conversation-scoped span.
///
/// # Example
///
/// ```ignore
/// let _span = ConversationSpan::enter("19:abc@thread.v2");
/// // tracing calls in this scope carry conversation_id = "19:abc@thread.v2"
/// ```
pub struct ConversationSpan {
    _span: tracing::span::EnteredSpan,
}

impl ConversationSpan {
    /// Create and enter a span tagged with the conversation id.
    pub fn enter(conversation_id: &str) -> Self {
        let span = tracing::info_span!("convmem.conversation", conversation_id = %conversation_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a record was written.
pub fn emit_event_appended(conversation_id: &str, kind: &str, id: &str) {
    info!(event = "event.appended", conversation_id = %conversation_id, kind = %kind, id = %id);
}

/// Emit event: an append hit an existing record name (warning level).
pub fn emit_append_conflict(conversation_id: &str, id: &str) {
    warn!(event = "event.append_conflict", conversation_id = %conversation_id, id = %id);
}

/// Emit event: a record was skipped during a scan (warning level).
pub fn emit_record_skipped(path: &Path, reason: &dyn std::fmt::Display) {
    warn!(event = "scan.record_skipped", path = %path.display(), reason = %reason);
}

/// Emit event: recent context assembled from `scanned` records, `selected` in window.
pub fn emit_context_assembled(conversation_id: &str, scanned: usize, selected: usize) {
    debug!(
        event = "context.assembled",
        conversation_id = %conversation_id,
        scanned = scanned,
        selected = selected,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_span_create() {
        let _span = ConversationSpan::enter("test-conversation");
    }
}
