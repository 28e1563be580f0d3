//! Error taxonomy for the memory log.

use std::path::PathBuf;

/// Errors surfaced by memory log operations.
///
/// An empty scan or an empty context is a success, never one of these.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// A record with the same name already exists. Indicates an id collision,
    /// not a transient fault.
    #[error("event {id} already exists at {}", path.display())]
    Conflict { id: String, path: PathBuf },

    #[error("storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("background task failed: {0}")]
    Background(String),
}

impl MemoryError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MemoryError::StorageUnavailable {
            path: path.into(),
            source,
        }
    }

    /// True for id collisions on append.
    pub fn is_conflict(&self) -> bool {
        matches!(self, MemoryError::Conflict { .. })
    }
}

/// Result type for memory log operations.
pub type Result<T> = std::result::Result<T, MemoryError>;

/// A record that could not be turned into an [`Event`](super::Event).
///
/// Only produced while scanning; the scan logs it and moves on.
#[derive(Debug, thiserror::Error)]
pub(crate) enum MalformedRecord {
    #[error("unreadable: {0}")]
    Unreadable(#[from] std::io::Error),

    #[error("unparsable: {0}")]
    Unparsable(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_display_names_id_and_path() {
        let err = MemoryError::Conflict {
            id: "2026-01-02T03-04-05-000000Z".to_string(),
            path: PathBuf::from("/tmp/events/2026/01/event_x_user_message.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("2026-01-02T03-04-05-000000Z"));
        assert!(msg.contains("event_x_user_message.json"));
        assert!(err.is_conflict());
    }

    #[test]
    fn test_storage_unavailable_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = MemoryError::storage("/root/events", io);
        assert!(err.to_string().contains("storage unavailable"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_conflict());
    }
}
