//! Memory configuration loaded from the environment.

use std::path::PathBuf;

use crate::domain::{MemoryError, Result};
use crate::recency::RecencyWindow;

pub const ENV_DATA_DIR: &str = "CONVMEM_DATA_DIR";
pub const ENV_MAX_ENTRIES: &str = "CONVMEM_MAX_ENTRIES";
pub const ENV_MAX_DAYS: &str = "CONVMEM_MAX_DAYS";
pub const ENV_MODEL_TAG: &str = "AI_MODEL";

pub const DEFAULT_DATA_DIR: &str = "data";

/// Where the log lives and how much of it a context may include.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Store root; records go under `<data_dir>/events`.
    pub data_dir: PathBuf,
    pub window: RecencyWindow,
    /// Recorded on bot replies.
    pub model_tag: Option<String>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            window: RecencyWindow::default(),
            model_tag: None,
        }
    }
}

impl MemoryConfig {
    /// Create from environment variables
    ///
    /// Reads:
    /// - CONVMEM_DATA_DIR (optional, default: "data")
    /// - CONVMEM_MAX_ENTRIES (optional, default: 10)
    /// - CONVMEM_MAX_DAYS (optional, default: 2)
    /// - AI_MODEL (optional)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let data_dir = lookup(ENV_DATA_DIR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let max_entries = match lookup(ENV_MAX_ENTRIES) {
            Some(raw) => parse_cap(ENV_MAX_ENTRIES, &raw)?,
            None => defaults.window.max_entries,
        };
        let max_days = match lookup(ENV_MAX_DAYS) {
            Some(raw) => parse_cap(ENV_MAX_DAYS, &raw)?,
            None => defaults.window.max_days,
        };

        let model_tag = lookup(ENV_MODEL_TAG).filter(|v| !v.trim().is_empty());

        Ok(Self {
            data_dir,
            window: RecencyWindow::new(max_entries, max_days),
            model_tag,
        })
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_window(mut self, window: RecencyWindow) -> Self {
        self.window = window;
        self
    }
}

fn parse_cap<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| MemoryError::InvalidConfig(format!("{key} must be a non-negative integer, got {raw:?}")))
}
