//! Configuration for the folder watcher and its downstream consumer.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{Result, WatcherError};

/// Default period between two scans of the watched root.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Configuration for a [`FolderWatcher`](crate::FolderWatcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Period between two scans of the watched root.
    pub poll_interval_ms: u64,

    /// Throttle window applied to outgoing snapshots.
    pub throttle_window_ms: u64,

    /// Capacity of the channel between the poller and the emitter.
    pub snapshot_buffer: usize,
}

impl WatcherConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            throttle_window_ms: DEFAULT_POLL_INTERVAL_MS,
            snapshot_buffer: 16,
        }
    }

    /// Set the poll interval.
    pub fn with_poll_interval_ms(mut self, millis: u64) -> Self {
        self.poll_interval_ms = millis;
        self
    }

    /// Set the throttle window.
    pub fn with_throttle_window_ms(mut self, millis: u64) -> Self {
        self.throttle_window_ms = millis;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_window_ms)
    }

    /// Reject values the poller and emitter cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(WatcherError::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.throttle_window_ms == 0 {
            return Err(WatcherError::Config(
                "throttle_window_ms must be greater than zero".to_string(),
            ));
        }
        if self.snapshot_buffer == 0 {
            return Err(WatcherError::Config(
                "snapshot_buffer must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).await?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Layout settings supplied by the configuration source.
///
/// Only the downstream pager reads these; the indexing core never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewSettings {
    /// Number of files shown per page.
    pub items_per_page: usize,

    /// Number of grid columns.
    pub columns: usize,
}

impl ViewSettings {
    pub fn new(items_per_page: usize, columns: usize) -> Self {
        Self {
            items_per_page,
            columns,
        }
    }

    /// Columns bounded to `1..=items_per_page`.
    pub fn clamped_columns(&self) -> usize {
        self.columns.min(self.items_per_page).max(1)
    }
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            items_per_page: 8,
            columns: 4,
        }
    }
}
