//! Error types for the folder watcher.

use std::io;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, WatcherError>;

/// Errors that can occur while watching a folder.
///
/// None of these cross the [`FolderWatcher`](crate::FolderWatcher) boundary:
/// the poller logs them and degrades to "no change this tick".
#[derive(Error, Debug)]
pub enum WatcherError {
    /// A single file or subdirectory could not be resolved during a walk.
    #[error("entry unavailable: {path}: {source}")]
    EntryUnavailable {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The watched root itself could not be listed.
    #[error("root unavailable: {root}: {source}")]
    RootUnavailable {
        root: String,
        #[source]
        source: io::Error,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WatcherError {
    pub(crate) fn entry(path: impl Into<String>, source: io::Error) -> Self {
        Self::EntryUnavailable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn root(root: impl Into<String>, source: io::Error) -> Self {
        Self::RootUnavailable {
            root: root.into(),
            source,
        }
    }

    /// Whether this error invalidates the whole tick rather than one entry.
    pub fn is_root_unavailable(&self) -> bool {
        matches!(self, Self::RootUnavailable { .. })
    }
}
