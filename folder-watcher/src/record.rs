//! Discovered file records.

use std::sync::Arc;

use crate::handle::FileHandle;

/// A matching file found under the watched root.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Ancestor directory names below the root, each prefixed with `/`.
    /// Empty for files directly inside the root.
    pub path: String,

    /// Last modification time in epoch milliseconds.
    pub last_modified: i64,

    /// MIME-like type resolved at discovery.
    pub mime_type: String,

    /// Capability to read the file later.
    pub handle: Arc<dyn FileHandle>,
}

/// Identity of a record for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub path: String,
    pub name: String,
}

impl FileRecord {
    pub fn new(
        path: impl Into<String>,
        handle: Arc<dyn FileHandle>,
        last_modified: i64,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            last_modified,
            mime_type: mime_type.into(),
            handle,
        }
    }

    /// Base name of the file.
    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// Dedup key: `(path, name)`, ignoring the timestamp.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            path: self.path.clone(),
            name: self.name().to_string(),
        }
    }

    /// Path of the file relative to the root, e.g. `/album/cat.png`.
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.path, self.name())
    }
}
