//! In-memory handles for tests.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::handle::{DirectoryHandle, Entry, FileHandle, FileMetadata};
use crate::matcher::mime_from_name;
use crate::record::FileRecord;

#[derive(Debug)]
pub struct MemoryFile {
    name: String,
    last_modified: AtomicI64,
    unavailable: AtomicBool,
}

impl MemoryFile {
    pub fn new(name: &str, last_modified: i64) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            last_modified: AtomicI64::new(last_modified),
            unavailable: AtomicBool::new(false),
        })
    }

    pub fn touch(&self, last_modified: i64) {
        self.last_modified.store(last_modified, Ordering::SeqCst);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl FileHandle for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn metadata(&self) -> io::Result<FileMetadata> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        Ok(FileMetadata {
            last_modified: self.last_modified.load(Ordering::SeqCst),
            mime_type: mime_from_name(&self.name).to_string(),
        })
    }

    async fn read(&self) -> io::Result<Vec<u8>> {
        Ok(self.name.as_bytes().to_vec())
    }
}

#[derive(Debug)]
pub struct MemoryDirectory {
    name: String,
    entries: Mutex<Vec<Entry>>,
    unavailable: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl MemoryDirectory {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            entries: Mutex::new(Vec::new()),
            unavailable: AtomicBool::new(false),
            delay: Mutex::new(None),
        })
    }

    pub fn add_file(&self, name: &str, last_modified: i64) -> Arc<MemoryFile> {
        let file = MemoryFile::new(name, last_modified);
        self.push(Entry::File(file.clone()));
        file
    }

    pub fn add_dir(&self, name: &str) -> Arc<MemoryDirectory> {
        let dir = MemoryDirectory::new(name);
        self.push(Entry::Directory(dir.clone()));
        dir
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make every listing of this directory wait first.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap_or_else(PoisonError::into_inner) = Some(delay);
    }

    fn push(&self, entry: Entry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

#[async_trait]
impl DirectoryHandle for MemoryDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    async fn entries(&self) -> io::Result<Vec<Entry>> {
        let delay = *self.delay.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

pub fn record(path: &str, name: &str, last_modified: i64) -> FileRecord {
    FileRecord::new(
        path,
        MemoryFile::new(name, last_modified),
        last_modified,
        mime_from_name(name),
    )
}

pub fn names(records: &[FileRecord]) -> Vec<String> {
    records.iter().map(FileRecord::relative_path).collect()
}
