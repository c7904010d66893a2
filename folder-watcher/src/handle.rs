//! Directory and file capabilities consumed by the traverser.
//!
//! The watcher never touches paths directly; it walks whatever a
//! [`DirectoryHandle`] lists. [`LocalDirectory`] backs the handles with the
//! local filesystem.

use std::fmt::Debug;
use std::fs::FileType;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::warn;

use crate::error::{Result, WatcherError};
use crate::matcher::mime_from_name;

/// An entry returned by a directory listing.
#[derive(Debug, Clone)]
pub enum Entry {
    File(Arc<dyn FileHandle>),
    Directory(Arc<dyn DirectoryHandle>),
}

/// Resolved metadata of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// Last modification time in epoch milliseconds.
    pub last_modified: i64,

    /// MIME-like type of the content.
    pub mime_type: String,
}

/// A listable directory.
#[async_trait]
pub trait DirectoryHandle: Send + Sync + Debug {
    /// Name of this directory (its last path segment).
    fn name(&self) -> &str;

    /// List the direct children, in whatever order the source provides.
    async fn entries(&self) -> io::Result<Vec<Entry>>;
}

/// A readable file.
#[async_trait]
pub trait FileHandle: Send + Sync + Debug {
    /// Base name of the file.
    fn name(&self) -> &str;

    /// Resolve modification time and type.
    async fn metadata(&self) -> io::Result<FileMetadata>;

    /// Read the whole content.
    async fn read(&self) -> io::Result<Vec<u8>>;
}

/// A directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    path: PathBuf,
    name: String,
}

impl LocalDirectory {
    /// Open a directory to be used as a watched root.
    ///
    /// Fails when the path is missing, unreadable or not a directory; the
    /// caller keeps its previous root in that case.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let metadata = fs::metadata(path)
            .await
            .map_err(|e| WatcherError::root(&display, e))?;
        if !metadata.is_dir() {
            return Err(WatcherError::root(
                display,
                io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            ));
        }

        Ok(Self::from_path(path.to_path_buf()))
    }

    fn from_path(path: PathBuf) -> Self {
        let name = file_name(&path);
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DirectoryHandle for LocalDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    async fn entries(&self) -> io::Result<Vec<Entry>> {
        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(&self.path).await?;

        while let Some(dir_entry) = read_dir.next_entry().await? {
            let file_type = dir_entry.file_type().await;
            entries.extend(local_entry(dir_entry.path(), file_type));
        }

        Ok(entries)
    }
}

/// Wrap a listed path, dropping it if its type cannot be read.
///
/// Symlinks report neither kind and are skipped.
fn local_entry(path: PathBuf, file_type: io::Result<FileType>) -> Option<Entry> {
    let file_type = match file_type {
        Ok(file_type) => file_type,
        Err(e) => {
            warn!("Skipping unreadable entry {}: {e}", path.display());
            return None;
        }
    };

    if file_type.is_dir() {
        Some(Entry::Directory(Arc::new(LocalDirectory::from_path(path))))
    } else if file_type.is_file() {
        Some(Entry::File(Arc::new(LocalFile::from_path(path))))
    } else {
        None
    }
}

/// A file on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
}

impl LocalFile {
    fn from_path(path: PathBuf) -> Self {
        let name = file_name(&path);
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FileHandle for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn metadata(&self) -> io::Result<FileMetadata> {
        let metadata = fs::metadata(&self.path).await?;
        let modified = DateTime::<Utc>::from(metadata.modified()?);

        Ok(FileMetadata {
            last_modified: modified.timestamp_millis(),
            mime_type: mime_from_name(&self.name).to_string(),
        })
    }

    async fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path).await
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
