//! # Folder Watcher
//!
//! Keeps an always-current index of the media files under a folder by
//! rescanning it on a fixed interval.
//!
//! ## Features
//!
//! - **Lazy Traversal**: Records are folded while the tree is still walked
//! - **Incremental Index**: Known files are skipped, new ones are inserted by
//!   modification time
//! - **Quiet Updates**: Unchanged scans are dropped and deliveries are
//!   throttled
//! - **Root Replacement**: A new folder supersedes the old one, whose pending
//!   results are discarded
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Folder Watcher                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  set_root ──► Poller ──► walk ──► FileIndex ──► Emitter ──► snapshots
//! │                 │                                 │             │
//! │                 ▼                                 ▼             │
//! │            Interval tick                ChangeFilter + Throttle │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use folder_watcher::{FolderWatcher, LocalDirectory};
//!
//! let watcher = FolderWatcher::with_defaults()?;
//! watcher.set_root(Arc::new(LocalDirectory::open("~/Pictures").await?));
//!
//! let mut snapshots = watcher.snapshots();
//! while let Some(snapshot) = snapshots.next().await {
//!     println!("{} files", snapshot.len());
//! }
//! ```

pub mod config;
mod emitter;
pub mod error;
pub mod handle;
pub mod index;
pub mod matcher;
pub mod pager;
mod poller;
pub mod record;
pub mod traverser;
pub mod watcher;

#[cfg(test)]
mod test_support;

pub use config::{ViewSettings, WatcherConfig};
pub use emitter::{ChangeFilter, Throttle};
pub use error::{Result, WatcherError};
pub use handle::{DirectoryHandle, Entry, FileHandle, FileMetadata, LocalDirectory, LocalFile};
pub use index::{FileIndex, Snapshot};
pub use matcher::{ALLOWED_EXTENSIONS, matches};
pub use pager::{Page, page_count, step_page};
pub use poller::TickOutcome;
pub use record::{FileRecord, RecordKey};
pub use traverser::walk;
pub use watcher::FolderWatcher;
