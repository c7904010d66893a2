//! Lazy recursive walk of a directory handle.

use std::sync::Arc;

use async_stream::stream;
use futures::StreamExt;
use futures::stream::BoxStream;

use crate::error::{Result, WatcherError};
use crate::handle::{DirectoryHandle, Entry};
use crate::matcher::matches;
use crate::record::FileRecord;

/// Walk `root` depth-first, yielding a record for every matching file.
///
/// Records are produced lazily while the tree is walked. A failed listing of
/// the root yields a single [`WatcherError::RootUnavailable`] and ends the
/// walk; any other failure yields [`WatcherError::EntryUnavailable`] for that
/// entry and the walk continues.
pub fn walk(root: Arc<dyn DirectoryHandle>) -> BoxStream<'static, Result<FileRecord>> {
    stream! {
        let entries = match root.entries().await {
            Ok(entries) => entries,
            Err(e) => {
                yield Err(WatcherError::root(root.name(), e));
                return;
            }
        };

        let mut children = walk_entries(entries, String::new());
        while let Some(item) = children.next().await {
            yield item;
        }
    }
    .boxed()
}

fn walk_directory(
    dir: Arc<dyn DirectoryHandle>,
    path: String,
) -> BoxStream<'static, Result<FileRecord>> {
    stream! {
        match dir.entries().await {
            Ok(entries) => {
                let mut children = walk_entries(entries, path);
                while let Some(item) = children.next().await {
                    yield item;
                }
            }
            Err(e) => {
                yield Err(WatcherError::entry(path, e));
            }
        }
    }
    .boxed()
}

fn walk_entries(entries: Vec<Entry>, path: String) -> BoxStream<'static, Result<FileRecord>> {
    stream! {
        for entry in entries {
            match entry {
                Entry::Directory(dir) => {
                    let child_path = format!("{path}/{}", dir.name());
                    let mut children = walk_directory(dir, child_path);
                    while let Some(item) = children.next().await {
                        yield item;
                    }
                }
                Entry::File(file) => {
                    if !matches(file.name()) {
                        continue;
                    }
                    match file.metadata().await {
                        Ok(metadata) => {
                            yield Ok(FileRecord::new(
                                path.clone(),
                                file,
                                metadata.last_modified,
                                metadata.mime_type,
                            ));
                        }
                        Err(e) => {
                            yield Err(WatcherError::entry(format!("{path}/{}", file.name()), e));
                        }
                    }
                }
            }
        }
    }
    .boxed()
}
