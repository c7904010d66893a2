//! Integration tests for watching a real folder on disk.
//!
//! These tests verify that the watcher:
//! - Finds matching files in nested directories
//! - Orders them by modification time
//! - Picks up files that appear later
//! - Resets when pointed at another folder

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use folder_watcher::{FileRecord, FolderWatcher, LocalDirectory, Snapshot, WatcherConfig};
use tempfile::TempDir;
use tokio::sync::watch;

fn create_file(dir: &Path, name: &str, modified_ms: u64) -> io::Result<()> {
    let file = File::create(dir.join(name))?;
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_millis(modified_ms))
}

fn fast_watcher() -> folder_watcher::Result<FolderWatcher> {
    let config = WatcherConfig::new()
        .with_poll_interval_ms(50)
        .with_throttle_window_ms(50);
    FolderWatcher::new(config)
}

/// Wait until a published snapshot satisfies `predicate`, or give up after
/// ten seconds.
async fn wait_for(
    rx: &mut watch::Receiver<Snapshot>,
    predicate: impl Fn(&Snapshot) -> bool,
) -> Option<Snapshot> {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let snapshot = rx.borrow_and_update().clone();
            if predicate(&snapshot) {
                return Some(snapshot);
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    })
    .await
    .ok()
    .flatten()
}

fn relative_paths(snapshot: &Snapshot) -> Vec<String> {
    snapshot.iter().map(FileRecord::relative_path).collect()
}

#[tokio::test]
async fn test_watch_nested_folder() {
    let temp_dir = TempDir::new().unwrap();
    let album = temp_dir.path().join("album");
    std::fs::create_dir(&album).unwrap();

    create_file(temp_dir.path(), "x.png", 100_000).unwrap();
    create_file(temp_dir.path(), "readme.txt", 1_000).unwrap();
    create_file(&album, "y.jpg", 50_000).unwrap();

    let watcher = fast_watcher().unwrap();
    let mut rx = watcher.subscribe();
    let root = LocalDirectory::open(temp_dir.path()).await.unwrap();
    watcher.set_root(Arc::new(root));

    let snapshot = wait_for(&mut rx, |s| s.len() == 2).await.unwrap();
    assert_eq!(relative_paths(&snapshot), vec!["/album/y.jpg", "/x.png"]);
    assert_eq!(snapshot[0].last_modified, 50_000);
    assert_eq!(snapshot[0].mime_type, "image/jpeg");
}

#[tokio::test]
async fn test_new_files_are_picked_up() {
    let temp_dir = TempDir::new().unwrap();
    create_file(temp_dir.path(), "x.png", 100_000).unwrap();
    create_file(temp_dir.path(), "y.jpg", 50_000).unwrap();

    let watcher = fast_watcher().unwrap();
    let mut rx = watcher.subscribe();
    watcher.set_root(Arc::new(LocalDirectory::open(temp_dir.path()).await.unwrap()));
    wait_for(&mut rx, |s| s.len() == 2).await.unwrap();

    create_file(temp_dir.path(), "z.mp4", 75_000).unwrap();
    create_file(temp_dir.path(), "x.png", 999_000).unwrap();

    let snapshot = wait_for(&mut rx, |s| s.len() == 3).await.unwrap();
    assert_eq!(relative_paths(&snapshot), vec!["/y.jpg", "/z.mp4", "/x.png"]);
    assert_eq!(snapshot[2].last_modified, 100_000);

    let bytes = snapshot[1].handle.read().await.unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_switching_folders_resets_index() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    create_file(first.path(), "a.gif", 1_000).unwrap();
    create_file(first.path(), "b.gif", 2_000).unwrap();
    create_file(second.path(), "c.mp4", 3_000).unwrap();

    let watcher = fast_watcher().unwrap();
    let mut rx = watcher.subscribe();
    watcher.set_root(Arc::new(LocalDirectory::open(first.path()).await.unwrap()));
    wait_for(&mut rx, |s| s.len() == 2).await.unwrap();

    let generation =
        watcher.set_root(Arc::new(LocalDirectory::open(second.path()).await.unwrap()));
    let snapshot = wait_for(&mut rx, |s| s.generation() == generation && s.len() == 1)
        .await
        .unwrap();
    assert_eq!(relative_paths(&snapshot), vec!["/c.mp4"]);
}

#[tokio::test]
async fn test_failed_open_keeps_current_root() {
    let temp_dir = TempDir::new().unwrap();
    create_file(temp_dir.path(), "a.png", 1_000).unwrap();

    let watcher = fast_watcher().unwrap();
    let mut rx = watcher.subscribe();
    watcher.set_root(Arc::new(LocalDirectory::open(temp_dir.path()).await.unwrap()));
    wait_for(&mut rx, |s| s.len() == 1).await.unwrap();

    let missing = temp_dir.path().join("missing");
    assert!(LocalDirectory::open(&missing).await.is_err());
    assert_eq!(watcher.generation(), 1);
    assert_eq!(watcher.current().len(), 1);
}
