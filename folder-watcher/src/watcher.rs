//! Public entry point: set a root, consume snapshots.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::WatcherConfig;
use crate::emitter::Emitter;
use crate::error::Result;
use crate::handle::DirectoryHandle;
use crate::index::Snapshot;
use crate::poller::{Poller, RootRequest};

/// Watches one folder at a time and publishes its index.
///
/// Must be created inside a tokio runtime; the poller and emitter run as
/// background tasks until the watcher is dropped or shut down.
pub struct FolderWatcher {
    config: WatcherConfig,

    /// Root requests for the poller.
    requests: mpsc::UnboundedSender<RootRequest>,

    /// Token of the currently watched root.
    current: Mutex<CancellationToken>,

    /// Generation of the currently watched root, shared with the emitter.
    generation: Arc<AtomicU64>,

    /// Latest emitted snapshot, also written by the emitter.
    output: Arc<watch::Sender<Snapshot>>,

    snapshots: watch::Receiver<Snapshot>,

    shutdown: CancellationToken,
}

impl FolderWatcher {
    /// Create a watcher and spawn its background tasks.
    pub fn new(config: WatcherConfig) -> Result<Self> {
        config.validate()?;

        let shutdown = CancellationToken::new();
        let generation = Arc::new(AtomicU64::new(0));
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = mpsc::channel(config.snapshot_buffer);
        let (output_tx, output_rx) = watch::channel(Snapshot::empty(0));
        let output_tx = Arc::new(output_tx);

        let poller = Poller::new(
            request_rx,
            snapshot_tx,
            config.poll_interval(),
            shutdown.clone(),
        );
        let emitter = Emitter::new(
            snapshot_rx,
            output_tx.clone(),
            generation.clone(),
            config.throttle_window(),
            shutdown.clone(),
        );
        tokio::spawn(poller.run());
        tokio::spawn(emitter.run());

        Ok(Self {
            config,
            requests: request_tx,
            current: Mutex::new(shutdown.child_token()),
            generation,
            output: output_tx,
            snapshots: output_rx,
            shutdown,
        })
    }

    /// Create a watcher with the default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(WatcherConfig::default())
    }

    /// Start watching `root`, superseding any previous root.
    ///
    /// Returns immediately; the first scan runs in the background. Once this
    /// returns, consumers see the new root's empty index until its first scan
    /// lands. Returns the generation assigned to this root.
    pub fn set_root(&self, root: Arc<dyn DirectoryHandle>) -> u64 {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

        let token = self.shutdown.child_token();
        let previous = std::mem::replace(&mut *current, token.clone());
        previous.cancel();

        // Bump before publishing: the emitter checks the generation under the
        // channel lock, so nothing of the old root can land after this.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.output.send_replace(Snapshot::empty(generation));
        info!("New folder to watch: {} (generation {generation})", root.name());

        let request = RootRequest {
            generation,
            root,
            token,
        };
        if self.requests.send(request).is_err() {
            warn!("Folder poller is not running; root ignored");
        }
        generation
    }

    /// Generation of the most recently set root (0 before any).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Continuous stream of snapshots, starting with the latest one.
    pub fn snapshots(&self) -> WatchStream<Snapshot> {
        WatchStream::new(self.snapshots.clone())
    }

    /// Receiver of snapshots for callers that prefer `changed()`.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// The latest emitted snapshot.
    pub fn current(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    /// Stop the background tasks.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for FolderWatcher {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
