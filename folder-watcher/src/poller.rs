//! Periodic rescans of the watched root, folded into its index.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::handle::DirectoryHandle;
use crate::index::{FileIndex, Snapshot};
use crate::traverser::walk;

/// A request to start watching a new root.
#[derive(Debug)]
pub(crate) struct RootRequest {
    pub generation: u64,
    pub root: Arc<dyn DirectoryHandle>,
    /// Cancelled as soon as another root is requested.
    pub token: CancellationToken,
}

/// How a single scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The walk finished; `added` records were new.
    Completed { added: usize },
    /// The root could not be listed; the index was left untouched.
    RootUnavailable,
    /// Another root was requested while walking; results were discarded.
    Superseded,
}

struct ActiveRoot {
    generation: u64,
    root: Arc<dyn DirectoryHandle>,
    token: CancellationToken,
    index: FileIndex,
    ticker: Interval,
}

/// Single writer of the index: every fold happens on this task.
pub(crate) struct Poller {
    requests: mpsc::UnboundedReceiver<RootRequest>,
    output: mpsc::Sender<Snapshot>,
    period: Duration,
    active: Option<ActiveRoot>,
    shutdown: CancellationToken,
}

impl Poller {
    pub(crate) fn new(
        requests: mpsc::UnboundedReceiver<RootRequest>,
        output: mpsc::Sender<Snapshot>,
        period: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            requests,
            output,
            period,
            active: None,
            shutdown,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                request = self.requests.recv() => match request {
                    Some(request) => {
                        if !self.activate(request).await {
                            break;
                        }
                    }
                    None => break,
                },
                _ = next_tick(&mut self.active) => {
                    if !self.tick().await {
                        break;
                    }
                }
            }
        }
        debug!("Folder poller stopped");
    }

    /// Replace the active root and publish its empty index.
    async fn activate(&mut self, request: RootRequest) -> bool {
        if request.token.is_cancelled() {
            debug!("Skipping superseded root {}", request.root.name());
            self.active = None;
            return true;
        }
        info!(
            "Watching folder: {} (generation {})",
            request.root.name(),
            request.generation
        );

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let active = ActiveRoot {
            generation: request.generation,
            root: request.root,
            token: request.token,
            index: FileIndex::new(),
            ticker,
        };
        let snapshot = active.index.snapshot(active.generation);
        self.active = Some(active);

        self.output.send(snapshot).await.is_ok()
    }

    /// Scan the active root once. Returns `false` once nobody listens.
    async fn tick(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return true;
        };

        let outcome = scan(active).await;
        match outcome {
            TickOutcome::Completed { added } => {
                debug!(
                    "Scanned {}: {added} new, {} total",
                    active.root.name(),
                    active.index.len()
                );
                let snapshot = active.index.snapshot(active.generation);
                return self.output.send(snapshot).await.is_ok();
            }
            TickOutcome::RootUnavailable => {}
            TickOutcome::Superseded => {
                debug!(
                    "Abandoned scan of superseded root {} (generation {})",
                    active.root.name(),
                    active.generation
                );
                self.active = None;
            }
        }
        true
    }
}

/// Walk the root and fold every record into its index.
async fn scan(active: &mut ActiveRoot) -> TickOutcome {
    let mut records = walk(active.root.clone());
    let mut added = 0;

    loop {
        let next = tokio::select! {
            biased;
            _ = active.token.cancelled() => return TickOutcome::Superseded,
            next = records.next() => next,
        };

        match next {
            Some(Ok(record)) => {
                if active.index.insert(record) {
                    added += 1;
                }
            }
            Some(Err(e)) if e.is_root_unavailable() => {
                warn!("Skipping scan: {e}");
                return TickOutcome::RootUnavailable;
            }
            Some(Err(e)) => warn!("Skipping entry for this scan: {e}"),
            None => break,
        }
    }

    if active.token.is_cancelled() {
        return TickOutcome::Superseded;
    }
    TickOutcome::Completed { added }
}

async fn next_tick(active: &mut Option<ActiveRoot>) {
    match active {
        Some(active) => {
            active.ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
