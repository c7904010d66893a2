//! Change detection and throttled delivery of index snapshots.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::index::Snapshot;

/// Drops snapshots whose cardinality matches the last one seen for the same
/// root.
///
/// Two snapshots of equal length are considered equal, so a file replaced in
/// place never counts as a change. The first snapshot of a new root always
/// passes.
#[derive(Debug, Default)]
pub struct ChangeFilter {
    last: Option<(u64, usize)>,
}

impl ChangeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `snapshot` differs from the last admitted one.
    pub fn admit(&mut self, snapshot: &Snapshot) -> bool {
        let current = (snapshot.generation(), snapshot.len());
        if self.last == Some(current) {
            return false;
        }
        self.last = Some(current);
        true
    }

    /// Generation of the last admitted snapshot.
    pub fn generation(&self) -> Option<u64> {
        self.last.map(|(generation, _)| generation)
    }
}

/// Leading and trailing edge throttle.
///
/// The first value offered outside a window passes immediately and opens a
/// window. Values offered inside the window replace each other; the last one
/// is released by [`flush`](Self::flush) when the window closes, which opens
/// the next window.
#[derive(Debug)]
pub struct Throttle<T> {
    window: Duration,
    deadline: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
            pending: None,
        }
    }

    /// Offer a value at `now`; returns it if it may be emitted right away.
    pub fn offer(&mut self, value: T, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now < deadline => {
                self.pending = Some(value);
                None
            }
            _ => {
                self.deadline = Some(now + self.window);
                self.pending = None;
                Some(value)
            }
        }
    }

    /// Close the window if it has elapsed, releasing the trailing value.
    pub fn flush(&mut self, now: Instant) -> Option<T> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        match self.pending.take() {
            Some(value) => {
                self.deadline = Some(now + self.window);
                Some(value)
            }
            None => {
                self.deadline = None;
                None
            }
        }
    }

    /// When the current window closes, if one is open.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Forget the open window and any pending value.
    pub fn reset(&mut self) {
        self.deadline = None;
        self.pending = None;
    }
}

/// Task that filters poller snapshots and publishes them to consumers.
pub(crate) struct Emitter {
    input: mpsc::Receiver<Snapshot>,
    output: Arc<watch::Sender<Snapshot>>,
    generation: Arc<AtomicU64>,
    filter: ChangeFilter,
    throttle: Throttle<Snapshot>,
    shutdown: CancellationToken,
}

impl Emitter {
    pub(crate) fn new(
        input: mpsc::Receiver<Snapshot>,
        output: Arc<watch::Sender<Snapshot>>,
        generation: Arc<AtomicU64>,
        window: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            input,
            output,
            generation,
            filter: ChangeFilter::new(),
            throttle: Throttle::new(window),
            shutdown,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            let deadline = self.throttle.deadline();
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(snapshot) = self.throttle.flush(Instant::now()) {
                        self.publish(snapshot);
                    }
                }
                snapshot = self.input.recv() => match snapshot {
                    Some(snapshot) => self.accept(snapshot),
                    None => break,
                },
            }
        }
        debug!("Snapshot emitter stopped");
    }

    fn accept(&mut self, snapshot: Snapshot) {
        if !self.is_current(&snapshot) {
            debug!(
                "Dropping snapshot of superseded root generation {}",
                snapshot.generation()
            );
            return;
        }

        if self.filter.generation() != Some(snapshot.generation()) {
            self.throttle.reset();
        }
        if !self.filter.admit(&snapshot) {
            return;
        }

        let now = Instant::now();
        if let Some(trailing) = self.throttle.flush(now) {
            self.publish(trailing);
        }
        if let Some(leading) = self.throttle.offer(snapshot, now) {
            self.publish(leading);
        }
    }

    /// Publish `snapshot` unless its root was superseded.
    ///
    /// The generation is checked while the channel is locked, so a root
    /// switch either happens before the check or overwrites this value.
    fn publish(&self, snapshot: Snapshot) {
        let generation = snapshot.generation();
        let len = snapshot.len();
        let published = self.output.send_if_modified(|current| {
            if !self.is_current(&snapshot) {
                return false;
            }
            if current.generation() == generation && current.len() == len {
                return false;
            }
            *current = snapshot;
            true
        });
        if published {
            debug!("Emitting snapshot with {len} files (generation {generation})");
        }
    }

    fn is_current(&self, snapshot: &Snapshot) -> bool {
        snapshot.generation() == self.generation.load(Ordering::SeqCst)
    }
}
