//! Time-ordered, deduplicated index of discovered files.

use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use crate::record::{FileRecord, RecordKey};

/// Files discovered under one watched root, ascending by modification time.
///
/// Insert-only: a record whose `(path, name)` is already present is ignored,
/// even if its timestamp changed.
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    records: Vec<FileRecord>,
    keys: HashSet<RecordKey>,
}

impl FileIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a record into the index.
    ///
    /// Returns `false` if a record with the same key was already present.
    pub fn insert(&mut self, incoming: FileRecord) -> bool {
        let key = incoming.key();
        if self.keys.contains(&key) {
            return false;
        }

        let position = self
            .records
            .partition_point(|existing| existing.last_modified < incoming.last_modified);
        self.records.insert(position, incoming);
        self.keys.insert(key);
        true
    }

    /// Owned variant of [`insert`](Self::insert) for folding over a sequence.
    pub fn fold(mut self, incoming: FileRecord) -> Self {
        self.insert(incoming);
        self
    }

    pub fn contains(&self, record: &FileRecord) -> bool {
        self.keys.contains(&record.key())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Copy the current state into an immutable snapshot.
    pub fn snapshot(&self, generation: u64) -> Snapshot {
        Snapshot {
            generation,
            records: self.records.as_slice().into(),
        }
    }
}

impl FromIterator<FileRecord> for FileIndex {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), Self::fold)
    }
}

/// Immutable copy of an index, as delivered to consumers.
///
/// `generation` identifies the root that produced it; generation 0 is the
/// idle state before any root was set.
#[derive(Debug, Clone)]
pub struct Snapshot {
    generation: u64,
    records: Arc<[FileRecord]>,
}

impl Snapshot {
    /// An empty snapshot for the given root generation.
    pub fn empty(generation: u64) -> Self {
        Self {
            generation,
            records: Arc::from(Vec::new()),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }
}

impl Deref for Snapshot {
    type Target = [FileRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}
