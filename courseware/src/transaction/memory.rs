use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use charybdis::types::Uuid;
use serde_json::Value;

use crate::errors::CourseError;
use crate::models::traits::{ContainerRecord, ItemRecord, Stored};
use crate::models::{Collection, Record};
use crate::ordering::Container;
use crate::transaction::store::{Store, Transaction};
use crate::transaction::write_set::{Mutation, WriteSet};

#[derive(Debug, Clone)]
struct Versioned {
    partition_id: Uuid,
    // `None` is a tombstone, kept so deletes take part in conflict detection
    document: Option<Value>,
    version: u64,
}

type Documents = HashMap<(Collection, Uuid), Versioned>;

#[derive(Default)]
struct State {
    documents: Arc<Documents>,
    sequence: u64,
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    injected_failures: AtomicUsize,
    begins: AtomicUsize,
    commits: AtomicUsize,
    aborts: AtomicUsize,
    conflicts: AtomicUsize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub begins: usize,
    pub commits: usize,
    pub aborts: usize,
    pub conflicts: usize,
}

/// In-process multi-version document store.
///
/// Documents are kept as json under `(collection, id)` with the sequence number of the
/// commit that last wrote them. A transaction reads the immutable map current at `begin` and
/// commits only if none of the documents it writes changed since, first committer wins.
#[derive(Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` commits fail with a transient connection error.
    pub fn fail_next_commits(&self, count: usize) {
        self.shared.injected_failures.store(count, Ordering::SeqCst);
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            begins: self.shared.begins.load(Ordering::SeqCst),
            commits: self.shared.commits.load(Ordering::SeqCst),
            aborts: self.shared.aborts.load(Ordering::SeqCst),
            conflicts: self.shared.conflicts.load(Ordering::SeqCst),
        }
    }

    /// Writes documents directly, outside of any transaction.
    pub fn seed<T: Stored>(&self, documents: impl IntoIterator<Item = T>) -> Result<(), CourseError> {
        let prepared = documents
            .into_iter()
            .map(|document| Ok((document.key(), document.partition_id(), serde_json::to_value(&document)?)))
            .collect::<Result<Vec<_>, CourseError>>()?;

        let mut state = self.shared.state.lock()?;
        state.sequence += 1;
        let version = state.sequence;
        let documents = Arc::make_mut(&mut state.documents);

        for (id, partition_id, document) in prepared {
            documents.insert(
                (T::COLLECTION, id),
                Versioned {
                    partition_id,
                    document: Some(document),
                    version,
                },
            );
        }

        Ok(())
    }

    /// Latest committed version of a document.
    pub fn get<T: Stored>(&self, id: Uuid) -> Result<Option<T>, CourseError> {
        let documents = self.snapshot()?.0;

        decode(documents.get(&(T::COLLECTION, id)))
    }

    /// Latest committed documents of one partition, in no particular order.
    pub fn list<T: Stored>(&self, partition_id: Uuid) -> Result<Vec<T>, CourseError> {
        let documents = self.snapshot()?.0;

        scan(&documents, partition_id)
    }

    fn snapshot(&self) -> Result<(Arc<Documents>, u64), CourseError> {
        let state = self.shared.state.lock()?;

        Ok((state.documents.clone(), state.sequence))
    }
}

fn decode<T: Stored>(versioned: Option<&Versioned>) -> Result<Option<T>, CourseError> {
    match versioned.and_then(|versioned| versioned.document.as_ref()) {
        Some(document) => Ok(Some(serde_json::from_value(document.clone())?)),
        None => Ok(None),
    }
}

fn scan<T: Stored>(documents: &Documents, partition_id: Uuid) -> Result<Vec<T>, CourseError> {
    documents
        .iter()
        .filter(|((collection, _), versioned)| *collection == T::COLLECTION && versioned.partition_id == partition_id)
        .filter_map(|(_, versioned)| versioned.document.as_ref())
        .map(|document| serde_json::from_value(document.clone()).map_err(CourseError::from))
        .collect()
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, CourseError> {
        let (snapshot, start_sequence) = self.snapshot()?;
        self.shared.begins.fetch_add(1, Ordering::SeqCst);

        Ok(MemoryTransaction {
            shared: self.shared.clone(),
            snapshot,
            start_sequence,
            write_set: Mutex::new(WriteSet::default()),
        })
    }
}

pub struct MemoryTransaction {
    shared: Arc<Shared>,
    snapshot: Arc<Documents>,
    start_sequence: u64,
    write_set: Mutex<WriteSet>,
}

impl MemoryTransaction {
    fn take_injected_failure(&self) -> bool {
        self.shared
            .injected_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| remaining.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn find_by_container<T: ItemRecord>(&self, container_id: Uuid) -> Result<Vec<T>, CourseError> {
        // every read is a suspension point, like a round trip to a real store
        tokio::task::yield_now().await;

        let stored = scan(&self.snapshot, container_id)?;

        Ok(self.write_set.lock()?.overlay(container_id, stored))
    }

    async fn find_container<C: ContainerRecord>(&self, container: &Container) -> Result<Option<C>, CourseError> {
        tokio::task::yield_now().await;

        if C::COLLECTION != container.collection() {
            return Ok(None);
        }

        let stored = decode(self.snapshot.get(&(C::COLLECTION, container.id())))?;

        Ok(self.write_set.lock()?.overlay_one(container.id(), stored))
    }

    fn stage(&self, mutation: Mutation, record: Record) -> Result<(), CourseError> {
        self.write_set.lock()?.stage(mutation, record);

        Ok(())
    }

    async fn commit(self) -> Result<(), CourseError> {
        if self.take_injected_failure() {
            self.shared.aborts.fetch_add(1, Ordering::SeqCst);

            return Err(CourseError::Connection("injected commit failure".to_string()));
        }

        let write_set = self.write_set.into_inner()?;

        let prepared = write_set
            .into_entries()
            .map(|(mutation, record)| {
                let document = match mutation {
                    Mutation::Delete => None,
                    _ => Some(record.to_document()?),
                };

                Ok(((record.collection(), record.key()), record.partition_id(), document))
            })
            .collect::<Result<Vec<_>, CourseError>>()?;

        let mut state = self.shared.state.lock()?;

        let conflict = prepared.iter().find(|(key, _, _)| match state.documents.get(key) {
            Some(current) => current.version > self.start_sequence,
            None => false,
        });

        if let Some(((collection, id), _, _)) = conflict {
            self.shared.conflicts.fetch_add(1, Ordering::SeqCst);
            self.shared.aborts.fetch_add(1, Ordering::SeqCst);

            log::debug!("[memory::commit] {} {} changed since snapshot", collection, id);

            return Err(CourseError::WriteConflict(format!(
                "{} {} was committed by a concurrent transaction",
                collection, id
            )));
        }

        if !prepared.is_empty() {
            state.sequence += 1;
            let version = state.sequence;
            let documents = Arc::make_mut(&mut state.documents);

            for (key, partition_id, document) in prepared {
                documents.insert(
                    key,
                    Versioned {
                        partition_id,
                        document,
                        version,
                    },
                );
            }
        }

        self.shared.commits.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }

    fn abort(self) {
        self.shared.aborts.fetch_add(1, Ordering::SeqCst);
    }
}
