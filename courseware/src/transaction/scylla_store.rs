use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use charybdis::types::{BigInt, Uuid};
use scylla::client::caching_session::CachingSession;

use crate::errors::CourseError;
use crate::models::traits::{ContainerRecord, ItemRecord};
use crate::models::{ContainerVersion, Record};
use crate::ordering::Container;
use crate::transaction::store::{Store, Transaction};
use crate::transaction::write_set::{Mutation, WriteSet};

mod fence;
mod flush;

/// Scylla has no multi-partition transactions, so they are built on top of it: writes are
/// staged and flushed through logged batches at commit, and isolation between transactions
/// comes from a versioned fence per container.
///
/// Commit takes the fence of every container read, moving it to the next version under a
/// lease, flushes, then releases the lease. Reads refuse a container whose lease is live, and
/// a transaction whose observed version moved loses its commit. Either way the conflict is
/// transient and the unit of work reruns from fresh reads.
#[derive(Clone)]
pub struct ScyllaStore {
    db_session: Arc<CachingSession>,
}

impl ScyllaStore {
    pub fn new(db_session: Arc<CachingSession>) -> Self {
        Self { db_session }
    }
}

#[async_trait]
impl Store for ScyllaStore {
    type Tx = ScyllaTransaction;

    async fn begin(&self) -> Result<Self::Tx, CourseError> {
        Ok(ScyllaTransaction {
            db_session: self.db_session.clone(),
            write_set: Mutex::new(WriteSet::default()),
            fences: Mutex::new(BTreeMap::new()),
        })
    }
}

pub struct ScyllaTransaction {
    db_session: Arc<CachingSession>,
    write_set: Mutex<WriteSet>,
    // container id -> fence version observed on first read, `None` when never fenced
    fences: Mutex<BTreeMap<Uuid, Option<BigInt>>>,
}

impl ScyllaTransaction {
    async fn observe_fence(&self, container_id: Uuid) -> Result<(), CourseError> {
        let observed = self.fences.lock()?.contains_key(&container_id);

        if observed {
            return Ok(());
        }

        let fence = ContainerVersion::observe(&self.db_session, container_id).await?;
        let version = fence::observed_version(container_id, fence.as_ref(), Utc::now())?;

        // a concurrent read of the same container may have won, keep the first observation
        self.fences.lock()?.entry(container_id).or_insert(version);

        Ok(())
    }
}

#[async_trait]
impl Transaction for ScyllaTransaction {
    async fn find_by_container<T: ItemRecord>(&self, container_id: Uuid) -> Result<Vec<T>, CourseError> {
        self.observe_fence(container_id).await?;

        let stored = T::find_by_container_id(&self.db_session, container_id).await?;

        Ok(self.write_set.lock()?.overlay(container_id, stored))
    }

    async fn find_container<C: ContainerRecord>(&self, container: &Container) -> Result<Option<C>, CourseError> {
        self.observe_fence(container.id()).await?;

        let stored = C::find_container(&self.db_session, container).await?;

        Ok(self.write_set.lock()?.overlay_one(container.id(), stored))
    }

    fn stage(&self, mutation: Mutation, record: Record) -> Result<(), CourseError> {
        self.write_set.lock()?.stage(mutation, record);

        Ok(())
    }

    async fn commit(self) -> Result<(), CourseError> {
        let write_set = self.write_set.into_inner()?;

        if write_set.is_empty() {
            return Ok(());
        }

        let fences = self.fences.into_inner()?;

        let acquired = fence::acquire(&self.db_session, &fences, Utc::now()).await?;

        // A failed flush still releases: the retry rewrites the whole ordering of every
        // container it touched, so it repairs what was partially written.
        let flushed = flush::flush(&self.db_session, write_set).await;
        fence::release(&self.db_session, &acquired).await;

        flushed
    }

    fn abort(self) {
        let staged = self.write_set.lock().map(|write_set| write_set.len()).unwrap_or_default();

        if staged > 0 {
            log::debug!("[scylla_store::abort] discarding {} staged writes", staged);
        }
    }
}
