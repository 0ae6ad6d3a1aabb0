use async_trait::async_trait;
use charybdis::types::Uuid;

use crate::errors::CourseError;
use crate::models::traits::{ContainerRecord, ItemRecord};
use crate::models::Record;
use crate::ordering::Container;
use crate::transaction::write_set::Mutation;

/// Snapshot-isolated unit of work against a store.
///
/// Reads observe the snapshot taken at `begin` overlaid with this transaction's own staged
/// writes. Writes are staged and only become visible to others on `commit`. Dropping a
/// transaction without committing discards its writes.
#[async_trait]
pub trait Transaction: Send + Sync + Sized {
    async fn find_by_container<T: ItemRecord>(&self, container_id: Uuid) -> Result<Vec<T>, CourseError>;

    async fn find_container<C: ContainerRecord>(&self, container: &Container) -> Result<Option<C>, CourseError>;

    fn stage(&self, mutation: Mutation, record: Record) -> Result<(), CourseError>;

    /// Fails with a transient `WriteConflict` when another transaction committed a
    /// conflicting write after this one began.
    async fn commit(self) -> Result<(), CourseError>;

    fn abort(self);
}

#[async_trait]
pub trait Store: Send + Sync + 'static {
    type Tx: Transaction + 'static;

    async fn begin(&self) -> Result<Self::Tx, CourseError>;
}
