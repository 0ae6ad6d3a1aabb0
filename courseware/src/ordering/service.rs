use std::sync::Arc;

use charybdis::types::{Int, Uuid};

use crate::constants::SENTINEL_ORDER;
use crate::errors::CourseError;
use crate::models::traits::ItemRecord;
use crate::models::udts::ContentEntry;
use crate::models::{Chapter, Lecture, Quiz};
use crate::ordering::model::{Container, ItemKind, ReorderRequest, ResolvedOrder};
use crate::ordering::projection::rebuild_projection;
use crate::ordering::repository::{find_container_items, ItemRepository};
use crate::ordering::resolver::resolve;
use crate::ordering::writer::apply_ordering;
use crate::resources::cache_invalidator::{CacheInvalidator, NoopInvalidator};
use crate::transaction::{run_in_transaction, RetryPolicy, Store, Transaction};

/// Entry point for every operation that changes the position space of a container.
///
/// Each operation runs as one retried transaction: load, resolve, write, rebuild the
/// projection. Cached summaries of the container are invalidated after the commit.
pub struct ContentService<S: Store> {
    store: S,
    policy: RetryPolicy,
    invalidator: Arc<dyn CacheInvalidator>,
}

impl<S: Store> ContentService<S> {
    pub fn new(store: S, policy: RetryPolicy) -> Self {
        Self {
            store,
            policy,
            invalidator: Arc::new(NoopInvalidator),
        }
    }

    pub fn with_invalidator(mut self, invalidator: Arc<dyn CacheInvalidator>) -> Self {
        self.invalidator = invalidator;
        self
    }

    /// Moves the requested items and renumbers the whole container `1..=N`.
    pub async fn reorder(
        &self,
        container: Container,
        requests: Vec<ReorderRequest>,
    ) -> Result<Vec<ResolvedOrder>, CourseError> {
        let resolved = run_in_transaction(&self.store, &self.policy, |tx| {
            let requests = requests.clone();

            Box::pin(async move { reorder_within(tx, &container, &requests).await })
        })
        .await?;

        self.invalidate(container);

        Ok(resolved)
    }

    /// Creates `item` in `container`. Without a position it is appended after the last item.
    /// With one, it is created with `SENTINEL_ORDER` and folded into a reorder of the whole
    /// container within the same transaction. Returns the item as stored.
    pub async fn add_item<T: ItemRecord>(
        &self,
        container: Container,
        item: T,
        desired_order: Option<Int>,
    ) -> Result<T, CourseError> {
        if !container.accepts(T::KIND) || item.container_id() != container.id() {
            return Err(CourseError::NotFound(format!(
                "{} {} does not belong to {} {}",
                T::KIND,
                item.id(),
                container.collection(),
                container.id()
            )));
        }

        let created = run_in_transaction(&self.store, &self.policy, |tx| {
            let item = item.clone();

            Box::pin(async move { add_within(tx, &container, item, desired_order).await })
        })
        .await?;

        self.invalidate(container);

        Ok(created)
    }

    /// Deletes an item and rebuilds the projection. Remaining orders are left as they are,
    /// the next reorder compacts them.
    pub async fn remove_item(&self, container: Container, item_kind: ItemKind, item_id: Uuid) -> Result<(), CourseError> {
        if !container.accepts(item_kind) {
            return Err(CourseError::NotFound(format!(
                "{} {} in {} {}",
                item_kind,
                item_id,
                container.collection(),
                container.id()
            )));
        }

        run_in_transaction(&self.store, &self.policy, |tx| {
            Box::pin(async move {
                match item_kind {
                    ItemKind::Lecture => {
                        ItemRepository::<S::Tx, Lecture>::new(tx)
                            .delete(container.id(), item_id)
                            .await?;
                    }
                    ItemKind::Quiz => {
                        ItemRepository::<S::Tx, Quiz>::new(tx)
                            .delete(container.id(), item_id)
                            .await?;
                    }
                    ItemKind::Chapter => {
                        ItemRepository::<S::Tx, Chapter>::new(tx)
                            .delete(container.id(), item_id)
                            .await?;
                    }
                }

                rebuild_projection(tx, &container).await?;

                Ok(())
            })
        })
        .await?;

        self.invalidate(container);

        Ok(())
    }

    pub async fn refresh_projection(&self, container: Container) -> Result<Vec<ContentEntry>, CourseError> {
        let entries = run_in_transaction(&self.store, &self.policy, |tx| {
            Box::pin(async move { rebuild_projection(tx, &container).await })
        })
        .await?;

        self.invalidate(container);

        Ok(entries)
    }

    fn invalidate(&self, container: Container) {
        let invalidator = self.invalidator.clone();
        let keys = container.cache_keys();

        tokio::spawn(async move {
            if let Err(e) = invalidator.invalidate(&keys).await {
                log::error!("[invalidate] failed to invalidate {:?}: {}", keys, e);
            }
        });
    }
}

async fn reorder_within<Tx: Transaction>(
    tx: &Tx,
    container: &Container,
    requests: &[ReorderRequest],
) -> Result<Vec<ResolvedOrder>, CourseError> {
    let items = find_container_items(tx, container).await?;
    let resolved = resolve(&items, requests)?;

    apply_ordering(tx, &resolved, container).await?;
    rebuild_projection(tx, container).await?;

    Ok(resolved)
}

async fn add_within<Tx: Transaction, T: ItemRecord>(
    tx: &Tx,
    container: &Container,
    mut item: T,
    desired_order: Option<Int>,
) -> Result<T, CourseError> {
    let repository = ItemRepository::<Tx, T>::new(tx);
    let items = find_container_items(tx, container).await?;

    match desired_order {
        None => {
            // max rather than count, deletes leave gaps until the next reorder
            let last = items.iter().map(|existing| existing.order).max().unwrap_or(0);

            item.set_order_index(last + 1);
            repository.insert(item.clone())?;
        }
        Some(desired_order) => {
            item.set_order_index(SENTINEL_ORDER);
            repository.insert(item.clone())?;

            let mut items = items;
            items.push(item.to_orderable());

            let request = ReorderRequest {
                item_id: item.id(),
                item_kind: T::KIND,
                desired_order,
            };

            let resolved = resolve(&items, &[request])?;
            apply_ordering(tx, &resolved, container).await?;

            if let Some(placed) = resolved.iter().find(|entry| entry.item_id == item.id()) {
                item.set_order_index(placed.new_order);
            }
        }
    }

    rebuild_projection(tx, container).await?;

    Ok(item)
}
