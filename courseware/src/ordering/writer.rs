use std::collections::BTreeMap;

use crate::errors::CourseError;
use crate::models::{Chapter, Lecture, Quiz};
use crate::ordering::model::{Container, ItemKind, OrderUpdate, ResolvedOrder};
use crate::ordering::repository::ItemRepository;
use crate::transaction::Transaction;

/// Stages a resolved ordering, one bulk order update per backing collection. Unchanged items
/// are written as well, so the persisted state is exactly the resolved one.
pub async fn apply_ordering<Tx: Transaction>(
    tx: &Tx,
    resolved: &[ResolvedOrder],
    container: &Container,
) -> Result<(), CourseError> {
    let mut updates_by_kind: BTreeMap<ItemKind, Vec<OrderUpdate>> = BTreeMap::new();

    for entry in resolved {
        if !container.accepts(entry.item_kind) {
            return Err(CourseError::NotFound(format!(
                "{} {} cannot be ordered within {} {}",
                entry.item_kind,
                entry.item_id,
                container.collection(),
                container.id()
            )));
        }

        updates_by_kind
            .entry(entry.item_kind)
            .or_default()
            .push(OrderUpdate::from(entry));
    }

    for (kind, updates) in updates_by_kind {
        match kind {
            ItemKind::Lecture => {
                ItemRepository::<Tx, Lecture>::new(tx)
                    .bulk_set_order(container.id(), &updates)
                    .await?
            }
            ItemKind::Quiz => {
                ItemRepository::<Tx, Quiz>::new(tx)
                    .bulk_set_order(container.id(), &updates)
                    .await?
            }
            ItemKind::Chapter => {
                ItemRepository::<Tx, Chapter>::new(tx)
                    .bulk_set_order(container.id(), &updates)
                    .await?
            }
        }
    }

    Ok(())
}
