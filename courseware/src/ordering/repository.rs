use std::collections::HashMap;
use std::marker::PhantomData;

use charybdis::types::Uuid;

use crate::errors::CourseError;
use crate::models::traits::{ContainerRecord, ItemRecord, Orderable};
use crate::models::udts::ContentEntry;
use crate::models::{Chapter, Lecture, Quiz};
use crate::ordering::model::{Container, OrderUpdate, OrderableItem};
use crate::transaction::{Mutation, Transaction};

/// Transaction scoped access to one item collection.
pub struct ItemRepository<'tx, Tx, T> {
    tx: &'tx Tx,
    _item: PhantomData<T>,
}

impl<'tx, Tx: Transaction, T: ItemRecord> ItemRepository<'tx, Tx, T> {
    pub fn new(tx: &'tx Tx) -> Self {
        Self { tx, _item: PhantomData }
    }

    pub async fn find_by_container(&self, container_id: Uuid) -> Result<Vec<T>, CourseError> {
        self.tx.find_by_container::<T>(container_id).await
    }

    /// Stages new orders for items of `container_id`. Every update must name an item of
    /// that container.
    pub async fn bulk_set_order(&self, container_id: Uuid, updates: &[OrderUpdate]) -> Result<(), CourseError> {
        if updates.is_empty() {
            return Ok(());
        }

        let mut items: HashMap<Uuid, T> = self
            .find_by_container(container_id)
            .await?
            .into_iter()
            .map(|item| (item.id(), item))
            .collect();

        for update in updates {
            let mut item = items.remove(&update.id).ok_or_else(|| {
                CourseError::NotFound(format!("{} {} in container {}", T::KIND, update.id, container_id))
            })?;

            item.set_order_index(update.order);
            item.touch();

            self.tx.stage(Mutation::ORDER, item.into_record())?;
        }

        Ok(())
    }

    pub fn insert(&self, item: T) -> Result<(), CourseError> {
        self.tx.stage(Mutation::Insert, item.into_record())
    }

    pub async fn delete(&self, container_id: Uuid, id: Uuid) -> Result<T, CourseError> {
        let item = self
            .find_by_container(container_id)
            .await?
            .into_iter()
            .find(|item| item.id() == id)
            .ok_or_else(|| CourseError::NotFound(format!("{} {} in container {}", T::KIND, id, container_id)))?;

        self.tx.stage(Mutation::Delete, item.clone().into_record())?;

        Ok(item)
    }
}

/// Transaction scoped access to the container documents carrying projections.
pub struct ContainerRepository<'tx, Tx, C> {
    tx: &'tx Tx,
    _container: PhantomData<C>,
}

impl<'tx, Tx: Transaction, C: ContainerRecord> ContainerRepository<'tx, Tx, C> {
    pub fn new(tx: &'tx Tx) -> Self {
        Self {
            tx,
            _container: PhantomData,
        }
    }

    pub async fn load_for_projection(&self, container: &Container) -> Result<C, CourseError> {
        self.tx
            .find_container::<C>(container)
            .await?
            .ok_or_else(|| CourseError::NotFound(format!("{} {}", container.collection(), container.id())))
    }

    pub fn save_projection(&self, mut record: C, projection: Vec<ContentEntry>) -> Result<(), CourseError> {
        record.set_content(projection);
        record.touch();

        self.tx.stage(Mutation::CONTENT, record.into_record())
    }
}

/// Current items of a container across every collection sharing its position space.
pub async fn find_container_items<Tx: Transaction>(
    tx: &Tx,
    container: &Container,
) -> Result<Vec<OrderableItem>, CourseError> {
    match container {
        Container::Chapter { id, .. } => {
            let lecture_repository = ItemRepository::<Tx, Lecture>::new(tx);
            let quiz_repository = ItemRepository::<Tx, Quiz>::new(tx);

            let (lectures, quizzes) = futures::try_join!(
                lecture_repository.find_by_container(*id),
                quiz_repository.find_by_container(*id),
            )?;

            let items = lectures
                .iter()
                .map(|lecture| lecture.to_orderable())
                .chain(quizzes.iter().map(|quiz| quiz.to_orderable()))
                .collect();

            Ok(items)
        }
        Container::Course { id } => {
            let chapters = ItemRepository::<Tx, Chapter>::new(tx).find_by_container(*id).await?;

            Ok(chapters.iter().map(|chapter| chapter.to_orderable()).collect())
        }
    }
}
