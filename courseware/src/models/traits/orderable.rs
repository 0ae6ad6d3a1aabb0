use async_trait::async_trait;
use charybdis::types::{Int, Timestamp, Uuid};
use scylla::client::caching_session::CachingSession;

use crate::errors::CourseError;
use crate::models::traits::Stored;
use crate::models::udts::ContentEntry;
use crate::ordering::{ItemKind, OrderableItem};

/// implemented by #[derive(Orderable)]
pub trait Orderable {
    const KIND: ItemKind;

    fn id(&self) -> Uuid;

    fn container_id(&self) -> Uuid;

    fn order_index(&self) -> Int;

    fn set_order_index(&mut self, order_index: Int);

    fn created_at(&self) -> Timestamp;

    fn title(&self) -> &str;

    fn preview(&self) -> bool;

    fn to_orderable(&self) -> OrderableItem {
        OrderableItem {
            id: self.id(),
            kind: Self::KIND,
            order: self.order_index(),
            container_id: self.container_id(),
            created_at: self.created_at(),
        }
    }

    fn to_content_entry(&self) -> ContentEntry {
        ContentEntry {
            item_kind: Self::KIND.to_string(),
            ref_id: self.id(),
            title: self.title().to_string(),
            order_index: self.order_index(),
            preview: self.preview(),
        }
    }
}

/// Item model stored in its own collection, partitioned by container.
#[async_trait]
pub trait ItemRecord: Orderable + Stored {
    async fn find_by_container_id(db_session: &CachingSession, container_id: Uuid) -> Result<Vec<Self>, CourseError>;
}
