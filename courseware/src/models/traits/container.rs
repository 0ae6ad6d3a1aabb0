use async_trait::async_trait;
use scylla::client::caching_session::CachingSession;

use crate::errors::CourseError;
use crate::models::traits::Stored;
use crate::models::udts::ContentEntry;
use crate::ordering::Container;

/// Document owning a position space and carrying its content projection.
#[async_trait]
pub trait ContainerRecord: Stored {
    fn content(&self) -> &[ContentEntry];

    fn set_content(&mut self, content: Vec<ContentEntry>);

    /// `None` when the container doesn't exist or is of another kind.
    async fn find_container(db_session: &CachingSession, container: &Container) -> Result<Option<Self>, CourseError>;
}
