use async_trait::async_trait;
use charybdis::macros::charybdis_model;
use charybdis::operations::Find;
use charybdis::options::Consistency;
use charybdis::types::{Frozen, Int, List, Text, Timestamp, Uuid};
use courseware_macros::{Orderable, Stored};
use scylla::client::caching_session::CachingSession;
use serde::{Deserialize, Serialize};

use crate::errors::CourseError;
use crate::models::traits::{ContainerRecord, ItemRecord};
use crate::models::udts::ContentEntry;
use crate::ordering::Container;

/// A chapter is ordered within its course and owns the position space of its lectures
/// and quizzes. `content` is the projection of that space.
#[charybdis_model(
    table_name = chapters,
    partition_keys = [course_id],
    clustering_keys = [id],
)]
#[derive(Orderable, Stored, Serialize, Deserialize, Default, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub course_id: Uuid,

    #[serde(default)]
    pub id: Uuid,

    pub title: Text,

    #[serde(rename = "order", default)]
    pub order_index: Int,

    pub content: Option<List<Frozen<ContentEntry>>>,

    #[serde(default = "chrono::Utc::now")]
    pub created_at: Timestamp,

    #[serde(default = "chrono::Utc::now")]
    pub updated_at: Timestamp,
}

impl Chapter {
    pub fn container(&self) -> Container {
        Container::Chapter {
            course_id: self.course_id,
            id: self.id,
        }
    }
}

#[async_trait]
impl ItemRecord for Chapter {
    async fn find_by_container_id(db_session: &CachingSession, course_id: Uuid) -> Result<Vec<Self>, CourseError> {
        let chapters = Chapter::find_by_course_id(course_id)
            .consistency(Consistency::Quorum)
            .execute(db_session)
            .await?
            .try_collect()
            .await?;

        Ok(chapters)
    }
}

#[async_trait]
impl ContainerRecord for Chapter {
    fn content(&self) -> &[ContentEntry] {
        self.content.as_deref().unwrap_or_default()
    }

    fn set_content(&mut self, content: Vec<ContentEntry>) {
        self.content = Some(content);
    }

    async fn find_container(db_session: &CachingSession, container: &Container) -> Result<Option<Self>, CourseError> {
        let (course_id, id) = match container {
            Container::Chapter { course_id, id } => (*course_id, *id),
            Container::Course { .. } => return Ok(None),
        };

        let chapter = Chapter::maybe_find_by_primary_key_value((course_id, id))
            .consistency(Consistency::Quorum)
            .execute(db_session)
            .await?;

        Ok(chapter)
    }
}

partial_chapter!(UpdateOrderChapter, course_id, id, order_index, updated_at);

impl From<&Chapter> for UpdateOrderChapter {
    fn from(chapter: &Chapter) -> Self {
        Self {
            course_id: chapter.course_id,
            id: chapter.id,
            order_index: chapter.order_index,
            updated_at: chapter.updated_at,
        }
    }
}

partial_chapter!(UpdateContentChapter, course_id, id, content, updated_at);

impl From<&Chapter> for UpdateContentChapter {
    fn from(chapter: &Chapter) -> Self {
        Self {
            course_id: chapter.course_id,
            id: chapter.id,
            content: chapter.content.clone(),
            updated_at: chapter.updated_at,
        }
    }
}
