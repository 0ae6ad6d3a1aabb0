use async_trait::async_trait;
use charybdis::macros::charybdis_model;
use charybdis::operations::Find;
use charybdis::options::Consistency;
use charybdis::types::{Frozen, List, Text, Timestamp, Uuid};
use courseware_macros::Stored;
use scylla::client::caching_session::CachingSession;
use serde::{Deserialize, Serialize};

use crate::errors::CourseError;
use crate::models::traits::ContainerRecord;
use crate::models::udts::ContentEntry;
use crate::ordering::Container;

#[charybdis_model(
    table_name = courses,
    partition_keys = [id],
    clustering_keys = [],
)]
#[derive(Stored, Serialize, Deserialize, Default, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default)]
    pub id: Uuid,

    pub title: Text,

    pub content: Option<List<Frozen<ContentEntry>>>,

    #[serde(default = "chrono::Utc::now")]
    pub created_at: Timestamp,

    #[serde(default = "chrono::Utc::now")]
    pub updated_at: Timestamp,
}

impl Course {
    pub fn container(&self) -> Container {
        Container::Course { id: self.id }
    }
}

#[async_trait]
impl ContainerRecord for Course {
    fn content(&self) -> &[ContentEntry] {
        self.content.as_deref().unwrap_or_default()
    }

    fn set_content(&mut self, content: Vec<ContentEntry>) {
        self.content = Some(content);
    }

    async fn find_container(db_session: &CachingSession, container: &Container) -> Result<Option<Self>, CourseError> {
        let id = match container {
            Container::Course { id } => *id,
            Container::Chapter { .. } => return Ok(None),
        };

        let course = Course::maybe_find_by_primary_key_value((id,))
            .consistency(Consistency::Quorum)
            .execute(db_session)
            .await?;

        Ok(course)
    }
}

partial_course!(UpdateContentCourse, id, content, updated_at);

impl From<&Course> for UpdateContentCourse {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            content: course.content.clone(),
            updated_at: course.updated_at,
        }
    }
}
