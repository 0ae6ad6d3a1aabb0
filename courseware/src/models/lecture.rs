use async_trait::async_trait;
use charybdis::macros::charybdis_model;
use charybdis::options::Consistency;
use charybdis::types::{Boolean, Int, Text, Timestamp, Uuid};
use courseware_macros::{Orderable, Stored};
use scylla::client::caching_session::CachingSession;
use serde::{Deserialize, Serialize};

use crate::errors::CourseError;
use crate::models::traits::ItemRecord;

#[charybdis_model(
    table_name = lectures,
    partition_keys = [chapter_id],
    clustering_keys = [id],
)]
#[derive(Orderable, Stored, Serialize, Deserialize, Default, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub chapter_id: Uuid,

    #[serde(default)]
    pub id: Uuid,

    pub title: Text,

    #[serde(rename = "order", default)]
    pub order_index: Int,

    #[serde(default)]
    pub is_preview: Boolean,

    pub video_url: Option<Text>,
    pub duration_secs: Option<Int>,

    #[serde(default = "chrono::Utc::now")]
    pub created_at: Timestamp,

    #[serde(default = "chrono::Utc::now")]
    pub updated_at: Timestamp,
}

#[async_trait]
impl ItemRecord for Lecture {
    async fn find_by_container_id(db_session: &CachingSession, chapter_id: Uuid) -> Result<Vec<Self>, CourseError> {
        let lectures = Lecture::find_by_chapter_id(chapter_id)
            .consistency(Consistency::Quorum)
            .execute(db_session)
            .await?
            .try_collect()
            .await?;

        Ok(lectures)
    }
}

partial_lecture!(UpdateOrderLecture, chapter_id, id, order_index, updated_at);

impl From<&Lecture> for UpdateOrderLecture {
    fn from(lecture: &Lecture) -> Self {
        Self {
            chapter_id: lecture.chapter_id,
            id: lecture.id,
            order_index: lecture.order_index,
            updated_at: lecture.updated_at,
        }
    }
}
