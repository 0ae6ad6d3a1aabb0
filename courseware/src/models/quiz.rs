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
    table_name = quizzes,
    partition_keys = [chapter_id],
    clustering_keys = [id],
)]
#[derive(Orderable, Stored, Serialize, Deserialize, Default, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub chapter_id: Uuid,

    #[serde(default)]
    pub id: Uuid,

    pub title: Text,

    #[serde(rename = "order", default)]
    pub order_index: Int,

    #[serde(default)]
    pub is_preview: Boolean,

    // percentage required to pass
    pub pass_score: Option<Int>,

    #[serde(default = "chrono::Utc::now")]
    pub created_at: Timestamp,

    #[serde(default = "chrono::Utc::now")]
    pub updated_at: Timestamp,
}

#[async_trait]
impl ItemRecord for Quiz {
    async fn find_by_container_id(db_session: &CachingSession, chapter_id: Uuid) -> Result<Vec<Self>, CourseError> {
        let quizzes = Quiz::find_by_chapter_id(chapter_id)
            .consistency(Consistency::Quorum)
            .execute(db_session)
            .await?
            .try_collect()
            .await?;

        Ok(quizzes)
    }
}

partial_quiz!(UpdateOrderQuiz, chapter_id, id, order_index, updated_at);

impl From<&Quiz> for UpdateOrderQuiz {
    fn from(quiz: &Quiz) -> Self {
        Self {
            chapter_id: quiz.chapter_id,
            id: quiz.id,
            order_index: quiz.order_index,
            updated_at: quiz.updated_at,
        }
    }
}
