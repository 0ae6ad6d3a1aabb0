use charybdis::types::{Int, Timestamp, Uuid};
use serde::{Deserialize, Serialize};

use crate::constants::{CHAPTER_CACHE_PREFIX, COURSE_CACHE_PREFIX};
use crate::models::Collection;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "snake_case")]
pub enum ItemKind {
    Lecture,
    Quiz,
    Chapter,
}

impl ItemKind {
    pub fn collection(&self) -> Collection {
        match self {
            ItemKind::Lecture => Collection::Lecture,
            ItemKind::Quiz => Collection::Quiz,
            ItemKind::Chapter => Collection::Chapter,
        }
    }
}

/// Owner of one position space. A chapter orders lectures and quizzes together,
/// a course orders its chapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Container {
    #[serde(rename_all = "camelCase")]
    Chapter { course_id: Uuid, id: Uuid },
    Course { id: Uuid },
}

impl Container {
    pub fn id(&self) -> Uuid {
        match self {
            Container::Chapter { id, .. } => *id,
            Container::Course { id } => *id,
        }
    }

    pub fn parent_id(&self) -> Option<Uuid> {
        match self {
            Container::Chapter { course_id, .. } => Some(*course_id),
            Container::Course { .. } => None,
        }
    }

    pub fn collection(&self) -> Collection {
        match self {
            Container::Chapter { .. } => Collection::Chapter,
            Container::Course { .. } => Collection::Course,
        }
    }

    pub fn item_kinds(&self) -> &'static [ItemKind] {
        match self {
            Container::Chapter { .. } => &[ItemKind::Lecture, ItemKind::Quiz],
            Container::Course { .. } => &[ItemKind::Chapter],
        }
    }

    pub fn accepts(&self, kind: ItemKind) -> bool {
        self.item_kinds().contains(&kind)
    }

    /// Cache entries summarizing this container and its parent.
    pub fn cache_keys(&self) -> Vec<String> {
        match self {
            Container::Chapter { course_id, id } => vec![
                format!("{}:{}", CHAPTER_CACHE_PREFIX, id),
                format!("{}:{}", COURSE_CACHE_PREFIX, course_id),
            ],
            Container::Course { id } => vec![format!("{}:{}", COURSE_CACHE_PREFIX, id)],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderableItem {
    pub id: Uuid,
    pub kind: ItemKind,
    pub order: Int,
    pub container_id: Uuid,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub item_id: Uuid,
    pub item_kind: ItemKind,
    pub desired_order: Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOrder {
    pub item_id: Uuid,
    pub item_kind: ItemKind,
    pub new_order: Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderUpdate {
    pub id: Uuid,
    pub order: Int,
}

impl From<&ResolvedOrder> for OrderUpdate {
    fn from(resolved: &ResolvedOrder) -> Self {
        Self {
            id: resolved.item_id,
            order: resolved.new_order,
        }
    }
}
