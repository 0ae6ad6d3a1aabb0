#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use courseware::errors::CourseError;
use courseware::models::{Chapter, Course, Lecture, Quiz};
use courseware::ordering::{Container, ContentService, ItemKind, ReorderRequest};
use courseware::resources::cache_invalidator::CacheInvalidator;
use courseware::transaction::{MemoryStore, RetryPolicy};
use tokio::sync::mpsc;
use uuid::Uuid;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        backoff: Duration::from_millis(1),
        max_commit_time: Duration::from_secs(5),
    }
}

pub fn service(store: &MemoryStore) -> ContentService<MemoryStore> {
    ContentService::new(store.clone(), fast_policy(5))
}

fn created_at(seconds: i64) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(seconds)
}

pub fn lecture(chapter_id: Uuid, order_index: i32) -> Lecture {
    Lecture {
        chapter_id,
        id: Uuid::new_v4(),
        title: format!("Lecture {}", order_index),
        order_index,
        created_at: created_at(order_index as i64),
        updated_at: created_at(order_index as i64),
        ..Default::default()
    }
}

pub fn quiz(chapter_id: Uuid, order_index: i32) -> Quiz {
    Quiz {
        chapter_id,
        id: Uuid::new_v4(),
        title: format!("Quiz {}", order_index),
        order_index,
        is_preview: true,
        created_at: created_at(order_index as i64),
        updated_at: created_at(order_index as i64),
        ..Default::default()
    }
}

/// A course with one empty chapter, both stored.
pub fn seed_chapter(store: &MemoryStore) -> Container {
    let course = Course {
        id: Uuid::new_v4(),
        title: "Rust in practice".to_string(),
        ..Default::default()
    };

    let chapter = Chapter {
        course_id: course.id,
        id: Uuid::new_v4(),
        title: "Ownership".to_string(),
        order_index: 1,
        ..Default::default()
    };

    store.seed(vec![course]).unwrap();
    store.seed(vec![chapter.clone()]).unwrap();

    chapter.container()
}

pub fn request(id: Uuid, item_kind: ItemKind, desired_order: i32) -> ReorderRequest {
    ReorderRequest {
        item_id: id,
        item_kind,
        desired_order,
    }
}

/// `(id, order)` of every lecture and quiz in a chapter, sorted by order.
pub fn chapter_orders(store: &MemoryStore, chapter_id: Uuid) -> Vec<(Uuid, i32)> {
    let mut orders: Vec<(Uuid, i32)> = store
        .list::<Lecture>(chapter_id)
        .unwrap()
        .into_iter()
        .map(|lecture| (lecture.id, lecture.order_index))
        .chain(
            store
                .list::<Quiz>(chapter_id)
                .unwrap()
                .into_iter()
                .map(|quiz| (quiz.id, quiz.order_index)),
        )
        .collect();

    orders.sort_by_key(|(_, order)| *order);

    orders
}

pub fn assert_contiguous(orders: &[(Uuid, i32)]) {
    let numbers: Vec<i32> = orders.iter().map(|(_, order)| *order).collect();
    let expected: Vec<i32> = (1..=orders.len() as i32).collect();

    assert_eq!(numbers, expected);
}

/// Forwards invalidated keys to the test.
pub struct RecordingInvalidator {
    sender: mpsc::UnboundedSender<Vec<String>>,
}

impl RecordingInvalidator {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Vec<String>>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        (Arc::new(Self { sender }), receiver)
    }
}

#[async_trait]
impl CacheInvalidator for RecordingInvalidator {
    async fn invalidate(&self, keys: &[String]) -> Result<(), CourseError> {
        self.sender
            .send(keys.to_vec())
            .map_err(|e| CourseError::InternalError(e.to_string()))
    }
}
