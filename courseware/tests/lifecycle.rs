mod common;

use common::*;
use courseware::constants::SENTINEL_ORDER;
use courseware::errors::CourseError;
use courseware::models::traits::ContainerRecord;
use courseware::models::{Chapter, Lecture, Quiz};
use courseware::ordering::{Container, ItemKind};
use courseware::transaction::MemoryStore;
use uuid::Uuid;

#[tokio::test]
async fn added_items_are_appended() {
    init_logger();
    let store = MemoryStore::new();
    let container = seed_chapter(&store);
    store.seed((1..=2).map(|order| lecture(container.id(), order))).unwrap();

    let added = service(&store)
        .add_item(container, quiz(container.id(), 0), None)
        .await
        .unwrap();

    assert_eq!(added.order_index, 3);
    assert_eq!(store.get::<Quiz>(added.id).unwrap().unwrap().order_index, 3);

    let chapter = store.get::<Chapter>(container.id()).unwrap().unwrap();
    assert_eq!(chapter.content().last().map(|entry| entry.ref_id), Some(added.id));
}

#[tokio::test]
async fn first_item_of_an_empty_chapter_gets_order_one() {
    let store = MemoryStore::new();
    let container = seed_chapter(&store);

    let added = service(&store)
        .add_item(container, lecture(container.id(), 0), None)
        .await
        .unwrap();

    assert_eq!(added.order_index, 1);
}

#[tokio::test]
async fn added_item_at_a_position_shifts_the_rest() {
    let store = MemoryStore::new();
    let container = seed_chapter(&store);
    let lectures: Vec<Lecture> = (1..=3).map(|order| lecture(container.id(), order)).collect();
    store.seed(lectures.clone()).unwrap();

    let added = service(&store)
        .add_item(container, quiz(container.id(), 0), Some(2))
        .await
        .unwrap();

    assert_eq!(added.order_index, 2);
    assert_ne!(added.order_index, SENTINEL_ORDER);
    assert_eq!(
        chapter_orders(&store, container.id()),
        vec![(lectures[0].id, 1), (added.id, 2), (lectures[1].id, 3), (lectures[2].id, 4)]
    );
}

#[tokio::test]
async fn item_for_another_container_is_rejected() {
    let store = MemoryStore::new();
    let container = seed_chapter(&store);

    let result = service(&store)
        .add_item(container, lecture(Uuid::new_v4(), 0), None)
        .await;

    assert!(matches!(result, Err(CourseError::NotFound(_))));
    assert_eq!(store.stats().begins, 0);
}

#[tokio::test]
async fn adding_to_a_missing_chapter_is_not_found() {
    let store = MemoryStore::new();
    let container = Container::Chapter {
        course_id: Uuid::new_v4(),
        id: Uuid::new_v4(),
    };

    let result = service(&store)
        .add_item(container, lecture(container.id(), 0), None)
        .await;

    assert!(matches!(result, Err(CourseError::NotFound(_))));
    assert!(store.list::<Lecture>(container.id()).unwrap().is_empty());
}

#[tokio::test]
async fn removal_leaves_a_gap_until_the_next_reorder() {
    let store = MemoryStore::new();
    let container = seed_chapter(&store);
    let lectures: Vec<Lecture> = (1..=3).map(|order| lecture(container.id(), order)).collect();
    store.seed(lectures.clone()).unwrap();
    let service = service(&store);

    service
        .remove_item(container, ItemKind::Lecture, lectures[1].id)
        .await
        .unwrap();

    assert_eq!(
        chapter_orders(&store, container.id()),
        vec![(lectures[0].id, 1), (lectures[2].id, 3)]
    );

    let chapter = store.get::<Chapter>(container.id()).unwrap().unwrap();
    assert_eq!(chapter.content().len(), 2);

    // an append after a delete must not collide with the survivors
    let added = service
        .add_item(container, lecture(container.id(), 0), None)
        .await
        .unwrap();
    assert_eq!(added.order_index, 4);

    service.reorder(container, Vec::new()).await.unwrap();

    assert_contiguous(&chapter_orders(&store, container.id()));
}

#[tokio::test]
async fn removing_an_unknown_item_is_not_found() {
    let store = MemoryStore::new();
    let container = seed_chapter(&store);

    let result = service(&store)
        .remove_item(container, ItemKind::Quiz, Uuid::new_v4())
        .await;

    assert!(matches!(result, Err(CourseError::NotFound(_))));
}

#[tokio::test]
async fn refresh_replaces_a_stale_projection() {
    let store = MemoryStore::new();
    let container = seed_chapter(&store);
    let lectures: Vec<Lecture> = (1..=2).map(|order| lecture(container.id(), order)).collect();
    // written behind the service's back, the projection doesn't know about them
    store.seed(lectures.clone()).unwrap();

    let entries = service(&store).refresh_projection(container).await.unwrap();

    let chapter = store.get::<Chapter>(container.id()).unwrap().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(chapter.content(), entries.as_slice());
    assert_eq!(entries[0].ref_id, lectures[0].id);
    assert_eq!(entries[0].title, "Lecture 1");
}
