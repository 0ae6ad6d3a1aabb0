use charybdis::types::{Int, Timestamp};

use crate::errors::CourseError;
use crate::models::traits::Orderable;
use crate::models::udts::ContentEntry;
use crate::models::{Chapter, Course, Lecture, Quiz};
use crate::ordering::model::Container;
use crate::ordering::repository::{ContainerRepository, ItemRepository};
use crate::transaction::Transaction;

/// Rebuilds the content list of `container` from its current items and stages it on the
/// container document. The list is derived data and is always replaced as a whole.
pub async fn rebuild_projection<Tx: Transaction>(
    tx: &Tx,
    container: &Container,
) -> Result<Vec<ContentEntry>, CourseError> {
    match container {
        Container::Chapter { id, .. } => {
            let chapter_repository = ContainerRepository::<Tx, Chapter>::new(tx);
            let lecture_repository = ItemRepository::<Tx, Lecture>::new(tx);
            let quiz_repository = ItemRepository::<Tx, Quiz>::new(tx);

            let (chapter, lectures, quizzes) = futures::try_join!(
                chapter_repository.load_for_projection(container),
                lecture_repository.find_by_container(*id),
                quiz_repository.find_by_container(*id),
            )?;

            let entries = sorted_entries(
                lectures
                    .iter()
                    .map(sort_key)
                    .chain(quizzes.iter().map(sort_key))
                    .collect(),
            );

            chapter_repository.save_projection(chapter, entries.clone())?;

            Ok(entries)
        }
        Container::Course { id } => {
            let course_repository = ContainerRepository::<Tx, Course>::new(tx);
            let chapter_repository = ItemRepository::<Tx, Chapter>::new(tx);

            let (course, chapters) = futures::try_join!(
                course_repository.load_for_projection(container),
                chapter_repository.find_by_container(*id),
            )?;

            let entries = sorted_entries(chapters.iter().map(sort_key).collect());

            course_repository.save_projection(course, entries.clone())?;

            Ok(entries)
        }
    }
}

fn sort_key<T: Orderable>(item: &T) -> (Int, Timestamp, ContentEntry) {
    (item.order_index(), item.created_at(), item.to_content_entry())
}

fn sorted_entries(mut keyed: Vec<(Int, Timestamp, ContentEntry)>) -> Vec<ContentEntry> {
    keyed.sort_by_key(|(order, created_at, _)| (*order, *created_at));

    keyed.into_iter().map(|(_, _, entry)| entry).collect()
}
