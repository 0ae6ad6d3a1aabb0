use charybdis::batch::ModelBatch;
use scylla::client::caching_session::CachingSession;

use crate::constants::BATCH_CHUNK_SIZE;
use crate::errors::CourseError;
use crate::models::{
    Chapter, Course, Lecture, Quiz, Record, UpdateContentChapter, UpdateContentCourse, UpdateOrderChapter,
    UpdateOrderLecture, UpdateOrderQuiz,
};
use crate::transaction::write_set::{Mutation, WriteSet};

/// Staged writes grouped per table and statement, so each group goes out as chunked batches.
#[derive(Default)]
struct Batches {
    lecture_inserts: Vec<Lecture>,
    quiz_inserts: Vec<Quiz>,
    chapter_inserts: Vec<Chapter>,
    course_inserts: Vec<Course>,
    lecture_orders: Vec<UpdateOrderLecture>,
    quiz_orders: Vec<UpdateOrderQuiz>,
    chapter_orders: Vec<UpdateOrderChapter>,
    chapter_contents: Vec<UpdateContentChapter>,
    course_contents: Vec<UpdateContentCourse>,
    lecture_deletes: Vec<Lecture>,
    quiz_deletes: Vec<Quiz>,
    chapter_deletes: Vec<Chapter>,
    course_deletes: Vec<Course>,
}

impl Batches {
    fn push(&mut self, mutation: Mutation, record: Record) -> Result<(), CourseError> {
        match (mutation, record) {
            (Mutation::Insert, Record::Lecture(lecture)) => self.lecture_inserts.push(lecture),
            (Mutation::Insert, Record::Quiz(quiz)) => self.quiz_inserts.push(quiz),
            (Mutation::Insert, Record::Chapter(chapter)) => self.chapter_inserts.push(chapter),
            (Mutation::Insert, Record::Course(course)) => self.course_inserts.push(course),
            (Mutation::Delete, Record::Lecture(lecture)) => self.lecture_deletes.push(lecture),
            (Mutation::Delete, Record::Quiz(quiz)) => self.quiz_deletes.push(quiz),
            (Mutation::Delete, Record::Chapter(chapter)) => self.chapter_deletes.push(chapter),
            (Mutation::Delete, Record::Course(course)) => self.course_deletes.push(course),
            (Mutation::Update { order, content }, record) => {
                match &record {
                    Record::Lecture(lecture) if order => self.lecture_orders.push(lecture.into()),
                    Record::Quiz(quiz) if order => self.quiz_orders.push(quiz.into()),
                    Record::Chapter(chapter) if order => self.chapter_orders.push(chapter.into()),
                    Record::Course(_) if order => {
                        return Err(CourseError::InternalError("courses are not ordered".to_string()));
                    }
                    _ => (),
                }

                if content {
                    match &record {
                        Record::Chapter(chapter) => self.chapter_contents.push(chapter.into()),
                        Record::Course(course) => self.course_contents.push(course.into()),
                        _ => {
                            return Err(CourseError::InternalError(format!(
                                "{} carries no content",
                                record.collection()
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn execute(self, db_session: &CachingSession) -> Result<(), CourseError> {
        if !self.lecture_inserts.is_empty() {
            Lecture::batch()
                .chunked_insert(db_session, &self.lecture_inserts, BATCH_CHUNK_SIZE)
                .await?;
        }

        if !self.quiz_inserts.is_empty() {
            Quiz::batch()
                .chunked_insert(db_session, &self.quiz_inserts, BATCH_CHUNK_SIZE)
                .await?;
        }

        if !self.chapter_inserts.is_empty() {
            Chapter::batch()
                .chunked_insert(db_session, &self.chapter_inserts, BATCH_CHUNK_SIZE)
                .await?;
        }

        if !self.course_inserts.is_empty() {
            Course::batch()
                .chunked_insert(db_session, &self.course_inserts, BATCH_CHUNK_SIZE)
                .await?;
        }

        if !self.lecture_orders.is_empty() {
            UpdateOrderLecture::batch()
                .chunked_update(db_session, &self.lecture_orders, BATCH_CHUNK_SIZE)
                .await?;
        }

        if !self.quiz_orders.is_empty() {
            UpdateOrderQuiz::batch()
                .chunked_update(db_session, &self.quiz_orders, BATCH_CHUNK_SIZE)
                .await?;
        }

        if !self.chapter_orders.is_empty() {
            UpdateOrderChapter::batch()
                .chunked_update(db_session, &self.chapter_orders, BATCH_CHUNK_SIZE)
                .await?;
        }

        if !self.lecture_deletes.is_empty() {
            Lecture::delete_batch()
                .chunked_delete(db_session, &self.lecture_deletes, BATCH_CHUNK_SIZE)
                .await?;
        }

        if !self.quiz_deletes.is_empty() {
            Quiz::delete_batch()
                .chunked_delete(db_session, &self.quiz_deletes, BATCH_CHUNK_SIZE)
                .await?;
        }

        if !self.chapter_deletes.is_empty() {
            Chapter::delete_batch()
                .chunked_delete(db_session, &self.chapter_deletes, BATCH_CHUNK_SIZE)
                .await?;
        }

        if !self.course_deletes.is_empty() {
            Course::delete_batch()
                .chunked_delete(db_session, &self.course_deletes, BATCH_CHUNK_SIZE)
                .await?;
        }

        // projections last, they summarize the item writes above
        if !self.chapter_contents.is_empty() {
            UpdateContentChapter::batch()
                .chunked_update(db_session, &self.chapter_contents, BATCH_CHUNK_SIZE)
                .await?;
        }

        if !self.course_contents.is_empty() {
            UpdateContentCourse::batch()
                .chunked_update(db_session, &self.course_contents, BATCH_CHUNK_SIZE)
                .await?;
        }

        Ok(())
    }
}

pub(super) async fn flush(db_session: &CachingSession, write_set: WriteSet) -> Result<(), CourseError> {
    let mut batches = Batches::default();

    for (mutation, record) in write_set.into_entries() {
        batches.push(mutation, record)?;
    }

    batches.execute(db_session).await
}
