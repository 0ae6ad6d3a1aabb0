use charybdis::types::Uuid;
use serde_json::Value;

use crate::errors::CourseError;
use crate::models::traits::Stored;
use crate::models::{Chapter, Course, Lecture, Quiz};

/// Backing collection of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Lecture,
    Quiz,
    Chapter,
    Course,
}

/// Any document a transaction can stage.
#[derive(Debug, Clone)]
pub enum Record {
    Lecture(Lecture),
    Quiz(Quiz),
    Chapter(Chapter),
    Course(Course),
}

macro_rules! with_record {
    ($record:expr, $model:ident => $body:expr) => {
        match $record {
            Record::Lecture($model) => $body,
            Record::Quiz($model) => $body,
            Record::Chapter($model) => $body,
            Record::Course($model) => $body,
        }
    };
}

impl Record {
    pub fn collection(&self) -> Collection {
        match self {
            Record::Lecture(_) => Lecture::COLLECTION,
            Record::Quiz(_) => Quiz::COLLECTION,
            Record::Chapter(_) => Chapter::COLLECTION,
            Record::Course(_) => Course::COLLECTION,
        }
    }

    pub fn key(&self) -> Uuid {
        with_record!(self, model => model.key())
    }

    pub fn partition_id(&self) -> Uuid {
        with_record!(self, model => model.partition_id())
    }

    pub fn to_document(&self) -> Result<Value, CourseError> {
        let document = with_record!(self, model => serde_json::to_value(model)?);

        Ok(document)
    }
}
