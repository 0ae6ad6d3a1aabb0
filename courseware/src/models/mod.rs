mod chapter;
mod container_version;
mod course;
mod lecture;
mod quiz;
mod record;
pub mod traits;
pub mod udts;

pub use chapter::{Chapter, UpdateContentChapter, UpdateOrderChapter};
pub use container_version::ContainerVersion;
pub use course::{Course, UpdateContentCourse};
pub use lecture::{Lecture, UpdateOrderLecture};
pub use quiz::{Quiz, UpdateOrderQuiz};
pub use record::{Collection, Record};
pub use udts::ContentEntry;
