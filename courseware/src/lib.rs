//! Ordering and conflict resolution for course content.
//!
//! Chapters order their lectures and quizzes in one shared position space, courses order
//! their chapters. [`ordering::ContentService`] is the entry point: every operation loads a
//! container within a transaction, resolves the new ordering, stages it and rebuilds the
//! container's content projection, retrying from a fresh snapshot when a concurrent
//! transaction wins.

pub mod app;
pub mod constants;
pub mod errors;
pub mod models;
pub mod ordering;
pub mod resources;
pub mod transaction;

pub use errors::CourseError;
