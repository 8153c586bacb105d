#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod model;
pub mod progress;
pub mod session;
pub mod time;

pub use catalog::{LessonCatalog, filter_lessons};
pub use error::Error;
pub use session::{IgnoreReason, QuizEvent, QuizPhase, QuizSession, QuizStep};
pub use time::Clock;
