#![forbid(unsafe_code)]

pub mod app_services;
pub mod content_service;
pub mod error;
pub mod progress_service;
pub mod quiz_service;

pub use corso_core::Clock;

pub use app_services::AppServices;
pub use content_service::{ContentIssue, ContentService};
pub use error::{AppServicesError, ContentError};
pub use progress_service::ProgressService;
pub use quiz_service::{QuizOutcome, QuizService};
