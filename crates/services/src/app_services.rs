use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::content_service::ContentService;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::quiz_service::QuizService;

/// Assembles app-facing services over one storage backend and one content set.
#[derive(Debug, Clone)]
pub struct AppServices {
    content: Arc<ContentService>,
    progress: Arc<ProgressService>,
    quizzes: Arc<QuizService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        content: ContentService,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, content))
    }

    /// Build services over volatile in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock, content: ContentService) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, content)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, content: ContentService) -> Self {
        let content = Arc::new(content);
        let progress = ProgressService::new(Arc::clone(&storage.kv));
        let quizzes = Arc::new(QuizService::new(
            Arc::clone(&content),
            progress.clone(),
            clock,
        ));
        Self {
            content,
            progress: Arc::new(progress),
            quizzes,
        }
    }

    #[must_use]
    pub fn content(&self) -> Arc<ContentService> {
        Arc::clone(&self.content)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizService> {
        Arc::clone(&self.quizzes)
    }
}
