use std::sync::Arc;

use corso_core::LessonCatalog;
use corso_core::model::LessonId;
use corso_core::progress::{
    COMPLETED_LESSONS_KEY, COURSE_PROGRESS_KEY, CompletionSet, CourseProgress, ProgressEffect,
    ProgressStats, ProgressTracker,
};
use serde::de::DeserializeOwned;
use storage::repository::KeyValueStore;
use tracing::{debug, warn};

/// Host side of progress tracking: rehydrates state and runs persistence effects.
///
/// Persistence is best effort. Failed reads fall back to defaults and failed
/// writes are logged; the in-memory state stays authoritative for the session.
#[derive(Clone)]
pub struct ProgressService {
    store: Arc<dyn KeyValueStore>,
}

impl ProgressService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Tracker seeded from the persisted completion set.
    ///
    /// Missing, unreadable or unparsable values yield an empty tracker. Blank
    /// entries of an otherwise valid array are dropped one by one.
    pub async fn rehydrate(&self) -> ProgressTracker {
        let Some(raw) = self.read_json::<Vec<String>>(COMPLETED_LESSONS_KEY).await else {
            return ProgressTracker::default();
        };
        let completed: CompletionSet = raw
            .into_iter()
            .filter_map(|entry| match LessonId::new(entry) {
                Ok(id) => Some(id),
                Err(err) => {
                    warn!(key = COMPLETED_LESSONS_KEY, error = %err, "dropping invalid lesson id");
                    None
                }
            })
            .collect();
        ProgressTracker::from_persisted(completed)
    }

    /// Flip completion of `id`, persist the new set, and return the new membership.
    pub async fn toggle_completion(&self, tracker: &mut ProgressTracker, id: &LessonId) -> bool {
        let step = tracker.toggle_completion(id);
        *tracker = step.state;
        self.run_effects(step.effects).await;
        let completed = tracker.is_completed(id);
        debug!(lesson = %id, completed, "lesson completion toggled");
        completed
    }

    /// Forget every completed lesson and persist the empty set.
    pub async fn clear(&self, tracker: &mut ProgressTracker) {
        let step = tracker.clear();
        *tracker = step.state;
        self.run_effects(step.effects).await;
    }

    #[must_use]
    pub fn stats(&self, tracker: &ProgressTracker, catalog: &LessonCatalog) -> ProgressStats {
        tracker.stats(catalog.lessons())
    }

    /// Course record from storage, or a fresh one seeded from `catalog`.
    pub async fn load_course(&self, catalog: &LessonCatalog) -> CourseProgress {
        match self.read_json::<CourseProgress>(COURSE_PROGRESS_KEY).await {
            Some(record) => record,
            None => CourseProgress::seeded(catalog.lessons()),
        }
    }

    /// Set completion and optional quiz score of one lesson in the course record.
    pub async fn update_lesson_progress(
        &self,
        course: &mut CourseProgress,
        id: &LessonId,
        completed: bool,
        quiz_score: Option<u32>,
    ) {
        let step = course.update_lesson(id, completed, quiz_score);
        *course = step.state;
        self.run_effects(step.effects).await;
    }

    /// Store the latest quiz score of a lesson, keeping its completion flag.
    pub async fn record_quiz_score(&self, course: &mut CourseProgress, id: &LessonId, score: u32) {
        let step = course.record_quiz_score(id, score);
        *course = step.state;
        self.run_effects(step.effects).await;
        debug!(lesson = %id, score, "quiz score recorded");
    }

    /// Remove both persisted records.
    pub async fn reset(&self) {
        for key in [COMPLETED_LESSONS_KEY, COURSE_PROGRESS_KEY] {
            if let Err(err) = self.store.remove(key).await {
                warn!(key, error = %err, "failed to remove persisted progress");
            }
        }
    }

    async fn run_effects(&self, effects: Vec<ProgressEffect>) {
        for effect in effects {
            let (key, encoded) = match &effect {
                ProgressEffect::PersistCompletion(set) => {
                    (COMPLETED_LESSONS_KEY, serde_json::to_vec(set))
                }
                ProgressEffect::PersistCourse(record) => {
                    (COURSE_PROGRESS_KEY, serde_json::to_vec(record))
                }
            };
            let bytes = match encoded {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(key, error = %err, "failed to encode progress");
                    continue;
                }
            };
            if let Err(err) = self.store.set(key, &bytes).await {
                warn!(key, error = %err, "failed to persist progress");
            }
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.store.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "failed to read persisted progress");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "discarding malformed persisted progress");
                None
            }
        }
    }
}

impl std::fmt::Debug for ProgressService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressService").finish_non_exhaustive()
    }
}
