//! Read-only lesson catalog and the search/difficulty filter used by listings.

use crate::model::{DifficultyFilter, Lesson, LessonId, QuizId};
use crate::progress::CompletionSet;

/// Lessons in course order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonCatalog {
    lessons: Vec<Lesson>,
}

impl LessonCatalog {
    #[must_use]
    pub fn new(lessons: Vec<Lesson>) -> Self {
        Self { lessons }
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| lesson.id() == id)
    }

    /// See [`filter_lessons`].
    #[must_use]
    pub fn filter(&self, search: &str, difficulty: DifficultyFilter) -> Vec<&Lesson> {
        filter_lessons(&self.lessons, search, difficulty)
    }

    /// Completed lessons in course order. Ids unknown to the catalog are skipped.
    #[must_use]
    pub fn completed_lessons(&self, completed: &CompletionSet) -> Vec<&Lesson> {
        self.lessons
            .iter()
            .filter(|lesson| completed.contains(lesson.id()))
            .collect()
    }

    /// Quizzes to offer after `id`: the lesson's own quiz, then its review quiz.
    ///
    /// Returns an empty list for unknown lessons. Ids are not checked against
    /// any quiz catalog.
    #[must_use]
    pub fn quiz_ids_for(&self, id: &LessonId) -> Vec<QuizId> {
        let Some(lesson) = self.get(id) else {
            return Vec::new();
        };
        let mut ids = vec![lesson.quiz_id()];
        if let Some(review) = lesson.review_quiz_id() {
            ids.push(review);
        }
        ids
    }
}

/// Lessons matching both the search term and the difficulty filter.
///
/// The search is a case-insensitive substring match on title, description or
/// any topic; an empty term matches everything. Course order is preserved.
#[must_use]
pub fn filter_lessons<'a>(
    lessons: &'a [Lesson],
    search: &str,
    difficulty: DifficultyFilter,
) -> Vec<&'a Lesson> {
    let needle = search.to_lowercase();
    lessons
        .iter()
        .filter(|lesson| difficulty.matches(lesson.difficulty()))
        .filter(|lesson| lesson.matches_lowercase(&needle))
        .collect()
}
