use serde::{Deserialize, Serialize};

use super::{ProgressEffect, ProgressStep, percent};
use crate::model::{Lesson, LessonId};

/// Per-lesson entry of the course progress record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgressEntry {
    pub id: LessonId,
    pub title: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_score: Option<u32>,
}

/// Course progress record: every lesson with its completion flag and last
/// quiz score, plus the sum of all scores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    lessons: Vec<LessonProgressEntry>,
    #[serde(default)]
    total_score: u32,
}

impl CourseProgress {
    /// Fresh record with one entry per catalog lesson.
    #[must_use]
    pub fn seeded(lessons: &[Lesson]) -> Self {
        Self {
            lessons: lessons
                .iter()
                .map(|lesson| LessonProgressEntry {
                    id: lesson.id().clone(),
                    title: lesson.title().to_owned(),
                    completed: false,
                    quiz_score: None,
                })
                .collect(),
            total_score: 0,
        }
    }

    #[must_use]
    pub fn lessons(&self) -> &[LessonProgressEntry] {
        &self.lessons
    }

    #[must_use]
    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    #[must_use]
    pub fn entry(&self, id: &LessonId) -> Option<&LessonProgressEntry> {
        self.lessons.iter().find(|entry| &entry.id == id)
    }

    /// Rounded percentage of completed entries.
    #[must_use]
    pub fn progress(&self) -> u32 {
        let done = self.lessons.iter().filter(|entry| entry.completed).count();
        percent(done, self.lessons.len())
    }

    /// Set the completion flag and, when given, the quiz score of one lesson.
    ///
    /// Unknown ids leave the entries unchanged; the record is persisted either way.
    #[must_use]
    pub fn update_lesson(
        &self,
        id: &LessonId,
        completed: bool,
        quiz_score: Option<u32>,
    ) -> ProgressStep<CourseProgress> {
        let lessons: Vec<LessonProgressEntry> = self
            .lessons
            .iter()
            .map(|entry| {
                if &entry.id == id {
                    LessonProgressEntry {
                        completed,
                        quiz_score: quiz_score.or(entry.quiz_score),
                        ..entry.clone()
                    }
                } else {
                    entry.clone()
                }
            })
            .collect();
        let total_score = lessons
            .iter()
            .filter_map(|entry| entry.quiz_score)
            .fold(0_u32, u32::saturating_add);

        let next = CourseProgress {
            lessons,
            total_score,
        };
        ProgressStep {
            effects: vec![ProgressEffect::PersistCourse(next.clone())],
            state: next,
        }
    }

    /// Record a quiz score for a lesson without changing its completion flag.
    #[must_use]
    pub fn record_quiz_score(&self, id: &LessonId, score: u32) -> ProgressStep<CourseProgress> {
        let completed = self.entry(id).is_some_and(|entry| entry.completed);
        self.update_lesson(id, completed, Some(score))
    }
}
