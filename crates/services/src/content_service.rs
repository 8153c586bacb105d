use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use corso_core::LessonCatalog;
use corso_core::model::{Lesson, LessonId, Quiz, QuizCatalog, QuizDraft, QuizId, QuizLoadIssue};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::ContentError;

pub const LESSONS_FILE: &str = "lessons.json";
pub const QUIZZES_FILE: &str = "quizzes.json";

/// A content entry skipped at load time.
#[derive(Debug)]
pub enum ContentIssue {
    Lesson {
        index: usize,
        source: serde_json::Error,
    },
    DuplicateLesson {
        id: LessonId,
    },
    QuizShape {
        key: String,
        source: serde_json::Error,
    },
    Quiz(QuizLoadIssue),
}

/// Lesson catalog plus quiz lookup, validated once at load.
#[derive(Debug, Clone, Default)]
pub struct ContentService {
    lessons: LessonCatalog,
    quizzes: QuizCatalog,
}

impl ContentService {
    #[must_use]
    pub fn new(lessons: LessonCatalog, quizzes: QuizCatalog) -> Self {
        Self { lessons, quizzes }
    }

    /// Parse lesson and quiz documents, dropping entries that do not validate.
    ///
    /// `lessons_json` is an array of lessons; `quizzes_json` maps quiz ids to
    /// quizzes. Skipped entries are logged and returned alongside the content.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Json` if either document is not JSON of the
    /// expected top-level shape.
    pub fn from_json(
        lessons_json: &str,
        quizzes_json: &str,
    ) -> Result<(Self, Vec<ContentIssue>), ContentError> {
        let raw_lessons: Vec<Value> =
            serde_json::from_str(lessons_json).map_err(|source| ContentError::Json {
                document: "lessons",
                source,
            })?;
        let raw_quizzes: BTreeMap<String, Value> =
            serde_json::from_str(quizzes_json).map_err(|source| ContentError::Json {
                document: "quizzes",
                source,
            })?;

        let mut issues = Vec::new();

        let mut seen = HashSet::new();
        let mut lessons = Vec::with_capacity(raw_lessons.len());
        for (index, raw) in raw_lessons.into_iter().enumerate() {
            match serde_json::from_value::<Lesson>(raw) {
                Ok(lesson) if !seen.insert(lesson.id().clone()) => {
                    issues.push(ContentIssue::DuplicateLesson {
                        id: lesson.id().clone(),
                    });
                }
                Ok(lesson) => lessons.push(lesson),
                Err(source) => issues.push(ContentIssue::Lesson { index, source }),
            }
        }

        let mut drafts = Vec::with_capacity(raw_quizzes.len());
        for (key, raw) in raw_quizzes {
            match serde_json::from_value::<QuizDraft>(raw) {
                Ok(draft) => drafts.push((key, draft)),
                Err(source) => issues.push(ContentIssue::QuizShape { key, source }),
            }
        }
        let (quizzes, quiz_issues) = QuizCatalog::from_drafts(drafts);
        issues.extend(quiz_issues.into_iter().map(ContentIssue::Quiz));

        for issue in &issues {
            match issue {
                ContentIssue::Lesson { index, source } => {
                    warn!(index, error = %source, "skipping malformed lesson");
                }
                ContentIssue::DuplicateLesson { id } => {
                    warn!(lesson = %id, "skipping duplicate lesson");
                }
                ContentIssue::QuizShape { key, source } => {
                    warn!(quiz = %key, error = %source, "skipping malformed quiz");
                }
                ContentIssue::Quiz(issue) => {
                    let cause = std::error::Error::source(&issue.error).map(ToString::to_string);
                    warn!(
                        quiz = %issue.key,
                        error = %issue.error,
                        cause = cause.as_deref().unwrap_or("-"),
                        "skipping invalid quiz"
                    );
                }
            }
        }
        info!(
            lessons = lessons.len(),
            quizzes = quizzes.len(),
            skipped = issues.len(),
            "course content loaded"
        );

        Ok((Self::new(LessonCatalog::new(lessons), quizzes), issues))
    }

    /// Load `lessons.json` and `quizzes.json` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if a file cannot be read or parsed.
    pub fn from_dir(dir: &Path) -> Result<(Self, Vec<ContentIssue>), ContentError> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| ContentError::Io { path, source })
        };
        let lessons = read(LESSONS_FILE)?;
        let quizzes = read(QUIZZES_FILE)?;
        Self::from_json(&lessons, &quizzes)
    }

    #[must_use]
    pub fn lessons(&self) -> &LessonCatalog {
        &self.lessons
    }

    #[must_use]
    pub fn quizzes(&self) -> &QuizCatalog {
        &self.quizzes
    }

    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.get(id)
    }

    /// Quiz by id; `None` means "not available".
    #[must_use]
    pub fn quiz(&self, id: &QuizId) -> Option<Arc<Quiz>> {
        self.quizzes.get(id)
    }

    /// Available quizzes for a lesson: its own quiz, then the review quiz of its block.
    #[must_use]
    pub fn quizzes_for_lesson(&self, id: &LessonId) -> Vec<Arc<Quiz>> {
        self.lessons
            .quiz_ids_for(id)
            .iter()
            .filter_map(|quiz_id| self.quizzes.get(quiz_id))
            .collect()
    }

    /// Lesson whose own quiz is `quiz_id`. Review quizzes belong to no lesson.
    #[must_use]
    pub fn lesson_for_quiz(&self, quiz_id: &QuizId) -> Option<&Lesson> {
        self.lessons
            .lessons()
            .iter()
            .find(|lesson| &lesson.quiz_id() == quiz_id)
    }
}
