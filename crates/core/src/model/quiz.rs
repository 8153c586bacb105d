use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::model::ids::{ParseIdError, QuizId};
use crate::model::question::{Question, QuestionDraft, QuestionError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("invalid quiz id: {0}")]
    InvalidId(#[source] ParseIdError),

    #[error("quiz has no questions")]
    NoQuestions,

    #[error("question {index} is invalid")]
    Question {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// Unvalidated quiz as it appears in quiz content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct QuizDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
}

impl QuizDraft {
    /// Validate every question and bind the quiz to `id`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` for an empty quiz, or the first
    /// `QuizError::Question` found.
    pub fn validate(self, id: QuizId) -> Result<Quiz, QuizError> {
        if self.questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        let questions = self
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                draft
                    .validate()
                    .map_err(|source| QuizError::Question { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Quiz {
            id,
            title: self.title,
            questions,
        })
    }
}

/// A validated, immutable sequence of at least one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    title: String,
    questions: Vec<Question>,
}

impl Quiz {
    #[must_use]
    pub fn id(&self) -> &QuizId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Number of questions; never zero.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.questions.len()
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// A quiz entry that was dropped while loading content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizLoadIssue {
    pub key: String,
    pub error: QuizError,
}

/// Lookup table from quiz id to validated quiz.
#[derive(Debug, Clone, Default)]
pub struct QuizCatalog {
    quizzes: BTreeMap<QuizId, Arc<Quiz>>,
}

impl QuizCatalog {
    /// Build a catalog from raw entries, keeping every entry that validates.
    ///
    /// Entries that fail validation are returned as issues instead of
    /// failing the whole load.
    pub fn from_drafts<I>(entries: I) -> (Self, Vec<QuizLoadIssue>)
    where
        I: IntoIterator<Item = (String, QuizDraft)>,
    {
        let mut quizzes = BTreeMap::new();
        let mut issues = Vec::new();

        for (key, draft) in entries {
            let validated = QuizId::new(key.clone())
                .map_err(QuizError::InvalidId)
                .and_then(|id| draft.validate(id));
            match validated {
                Ok(quiz) => {
                    quizzes.insert(quiz.id().clone(), Arc::new(quiz));
                }
                Err(error) => issues.push(QuizLoadIssue { key, error }),
            }
        }

        (Self { quizzes }, issues)
    }

    #[must_use]
    pub fn get(&self, id: &QuizId) -> Option<Arc<Quiz>> {
        self.quizzes.get(id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: &QuizId) -> bool {
        self.quizzes.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &QuizId> {
        self.quizzes.keys()
    }
}
