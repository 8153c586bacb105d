use serde::Deserialize;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("correct answer index {index} is out of range for {len} options")]
    AnswerOutOfRange { index: i64, len: usize },

    #[error("a question with options needs an option index as its correct answer")]
    TextKeyForChoice,

    #[error("expected answer of a free-text question cannot be empty")]
    EmptyExpectedAnswer,
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Correct answer as written in quiz content: an option index or a text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AnswerKeyDraft {
    Index(i64),
    Text(String),
}

/// Unvalidated question as it appears in quiz content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    #[serde(rename = "question")]
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: AnswerKeyDraft,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl QuestionDraft {
    /// Validate the draft into a `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is blank, the answer index does not
    /// address an option, or a free-text question has no expected answer.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }

        let mode = if self.options.is_empty() {
            let expected = match self.correct_answer {
                AnswerKeyDraft::Text(text) => text,
                AnswerKeyDraft::Index(n) => n.to_string(),
            };
            if expected.trim().is_empty() {
                return Err(QuestionError::EmptyExpectedAnswer);
            }
            QuestionMode::FreeText { expected }
        } else {
            let AnswerKeyDraft::Index(index) = self.correct_answer else {
                return Err(QuestionError::TextKeyForChoice);
            };
            let len = self.options.len();
            let correct = usize::try_from(index)
                .ok()
                .filter(|i| *i < len)
                .ok_or(QuestionError::AnswerOutOfRange { index, len })?;
            QuestionMode::Choice {
                options: self.options,
                correct,
            }
        };

        Ok(Question {
            text: self.text,
            mode,
            explanation: self.explanation.filter(|e| !e.trim().is_empty()),
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionMode {
    /// Pick one of `options`; `correct` is always a valid index.
    Choice { options: Vec<String>, correct: usize },
    /// Type the answer; compared after trimming and lowercasing.
    FreeText { expected: String },
}

/// A submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Choice(usize),
    Text(String),
}

/// Why a submitted answer could not be judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerRejection {
    EmptyText,
    OptionOutOfRange,
    WrongKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    mode: QuestionMode,
    explanation: Option<String>,
}

impl Question {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn mode(&self) -> &QuestionMode {
        &self.mode
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Options to choose from; empty for free-text questions.
    #[must_use]
    pub fn options(&self) -> &[String] {
        match &self.mode {
            QuestionMode::Choice { options, .. } => options,
            QuestionMode::FreeText { .. } => &[],
        }
    }

    #[must_use]
    pub fn is_free_text(&self) -> bool {
        matches!(self.mode, QuestionMode::FreeText { .. })
    }

    /// Decide whether `answer` is correct.
    ///
    /// # Errors
    ///
    /// Returns `AnswerRejection` when the answer cannot be judged against this
    /// question: blank text, an index past the options, or the wrong kind.
    pub fn judge(&self, answer: &Answer) -> Result<bool, AnswerRejection> {
        match (&self.mode, answer) {
            (QuestionMode::Choice { options, correct }, Answer::Choice(index)) => {
                if *index >= options.len() {
                    return Err(AnswerRejection::OptionOutOfRange);
                }
                Ok(index == correct)
            }
            (QuestionMode::FreeText { expected }, Answer::Text(text)) => {
                if text.trim().is_empty() {
                    return Err(AnswerRejection::EmptyText);
                }
                Ok(normalize(text) == normalize(expected))
            }
            _ => Err(AnswerRejection::WrongKind),
        }
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(correct: i64) -> QuestionDraft {
        QuestionDraft {
            text: "Qual è l'indice del primo elemento di un array in C++?".into(),
            options: vec!["1".into(), "0".into(), "-1".into(), "Non è definito".into()],
            correct_answer: AnswerKeyDraft::Index(correct),
            explanation: Some("Gli array sono zero-based.".into()),
        }
    }

    fn free_text(expected: AnswerKeyDraft) -> QuestionDraft {
        QuestionDraft {
            text: "Quale parola chiave dichiara una costante?".into(),
            options: Vec::new(),
            correct_answer: expected,
            explanation: None,
        }
    }

    #[test]
    fn choice_judges_by_index() {
        let q = choice(1).validate().unwrap();
        assert_eq!(q.judge(&Answer::Choice(1)), Ok(true));
        for wrong in [0, 2, 3] {
            assert_eq!(q.judge(&Answer::Choice(wrong)), Ok(false));
        }
        assert_eq!(
            q.judge(&Answer::Choice(4)),
            Err(AnswerRejection::OptionOutOfRange)
        );
        assert_eq!(
            q.judge(&Answer::Text("0".into())),
            Err(AnswerRejection::WrongKind)
        );
    }

    #[test]
    fn choice_rejects_bad_keys_at_load() {
        assert_eq!(
            choice(4).validate().unwrap_err(),
            QuestionError::AnswerOutOfRange { index: 4, len: 4 }
        );
        assert!(matches!(
            choice(-1).validate(),
            Err(QuestionError::AnswerOutOfRange { .. })
        ));

        let mut text_key = choice(0);
        text_key.correct_answer = AnswerKeyDraft::Text("0".into());
        assert_eq!(text_key.validate().unwrap_err(), QuestionError::TextKeyForChoice);
    }

    #[test]
    fn free_text_is_trimmed_and_case_insensitive() {
        let q = free_text(AnswerKeyDraft::Text("answer".into()))
            .validate()
            .unwrap();
        assert!(q.is_free_text());
        assert_eq!(q.judge(&Answer::Text("  Answer  ".into())), Ok(true));
        assert_eq!(q.judge(&Answer::Text("answers".into())), Ok(false));
        assert_eq!(
            q.judge(&Answer::Text(String::new())),
            Err(AnswerRejection::EmptyText)
        );
        assert_eq!(
            q.judge(&Answer::Text("   ".into())),
            Err(AnswerRejection::EmptyText)
        );
    }

    #[test]
    fn free_text_numeric_key_becomes_text() {
        let q = free_text(AnswerKeyDraft::Index(42)).validate().unwrap();
        assert_eq!(q.judge(&Answer::Text(" 42".into())), Ok(true));
    }

    #[test]
    fn blank_text_and_blank_expected_are_rejected() {
        let mut blank = choice(1);
        blank.text = "  ".into();
        assert_eq!(blank.validate().unwrap_err(), QuestionError::EmptyText);

        assert_eq!(
            free_text(AnswerKeyDraft::Text(" ".into()))
                .validate()
                .unwrap_err(),
            QuestionError::EmptyExpectedAnswer
        );
    }

    #[test]
    fn parses_content_json() {
        let json = r#"{
            "question": "Cosa è un puntatore in C++?",
            "options": ["Un valore", "Un indirizzo di memoria"],
            "correctAnswer": 1,
            "explanation": "Memorizza un indirizzo."
        }"#;
        let draft: QuestionDraft = serde_json::from_str(json).unwrap();
        let q = draft.validate().unwrap();
        assert_eq!(q.options().len(), 2);
        assert_eq!(q.explanation(), Some("Memorizza un indirizzo."));
    }
}
