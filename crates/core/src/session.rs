//! Quiz session state machine.
//!
//! A session walks a quiz once, question by question:
//!
//! ```text
//! Answering(0) --submit--> Revealed(0) --advance--> Answering(1) ... --advance--> Finished
//! ```
//!
//! Every transition consumes the session and returns a [`QuizStep`] carrying
//! the next session and a [`QuizEvent`] for the owner. Calls that are not valid
//! in the current phase return the session unchanged with
//! [`QuizEvent::Ignored`].

use std::sync::Arc;

use crate::model::{Answer, AnswerRejection, Question, Quiz};

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Question `index` is shown and waits for an answer.
    Answering { index: usize },
    /// An answer for question `index` was judged; result and explanation are visible.
    Revealed { index: usize, correct: bool },
    /// Every question was answered.
    Finished,
}

/// Why a call left the session unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// An answer was already submitted for this question.
    AlreadyAnswered,
    /// `advance` before any answer was submitted.
    NotAnswered,
    /// The session is finished; only `restart` applies.
    Finished,
    /// The answer could not be judged against the current question.
    Rejected(AnswerRejection),
}

/// What a transition produced, for the owner of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    Judged { index: usize, correct: bool },
    Advanced { index: usize },
    /// Final tally; emitted once per pass.
    Completed { score: u32, total: usize },
    Restarted,
    Ignored(IgnoreReason),
}

/// Result of a transition.
#[derive(Debug, Clone)]
pub struct QuizStep {
    pub session: QuizSession,
    pub event: QuizEvent,
}

/// One pass over a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    quiz: Arc<Quiz>,
    phase: QuizPhase,
    selected: Option<Answer>,
    score: u32,
}

impl QuizSession {
    /// Start at the first question. `Quiz` guarantees at least one question.
    #[must_use]
    pub fn start(quiz: Arc<Quiz>) -> Self {
        Self {
            quiz,
            phase: QuizPhase::Answering { index: 0 },
            selected: None,
            score: 0,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.quiz.len()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == QuizPhase::Finished
    }

    /// Index of the active question; `None` once finished.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            QuizPhase::Answering { index } | QuizPhase::Revealed { index, .. } => Some(index),
            QuizPhase::Finished => None,
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().and_then(|index| self.quiz.question(index))
    }

    /// Answer submitted for the active question, if any.
    #[must_use]
    pub fn selected_answer(&self) -> Option<&Answer> {
        self.selected.as_ref()
    }

    /// Explanation of the active question, visible only after answering.
    #[must_use]
    pub fn revealed_explanation(&self) -> Option<&str> {
        match self.phase {
            QuizPhase::Revealed { .. } => self.current_question()?.explanation(),
            _ => None,
        }
    }

    /// Judge `answer` for the active question and reveal the result.
    #[must_use]
    pub fn submit_answer(self, answer: Answer) -> QuizStep {
        let index = match self.phase {
            QuizPhase::Answering { index } => index,
            QuizPhase::Revealed { .. } => return self.ignore(IgnoreReason::AlreadyAnswered),
            QuizPhase::Finished => return self.ignore(IgnoreReason::Finished),
        };
        let Some(question) = self.quiz.question(index) else {
            return self.ignore(IgnoreReason::Finished);
        };
        let correct = match question.judge(&answer) {
            Ok(correct) => correct,
            Err(rejection) => return self.ignore(IgnoreReason::Rejected(rejection)),
        };

        let score = if correct { self.score + 1 } else { self.score };
        QuizStep {
            session: QuizSession {
                phase: QuizPhase::Revealed { index, correct },
                selected: Some(answer),
                score,
                ..self
            },
            event: QuizEvent::Judged { index, correct },
        }
    }

    /// Move past a revealed question, finishing after the last one.
    #[must_use]
    pub fn advance(self) -> QuizStep {
        let index = match self.phase {
            QuizPhase::Revealed { index, .. } => index,
            QuizPhase::Answering { .. } => return self.ignore(IgnoreReason::NotAnswered),
            QuizPhase::Finished => return self.ignore(IgnoreReason::Finished),
        };

        let next = index + 1;
        if next >= self.quiz.len() {
            let event = QuizEvent::Completed {
                score: self.score,
                total: self.quiz.len(),
            };
            return QuizStep {
                session: QuizSession {
                    phase: QuizPhase::Finished,
                    selected: None,
                    ..self
                },
                event,
            };
        }

        QuizStep {
            session: QuizSession {
                phase: QuizPhase::Answering { index: next },
                selected: None,
                ..self
            },
            event: QuizEvent::Advanced { index: next },
        }
    }

    /// Back to the first question with a zero score. Valid from any phase.
    #[must_use]
    pub fn restart(self) -> QuizStep {
        QuizStep {
            session: QuizSession::start(self.quiz),
            event: QuizEvent::Restarted,
        }
    }

    fn ignore(self, reason: IgnoreReason) -> QuizStep {
        QuizStep {
            session: self,
            event: QuizEvent::Ignored(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerKeyDraft, QuestionDraft, QuizDraft, QuizId};

    fn choice_question(correct: i64) -> QuestionDraft {
        QuestionDraft {
            text: "Cosa fa l'operatore << in C++?".into(),
            options: vec![
                "Esegue una divisione".into(),
                "Inserisce dati in un flusso di output".into(),
                "Confronta due valori".into(),
            ],
            correct_answer: AnswerKeyDraft::Index(correct),
            explanation: Some("Scrive su std::cout.".into()),
        }
    }

    fn text_question(expected: &str) -> QuestionDraft {
        QuestionDraft {
            text: "Parola chiave per una costante?".into(),
            options: Vec::new(),
            correct_answer: AnswerKeyDraft::Text(expected.into()),
            explanation: None,
        }
    }

    fn quiz(questions: Vec<QuestionDraft>) -> Arc<Quiz> {
        let draft = QuizDraft {
            title: "Quiz".into(),
            questions,
        };
        Arc::new(draft.validate(QuizId::new("1-introduzione").unwrap()).unwrap())
    }

    #[test]
    fn starts_answering_first_question() {
        let session = QuizSession::start(quiz(vec![choice_question(1)]));
        assert_eq!(session.phase(), QuizPhase::Answering { index: 0 });
        assert_eq!(session.score(), 0);
        assert!(session.selected_answer().is_none());
        assert!(session.revealed_explanation().is_none());
    }

    #[test]
    fn right_then_wrong_finishes_with_score_one() {
        let session = QuizSession::start(quiz(vec![choice_question(1), choice_question(2)]));

        let step = session.submit_answer(Answer::Choice(1));
        assert_eq!(step.event, QuizEvent::Judged { index: 0, correct: true });
        assert_eq!(step.session.revealed_explanation(), Some("Scrive su std::cout."));

        let step = step.session.advance();
        assert_eq!(step.event, QuizEvent::Advanced { index: 1 });
        assert!(step.session.selected_answer().is_none());

        let step = step.session.submit_answer(Answer::Choice(0));
        assert_eq!(step.event, QuizEvent::Judged { index: 1, correct: false });

        let step = step.session.advance();
        assert_eq!(step.event, QuizEvent::Completed { score: 1, total: 2 });
        assert!(step.session.is_finished());
        assert_eq!(step.session.score(), 1);
        assert!(step.session.current_question().is_none());
    }

    #[test]
    fn second_answer_is_ignored() {
        let session = QuizSession::start(quiz(vec![choice_question(1)]));
        let step = session.submit_answer(Answer::Choice(0));
        let before = step.session.clone();

        let step = step.session.submit_answer(Answer::Choice(1));
        assert_eq!(step.event, QuizEvent::Ignored(IgnoreReason::AlreadyAnswered));
        assert_eq!(step.session, before);
        assert_eq!(step.session.score(), 0);
    }

    #[test]
    fn advance_requires_an_answer() {
        let session = QuizSession::start(quiz(vec![choice_question(1)]));
        let step = session.advance();
        assert_eq!(step.event, QuizEvent::Ignored(IgnoreReason::NotAnswered));
        assert_eq!(step.session.phase(), QuizPhase::Answering { index: 0 });
    }

    #[test]
    fn empty_free_text_is_rejected_without_state_change() {
        let session = QuizSession::start(quiz(vec![text_question("answer")]));
        let before = session.clone();

        let step = session.submit_answer(Answer::Text(String::new()));
        assert_eq!(
            step.event,
            QuizEvent::Ignored(IgnoreReason::Rejected(AnswerRejection::EmptyText))
        );
        assert_eq!(step.session, before);

        let step = step.session.submit_answer(Answer::Text("  Answer  ".into()));
        assert_eq!(step.event, QuizEvent::Judged { index: 0, correct: true });
        assert_eq!(step.session.score(), 1);
    }

    #[test]
    fn mismatched_answer_kind_is_rejected() {
        let session = QuizSession::start(quiz(vec![choice_question(1)]));
        let step = session.submit_answer(Answer::Text("1".into()));
        assert_eq!(
            step.event,
            QuizEvent::Ignored(IgnoreReason::Rejected(AnswerRejection::WrongKind))
        );
    }

    #[test]
    fn finished_session_ignores_everything_but_restart() {
        let session = QuizSession::start(quiz(vec![choice_question(1)]));
        let finished = session
            .submit_answer(Answer::Choice(1))
            .session
            .advance()
            .session;

        let step = finished.clone().submit_answer(Answer::Choice(1));
        assert_eq!(step.event, QuizEvent::Ignored(IgnoreReason::Finished));
        let step = step.session.advance();
        assert_eq!(step.event, QuizEvent::Ignored(IgnoreReason::Finished));
        assert_eq!(step.session.score(), 1);

        let step = step.session.restart();
        assert_eq!(step.event, QuizEvent::Restarted);
        assert_eq!(step.session.phase(), QuizPhase::Answering { index: 0 });
        assert_eq!(step.session.score(), 0);
        assert_eq!(step.session.total(), 1);
    }

    #[test]
    fn restart_mid_quiz_resets_everything() {
        let session = QuizSession::start(quiz(vec![choice_question(1), choice_question(1)]));
        let revealed = session
            .submit_answer(Answer::Choice(1))
            .session
            .advance()
            .session
            .submit_answer(Answer::Choice(1))
            .session;
        assert_eq!(revealed.score(), 2);

        let restarted = revealed.restart().session;
        assert_eq!(restarted.phase(), QuizPhase::Answering { index: 0 });
        assert_eq!(restarted.score(), 0);
        assert!(restarted.selected_answer().is_none());
    }

    #[test]
    fn score_stays_within_bounds_for_any_answers() {
        let questions: Vec<QuestionDraft> = (0..3).map(|_| choice_question(2)).collect();
        let q = quiz(questions);
        for pattern in 0..27_usize {
            let mut session = QuizSession::start(Arc::clone(&q));
            let mut picks = pattern;
            let mut completed = None;
            while !session.is_finished() {
                session = session.submit_answer(Answer::Choice(picks % 3)).session;
                picks /= 3;
                let step = session.advance();
                if let QuizEvent::Completed { score, total } = step.event {
                    completed = Some((score, total));
                }
                session = step.session;
            }
            let (score, total) = completed.expect("completion event");
            assert!(score as usize <= total);
            assert_eq!(score, session.score());
        }
    }
}
