use std::sync::Arc;

use chrono::{DateTime, Utc};
use corso_core::model::{LessonId, QuizId};
use corso_core::progress::{CourseProgress, percent};
use corso_core::{Clock, QuizEvent, QuizSession, QuizStep};
use tracing::info;

use crate::content_service::ContentService;
use crate::progress_service::ProgressService;

/// Result of a finished quiz pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    pub quiz_id: QuizId,
    /// Lesson the score was recorded for; review quizzes have none.
    pub lesson_id: Option<LessonId>,
    pub score: u32,
    pub total: usize,
    pub completed_at: DateTime<Utc>,
}

impl QuizOutcome {
    #[must_use]
    pub fn is_perfect(&self) -> bool {
        usize::try_from(self.score).is_ok_and(|score| score == self.total)
    }

    #[must_use]
    pub fn percent(&self) -> u32 {
        percent(self.score as usize, self.total)
    }
}

/// Starts quiz sessions and records their scores.
#[derive(Debug, Clone)]
pub struct QuizService {
    content: Arc<ContentService>,
    progress: ProgressService,
    clock: Clock,
}

impl QuizService {
    #[must_use]
    pub fn new(content: Arc<ContentService>, progress: ProgressService, clock: Clock) -> Self {
        Self {
            content,
            progress,
            clock,
        }
    }

    /// Fresh session for `id`, or `None` when the quiz is not available.
    #[must_use]
    pub fn start(&self, id: &QuizId) -> Option<QuizSession> {
        self.content.quiz(id).map(QuizSession::start)
    }

    /// Session for the first quiz available to a lesson.
    #[must_use]
    pub fn start_for_lesson(&self, id: &LessonId) -> Option<QuizSession> {
        self.content
            .quizzes_for_lesson(id)
            .into_iter()
            .next()
            .map(QuizSession::start)
    }

    /// Turn a completing step into an outcome and store its score.
    ///
    /// Returns `None` for every event other than `Completed`. The score goes
    /// into the course record of the lesson owning the quiz, if any.
    pub async fn finish(
        &self,
        step: &QuizStep,
        course: &mut CourseProgress,
    ) -> Option<QuizOutcome> {
        let QuizEvent::Completed { score, total } = step.event else {
            return None;
        };
        let quiz_id = step.session.quiz().id().clone();
        let lesson_id = self
            .content
            .lesson_for_quiz(&quiz_id)
            .map(|lesson| lesson.id().clone());

        if let Some(lesson) = &lesson_id {
            self.progress.record_quiz_score(course, lesson, score).await;
        }
        info!(quiz = %quiz_id, score, total, "quiz completed");

        Some(QuizOutcome {
            quiz_id,
            lesson_id,
            score,
            total,
            completed_at: self.clock.now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corso_core::model::Answer;
    use corso_core::time::fixed_now;
    use storage::InMemoryRepository;

    const LESSONS: &str = r#"[
        {"id": "1-introduzione", "title": "Introduzione", "difficulty": "base"},
        {"id": "2-variabili-tipi", "title": "Variabili", "difficulty": "base"},
        {"id": "3-operatori", "title": "Operatori", "difficulty": "base"}
    ]"#;

    const QUIZZES: &str = r#"{
        "1-introduzione": {"title": "Quiz 1", "questions": [
            {"question": "Compilato?", "options": ["No", "Sì"], "correctAnswer": 1},
            {"question": "Estensione?", "options": [], "correctAnswer": ".cpp"}
        ]},
        "quiz-1-3": {"title": "Ripasso", "questions": [
            {"question": "Operatore modulo?", "options": ["%", "/"], "correctAnswer": 0}
        ]}
    }"#;

    fn service() -> QuizService {
        let (content, _) = ContentService::from_json(LESSONS, QUIZZES).unwrap();
        let progress = ProgressService::new(Arc::new(InMemoryRepository::new()));
        QuizService::new(Arc::new(content), progress, Clock::fixed(fixed_now()))
    }

    fn lesson(raw: &str) -> LessonId {
        LessonId::new(raw).unwrap()
    }

    #[test]
    fn start_missing_quiz_is_unavailable() {
        let service = service();
        assert!(service.start(&QuizId::new("templates").unwrap()).is_none());
        assert!(service.start_for_lesson(&lesson("2-variabili-tipi")).is_none());
    }

    #[test]
    fn start_for_lesson_falls_back_to_review_quiz() {
        let service = service();
        let session = service.start_for_lesson(&lesson("3-operatori")).unwrap();
        assert_eq!(session.quiz().id().as_str(), "quiz-1-3");
    }

    #[tokio::test]
    async fn finishing_records_score_for_owning_lesson() {
        let service = service();
        let mut course = CourseProgress::seeded(service.content.lessons().lessons());
        let session = service.start(&QuizId::new("1-introduzione").unwrap()).unwrap();

        let step = session.submit_answer(Answer::Choice(1));
        assert!(service.finish(&step, &mut course).await.is_none());
        let step = step.session.advance();
        let step = step.session.submit_answer(Answer::Text(" .CPP ".into()));
        let step = step.session.advance();

        let outcome = service.finish(&step, &mut course).await.unwrap();
        assert_eq!(outcome.score, 2);
        assert_eq!(outcome.total, 2);
        assert!(outcome.is_perfect());
        assert_eq!(outcome.percent(), 100);
        assert_eq!(outcome.completed_at, fixed_now());
        assert_eq!(outcome.lesson_id, Some(lesson("1-introduzione")));

        let entry = course.entry(&lesson("1-introduzione")).unwrap();
        assert_eq!(entry.quiz_score, Some(2));
        assert!(!entry.completed);
    }

    #[tokio::test]
    async fn review_quiz_score_is_not_recorded() {
        let service = service();
        let mut course = CourseProgress::seeded(service.content.lessons().lessons());
        let session = service.start(&QuizId::new("quiz-1-3").unwrap()).unwrap();

        let step = session.submit_answer(Answer::Choice(1)).session.advance();
        let outcome = service.finish(&step, &mut course).await.unwrap();
        assert_eq!(outcome.score, 0);
        assert!(!outcome.is_perfect());
        assert_eq!(outcome.lesson_id, None);
        assert_eq!(course.total_score(), 0);
    }
}
