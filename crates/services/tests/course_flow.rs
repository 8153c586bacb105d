use corso_core::model::{Answer, LessonId, QuizId};
use corso_core::time::fixed_now;
use corso_core::{QuizEvent, QuizPhase};
use services::{AppServices, Clock, ContentService};

const LESSONS: &str = r#"[
    {"id": "1-introduzione", "title": "Introduzione al C++", "difficulty": "base",
     "description": "Storia e primo programma.", "topics": ["Hello World", "Compilazione"]},
    {"id": "5-array", "title": "Array e Stringhe", "difficulty": "intermedio",
     "description": "Array statici e std::string.", "topics": ["Array", "std::string"]},
    {"id": "7-puntatori", "title": "Puntatori e Riferimenti", "difficulty": "intermedio",
     "description": "Indirizzi di memoria.", "topics": ["Puntatori", "Riferimenti"],
     "quizId": "puntatori"}
]"#;

const QUIZZES: &str = r#"{
    "5-array": {"title": "Quiz Array", "questions": [
        {"question": "Indice del primo elemento?", "options": ["0", "1"], "correctAnswer": 0,
         "explanation": "Gli array partono da zero."},
        {"question": "Header per std::string?", "options": [], "correctAnswer": "<string>"}
    ]},
    "puntatori": {"title": "Quiz Puntatori", "questions": [
        {"question": "Operatore di dereferenziazione?", "options": ["&", "*"], "correctAnswer": 1}
    ]}
}"#;

fn lesson(raw: &str) -> LessonId {
    LessonId::new(raw).unwrap()
}

async fn sqlite_services(name: &str) -> AppServices {
    let (content, issues) = ContentService::from_json(LESSONS, QUIZZES).unwrap();
    assert!(issues.is_empty());
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    AppServices::new_sqlite(&url, Clock::fixed(fixed_now()), content)
        .await
        .unwrap()
}

#[tokio::test]
async fn completion_survives_a_new_service_instance() {
    let app = sqlite_services("memdb_flow_completion").await;
    let progress = app.progress();
    let catalog = app.content().lessons().clone();

    let mut tracker = progress.rehydrate().await;
    progress.toggle_completion(&mut tracker, &lesson("5-array")).await;
    let stats = progress.stats(&tracker, &catalog);
    assert_eq!((stats.completed, stats.progress, stats.remaining), (1, 33, 2));

    let reopened = sqlite_services("memdb_flow_completion").await;
    let tracker = reopened.progress().rehydrate().await;
    assert!(tracker.is_completed(&lesson("5-array")));
    assert_eq!(
        reopened.content().lessons().completed_lessons(tracker.completed()).len(),
        1
    );
}

#[tokio::test]
async fn quiz_pass_records_score_in_course_record() {
    let app = sqlite_services("memdb_flow_quiz").await;
    let quizzes = app.quizzes();
    let mut course = app.progress().load_course(app.content().lessons()).await;

    let session = quizzes.start_for_lesson(&lesson("5-array")).unwrap();
    let step = session.submit_answer(Answer::Choice(0));
    assert_eq!(step.event, QuizEvent::Judged { index: 0, correct: true });
    assert_eq!(
        step.session.revealed_explanation(),
        Some("Gli array partono da zero.")
    );

    let step = step.session.advance();
    let step = step.session.submit_answer(Answer::Text("<vector>".into()));
    assert_eq!(step.session.phase(), QuizPhase::Revealed { index: 1, correct: false });
    let step = step.session.advance();
    assert_eq!(step.event, QuizEvent::Completed { score: 1, total: 2 });

    let outcome = quizzes.finish(&step, &mut course).await.unwrap();
    assert_eq!(outcome.percent(), 50);

    let reloaded = app.progress().load_course(app.content().lessons()).await;
    assert_eq!(reloaded.entry(&lesson("5-array")).unwrap().quiz_score, Some(1));
    assert_eq!(reloaded.total_score(), 1);
}

#[tokio::test]
async fn explicit_quiz_id_is_used_for_lesson() {
    let app = in_memory();
    let session = app.quizzes().start_for_lesson(&lesson("7-puntatori")).unwrap();
    assert_eq!(session.quiz().id(), &QuizId::new("puntatori").unwrap());
    assert!(app.quizzes().start_for_lesson(&lesson("1-introduzione")).is_none());
}

fn in_memory() -> AppServices {
    let (content, _) = ContentService::from_json(LESSONS, QUIZZES).unwrap();
    AppServices::in_memory(Clock::fixed(fixed_now()), content)
}
