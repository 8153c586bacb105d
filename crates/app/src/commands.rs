use std::io::{self, BufRead, Write};

use corso_core::model::{Answer, DifficultyFilter, LessonId, Question, QuestionMode, QuizId};
use corso_core::{IgnoreReason, QuizEvent, QuizPhase, QuizSession};
use services::AppServices;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Help,
    Lessons {
        search: String,
        difficulty: DifficultyFilter,
    },
    Stats,
    Toggle(LessonId),
    Completed,
    Quiz(String),
    Scores,
    Reset,
}

pub(crate) async fn execute<R: BufRead, W: Write>(
    services: &AppServices,
    command: Command,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    let content = services.content();
    let progress = services.progress();

    match command {
        Command::Help => Ok(()),
        Command::Lessons { search, difficulty } => {
            let tracker = progress.rehydrate().await;
            let lessons = content.lessons().filter(&search, difficulty);
            if lessons.is_empty() {
                return writeln!(out, "Nessuna lezione trovata.");
            }
            for lesson in lessons {
                let mark = if tracker.is_completed(lesson.id()) { 'x' } else { ' ' };
                writeln!(
                    out,
                    "[{mark}] {:<20} {} ({}, {})",
                    lesson.id().as_str(),
                    lesson.title(),
                    lesson.difficulty(),
                    lesson.duration()
                )?;
            }
            Ok(())
        }
        Command::Stats => {
            let tracker = progress.rehydrate().await;
            let stats = progress.stats(&tracker, content.lessons());
            writeln!(out, "Lezioni:     {}", stats.total)?;
            writeln!(out, "Completate:  {}", stats.completed)?;
            writeln!(out, "Progresso:   {}%", stats.progress)?;
            writeln!(out, "Rimanenti:   {}", stats.remaining)
        }
        Command::Toggle(id) => {
            let mut tracker = progress.rehydrate().await;
            let completed = progress.toggle_completion(&mut tracker, &id).await;
            let mut course = progress.load_course(content.lessons()).await;
            progress
                .update_lesson_progress(&mut course, &id, completed, None)
                .await;

            if completed {
                writeln!(out, "Lezione {id} completata.")?;
            } else {
                writeln!(out, "Lezione {id} non più completata.")?;
            }
            if content.lesson(&id).is_none() {
                writeln!(out, "(lezione non presente nel catalogo)")?;
            }
            Ok(())
        }
        Command::Completed => {
            let tracker = progress.rehydrate().await;
            let lessons = content.lessons().completed_lessons(tracker.completed());
            if lessons.is_empty() {
                return writeln!(out, "Nessuna lezione completata.");
            }
            for lesson in lessons {
                writeln!(out, "{:<20} {}", lesson.id().as_str(), lesson.title())?;
            }
            Ok(())
        }
        Command::Quiz(raw) => run_quiz(services, &raw, input, out).await,
        Command::Scores => {
            let course = progress.load_course(content.lessons()).await;
            for entry in course.lessons() {
                if let Some(score) = entry.quiz_score {
                    writeln!(out, "{:<20} {}: {score}", entry.id.as_str(), entry.title)?;
                }
            }
            writeln!(out, "Punteggio totale: {}", course.total_score())?;
            writeln!(out, "Progresso corso:  {}%", course.progress())
        }
        Command::Reset => {
            progress.reset().await;
            writeln!(out, "Progressi azzerati.")
        }
    }
}

fn start_session(services: &AppServices, raw: &str) -> Option<QuizSession> {
    let quizzes = services.quizzes();
    QuizId::new(raw)
        .ok()
        .and_then(|id| quizzes.start(&id))
        .or_else(|| {
            LessonId::new(raw)
                .ok()
                .and_then(|id| quizzes.start_for_lesson(&id))
        })
}

async fn run_quiz<R: BufRead, W: Write>(
    services: &AppServices,
    raw: &str,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    let Some(mut session) = start_session(services, raw) else {
        return writeln!(out, "Quiz non disponibile: {raw}");
    };
    let quizzes = services.quizzes();
    let progress = services.progress();
    let mut course = progress.load_course(services.content().lessons()).await;

    writeln!(
        out,
        "{} ({} domande)",
        session.quiz().title(),
        session.total()
    )?;

    let mut shown = None;
    loop {
        match session.phase() {
            QuizPhase::Answering { index } => {
                let Some(question) = session.current_question() else {
                    break;
                };
                if shown != Some(index) {
                    print_question(out, index, session.total(), question)?;
                    shown = Some(index);
                }
                write!(out, "> ")?;
                out.flush()?;

                let Some(line) = read_line(input)? else {
                    return writeln!(out, "\nQuiz interrotto.");
                };
                let Some(answer) = parse_answer(question, &line) else {
                    writeln!(out, "Risposta non valida.")?;
                    continue;
                };

                let step = session.submit_answer(answer);
                session = step.session;
                match step.event {
                    QuizEvent::Judged { correct: true, .. } => writeln!(out, "Corretto!")?,
                    QuizEvent::Judged { correct: false, index } => {
                        if let Some(question) = session.quiz().question(index) {
                            let answer = expected(question);
                            writeln!(out, "Sbagliato. Risposta corretta: {answer}")?;
                        }
                    }
                    QuizEvent::Ignored(IgnoreReason::Rejected(_)) => {
                        writeln!(out, "Risposta non valida.")?;
                    }
                    _ => {}
                }
                if let Some(explanation) = session.revealed_explanation() {
                    writeln!(out, "{explanation}")?;
                }
            }
            QuizPhase::Revealed { .. } => {
                let step = session.advance();
                if let Some(outcome) = quizzes.finish(&step, &mut course).await {
                    writeln!(
                        out,
                        "\nPunteggio: {}/{} ({}%)",
                        outcome.score,
                        outcome.total,
                        outcome.percent()
                    )?;
                    writeln!(
                        out,
                        "Completato il {}",
                        outcome.completed_at.format("%d/%m/%Y %H:%M UTC")
                    )?;
                    if outcome.is_perfect() {
                        writeln!(out, "Ottimo lavoro!")?;
                    } else {
                        writeln!(out, "Rivedi la lezione e riprova.")?;
                    }
                }
                session = step.session;
            }
            QuizPhase::Finished => break,
        }
    }
    Ok(())
}

fn print_question<W: Write>(
    out: &mut W,
    index: usize,
    total: usize,
    question: &Question,
) -> io::Result<()> {
    writeln!(out, "\nDomanda {}/{total}: {}", index + 1, question.text())?;
    if question.is_free_text() {
        return writeln!(out, "(risposta libera)");
    }
    for (i, option) in question.options().iter().enumerate() {
        writeln!(out, "  {}. {option}", i + 1)?;
    }
    Ok(())
}

/// Options are numbered from 1 on screen.
fn parse_answer(question: &Question, line: &str) -> Option<Answer> {
    if question.is_free_text() {
        return Some(Answer::Text(line.to_owned()));
    }
    match line.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(Answer::Choice(n - 1)),
        _ => None,
    }
}

fn expected(question: &Question) -> &str {
    match question.mode() {
        QuestionMode::Choice { options, correct } => {
            options.get(*correct).map_or("", String::as_str)
        }
        QuestionMode::FreeText { expected } => expected.as_str(),
    }
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
}
