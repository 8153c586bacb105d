mod ids;
mod lesson;
mod question;
mod quiz;

pub use ids::{LessonId, ParseIdError, QuizId};
pub use lesson::{Difficulty, DifficultyFilter, Lesson, ParseDifficultyError};
pub use question::{
    Answer, AnswerKeyDraft, AnswerRejection, Question, QuestionDraft, QuestionError, QuestionMode,
};
pub use quiz::{Quiz, QuizCatalog, QuizDraft, QuizError, QuizLoadIssue};
