//! Single-user progress tracking.
//!
//! Transitions here are pure: they return the next state together with the
//! [`ProgressEffect`]s the host has to run (persisting the new state). Storage
//! keys live here so every host writes the same layout.

mod course;
mod tracker;

pub use course::{CourseProgress, LessonProgressEntry};
pub use tracker::{CompletionSet, ProgressStats, ProgressTracker, compute_stats};

/// Storage key of the completed-lesson set (JSON array of ids).
pub const COMPLETED_LESSONS_KEY: &str = "completedLessons";

/// Storage key of the course progress record with quiz scores.
pub const COURSE_PROGRESS_KEY: &str = "courseProgress";

/// Side effect requested by a progress transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEffect {
    /// Write the completion set under [`COMPLETED_LESSONS_KEY`].
    PersistCompletion(CompletionSet),
    /// Write the course record under [`COURSE_PROGRESS_KEY`].
    PersistCourse(CourseProgress),
}

/// Next state plus the effects to run for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStep<S> {
    pub state: S,
    pub effects: Vec<ProgressEffect>,
}

/// `round(100 * part / total)` with halves rounded up; 0 when `total` is 0.
#[must_use]
pub fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let part = part as u128;
    let total = total as u128;
    let rounded = (200 * part + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13); // 12.5
        assert_eq!(percent(3, 3), 100);
    }
}
