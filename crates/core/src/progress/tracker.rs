use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{ProgressEffect, ProgressStep, percent};
use crate::model::{Lesson, LessonId};

//
// ─── COMPLETION SET ────────────────────────────────────────────────────────────
//

/// Lesson ids the user marked as done. Serialized as a sorted JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionSet(BTreeSet<LessonId>);

impl CompletionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &LessonId) -> bool {
        self.0.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LessonId> {
        self.0.iter()
    }

    fn toggled(&self, id: &LessonId) -> Self {
        let mut next = self.0.clone();
        if !next.remove(id) {
            next.insert(id.clone());
        }
        Self(next)
    }
}

impl FromIterator<LessonId> for CompletionSet {
    fn from_iter<T: IntoIterator<Item = LessonId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

/// Derived completion statistics for the lesson list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressStats {
    pub total: usize,
    pub completed: usize,
    /// Rounded percentage of `completed` over `total`.
    pub progress: u32,
    pub remaining: usize,
}

/// Pure statistics over the catalog and the completion set.
///
/// Completed ids are counted as-is, even when the catalog does not know them;
/// `remaining` saturates at zero in that case.
#[must_use]
pub fn compute_stats(lessons: &[Lesson], completed: &CompletionSet) -> ProgressStats {
    let total = lessons.len();
    let done = completed.len();
    ProgressStats {
        total,
        completed: done,
        progress: percent(done, total),
        remaining: total.saturating_sub(done),
    }
}

//
// ─── TRACKER ───────────────────────────────────────────────────────────────────
//

/// Owner of the completion set for the running session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressTracker {
    completed: CompletionSet,
}

impl ProgressTracker {
    /// Tracker rehydrated from a previously persisted set.
    #[must_use]
    pub fn from_persisted(completed: CompletionSet) -> Self {
        Self { completed }
    }

    #[must_use]
    pub fn completed(&self) -> &CompletionSet {
        &self.completed
    }

    #[must_use]
    pub fn is_completed(&self, id: &LessonId) -> bool {
        self.completed.contains(id)
    }

    #[must_use]
    pub fn stats(&self, lessons: &[Lesson]) -> ProgressStats {
        compute_stats(lessons, &self.completed)
    }

    /// Flip membership of `id`; the new set must be persisted right away.
    #[must_use]
    pub fn toggle_completion(&self, id: &LessonId) -> ProgressStep<ProgressTracker> {
        self.replace(self.completed.toggled(id))
    }

    /// Forget every completed lesson.
    #[must_use]
    pub fn clear(&self) -> ProgressStep<ProgressTracker> {
        self.replace(CompletionSet::new())
    }

    fn replace(&self, completed: CompletionSet) -> ProgressStep<ProgressTracker> {
        ProgressStep {
            effects: vec![ProgressEffect::PersistCompletion(completed.clone())],
            state: ProgressTracker { completed },
        }
    }
}
