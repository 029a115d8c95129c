//! Learner progression state and its transition operations.
//!
//! `Progression` is the single owner of unlock/completion state. It is only
//! mutated through the operations here, which keep the unlock cascade
//! deterministic: completing a lesson marks it done exactly once, recomputes
//! the owning module's progress, and completes the module when every lesson
//! is done, unlocking its successors and their entry lessons.
//!
//! Access gating (`can_access_lesson`) and completion recording
//! (`complete_lesson`) are deliberately separate: the store does not
//! re-check prerequisites on write. The caller decides what the learner may
//! attempt; the store records what happened.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::curriculum::{CurriculumError, CurriculumGraph};

/// Progression errors. Structural problems fail fast; they indicate a bug
/// in the curriculum data or the caller, not a recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressionError {
    Curriculum(CurriculumError),
    /// `complete_lesson` was called with a module that is not the lesson's
    /// declared owner.
    OwnershipMismatch {
        lesson: String,
        declared_owner: String,
        given: String,
    },
}

impl From<CurriculumError> for ProgressionError {
    fn from(e: CurriculumError) -> Self {
        ProgressionError::Curriculum(e)
    }
}

impl std::fmt::Display for ProgressionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressionError::Curriculum(e) => write!(f, "{}", e),
            ProgressionError::OwnershipMismatch {
                lesson,
                declared_owner,
                given,
            } => write!(
                f,
                "lesson {} belongs to module {}, not {}",
                lesson, declared_owner, given
            ),
        }
    }
}

impl std::error::Error for ProgressionError {}

/// What a `complete_lesson` call actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonCompletion {
    /// False when the lesson was already completed (idempotent repeat).
    pub newly_completed: bool,
    /// True when this completion finished the owning module.
    pub module_completed: bool,
}

/// The learner's unlock/completion state. Created per session with the
/// starting module and its entry lesson unlocked, then mutated only through
/// the transition operations below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    completed_lessons: HashSet<String>,
    completed_modules: HashSet<String>,
    unlocked_lessons: HashSet<String>,
    unlocked_modules: HashSet<String>,
    current_lesson: String,
    current_module: String,
    /// Per-lesson progress percentage (0–100). Absent means not started.
    lesson_progress: HashMap<String, u8>,
    /// Per-module progress percentage, derived from completed lessons.
    module_progress: HashMap<String, u8>,
}

impl Progression {
    /// Fixed initial state: the first module and its entry lesson unlocked.
    pub fn new(graph: &CurriculumGraph) -> Self {
        let first = graph.first_module();
        Self {
            completed_lessons: HashSet::new(),
            completed_modules: HashSet::new(),
            unlocked_lessons: HashSet::from([first.entry_lesson.clone()]),
            unlocked_modules: HashSet::from([first.id.clone()]),
            current_lesson: first.entry_lesson.clone(),
            current_module: first.id.clone(),
            lesson_progress: HashMap::new(),
            module_progress: HashMap::new(),
        }
    }

    /// Reinitialize to the fixed initial state.
    pub fn reset(&mut self, graph: &CurriculumGraph) {
        *self = Self::new(graph);
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Whether the learner may attempt a lesson: its module must be
    /// unlocked, and either the lesson has no prerequisites and is
    /// unlocked (or is the module's entry lesson), or every prerequisite
    /// is completed.
    pub fn can_access_lesson(
        &self,
        graph: &CurriculumGraph,
        lesson_id: &str,
        module_id: &str,
    ) -> Result<bool, ProgressionError> {
        let lesson = graph.lesson(lesson_id)?;
        let module = graph.module(module_id)?;
        self.check_ownership(lesson_id, &lesson.module, module_id)?;

        if !self.unlocked_modules.contains(&module.id) {
            return Ok(false);
        }
        if lesson.prerequisites.is_empty() {
            Ok(self.unlocked_lessons.contains(lesson_id) || module.entry_lesson == lesson_id)
        } else {
            Ok(lesson
                .prerequisites
                .iter()
                .all(|p| self.completed_lessons.contains(p)))
        }
    }

    /// Whether the learner may enter a module: it must be unlocked and all
    /// its module-level prerequisites completed.
    pub fn can_access_module(
        &self,
        graph: &CurriculumGraph,
        module_id: &str,
    ) -> Result<bool, ProgressionError> {
        let module = graph.module(module_id)?;
        Ok(self.unlocked_modules.contains(&module.id)
            && module
                .prerequisites
                .iter()
                .all(|p| self.completed_modules.contains(p)))
    }

    /// Lesson progress percentage, 0 when not started.
    pub fn lesson_progress(&self, lesson_id: &str) -> u8 {
        self.lesson_progress.get(lesson_id).copied().unwrap_or(0)
    }

    /// Module progress percentage, 0 when not started.
    pub fn module_progress(&self, module_id: &str) -> u8 {
        self.module_progress.get(module_id).copied().unwrap_or(0)
    }

    pub fn completed_lessons(&self) -> &HashSet<String> {
        &self.completed_lessons
    }

    pub fn completed_modules(&self) -> &HashSet<String> {
        &self.completed_modules
    }

    pub fn unlocked_lessons(&self) -> &HashSet<String> {
        &self.unlocked_lessons
    }

    pub fn unlocked_modules(&self) -> &HashSet<String> {
        &self.unlocked_modules
    }

    pub fn current_lesson(&self) -> &str {
        &self.current_lesson
    }

    pub fn current_module(&self) -> &str {
        &self.current_module
    }

    // ── Transitions ─────────────────────────────────────────────────────

    /// Record a lesson completion. Idempotent: a repeat call changes
    /// nothing and reports `newly_completed: false` so the caller knows
    /// not to credit rewards again.
    ///
    /// Prerequisites are intentionally not re-checked here; gating is the
    /// caller's job via `can_access_lesson`.
    pub fn complete_lesson(
        &mut self,
        graph: &CurriculumGraph,
        lesson_id: &str,
        module_id: &str,
    ) -> Result<LessonCompletion, ProgressionError> {
        let lesson = graph.lesson(lesson_id)?;
        let module = graph.module(module_id)?;
        self.check_ownership(lesson_id, &lesson.module, module_id)?;

        if self.completed_lessons.contains(lesson_id) {
            return Ok(LessonCompletion {
                newly_completed: false,
                module_completed: false,
            });
        }

        self.completed_lessons.insert(lesson_id.to_string());
        self.lesson_progress.insert(lesson_id.to_string(), 100);

        for unlock in &lesson.unlocks {
            self.unlocked_lessons.insert(unlock.clone());
        }
        if let Some(first) = lesson.unlocks.first() {
            self.current_lesson = first.clone();
        }

        let completed_in_module = module
            .lessons
            .iter()
            .filter(|l| self.completed_lessons.contains(*l))
            .count();
        let progress = (completed_in_module * 100 / module.lessons.len()) as u8;
        self.module_progress.insert(module.id.clone(), progress);

        let module_completed = if progress == 100 {
            self.complete_module(graph, module_id)?
        } else {
            false
        };

        Ok(LessonCompletion {
            newly_completed: true,
            module_completed,
        })
    }

    /// Record a module completion. Idempotent no-op when already
    /// completed; returns whether this call newly completed the module.
    /// Unlocks every module in the unlock set along with its entry lesson,
    /// and advances the current module/lesson to the first successor.
    pub fn complete_module(
        &mut self,
        graph: &CurriculumGraph,
        module_id: &str,
    ) -> Result<bool, ProgressionError> {
        let module = graph.module(module_id)?;
        if self.completed_modules.contains(module_id) {
            return Ok(false);
        }

        self.completed_modules.insert(module.id.clone());
        for unlock in &module.unlocks {
            let next = graph.module(unlock)?;
            self.unlocked_modules.insert(next.id.clone());
            self.unlocked_lessons.insert(next.entry_lesson.clone());
        }
        if let Some(first) = module.unlocks.first() {
            let next = graph.module(first)?;
            self.current_module = next.id.clone();
            self.current_lesson = next.entry_lesson.clone();
        }

        Ok(true)
    }

    fn check_ownership(
        &self,
        lesson_id: &str,
        declared_owner: &str,
        given: &str,
    ) -> Result<(), ProgressionError> {
        if declared_owner != given {
            return Err(ProgressionError::OwnershipMismatch {
                lesson: lesson_id.to_string(),
                declared_owner: declared_owner.to_string(),
                given: given.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::builtin_curriculum;

    fn fresh() -> (CurriculumGraph, Progression) {
        let graph = builtin_curriculum();
        let progression = Progression::new(&graph);
        (graph, progression)
    }

    #[test]
    fn test_initial_state() {
        let (_, p) = fresh();
        assert_eq!(p.current_module(), "climate-change");
        assert_eq!(p.current_lesson(), "climate-1");
        assert!(p.unlocked_modules().contains("climate-change"));
        assert!(p.unlocked_lessons().contains("climate-1"));
        assert!(p.completed_lessons().is_empty());
        assert_eq!(p.module_progress("climate-change"), 0);
    }

    #[test]
    fn test_first_lesson_completion() {
        // Scenario: completing climate-1 unlocks climate-2, records the
        // completion, and puts module progress at 20 (1 of 5).
        let (graph, mut p) = fresh();
        let outcome = p.complete_lesson(&graph, "climate-1", "climate-change").unwrap();
        assert!(outcome.newly_completed);
        assert!(!outcome.module_completed);
        assert!(p.unlocked_lessons().contains("climate-2"));
        assert_eq!(p.completed_lessons().len(), 1);
        assert!(p.completed_lessons().contains("climate-1"));
        assert_eq!(p.module_progress("climate-change"), 20);
        assert_eq!(p.lesson_progress("climate-1"), 100);
        assert_eq!(p.current_lesson(), "climate-2");
    }

    #[test]
    fn test_complete_lesson_idempotent() {
        let (graph, mut p) = fresh();
        p.complete_lesson(&graph, "climate-1", "climate-change").unwrap();
        let snapshot = p.clone();

        let repeat = p.complete_lesson(&graph, "climate-1", "climate-change").unwrap();
        assert!(!repeat.newly_completed);
        assert_eq!(p.completed_lessons(), snapshot.completed_lessons());
        assert_eq!(p.unlocked_lessons(), snapshot.unlocked_lessons());
        assert_eq!(
            p.module_progress("climate-change"),
            snapshot.module_progress("climate-change")
        );
        assert_eq!(p.current_lesson(), snapshot.current_lesson());
    }

    #[test]
    fn test_module_completion_cascade() {
        // Scenario: completing all five climate lessons completes the
        // module, unlocks waste-management, and moves current to waste-1.
        let (graph, mut p) = fresh();
        for i in 1..=5 {
            let outcome = p
                .complete_lesson(&graph, &format!("climate-{}", i), "climate-change")
                .unwrap();
            assert_eq!(outcome.module_completed, i == 5);
        }
        assert!(p.completed_modules().contains("climate-change"));
        assert!(p.unlocked_modules().contains("waste-management"));
        assert_eq!(p.current_module(), "waste-management");
        assert_eq!(p.current_lesson(), "waste-1");
        assert_eq!(p.module_progress("climate-change"), 100);
    }

    #[test]
    fn test_cascade_unlocks_exactly_the_named_modules() {
        let (graph, mut p) = fresh();
        for i in 1..=5 {
            p.complete_lesson(&graph, &format!("climate-{}", i), "climate-change")
                .unwrap();
        }
        let mut expected: Vec<&str> = vec!["climate-change", "waste-management"];
        expected.sort_unstable();
        let mut unlocked: Vec<&str> = p.unlocked_modules().iter().map(|s| s.as_str()).collect();
        unlocked.sort_unstable();
        assert_eq!(unlocked, expected, "no more, no fewer");
    }

    #[test]
    fn test_gating_locked_module() {
        // waste-1 has no prerequisites, but its module is locked.
        let (graph, p) = fresh();
        assert_eq!(
            p.can_access_lesson(&graph, "waste-1", "waste-management"),
            Ok(false)
        );
        assert_eq!(p.can_access_module(&graph, "waste-management"), Ok(false));
    }

    #[test]
    fn test_gating_prerequisites() {
        let (graph, mut p) = fresh();
        // Entry lesson is accessible; its successor is not yet.
        assert_eq!(
            p.can_access_lesson(&graph, "climate-1", "climate-change"),
            Ok(true)
        );
        assert_eq!(
            p.can_access_lesson(&graph, "climate-2", "climate-change"),
            Ok(false)
        );
        p.complete_lesson(&graph, "climate-1", "climate-change").unwrap();
        assert_eq!(
            p.can_access_lesson(&graph, "climate-2", "climate-change"),
            Ok(true)
        );
    }

    #[test]
    fn test_module_access_after_cascade() {
        let (graph, mut p) = fresh();
        for i in 1..=5 {
            p.complete_lesson(&graph, &format!("climate-{}", i), "climate-change")
                .unwrap();
        }
        assert_eq!(p.can_access_module(&graph, "waste-management"), Ok(true));
        assert_eq!(
            p.can_access_lesson(&graph, "waste-1", "waste-management"),
            Ok(true)
        );
        // Two modules ahead stays locked.
        assert_eq!(p.can_access_module(&graph, "renewable-energy"), Ok(false));
    }

    #[test]
    fn test_ownership_mismatch() {
        let (graph, mut p) = fresh();
        let err = p
            .complete_lesson(&graph, "climate-1", "waste-management")
            .unwrap_err();
        assert_eq!(
            err,
            ProgressionError::OwnershipMismatch {
                lesson: "climate-1".to_string(),
                declared_owner: "climate-change".to_string(),
                given: "waste-management".to_string(),
            }
        );
        // Nothing was recorded.
        assert!(p.completed_lessons().is_empty());
    }

    #[test]
    fn test_unknown_ids() {
        let (graph, mut p) = fresh();
        assert!(matches!(
            p.complete_lesson(&graph, "nope", "climate-change"),
            Err(ProgressionError::Curriculum(CurriculumError::UnknownLesson(_)))
        ));
        assert!(matches!(
            p.can_access_module(&graph, "nope"),
            Err(ProgressionError::Curriculum(CurriculumError::UnknownModule(_)))
        ));
    }

    #[test]
    fn test_complete_module_idempotent() {
        let (graph, mut p) = fresh();
        assert!(p.complete_module(&graph, "climate-change").unwrap());
        let snapshot = p.clone();
        assert!(!p.complete_module(&graph, "climate-change").unwrap());
        assert_eq!(p.unlocked_modules(), snapshot.unlocked_modules());
        assert_eq!(p.current_module(), snapshot.current_module());
    }

    #[test]
    fn test_completion_does_not_recheck_prerequisites() {
        // Deliberate policy: the store records what the caller tells it.
        let (graph, mut p) = fresh();
        let outcome = p
            .complete_lesson(&graph, "climate-3", "climate-change")
            .unwrap();
        assert!(outcome.newly_completed);
        assert_eq!(p.module_progress("climate-change"), 20);
    }

    #[test]
    fn test_progress_accessors_default_zero() {
        let (_, p) = fresh();
        assert_eq!(p.lesson_progress("climate-4"), 0);
        assert_eq!(p.module_progress("biodiversity"), 0);
        // Unknown ids are not an error for progress reads: absence means
        // "not started".
        assert_eq!(p.lesson_progress("never-heard-of-it"), 0);
    }

    #[test]
    fn test_reset() {
        let (graph, mut p) = fresh();
        for i in 1..=5 {
            p.complete_lesson(&graph, &format!("climate-{}", i), "climate-change")
                .unwrap();
        }
        p.reset(&graph);
        assert!(p.completed_lessons().is_empty());
        assert!(p.completed_modules().is_empty());
        assert_eq!(p.current_lesson(), "climate-1");
        assert_eq!(p.module_progress("climate-change"), 0);
    }

    #[test]
    fn test_full_curriculum_playthrough() {
        let (graph, mut p) = fresh();
        let order = [
            ("climate-change", "climate"),
            ("waste-management", "waste"),
            ("renewable-energy", "energy"),
            ("water-conservation", "water"),
            ("biodiversity", "bio"),
        ];
        for (module, stem) in order {
            assert_eq!(p.can_access_module(&graph, module), Ok(true));
            for i in 1..=5 {
                let lesson = format!("{}-{}", stem, i);
                assert_eq!(p.can_access_lesson(&graph, &lesson, module), Ok(true));
                p.complete_lesson(&graph, &lesson, module).unwrap();
            }
            assert!(p.completed_modules().contains(module));
        }
        assert_eq!(p.completed_lessons().len(), 25);
        assert_eq!(p.completed_modules().len(), 5);
        // Terminal module has no successor; current stays on biodiversity.
        assert_eq!(p.current_module(), "biodiversity");
    }
}
