//! Learner session - main entry point for driving the progression engine

use ecosprout_logic::curriculum::{builtin_curriculum, CurriculumGraph};
use ecosprout_logic::growth::{GrowthError, TreeGrowth, TreeStage};
use ecosprout_logic::inventory::{Inventory, ResourceBundle, ResourceKind};
use ecosprout_logic::progression::{Progression, ProgressionError};
use ecosprout_logic::rewards::resolve_reward;

/// One learner's full session state
pub struct LearnerSession {
    /// Static curriculum dependency graph
    graph: CurriculumGraph,
    /// Unlock/completion state
    progression: Progression,
    /// Earned resource counts
    inventory: Inventory,
    /// Tree growth stage machine
    growth: TreeGrowth,
}

/// What a completion call did, for the caller's render layer.
#[derive(Debug, Clone)]
pub struct CompletionReport {
    /// False on an idempotent repeat — nothing changed, nothing credited.
    pub newly_completed: bool,
    /// True when this completion finished the owning module.
    pub module_completed: bool,
    /// The bundle credited to the inventory. Empty on a repeat.
    pub reward: ResourceBundle,
}

impl LearnerSession {
    /// Fresh session over the built-in curriculum.
    pub fn new() -> Self {
        Self::with_curriculum(builtin_curriculum())
    }

    /// Fresh session over a caller-supplied curriculum graph.
    pub fn with_curriculum(graph: CurriculumGraph) -> Self {
        let progression = Progression::new(&graph);
        Self {
            graph,
            progression,
            inventory: Inventory::new(),
            growth: TreeGrowth::new(),
        }
    }

    // ── Activity entry points ───────────────────────────────────────────

    /// Complete a lesson and credit its reward exactly once. Repeat calls
    /// are no-ops that credit nothing.
    pub fn complete_lesson(
        &mut self,
        lesson_id: &str,
        module_id: &str,
    ) -> Result<CompletionReport, ProgressionError> {
        let outcome = self
            .progression
            .complete_lesson(&self.graph, lesson_id, module_id)?;

        let reward = if outcome.newly_completed {
            let lesson = self.graph.lesson(lesson_id)?;
            let bundle = resolve_reward(&lesson.module, lesson.difficulty);
            self.inventory.add_items(&bundle);
            bundle
        } else {
            ResourceBundle::new()
        };

        Ok(CompletionReport {
            newly_completed: outcome.newly_completed,
            module_completed: outcome.module_completed,
            reward,
        })
    }

    /// Complete a module directly. Returns whether it was newly completed.
    pub fn complete_module(&mut self, module_id: &str) -> Result<bool, ProgressionError> {
        self.progression.complete_module(&self.graph, module_id)
    }

    /// Credit extra resources (e.g., a mini-game payout resolved upstream).
    pub fn add_items(&mut self, bundle: &ResourceBundle) {
        self.inventory.add_items(bundle);
    }

    /// Attempt a stage upgrade against current inventory.
    pub fn try_upgrade(&mut self, target: TreeStage) -> Result<bool, GrowthError> {
        self.growth.upgrade(&mut self.inventory, target)
    }

    /// Reinitialize everything to the fixed starting state.
    pub fn reset_progress(&mut self) {
        self.progression.reset(&self.graph);
        self.inventory = Inventory::new();
        self.growth.reset();
    }

    // ── Queries for the caller's render layer ───────────────────────────

    pub fn can_access_lesson(
        &self,
        lesson_id: &str,
        module_id: &str,
    ) -> Result<bool, ProgressionError> {
        self.progression
            .can_access_lesson(&self.graph, lesson_id, module_id)
    }

    pub fn can_access_module(&self, module_id: &str) -> Result<bool, ProgressionError> {
        self.progression.can_access_module(&self.graph, module_id)
    }

    pub fn can_upgrade(&self, target: TreeStage) -> Result<bool, GrowthError> {
        self.growth.can_upgrade(&self.inventory, target)
    }

    pub fn lesson_progress(&self, lesson_id: &str) -> u8 {
        self.progression.lesson_progress(lesson_id)
    }

    pub fn module_progress(&self, module_id: &str) -> u8 {
        self.progression.module_progress(module_id)
    }

    pub fn resource_count(&self, kind: ResourceKind) -> u32 {
        self.inventory.count(kind)
    }

    pub fn stage(&self) -> TreeStage {
        self.growth.stage()
    }

    pub fn graph(&self) -> &CurriculumGraph {
        &self.graph
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Save session state to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), crate::persistence::SaveError> {
        crate::persistence::save_session(
            writer,
            &self.graph,
            &self.progression,
            &self.inventory,
            &self.growth,
        )
    }

    /// Load session state from a reader
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), crate::persistence::SaveError> {
        let loaded = crate::persistence::load_session(reader)?;
        self.graph = loaded.curriculum;
        self.progression = loaded.progression;
        self.inventory = loaded.inventory;
        self.growth = loaded.growth;
        Ok(())
    }

    /// Save as a human-readable JSON snapshot
    pub fn save_json(&self) -> Result<String, crate::persistence::SaveError> {
        crate::persistence::save_session_json(
            &self.graph,
            &self.progression,
            &self.inventory,
            &self.growth,
        )
    }

    /// Load from a JSON snapshot
    pub fn load_json(&mut self, json: &str) -> Result<(), crate::persistence::SaveError> {
        let loaded = crate::persistence::load_session_json(json)?;
        self.graph = loaded.curriculum;
        self.progression = loaded.progression;
        self.inventory = loaded.inventory;
        self.growth = loaded.growth;
        Ok(())
    }
}

impl Default for LearnerSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session() {
        let session = LearnerSession::new();
        assert_eq!(session.stage(), TreeStage::Pot);
        assert_eq!(session.resource_count(ResourceKind::Water), 0);
        assert_eq!(session.module_progress("climate-change"), 0);
        assert_eq!(session.can_access_lesson("climate-1", "climate-change"), Ok(true));
    }

    #[test]
    fn test_completion_credits_reward_once() {
        let mut session = LearnerSession::new();
        let report = session.complete_lesson("climate-1", "climate-change").unwrap();
        assert!(report.newly_completed);
        assert!(!report.reward.is_empty());
        assert_eq!(session.resource_count(ResourceKind::Water), 2);
        assert_eq!(session.resource_count(ResourceKind::Sunlight), 1);

        // Repeat: no state change, no reward.
        let repeat = session.complete_lesson("climate-1", "climate-change").unwrap();
        assert!(!repeat.newly_completed);
        assert!(repeat.reward.is_empty());
        assert_eq!(session.resource_count(ResourceKind::Water), 2);
    }

    #[test]
    fn test_advanced_lesson_bonus() {
        let mut session = LearnerSession::new();
        for i in 1..=4 {
            session
                .complete_lesson(&format!("climate-{}", i), "climate-change")
                .unwrap();
        }
        // climate-4 is advanced: fertilizer + love bonus landed.
        assert_eq!(session.resource_count(ResourceKind::Fertilizer), 1);
        assert_eq!(session.resource_count(ResourceKind::Love), 1);
    }

    #[test]
    fn test_module_cascade_reported() {
        let mut session = LearnerSession::new();
        for i in 1..=4 {
            let report = session
                .complete_lesson(&format!("climate-{}", i), "climate-change")
                .unwrap();
            assert!(!report.module_completed);
        }
        let last = session.complete_lesson("climate-5", "climate-change").unwrap();
        assert!(last.module_completed);
        assert_eq!(session.can_access_module("waste-management"), Ok(true));
    }

    #[test]
    fn test_upgrade_through_session() {
        let mut session = LearnerSession::new();
        session.complete_lesson("climate-1", "climate-change").unwrap();
        // Water 2 covers the seed stage exactly.
        assert_eq!(session.can_upgrade(TreeStage::Seed), Ok(true));
        assert_eq!(session.try_upgrade(TreeStage::Seed), Ok(true));
        assert_eq!(session.stage(), TreeStage::Seed);
        assert_eq!(session.resource_count(ResourceKind::Water), 0);
    }

    #[test]
    fn test_reset_progress() {
        let mut session = LearnerSession::new();
        session.complete_lesson("climate-1", "climate-change").unwrap();
        session.try_upgrade(TreeStage::Seed).unwrap();
        session.reset_progress();
        assert_eq!(session.stage(), TreeStage::Pot);
        assert_eq!(session.resource_count(ResourceKind::Water), 0);
        assert!(session.progression().completed_lessons().is_empty());
    }

    #[test]
    fn test_add_items_entry_point() {
        let mut session = LearnerSession::new();
        session.add_items(&ResourceBundle::new().with(ResourceKind::Love, 4));
        assert_eq!(session.resource_count(ResourceKind::Love), 4);
    }
}
