//! Tree growth stages and resource-gated stage upgrades.
//!
//! The tree advances through a strict ladder of stages; the only legal
//! transition is to the single next stage, paid for from the inventory.
//! The affordability check and the debit happen inside one operation so a
//! caller can never observe a debit without the stage advance or the
//! reverse.

use serde::{Deserialize, Serialize};

use crate::inventory::{Inventory, ResourceBundle, ResourceKind};

/// Discrete growth stages in strict order. `Forest` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TreeStage {
    Pot = 0,
    Seed = 1,
    Sapling = 2,
    Growing = 3,
    Mature = 4,
    Blooming = 5,
    Tree = 6,
    Forest = 7,
}

impl TreeStage {
    /// All stages in ladder order.
    pub const ALL: [TreeStage; 8] = [
        TreeStage::Pot,
        TreeStage::Seed,
        TreeStage::Sapling,
        TreeStage::Growing,
        TreeStage::Mature,
        TreeStage::Blooming,
        TreeStage::Tree,
        TreeStage::Forest,
    ];

    /// The single legal successor stage, `None` at the terminal stage.
    pub fn next(&self) -> Option<TreeStage> {
        TreeStage::from_u8(*self as u8 + 1)
    }

    pub fn from_u8(val: u8) -> Option<TreeStage> {
        match val {
            0 => Some(TreeStage::Pot),
            1 => Some(TreeStage::Seed),
            2 => Some(TreeStage::Sapling),
            3 => Some(TreeStage::Growing),
            4 => Some(TreeStage::Mature),
            5 => Some(TreeStage::Blooming),
            6 => Some(TreeStage::Tree),
            7 => Some(TreeStage::Forest),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TreeStage::Pot => "pot",
            TreeStage::Seed => "seed",
            TreeStage::Sapling => "sapling",
            TreeStage::Growing => "growing",
            TreeStage::Mature => "mature",
            TreeStage::Blooming => "blooming",
            TreeStage::Tree => "tree",
            TreeStage::Forest => "forest",
        }
    }
}

/// Stage transition errors. Affordability failure is not an error — it is
/// an ordinary `false` result from `can_upgrade`/`upgrade`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrowthError {
    /// The requested target is not the single next stage.
    IllegalTransition { current: TreeStage, target: TreeStage },
}

impl std::fmt::Display for GrowthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrowthError::IllegalTransition { current, target } => write!(
                f,
                "illegal stage transition: {} -> {} (only the next stage is legal)",
                current.name(),
                target.name()
            ),
        }
    }
}

impl std::error::Error for GrowthError {}

/// Resource cost table keyed by target stage. Config data — the built-in
/// table can be replaced wholesale or per stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRequirements {
    costs: Vec<(TreeStage, ResourceBundle)>,
}

impl StageRequirements {
    /// An empty table: every stage is vacuously affordable.
    pub fn empty() -> Self {
        Self { costs: Vec::new() }
    }

    /// Cost of reaching `target`. A stage with no entry costs nothing.
    pub fn cost(&self, target: TreeStage) -> ResourceBundle {
        self.costs
            .iter()
            .find(|(stage, _)| *stage == target)
            .map(|(_, bundle)| bundle.clone())
            .unwrap_or_default()
    }

    /// Replace the cost of one target stage.
    pub fn set_cost(&mut self, target: TreeStage, bundle: ResourceBundle) {
        match self.costs.iter_mut().find(|(stage, _)| *stage == target) {
            Some((_, existing)) => *existing = bundle,
            None => self.costs.push((target, bundle)),
        }
    }
}

impl Default for StageRequirements {
    /// The built-in cost ladder. Totals are tuned so completing the whole
    /// built-in curriculum funds the full climb to `Forest`.
    fn default() -> Self {
        Self {
            costs: vec![
                (
                    TreeStage::Seed,
                    ResourceBundle::new().with(ResourceKind::Water, 2),
                ),
                (
                    TreeStage::Sapling,
                    ResourceBundle::new()
                        .with(ResourceKind::Water, 3)
                        .with(ResourceKind::Sunlight, 1),
                ),
                (
                    TreeStage::Growing,
                    ResourceBundle::new()
                        .with(ResourceKind::Water, 4)
                        .with(ResourceKind::Sunlight, 2)
                        .with(ResourceKind::Nutrients, 1),
                ),
                (
                    TreeStage::Mature,
                    ResourceBundle::new()
                        .with(ResourceKind::Water, 5)
                        .with(ResourceKind::Sunlight, 3)
                        .with(ResourceKind::Nutrients, 2),
                ),
                (
                    TreeStage::Blooming,
                    ResourceBundle::new()
                        .with(ResourceKind::Water, 6)
                        .with(ResourceKind::Sunlight, 3)
                        .with(ResourceKind::Nutrients, 3)
                        .with(ResourceKind::Fertilizer, 2),
                ),
                (
                    TreeStage::Tree,
                    ResourceBundle::new()
                        .with(ResourceKind::Water, 7)
                        .with(ResourceKind::Sunlight, 3)
                        .with(ResourceKind::Nutrients, 4)
                        .with(ResourceKind::Fertilizer, 3)
                        .with(ResourceKind::Love, 2),
                ),
                (
                    TreeStage::Forest,
                    ResourceBundle::new()
                        .with(ResourceKind::Water, 8)
                        .with(ResourceKind::Sunlight, 3)
                        .with(ResourceKind::Nutrients, 5)
                        .with(ResourceKind::Fertilizer, 4)
                        .with(ResourceKind::Seed, 3)
                        .with(ResourceKind::Love, 3),
                ),
            ],
        }
    }
}

/// Stage upgrade engine: current stage plus the cost table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeGrowth {
    stage: TreeStage,
    requirements: StageRequirements,
}

impl TreeGrowth {
    /// Fresh tree at the lowest stage with the built-in cost table.
    pub fn new() -> Self {
        Self::with_requirements(StageRequirements::default())
    }

    pub fn with_requirements(requirements: StageRequirements) -> Self {
        Self {
            stage: TreeStage::Pot,
            requirements,
        }
    }

    pub fn stage(&self) -> TreeStage {
        self.stage
    }

    pub fn requirements(&self) -> &StageRequirements {
        &self.requirements
    }

    /// Whether the inventory covers the cost of `target`.
    ///
    /// Errors if `target` is not the single next stage.
    pub fn can_upgrade(&self, inventory: &Inventory, target: TreeStage) -> Result<bool, GrowthError> {
        self.check_target(target)?;
        Ok(inventory.can_afford(&self.requirements.cost(target)))
    }

    /// Attempt the upgrade. Affordability is re-validated here — never
    /// trust an earlier `can_upgrade` — and the debit plus stage advance
    /// are one unit: both happen or neither does.
    pub fn upgrade(&mut self, inventory: &mut Inventory, target: TreeStage) -> Result<bool, GrowthError> {
        self.check_target(target)?;
        if !inventory.spend(&self.requirements.cost(target)) {
            return Ok(false);
        }
        self.stage = target;
        Ok(true)
    }

    /// Back to the lowest stage. The cost table is static and stays.
    pub fn reset(&mut self) {
        self.stage = TreeStage::Pot;
    }

    fn check_target(&self, target: TreeStage) -> Result<(), GrowthError> {
        match self.stage.next() {
            Some(next) if next == target => Ok(()),
            _ => Err(GrowthError::IllegalTransition {
                current: self.stage,
                target,
            }),
        }
    }
}

impl Default for TreeGrowth {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water(amount: u32) -> ResourceBundle {
        ResourceBundle::new().with(ResourceKind::Water, amount)
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(TreeStage::Pot.next(), Some(TreeStage::Seed));
        assert_eq!(TreeStage::Tree.next(), Some(TreeStage::Forest));
        assert_eq!(TreeStage::Forest.next(), None, "forest is terminal");
        assert!(TreeStage::Pot < TreeStage::Forest);
    }

    #[test]
    fn test_stage_u8_roundtrip() {
        for stage in TreeStage::ALL {
            assert_eq!(TreeStage::from_u8(stage as u8), Some(stage));
        }
        assert_eq!(TreeStage::from_u8(8), None);
    }

    #[test]
    fn test_upgrade_scenario() {
        // {water: 1} cannot afford seed (costs water 2); one more can.
        let mut growth = TreeGrowth::new();
        let mut inv = Inventory::new();
        inv.add_items(&water(1));
        assert_eq!(growth.can_upgrade(&inv, TreeStage::Seed), Ok(false));

        inv.add_items(&water(1));
        assert_eq!(growth.can_upgrade(&inv, TreeStage::Seed), Ok(true));

        assert_eq!(growth.upgrade(&mut inv, TreeStage::Seed), Ok(true));
        assert_eq!(growth.stage(), TreeStage::Seed);
        assert_eq!(inv.count(ResourceKind::Water), 0);
    }

    #[test]
    fn test_skipping_a_stage_is_illegal() {
        let growth = TreeGrowth::new();
        let inv = Inventory::new();
        let err = growth.can_upgrade(&inv, TreeStage::Sapling).unwrap_err();
        assert_eq!(
            err,
            GrowthError::IllegalTransition {
                current: TreeStage::Pot,
                target: TreeStage::Sapling,
            }
        );
    }

    #[test]
    fn test_backward_transition_is_illegal() {
        let mut growth = TreeGrowth::new();
        let mut inv = Inventory::new();
        inv.add_items(&water(10));
        growth.upgrade(&mut inv, TreeStage::Seed).unwrap();
        assert!(growth.upgrade(&mut inv, TreeStage::Pot).is_err());
        assert!(growth.upgrade(&mut inv, TreeStage::Seed).is_err());
    }

    #[test]
    fn test_failed_upgrade_has_no_side_effect() {
        let mut growth = TreeGrowth::new();
        let mut inv = Inventory::new();
        inv.add_items(&water(1));
        assert_eq!(growth.upgrade(&mut inv, TreeStage::Seed), Ok(false));
        assert_eq!(growth.stage(), TreeStage::Pot);
        assert_eq!(inv.count(ResourceKind::Water), 1);
    }

    #[test]
    fn test_upgrade_conserves_other_kinds() {
        let mut growth = TreeGrowth::new();
        let mut inv = Inventory::new();
        inv.add_items(
            &ResourceBundle::new()
                .with(ResourceKind::Water, 2)
                .with(ResourceKind::Love, 7),
        );
        growth.upgrade(&mut inv, TreeStage::Seed).unwrap();
        // Seed costs water only; love is untouched.
        assert_eq!(inv.count(ResourceKind::Water), 0);
        assert_eq!(inv.count(ResourceKind::Love), 7);
    }

    #[test]
    fn test_empty_requirements_are_vacuously_affordable() {
        let growth = TreeGrowth::with_requirements(StageRequirements::empty());
        let inv = Inventory::new();
        assert_eq!(growth.can_upgrade(&inv, TreeStage::Seed), Ok(true));
    }

    #[test]
    fn test_set_cost_overrides() {
        let mut reqs = StageRequirements::default();
        reqs.set_cost(TreeStage::Seed, water(99));
        assert_eq!(reqs.cost(TreeStage::Seed).amount(ResourceKind::Water), 99);
    }

    #[test]
    fn test_every_target_stage_has_a_builtin_cost() {
        let reqs = StageRequirements::default();
        for stage in TreeStage::ALL.iter().skip(1) {
            assert!(
                !reqs.cost(*stage).is_empty(),
                "stage {} should have a cost",
                stage.name()
            );
        }
    }

    #[test]
    fn test_reset_returns_to_pot() {
        let mut growth = TreeGrowth::new();
        let mut inv = Inventory::new();
        inv.add_items(&water(2));
        growth.upgrade(&mut inv, TreeStage::Seed).unwrap();
        growth.reset();
        assert_eq!(growth.stage(), TreeStage::Pot);
    }
}
