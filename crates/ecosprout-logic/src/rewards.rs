//! Deterministic reward resolution — completed activity to resource bundle.
//!
//! A small rule table: each module has a base bundle, and advanced
//! activities earn a fixed bonus on top. No randomness, no hidden state —
//! the same inputs always resolve to the same bundle. The difficulty tag
//! is carried on the lesson data, not inferred from id naming.

use serde::{Deserialize, Serialize};

use crate::inventory::{ResourceBundle, ResourceKind};

/// Activity difficulty tag, declared on each lesson.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Standard,
    Advanced,
}

/// Module-specific base reward bundle.
fn base_bundle(module_id: &str) -> ResourceBundle {
    match module_id {
        "climate-change" => ResourceBundle::new()
            .with(ResourceKind::Water, 2)
            .with(ResourceKind::Sunlight, 1),
        "waste-management" => ResourceBundle::new()
            .with(ResourceKind::Nutrients, 2)
            .with(ResourceKind::Water, 1),
        "renewable-energy" => ResourceBundle::new()
            .with(ResourceKind::Sunlight, 2)
            .with(ResourceKind::Water, 1),
        "water-conservation" => ResourceBundle::new().with(ResourceKind::Water, 3),
        "biodiversity" => ResourceBundle::new()
            .with(ResourceKind::Seed, 1)
            .with(ResourceKind::Nutrients, 1)
            .with(ResourceKind::Love, 1),
        // Modules without a dedicated rule still reward something.
        _ => ResourceBundle::new().with(ResourceKind::Water, 1),
    }
}

/// Bonus earned on top of the base bundle for advanced activities.
fn advanced_bonus() -> ResourceBundle {
    ResourceBundle::new()
        .with(ResourceKind::Fertilizer, 1)
        .with(ResourceKind::Love, 1)
}

/// Resolve the reward for a completed activity.
pub fn resolve_reward(module_id: &str, difficulty: Difficulty) -> ResourceBundle {
    let mut bundle = base_bundle(module_id);
    if difficulty == Difficulty::Advanced {
        bundle.merge(&advanced_bonus());
    }
    bundle
}
