//! Typed resource inventory — the learner's earned-resource counts.
//!
//! Counts are unsigned and can never be observed negative. Credits go
//! through [`Inventory::add_items`]; the only debit path is the
//! crate-internal [`Inventory::spend`], which checks a whole bundle and
//! debits it as one unit. Nothing outside this crate can subtract.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All resource kinds a learning activity can earn. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Seed,
    Water,
    Sunlight,
    Nutrients,
    Fertilizer,
    Love,
}

impl ResourceKind {
    /// All resource kinds in order.
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Seed,
        ResourceKind::Water,
        ResourceKind::Sunlight,
        ResourceKind::Nutrients,
        ResourceKind::Fertilizer,
        ResourceKind::Love,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Seed => "seed",
            ResourceKind::Water => "water",
            ResourceKind::Sunlight => "sunlight",
            ResourceKind::Nutrients => "nutrients",
            ResourceKind::Fertilizer => "fertilizer",
            ResourceKind::Love => "love",
        }
    }
}

/// An ordered kind → amount mapping, credited or required as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBundle {
    entries: Vec<(ResourceKind, u32)>,
}

impl ResourceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style entry. Amounts for a repeated kind accumulate.
    pub fn with(mut self, kind: ResourceKind, amount: u32) -> Self {
        self.add(kind, amount);
        self
    }

    /// Add an amount of one kind.
    pub fn add(&mut self, kind: ResourceKind, amount: u32) {
        if amount == 0 {
            return;
        }
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, n)) => *n = n.saturating_add(amount),
            None => self.entries.push((kind, amount)),
        }
    }

    /// Merge every entry of `other` into this bundle.
    pub fn merge(&mut self, other: &ResourceBundle) {
        for (kind, amount) in other.iter() {
            self.add(kind, amount);
        }
    }

    /// Amount of one kind, 0 if absent.
    pub fn amount(&self, kind: ResourceKind) -> u32 {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u32)> + '_ {
        self.entries.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Mutable resource counts for one learner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    counts: HashMap<ResourceKind, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit every entry of a bundle. Never decreases any count.
    pub fn add_items(&mut self, bundle: &ResourceBundle) {
        for (kind, amount) in bundle.iter() {
            let count = self.counts.entry(kind).or_insert(0);
            *count = count.saturating_add(amount);
        }
    }

    /// Current count of one kind, 0 if never credited.
    pub fn count(&self, kind: ResourceKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Whether every entry of `bundle` is covered by current counts.
    pub fn can_afford(&self, bundle: &ResourceBundle) -> bool {
        bundle.iter().all(|(kind, amount)| self.count(kind) >= amount)
    }

    /// Debit a whole bundle atomically: checks affordability, then
    /// subtracts every entry. Returns false (and changes nothing) if any
    /// count is insufficient. Crate-internal — only the stage upgrade
    /// engine spends.
    pub(crate) fn spend(&mut self, bundle: &ResourceBundle) -> bool {
        if !self.can_afford(bundle) {
            return false;
        }
        for (kind, amount) in bundle.iter() {
            if let Some(count) = self.counts.get_mut(&kind) {
                *count -= amount;
            }
        }
        true
    }
}
