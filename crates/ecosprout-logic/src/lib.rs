//! Pure progression and economy rules for EcoSprout.
//!
//! This crate contains all curriculum-gating and reward-economy logic that
//! is independent of any storage medium, UI framework, or runtime. Functions
//! take plain data and return results, making them unit-testable and portable
//! across the app shell, native tools, and any future host.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`curriculum`] | Lesson/module dependency graph with entry lessons and acyclicity validation |
//! | [`progression`] | Learner unlock/completion state and its transition operations |
//! | [`inventory`] | Typed resource counts with atomic, never-negative spending |
//! | [`growth`] | Tree growth stage ladder and resource-gated stage upgrades |
//! | [`rewards`] | Deterministic activity-to-resource-bundle reward table |

pub mod curriculum;
pub mod growth;
pub mod inventory;
pub mod progression;
pub mod rewards;
