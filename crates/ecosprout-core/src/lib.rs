//! EcoSprout Core - Learner Session Engine
//!
//! Wires the pure rules from `ecosprout-logic` into a single owned session:
//! one learner's curriculum graph, progression state, resource inventory,
//! and tree growth, plus versioned save/load.
//!
//! # Example
//!
//! ```rust
//! use ecosprout_core::prelude::*;
//!
//! let mut session = LearnerSession::new();
//!
//! // Complete the first lesson; rewards credit automatically.
//! let report = session.complete_lesson("climate-1", "climate-change").unwrap();
//! assert!(report.newly_completed);
//! ```

pub mod persistence;
pub mod session;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::session::{CompletionReport, LearnerSession};
    pub use ecosprout_logic::growth::TreeStage;
    pub use ecosprout_logic::inventory::ResourceKind;
}
