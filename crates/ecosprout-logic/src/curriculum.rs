//! Curriculum dependency graph — lessons, modules, and unlock edges.
//!
//! The graph is static data: lessons grouped into modules, with prerequisite
//! and unlock edges at both levels. Each module declares one designated entry
//! lesson, which is what becomes accessible the moment the module unlocks —
//! a graph property rather than a special case per module.
//!
//! Structural validation (referential integrity, entry-lesson membership,
//! acyclicity) runs when building a graph from external definitions and in
//! tests for the built-in curriculum. Runtime lookups of unknown ids are
//! errors, never silent defaults.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::rewards::Difficulty;

/// A single lesson definition. Immutable once the graph is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    /// Owning module id.
    pub module: String,
    /// Lesson ids that must all be completed before this one is accessible.
    pub prerequisites: Vec<String>,
    /// Lesson ids that become unlocked when this one is completed.
    pub unlocks: Vec<String>,
    /// Reward difficulty tag carried on the lesson data itself.
    pub difficulty: Difficulty,
}

/// A named group of sequential lessons with module-level unlock edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    /// Ordered lesson ids belonging to this module.
    pub lessons: Vec<String>,
    /// Designated entry lesson — accessible as soon as the module unlocks.
    pub entry_lesson: String,
    /// Module ids that must all be completed before this module is accessible.
    pub prerequisites: Vec<String>,
    /// Module ids that become unlocked when this module is completed.
    pub unlocks: Vec<String>,
}

/// Errors from graph lookups and definition validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurriculumError {
    /// Lesson id not present in the graph.
    UnknownLesson(String),
    /// Module id not present in the graph.
    UnknownModule(String),
    /// The static definitions are inconsistent (bad reference, cycle, etc.).
    InvalidDefinition(String),
}

impl std::fmt::Display for CurriculumError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurriculumError::UnknownLesson(id) => write!(f, "unknown lesson id: {}", id),
            CurriculumError::UnknownModule(id) => write!(f, "unknown module id: {}", id),
            CurriculumError::InvalidDefinition(msg) => {
                write!(f, "invalid curriculum definition: {}", msg)
            }
        }
    }
}

impl std::error::Error for CurriculumError {}

/// Static dependency graph over lessons and modules with O(1) id lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumGraph {
    lessons: HashMap<String, Lesson>,
    modules: HashMap<String, Module>,
    /// Module ids in definition order. The first entry is the starting module.
    module_order: Vec<String>,
}

impl CurriculumGraph {
    /// Build a graph from external definitions, validating structure.
    pub fn from_defs(modules: Vec<Module>, lessons: Vec<Lesson>) -> Result<Self, CurriculumError> {
        let graph = Self::from_parts(modules, lessons);
        graph.validate()?;
        Ok(graph)
    }

    /// Build without validation. Used for the built-in curriculum, whose
    /// structure is checked by tests instead of at every startup.
    fn from_parts(modules: Vec<Module>, lessons: Vec<Lesson>) -> Self {
        let module_order: Vec<String> = modules.iter().map(|m| m.id.clone()).collect();
        Self {
            lessons: lessons.into_iter().map(|l| (l.id.clone(), l)).collect(),
            modules: modules.into_iter().map(|m| (m.id.clone(), m)).collect(),
            module_order,
        }
    }

    /// Look up a lesson by id.
    pub fn lesson(&self, id: &str) -> Result<&Lesson, CurriculumError> {
        self.lessons
            .get(id)
            .ok_or_else(|| CurriculumError::UnknownLesson(id.to_string()))
    }

    /// Look up a module by id.
    pub fn module(&self, id: &str) -> Result<&Module, CurriculumError> {
        self.modules
            .get(id)
            .ok_or_else(|| CurriculumError::UnknownModule(id.to_string()))
    }

    /// The starting module (first in definition order).
    ///
    /// The graph is never constructed empty: `from_defs` rejects it and the
    /// built-in curriculum always has modules.
    pub fn first_module(&self) -> &Module {
        &self.modules[&self.module_order[0]]
    }

    /// Modules in definition order.
    pub fn modules_in_order(&self) -> impl Iterator<Item = &Module> {
        self.module_order.iter().map(|id| &self.modules[id])
    }

    /// All lessons (arbitrary order).
    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.lessons.values()
    }

    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Validate referential integrity, entry-lesson membership, and
    /// acyclicity of both the prerequisite and unlock relations.
    pub fn validate(&self) -> Result<(), CurriculumError> {
        if self.module_order.is_empty() {
            return Err(CurriculumError::InvalidDefinition(
                "curriculum has no modules".to_string(),
            ));
        }

        for module in self.modules.values() {
            if module.lessons.is_empty() {
                return Err(CurriculumError::InvalidDefinition(format!(
                    "module {} has no lessons",
                    module.id
                )));
            }
            if !module.lessons.contains(&module.entry_lesson) {
                return Err(CurriculumError::InvalidDefinition(format!(
                    "entry lesson {} is not a lesson of module {}",
                    module.entry_lesson, module.id
                )));
            }
            for lesson_id in &module.lessons {
                let lesson = self.lesson(lesson_id)?;
                if lesson.module != module.id {
                    return Err(CurriculumError::InvalidDefinition(format!(
                        "lesson {} is listed by module {} but declares owner {}",
                        lesson.id, module.id, lesson.module
                    )));
                }
            }
            for id in module.prerequisites.iter().chain(module.unlocks.iter()) {
                self.module(id)?;
            }
        }

        for lesson in self.lessons.values() {
            let owner = self.module(&lesson.module)?;
            if !owner.lessons.contains(&lesson.id) {
                return Err(CurriculumError::InvalidDefinition(format!(
                    "lesson {} declares owner {} but the module does not list it",
                    lesson.id, lesson.module
                )));
            }
            for id in lesson.prerequisites.iter().chain(lesson.unlocks.iter()) {
                self.lesson(id)?;
            }
        }

        // Acyclicity of the dependency order. Prerequisite edges point
        // backwards (lesson -> what it needs); unlock edges point forwards.
        let lesson_ids: Vec<&String> = self.lessons.keys().collect();
        if let Some(id) = find_cycle(&lesson_ids, |id| &self.lessons[id].prerequisites) {
            return Err(CurriculumError::InvalidDefinition(format!(
                "lesson prerequisite cycle through {}",
                id
            )));
        }
        if let Some(id) = find_cycle(&lesson_ids, |id| &self.lessons[id].unlocks) {
            return Err(CurriculumError::InvalidDefinition(format!(
                "lesson unlock cycle through {}",
                id
            )));
        }
        let module_ids: Vec<&String> = self.modules.keys().collect();
        if let Some(id) = find_cycle(&module_ids, |id| &self.modules[id].prerequisites) {
            return Err(CurriculumError::InvalidDefinition(format!(
                "module prerequisite cycle through {}",
                id
            )));
        }
        if let Some(id) = find_cycle(&module_ids, |id| &self.modules[id].unlocks) {
            return Err(CurriculumError::InvalidDefinition(format!(
                "module unlock cycle through {}",
                id
            )));
        }

        Ok(())
    }
}

/// DFS cycle detection over an edge relation. Returns an id on a cycle.
fn find_cycle<'a, F>(ids: &[&'a String], edges: F) -> Option<String>
where
    F: Fn(&str) -> &'a Vec<String>,
{
    let mut done: HashSet<&str> = HashSet::new();
    for start in ids {
        if done.contains(start.as_str()) {
            continue;
        }
        // Iterative DFS with an explicit on-path set.
        let mut on_path: HashSet<&str> = HashSet::new();
        let mut stack: Vec<(&str, usize)> = vec![(start.as_str(), 0)];
        on_path.insert(start.as_str());
        while let Some((node, edge_idx)) = stack.pop() {
            let next_edges = edges(node);
            if edge_idx < next_edges.len() {
                stack.push((node, edge_idx + 1));
                let next = next_edges[edge_idx].as_str();
                if on_path.contains(next) {
                    return Some(next.to_string());
                }
                if !done.contains(next) {
                    on_path.insert(next);
                    stack.push((next, 0));
                }
            } else {
                on_path.remove(node);
                done.insert(node);
            }
        }
    }
    None
}

// ============================================================================
// BUILT-IN CURRICULUM
// ============================================================================

/// Generate a linear lesson chain for one module: each lesson requires the
/// previous one and unlocks the next. Lessons at or past `advanced_from`
/// (1-based) are tagged advanced.
fn lesson_chain(module: &str, stem: &str, count: usize, advanced_from: usize) -> Vec<Lesson> {
    (1..=count)
        .map(|i| Lesson {
            id: format!("{}-{}", stem, i),
            module: module.to_string(),
            prerequisites: if i == 1 {
                vec![]
            } else {
                vec![format!("{}-{}", stem, i - 1)]
            },
            unlocks: if i == count {
                vec![]
            } else {
                vec![format!("{}-{}", stem, i + 1)]
            },
            difficulty: if i >= advanced_from {
                Difficulty::Advanced
            } else {
                Difficulty::Standard
            },
        })
        .collect()
}

fn module_def(id: &str, stem: &str, count: usize, prereq: Option<&str>, unlock: Option<&str>) -> Module {
    Module {
        id: id.to_string(),
        lessons: (1..=count).map(|i| format!("{}-{}", stem, i)).collect(),
        entry_lesson: format!("{}-1", stem),
        prerequisites: prereq.map(|p| vec![p.to_string()]).unwrap_or_default(),
        unlocks: unlock.map(|u| vec![u.to_string()]).unwrap_or_default(),
    }
}

/// The built-in environmental curriculum: five modules of five lessons each,
/// chained in a fixed order. Lessons 4 and 5 of every module are advanced.
pub fn builtin_curriculum() -> CurriculumGraph {
    let modules = vec![
        module_def("climate-change", "climate", 5, None, Some("waste-management")),
        module_def(
            "waste-management",
            "waste",
            5,
            Some("climate-change"),
            Some("renewable-energy"),
        ),
        module_def(
            "renewable-energy",
            "energy",
            5,
            Some("waste-management"),
            Some("water-conservation"),
        ),
        module_def(
            "water-conservation",
            "water",
            5,
            Some("renewable-energy"),
            Some("biodiversity"),
        ),
        module_def("biodiversity", "bio", 5, Some("water-conservation"), None),
    ];
    let lessons = [
        ("climate-change", "climate"),
        ("waste-management", "waste"),
        ("renewable-energy", "energy"),
        ("water-conservation", "water"),
        ("biodiversity", "bio"),
    ]
    .iter()
    .flat_map(|(module, stem)| lesson_chain(module, stem, 5, 4))
    .collect();

    CurriculumGraph::from_parts(modules, lessons)
}
