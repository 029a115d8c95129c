//! EcoSprout Headless Validation Harness
//!
//! Validates the progression and economy rules end to end without any UI.
//! Runs entirely in-process — no storage, no networking, no rendering.
//!
//! Usage:
//!   cargo run -p ecosprout-simtest
//!   cargo run -p ecosprout-simtest -- --verbose

use ecosprout_logic::curriculum::{builtin_curriculum, CurriculumGraph, Lesson, Module};
use ecosprout_logic::growth::{TreeGrowth, TreeStage};
use ecosprout_logic::inventory::{Inventory, ResourceKind};
use ecosprout_logic::progression::Progression;
use ecosprout_logic::rewards::{resolve_reward, Difficulty};
use serde::Deserialize;

// ── Curriculum manifest (same JSON a content pipeline would supply) ─────
const MANIFEST_JSON: &str = include_str!("../../../data/curriculum_manifest.json");

#[derive(Debug, Deserialize)]
struct CurriculumManifest {
    modules: Vec<Module>,
    lessons: Vec<Lesson>,
}

const MODULE_ORDER: [(&str, &str); 5] = [
    ("climate-change", "climate"),
    ("waste-management", "waste"),
    ("renewable-energy", "energy"),
    ("water-conservation", "water"),
    ("biodiversity", "bio"),
];

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail,
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== EcoSprout Validation Harness ===\n");

    let mut results = Vec::new();

    // 1. Built-in curriculum structure
    results.extend(validate_curriculum());

    // 2. Manifest parse + cross-check against built-in
    results.extend(validate_manifest());

    // 3. Progression cascade replay
    results.extend(validate_progression());

    // 4. Reward economy totals
    results.extend(validate_economy());

    // 5. Growth ladder grind
    results.extend(validate_growth());

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Curriculum structure ─────────────────────────────────────────────

fn validate_curriculum() -> Vec<TestResult> {
    println!("--- Curriculum Graph ---");
    let mut results = Vec::new();
    let graph = builtin_curriculum();

    let validation = graph.validate();
    results.push(check(
        "curriculum_valid",
        validation.is_ok(),
        match validation {
            Ok(()) => "structure and acyclicity hold".into(),
            Err(e) => format!("{}", e),
        },
    ));

    results.push(check(
        "curriculum_shape",
        graph.module_count() == 5 && graph.lesson_count() == 25,
        format!(
            "{} modules, {} lessons",
            graph.module_count(),
            graph.lesson_count()
        ),
    ));

    let entries_ok = graph.modules_in_order().all(|m| {
        graph
            .lesson(&m.entry_lesson)
            .map(|l| l.prerequisites.is_empty())
            .unwrap_or(false)
    });
    results.push(check(
        "entry_lessons_open",
        entries_ok,
        "every entry lesson exists and has no prerequisites".into(),
    ));

    let advanced = graph
        .lessons()
        .filter(|l| l.difficulty == Difficulty::Advanced)
        .count();
    results.push(check(
        "advanced_tagging",
        advanced == 10,
        format!("{} advanced lessons (expected 10)", advanced),
    ));

    results
}

// ── 2. Manifest cross-check ─────────────────────────────────────────────

fn validate_manifest() -> Vec<TestResult> {
    println!("--- Curriculum Manifest ---");
    let mut results = Vec::new();

    let manifest: CurriculumManifest = match serde_json::from_str(MANIFEST_JSON) {
        Ok(m) => m,
        Err(e) => {
            results.push(check(
                "manifest_parse",
                false,
                format!("JSON parse error: {}", e),
            ));
            return results;
        }
    };
    results.push(check(
        "manifest_parse",
        true,
        format!(
            "{} modules, {} lessons parsed",
            manifest.modules.len(),
            manifest.lessons.len()
        ),
    ));

    let graph = match CurriculumGraph::from_defs(manifest.modules, manifest.lessons) {
        Ok(g) => g,
        Err(e) => {
            results.push(check("manifest_builds", false, format!("{}", e)));
            return results;
        }
    };
    results.push(check(
        "manifest_builds",
        true,
        "manifest passes full graph validation".into(),
    ));

    let builtin = builtin_curriculum();
    let mut matches = graph.module_count() == builtin.module_count()
        && graph.lesson_count() == builtin.lesson_count();
    if matches {
        matches = builtin.lessons().all(|l| {
            graph
                .lesson(&l.id)
                .map(|other| other == l)
                .unwrap_or(false)
        });
    }
    results.push(check(
        "manifest_matches_builtin",
        matches,
        "manifest and built-in curriculum agree lesson-for-lesson".into(),
    ));

    results
}

// ── 3. Progression replay ───────────────────────────────────────────────

fn validate_progression() -> Vec<TestResult> {
    println!("--- Progression Replay ---");
    let mut results = Vec::new();
    let graph = builtin_curriculum();
    let mut p = Progression::new(&graph);

    // Gating holds before anything is completed.
    let locked = p.can_access_module(&graph, "waste-management") == Ok(false)
        && p.can_access_lesson(&graph, "climate-2", "climate-change") == Ok(false)
        && p.can_access_lesson(&graph, "climate-1", "climate-change") == Ok(true);
    results.push(check(
        "initial_gating",
        locked,
        "only the entry lesson of the first module is accessible".into(),
    ));

    let mut gating_held = true;
    let mut cascade_held = true;
    for (module, stem) in MODULE_ORDER {
        gating_held &= p.can_access_module(&graph, module) == Ok(true);
        for i in 1..=5 {
            let lesson = format!("{}-{}", stem, i);
            gating_held &= p.can_access_lesson(&graph, &lesson, module) == Ok(true);
            match p.complete_lesson(&graph, &lesson, module) {
                Ok(outcome) => cascade_held &= outcome.module_completed == (i == 5),
                Err(e) => {
                    results.push(check("replay_error", false, format!("{}", e)));
                    return results;
                }
            }
        }
        cascade_held &= p.completed_modules().contains(module);
    }
    results.push(check(
        "replay_gating",
        gating_held,
        "every lesson was accessible exactly when its turn came".into(),
    ));
    results.push(check(
        "replay_cascade",
        cascade_held,
        "module completion fired on each fifth lesson".into(),
    ));
    results.push(check(
        "replay_complete",
        p.completed_lessons().len() == 25 && p.completed_modules().len() == 5,
        format!(
            "{} lessons, {} modules completed",
            p.completed_lessons().len(),
            p.completed_modules().len()
        ),
    ));

    // Idempotence sweep: repeating every completion changes nothing.
    let before = p.completed_lessons().len();
    let mut idempotent = true;
    for (module, stem) in MODULE_ORDER {
        for i in 1..=5 {
            match p.complete_lesson(&graph, &format!("{}-{}", stem, i), module) {
                Ok(outcome) => idempotent &= !outcome.newly_completed,
                Err(_) => idempotent = false,
            }
        }
    }
    results.push(check(
        "replay_idempotent",
        idempotent && p.completed_lessons().len() == before,
        "repeated completions were all no-ops".into(),
    ));

    results
}

// ── 4. Reward economy ───────────────────────────────────────────────────

fn grind_curriculum(inventory: &mut Inventory) {
    let graph = builtin_curriculum();
    let mut p = Progression::new(&graph);
    for (module, stem) in MODULE_ORDER {
        for i in 1..=5 {
            let lesson_id = format!("{}-{}", stem, i);
            if let Ok(outcome) = p.complete_lesson(&graph, &lesson_id, module) {
                if outcome.newly_completed {
                    if let Ok(lesson) = graph.lesson(&lesson_id) {
                        inventory.add_items(&resolve_reward(&lesson.module, lesson.difficulty));
                    }
                }
            }
        }
    }
}

fn validate_economy() -> Vec<TestResult> {
    println!("--- Reward Economy ---");
    let mut results = Vec::new();

    // Determinism: resolving twice gives identical bundles.
    let deterministic = MODULE_ORDER.iter().all(|(module, _)| {
        resolve_reward(module, Difficulty::Standard) == resolve_reward(module, Difficulty::Standard)
            && resolve_reward(module, Difficulty::Advanced)
                == resolve_reward(module, Difficulty::Advanced)
    });
    results.push(check(
        "rewards_deterministic",
        deterministic,
        "same inputs always resolve to the same bundle".into(),
    ));

    let mut inventory = Inventory::new();
    grind_curriculum(&mut inventory);
    let expected: [(ResourceKind, u32); 6] = [
        (ResourceKind::Water, 35),
        (ResourceKind::Sunlight, 15),
        (ResourceKind::Nutrients, 15),
        (ResourceKind::Seed, 5),
        (ResourceKind::Fertilizer, 10),
        (ResourceKind::Love, 15),
    ];
    let totals_ok = expected
        .iter()
        .all(|(kind, amount)| inventory.count(*kind) == *amount);
    results.push(check(
        "playthrough_totals",
        totals_ok,
        expected
            .iter()
            .map(|(kind, _)| format!("{}={}", kind.name(), inventory.count(*kind)))
            .collect::<Vec<_>>()
            .join(" "),
    ));

    results
}

// ── 5. Growth ladder ────────────────────────────────────────────────────

fn validate_growth() -> Vec<TestResult> {
    println!("--- Growth Ladder ---");
    let mut results = Vec::new();

    let mut inventory = Inventory::new();
    grind_curriculum(&mut inventory);
    let mut growth = TreeGrowth::new();

    // A skip request fails fast before any climbing.
    let skip_rejected = growth.can_upgrade(&inventory, TreeStage::Sapling).is_err();
    results.push(check(
        "skip_rejected",
        skip_rejected,
        "non-adjacent target is an illegal transition".into(),
    ));

    let mut climbed = true;
    let mut stage = growth.stage();
    while let Some(target) = stage.next() {
        match growth.upgrade(&mut inventory, target) {
            Ok(true) => {}
            _ => {
                climbed = false;
                break;
            }
        }
        stage = growth.stage();
    }
    results.push(check(
        "full_climb",
        climbed && growth.stage() == TreeStage::Forest,
        format!("reached {}", growth.stage().name()),
    ));

    // Conservation: the ladder drains earned water/sunlight/nutrients to 0.
    let drained = inventory.count(ResourceKind::Water) == 0
        && inventory.count(ResourceKind::Sunlight) == 0
        && inventory.count(ResourceKind::Nutrients) == 0;
    results.push(check(
        "ladder_conservation",
        drained,
        format!(
            "water={} sunlight={} nutrients={} after the climb",
            inventory.count(ResourceKind::Water),
            inventory.count(ResourceKind::Sunlight),
            inventory.count(ResourceKind::Nutrients)
        ),
    ));

    // Terminal stage has no outgoing edge.
    results.push(check(
        "terminal_stage",
        TreeStage::Forest.next().is_none() && growth.upgrade(&mut inventory, TreeStage::Forest).is_err(),
        "no transition exists out of the forest stage".into(),
    ));

    results
}
