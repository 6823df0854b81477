//! Keyword heuristic for default automation scores.
//!
//! Imported tasks receive a plausible starting score before any model has
//! looked at them. The task text is matched against per-category verb lists;
//! the category with the most hits supplies a base score which is then
//! perturbed by up to ±[`HEURISTIC_VARIATION`] points.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::defaults::{HEURISTIC_VARIATION, SCORE_MAX, SCORE_MIN};
use crate::text::normalize_for_search;

/// Coarse nature of a task, as inferred from its wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Administrative,
    Management,
    Analysis,
    Communication,
    Creative,
    Supervision,
    Technical,
    Manual,
    Relational,
    Advisory,
    Teaching,
    Sales,
    Production,
    Maintenance,
    Control,
    Research,
}

impl TaskCategory {
    /// Base automation percentage for the category.
    pub fn base_score(&self) -> f64 {
        match self {
            TaskCategory::Administrative => 65.0,
            TaskCategory::Management => 55.0,
            TaskCategory::Analysis => 45.0,
            TaskCategory::Communication => 25.0,
            TaskCategory::Creative => 15.0,
            TaskCategory::Supervision => 20.0,
            TaskCategory::Technical => 70.0,
            TaskCategory::Manual => 35.0,
            TaskCategory::Relational => 10.0,
            TaskCategory::Advisory => 20.0,
            TaskCategory::Teaching => 25.0,
            TaskCategory::Sales => 30.0,
            TaskCategory::Production => 60.0,
            TaskCategory::Maintenance => 50.0,
            TaskCategory::Control => 75.0,
            TaskCategory::Research => 35.0,
        }
    }
}

/// Category used when no keyword matches.
pub const FALLBACK_CATEGORY: TaskCategory = TaskCategory::Manual;

/// Keyword lists in evaluation order. On equal hit counts the earlier entry
/// wins. `Advisory` has a base score but no keywords of its own.
const KEYWORDS: &[(TaskCategory, &[&str])] = &[
    (
        TaskCategory::Administrative,
        &["saisie", "formulaire", "document", "archive", "classement", "reporting"],
    ),
    (
        TaskCategory::Technical,
        &["programmer", "développer", "configurer", "installer", "paramétrer", "automatiser"],
    ),
    (
        TaskCategory::Analysis,
        &["analyser", "étudier", "évaluer", "diagnostiquer", "mesurer", "calculer"],
    ),
    (
        TaskCategory::Communication,
        &["communiquer", "présenter", "rédiger", "expliquer", "informer"],
    ),
    (
        TaskCategory::Creative,
        &["créer", "concevoir", "designer", "innover", "imaginer"],
    ),
    (
        TaskCategory::Supervision,
        &["manager", "diriger", "coordonner", "encadrer", "superviser"],
    ),
    (
        TaskCategory::Manual,
        &["fabriquer", "assembler", "réparer", "manipuler", "transporter"],
    ),
    (
        TaskCategory::Relational,
        &["accueillir", "conseiller", "négocier", "accompagner", "former"],
    ),
    (
        TaskCategory::Sales,
        &["vendre", "commercial", "client", "prospect", "devis"],
    ),
    (
        TaskCategory::Control,
        &["contrôler", "vérifier", "inspecter", "auditer", "surveiller"],
    ),
    (
        TaskCategory::Management,
        &["gérer", "planifier", "organiser", "budget", "planning"],
    ),
    (
        TaskCategory::Production,
        &["produire", "fabriquer", "usiner", "transformer"],
    ),
    (
        TaskCategory::Maintenance,
        &["maintenir", "entretenir", "dépanner", "réviser"],
    ),
    (
        TaskCategory::Research,
        &["rechercher", "étudier", "expérimenter", "investiguer"],
    ),
    (
        TaskCategory::Teaching,
        &["enseigner", "former", "transmettre", "éduquer"],
    ),
];

/// Pick the category whose keywords occur most often in the task text.
pub fn categorize(label: &str, description: Option<&str>) -> TaskCategory {
    let text = normalize_for_search(&format!("{} {}", label, description.unwrap_or("")));

    let mut best = FALLBACK_CATEGORY;
    let mut best_hits = 0usize;
    for (category, words) in KEYWORDS {
        let hits = words
            .iter()
            .filter(|w| text.contains(normalize_for_search(w).as_str()))
            .count();
        if hits > best_hits {
            best_hits = hits;
            best = *category;
        }
    }
    best
}

/// Apply an offset to a base score, clamp to the valid range and round.
pub fn perturb(base: f64, offset: f64) -> f64 {
    (base + offset).clamp(SCORE_MIN, SCORE_MAX).round()
}

/// Heuristic default score for a task, in whole percentage points.
pub fn default_score<R: Rng + ?Sized>(
    label: &str,
    description: Option<&str>,
    rng: &mut R,
) -> f64 {
    let base = categorize(label, description).base_score();
    let offset = rng.gen_range(-HEURISTIC_VARIATION..HEURISTIC_VARIATION);
    perturb(base, offset)
}
