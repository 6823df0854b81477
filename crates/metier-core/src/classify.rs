//! Task label classification.
//!
//! The upstream occupation export mixes "how to enter this job" paragraphs
//! into the task list. They are recognized by a fixed set of markers.

use serde::Serialize;

use crate::models::TaskKind;
use crate::text::normalize_for_search;

/// Markers of access-requirement text, already accent-folded and lowercased.
const ACCESS_MARKERS: &[&str] = &[
    "emploi est accessible",
    "diplome",
    "formation",
    "experience",
    "niveau bac",
    "capa",
    "certificat",
    "recommandee",
];

/// Classify a task label as a real duty or access-requirement boilerplate.
pub fn classify_task_label(label: &str) -> TaskKind {
    let folded = normalize_for_search(label);
    if ACCESS_MARKERS.iter().any(|m| folded.contains(m)) {
        TaskKind::AccessRequirement
    } else {
        TaskKind::Definition
    }
}

/// Counts produced by a classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationStats {
    pub definition: usize,
    pub access_requirement: usize,
}

impl ClassificationStats {
    pub fn record(&mut self, kind: TaskKind) {
        match kind {
            TaskKind::Definition => self.definition += 1,
            TaskKind::AccessRequirement => self.access_requirement += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.definition + self.access_requirement
    }
}
