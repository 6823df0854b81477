//! Occupation search: matching, ranking and result annotation.
//!
//! Matching is a case- and accent-insensitive substring test against the
//! title, code, and sector. Matches are ranked into tiers:
//!
//! 1. exact title
//! 2. title prefix
//! 3. exact code
//! 4. any other match
//!
//! Within a tier results are alphabetical by title.

use std::cmp::Ordering;

use crate::defaults::SEARCH_LIMIT;
use crate::models::{Occupation, OccupationSummary, TaskWithScore};
use crate::text::normalize_for_search;

/// Rank tier of a search hit. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    ExactTitle,
    TitlePrefix,
    ExactCode,
    Substring,
}

/// Tier of `occupation` for an already normalized query, or `None` if it
/// does not match at all.
pub fn match_tier(occupation: &Occupation, normalized_query: &str) -> Option<MatchTier> {
    let title = normalize_for_search(&occupation.title);
    let code = normalize_for_search(&occupation.code);

    if title == normalized_query {
        return Some(MatchTier::ExactTitle);
    }
    if title.starts_with(normalized_query) {
        return Some(MatchTier::TitlePrefix);
    }
    if code == normalized_query {
        return Some(MatchTier::ExactCode);
    }

    let sector_hit = occupation
        .sector
        .as_deref()
        .map(|s| normalize_for_search(s).contains(normalized_query))
        .unwrap_or(false);
    if title.contains(normalized_query) || code.contains(normalized_query) || sector_hit {
        return Some(MatchTier::Substring);
    }
    None
}

/// Filter and rank occupations for `query`, keeping at most `limit`.
///
/// A blank query matches nothing.
pub fn rank_occupations(occupations: Vec<Occupation>, query: &str, limit: usize) -> Vec<Occupation> {
    let normalized = normalize_for_search(query);
    if normalized.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<(MatchTier, String, Occupation)> = occupations
        .into_iter()
        .filter_map(|occ| {
            match_tier(&occ, &normalized).map(|tier| (tier, normalize_for_search(&occ.title), occ))
        })
        .collect();

    hits.sort_by(|a, b| match a.0.cmp(&b.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        other => other,
    });
    hits.truncate(limit);
    hits.into_iter().map(|(_, _, occ)| occ).collect()
}

/// [`rank_occupations`] with the default result cap.
pub fn search_occupations(occupations: Vec<Occupation>, query: &str) -> Vec<Occupation> {
    rank_occupations(occupations, query, SEARCH_LIMIT)
}

/// Annotate an occupation with its real-task count and mean score.
///
/// `tasks` may contain rows of other occupations; only this occupation's
/// real tasks are counted. The mean is rounded to the nearest integer and
/// is 0 when there are no real tasks.
pub fn summarize(occupation: &Occupation, tasks: &[TaskWithScore]) -> OccupationSummary {
    let scores: Vec<f64> = tasks
        .iter()
        .filter(|t| t.task.occupation_code == occupation.code && t.task.is_real_task())
        .map(|t| t.score_pct())
        .collect();

    let avg = if scores.is_empty() {
        0.0
    } else {
        (scores.iter().sum::<f64>() / scores.len() as f64).round()
    };

    OccupationSummary {
        code: occupation.code.clone(),
        title: occupation.title.clone(),
        slug: occupation.slug.clone(),
        sector: occupation.sector.clone(),
        description: occupation.description.clone(),
        task_count: scores.len() as i64,
        avg_automation_score: avg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AutomationScore, Horizon, ScoreSource, Task, TaskKind};
    use chrono::Utc;

    fn occ(code: &str, title: &str, sector: Option<&str>) -> Occupation {
        Occupation {
            code: code.to_string(),
            title: title.to_string(),
            sector: sector.map(String::from),
            description: None,
            slug: None,
            created_at_utc: Utc::now(),
            updated_at_utc: Utc::now(),
        }
    }

    fn scored(id: i64, code: &str, label: &str, kind: Option<TaskKind>, score: Option<f64>) -> TaskWithScore {
        TaskWithScore {
            task: Task {
                id,
                occupation_code: code.to_string(),
                label: label.to_string(),
                description: None,
                kind,
            },
            score: score.map(|s| AutomationScore {
                task_id: id,
                horizon: Horizon::Now,
                score_pct: s,
                source: ScoreSource::Default,
                analysis: None,
                reasoning: None,
                updated_at_utc: Utc::now(),
            }),
        }
    }

    fn corpus() -> Vec<Occupation> {
        vec![
            occ("M1805", "Études et développement informatique", Some("Informatique")),
            occ("M1801", "Administration de systèmes d'information", Some("Informatique")),
            occ("E1101", "Animation de site multimédia", Some("Communication")),
            occ("K2111", "Formation professionnelle", Some("Enseignement")),
            occ("D1401", "Assistanat commercial", None),
        ]
    }

    fn codes(results: &[Occupation]) -> Vec<&str> {
        results.iter().map(|o| o.code.as_str()).collect()
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        assert!(search_occupations(corpus(), "").is_empty());
        assert!(search_occupations(corpus(), "   ").is_empty());
    }

    #[test]
    fn test_accent_insensitive_title_match() {
        let results = search_occupations(corpus(), "etudes");
        assert_eq!(codes(&results), vec!["M1805"]);
    }

    #[test]
    fn test_sector_match() {
        let results = search_occupations(corpus(), "INFORMATIQUE");
        assert_eq!(codes(&results), vec!["M1801", "M1805"]);
    }

    #[test]
    fn test_code_match() {
        let results = search_occupations(corpus(), "m1805");
        assert_eq!(codes(&results), vec!["M1805"]);
    }

    #[test]
    fn test_ranking_tiers() {
        let occupations = vec![
            occ("A0001", "Zoo formation", None),
            occ("A0002", "Formation", None),
            occ("A0003", "Formation continue", None),
            occ("A0004", "Agent", Some("Formation")),
        ];
        let results = search_occupations(occupations, "formation");
        // exact title, prefix, then substring ordered by title
        assert_eq!(codes(&results), vec!["A0002", "A0003", "A0004", "A0001"]);
    }

    #[test]
    fn test_exact_code_outranks_substring() {
        let occupations = vec![
            occ("B1234", "Agent b1234 spécialisé", None),
            occ("A1234", "Zzz", None),
            occ("C0001", "Agent a1234 dérivé", None),
        ];
        let results = search_occupations(occupations, "a1234");
        assert_eq!(codes(&results), vec!["A1234", "C0001"]);
    }

    #[test]
    fn test_limit_is_applied() {
        let occupations: Vec<Occupation> = (0..80)
            .map(|i| occ(&format!("X{:04}", i), &format!("Agent {:02}", i), None))
            .collect();
        let results = search_occupations(occupations, "agent");
        assert_eq!(results.len(), SEARCH_LIMIT);
        assert_eq!(results[0].title, "Agent 00");
    }

    #[test]
    fn test_summarize_counts_real_tasks_only() {
        let o = occ("M1805", "Études et développement informatique", None);
        let tasks = vec![
            scored(1, "M1805", "Développer des applications", Some(TaskKind::Definition), Some(60.0)),
            scored(2, "M1805", "Tester le code", None, Some(25.0)),
            scored(3, "M1805", "Cet emploi est accessible avec un diplôme", None, Some(90.0)),
            scored(4, "M1801", "Administrer un serveur", None, Some(10.0)),
        ];
        let summary = summarize(&o, &tasks);
        assert_eq!(summary.task_count, 2);
        // (60 + 25) / 2 = 42.5 rounds to 43
        assert_eq!(summary.avg_automation_score, 43.0);
    }

    #[test]
    fn test_summarize_missing_scores_count_as_zero() {
        let o = occ("M1805", "Études", None);
        let tasks = vec![
            scored(1, "M1805", "Développer", None, Some(50.0)),
            scored(2, "M1805", "Tester", None, None),
        ];
        assert_eq!(summarize(&o, &tasks).avg_automation_score, 25.0);
    }

    #[test]
    fn test_summarize_no_tasks() {
        let summary = summarize(&occ("M1805", "Études", None), &[]);
        assert_eq!(summary.task_count, 0);
        assert_eq!(summary.avg_automation_score, 0.0);
    }
}
