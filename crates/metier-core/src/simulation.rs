//! Time-allocation simulation.
//!
//! A user states how many hours per week they spend on each task of an
//! occupation; the simulation reweights the per-task automation scores by
//! those hours to produce a personal overall score.
//!
//! ## Formula
//!
//! ```text
//! overall   = Σ(hours_i × score_i) / Σ(hours_i)     (0 when Σ hours = 0)
//! automated = Σ(hours_i × score_i / 100)
//! ```
//!
//! Only the occupation's real tasks take part. Tasks absent from the
//! allocation count as 0 h, and allocation entries naming other ids are
//! ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::defaults::{SCORE_DECIMALS, SCORE_MAX};
use crate::error::{Error, Result};

/// A real task with its resolved automation score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredTask {
    pub id: i64,
    pub score: f64,
}

/// Per-task breakdown of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskSimulationResult {
    pub time_spent: f64,
    pub time_automated: f64,
    pub automation_score: f64,
}

/// Outcome of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub overall_automation_score: f64,
    pub total_time: f64,
    pub automated_time: f64,
    pub task_results: BTreeMap<i64, TaskSimulationResult>,
}

/// Round to [`SCORE_DECIMALS`] decimal places.
pub fn round_score(value: f64) -> f64 {
    let factor = 10f64.powi(SCORE_DECIMALS);
    (value * factor).round() / factor
}

/// Reject any hour value that is not a finite non-negative number.
///
/// The total is bounded too, so that weighting it by a score cannot overflow
/// to infinity.
pub fn validate_allocation(raw: &BTreeMap<i64, Option<f64>>) -> Result<BTreeMap<i64, f64>> {
    let mut hours = BTreeMap::new();
    let mut total = 0.0;
    for (task_id, value) in raw {
        match value {
            None => {
                return Err(Error::InvalidInput(format!(
                    "Hours for task {} must not be null",
                    task_id
                )))
            }
            Some(h) if !h.is_finite() => {
                return Err(Error::InvalidInput(format!(
                    "Hours for task {} must be a finite number",
                    task_id
                )))
            }
            Some(h) if *h < 0.0 => {
                return Err(Error::InvalidInput(format!(
                    "Hours for task {} must not be negative (got {})",
                    task_id, h
                )))
            }
            Some(h) => {
                total += *h;
                hours.insert(*task_id, *h);
            }
        }
    }
    if !(total * SCORE_MAX).is_finite() {
        return Err(Error::InvalidInput(
            "Total hours are too large to simulate".to_string(),
        ));
    }
    Ok(hours)
}

/// Run the simulation over `tasks` with an already validated allocation.
pub fn simulate(tasks: &[ScoredTask], allocation: &BTreeMap<i64, f64>) -> SimulationResult {
    let mut total_time = 0.0;
    let mut weighted = 0.0;
    let mut task_results = BTreeMap::new();

    for task in tasks {
        let time_spent = allocation.get(&task.id).copied().unwrap_or(0.0);
        let time_automated = time_spent * task.score / 100.0;
        total_time += time_spent;
        weighted += time_spent * task.score;
        task_results.insert(
            task.id,
            TaskSimulationResult {
                time_spent,
                time_automated: round_score(time_automated),
                automation_score: task.score,
            },
        );
    }

    let overall = if total_time > 0.0 {
        weighted / total_time
    } else {
        0.0
    };

    SimulationResult {
        overall_automation_score: round_score(overall),
        total_time: round_score(total_time),
        automated_time: round_score(weighted / 100.0),
        task_results,
    }
}

/// Split `total_hours` as evenly as possible across `task_ids`.
///
/// Every task receives `total_hours / n`; the first `total_hours % n` tasks in
/// listing order receive one extra hour, so the parts always sum to
/// `total_hours`. An empty task list yields an empty allocation.
pub fn redistribute_equally(total_hours: u32, task_ids: &[i64]) -> Vec<(i64, u32)> {
    if task_ids.is_empty() {
        return Vec::new();
    }
    let (base, remainder) = match u32::try_from(task_ids.len()) {
        Ok(n) => (total_hours / n, (total_hours % n) as usize),
        // More tasks than any u32 budget: the first ones get an hour each.
        Err(_) => (0, total_hours as usize),
    };
    task_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, base + u32::from(i < remainder)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn tasks(scores: &[(i64, f64)]) -> Vec<ScoredTask> {
        scores
            .iter()
            .map(|(id, score)| ScoredTask {
                id: *id,
                score: *score,
            })
            .collect()
    }

    #[test]
    fn test_two_task_scenario() {
        let t = tasks(&[(1, 60.0), (2, 20.0)]);
        let alloc = BTreeMap::from([(1, 5.0), (2, 5.0)]);
        let result = simulate(&t, &alloc);
        assert_eq!(result.overall_automation_score, 40.0);
        assert_eq!(result.automated_time, 4.0);
        assert_eq!(result.total_time, 10.0);
        assert_eq!(result.task_results[&1].time_automated, 3.0);
        assert_eq!(result.task_results[&2].automation_score, 20.0);
    }

    #[test]
    fn test_empty_allocation_scores_zero() {
        let t = tasks(&[(1, 60.0), (2, 20.0)]);
        let result = simulate(&t, &BTreeMap::new());
        assert_eq!(result.overall_automation_score, 0.0);
        assert_eq!(result.automated_time, 0.0);
        assert_eq!(result.total_time, 0.0);
        assert_eq!(result.task_results.len(), 2);
    }

    #[test]
    fn test_no_tasks_scores_zero() {
        let result = simulate(&[], &BTreeMap::from([(1, 8.0)]));
        assert_eq!(result.overall_automation_score, 0.0);
        assert!(result.task_results.is_empty());
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let t = tasks(&[(1, 50.0)]);
        let alloc = BTreeMap::from([(1, 4.0), (99, 100.0)]);
        let result = simulate(&t, &alloc);
        assert_eq!(result.total_time, 4.0);
        assert_eq!(result.overall_automation_score, 50.0);
        assert!(!result.task_results.contains_key(&99));
    }

    #[test]
    fn test_uniform_scores_yield_that_score() {
        let t = tasks(&[(1, 37.5), (2, 37.5), (3, 37.5)]);
        let alloc = BTreeMap::from([(1, 1.0), (2, 13.25), (3, 0.5)]);
        assert_eq!(simulate(&t, &alloc).overall_automation_score, 37.5);
    }

    #[test]
    fn test_overall_rounded_to_two_decimals() {
        let t = tasks(&[(1, 10.0), (2, 20.0), (3, 25.0)]);
        let alloc = BTreeMap::from([(1, 1.0), (2, 1.0), (3, 1.0)]);
        // 55 / 3 = 18.333...
        assert_eq!(simulate(&t, &alloc).overall_automation_score, 18.33);
    }

    #[test]
    fn test_overall_in_range_for_random_allocations() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let n = rng.gen_range(1..12);
            let t: Vec<ScoredTask> = (0..n)
                .map(|id| ScoredTask {
                    id,
                    score: rng.gen_range(0.0..=100.0),
                })
                .collect();
            let alloc: BTreeMap<i64, f64> =
                (0..n).map(|id| (id, rng.gen_range(0.0..40.0))).collect();
            let result = simulate(&t, &alloc);
            if result.total_time > 0.0 {
                assert!((0.0..=100.0).contains(&result.overall_automation_score));
            } else {
                assert_eq!(result.overall_automation_score, 0.0);
            }
        }
    }

    #[test]
    fn test_validate_rejects_negative_hours() {
        let raw = BTreeMap::from([(1, Some(2.0)), (7, Some(-1.0))]);
        let err = validate_allocation(&raw).unwrap_err();
        match err {
            Error::InvalidInput(msg) => assert!(msg.contains("task 7"), "{}", msg),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_null_and_non_finite() {
        assert!(validate_allocation(&BTreeMap::from([(3, None)])).is_err());
        assert!(validate_allocation(&BTreeMap::from([(3, Some(f64::NAN))])).is_err());
        assert!(validate_allocation(&BTreeMap::from([(3, Some(f64::INFINITY))])).is_err());
    }

    #[test]
    fn test_validate_rejects_overflowing_total() {
        let raw = BTreeMap::from([(1, Some(1e308)), (2, Some(1e308))]);
        assert!(validate_allocation(&raw).is_err());
        let raw = BTreeMap::from([(1, Some(1e307))]);
        assert!(validate_allocation(&raw).is_err());
    }

    #[test]
    fn test_large_valid_total_stays_finite() {
        let raw = BTreeMap::from([(1, Some(1e300)), (2, Some(1e300))]);
        let allocation = validate_allocation(&raw).unwrap();
        let tasks = [ScoredTask { id: 1, score: 100.0 }, ScoredTask { id: 2, score: 0.0 }];
        let result = simulate(&tasks, &allocation);
        assert_eq!(result.overall_automation_score, 50.0);
        assert!(result.automated_time.is_finite());
    }

    #[test]
    fn test_validate_accepts_zero_and_positive() {
        let raw = BTreeMap::from([(1, Some(0.0)), (2, Some(7.5))]);
        let hours = validate_allocation(&raw).unwrap();
        assert_eq!(hours, BTreeMap::from([(1, 0.0), (2, 7.5)]));
    }

    #[test]
    fn test_redistribute_sums_to_budget() {
        for budget in [0u32, 1, 7, 35, 36, 100] {
            for n in 1..15i64 {
                let ids: Vec<i64> = (0..n).collect();
                let parts = redistribute_equally(budget, &ids);
                assert_eq!(parts.len(), n as usize);
                assert_eq!(parts.iter().map(|(_, h)| h).sum::<u32>(), budget);
            }
        }
    }

    #[test]
    fn test_redistribute_remainder_goes_first() {
        let parts = redistribute_equally(35, &[10, 20, 30]);
        assert_eq!(parts, vec![(10, 12), (20, 12), (30, 11)]);
    }

    #[test]
    fn test_redistribute_no_tasks() {
        assert!(redistribute_equally(35, &[]).is_empty());
    }
}
