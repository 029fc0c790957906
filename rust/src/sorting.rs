//! Ranking of scored tasks.
//!
//! Highest score first. Equal scores keep their batch order, so ranking the
//! same batch twice always yields the same sequence.

use std::cmp::Ordering;

use crate::models::ScoredTask;

/// Sort key for ranking (lower = ranked earlier).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankKey {
    neg_score: f64,
    position: usize,
}

impl RankKey {
    pub fn new(score: f64, position: usize) -> Self {
        Self {
            neg_score: -score,
            position,
        }
    }
}

/// Compare f64 values for sorting, treating NaN as equal to everything.
fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

impl Eq for RankKey {}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_f64(self.neg_score, other.neg_score).then(self.position.cmp(&other.position))
    }
}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Rank scored tasks by descending score; ties keep input order.
pub fn rank_tasks(scored: Vec<ScoredTask>) -> Vec<ScoredTask> {
    let mut keyed: Vec<(RankKey, ScoredTask)> = scored
        .into_iter()
        .enumerate()
        .map(|(position, task)| (RankKey::new(task.score, position), task))
        .collect();

    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    keyed.into_iter().map(|(_, task)| task).collect()
}
