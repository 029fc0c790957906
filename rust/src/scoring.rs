//! Priority scoring for acyclic task batches.
//!
//! score = 0.40 * urgency + 0.40 * importance + 0.15 * effort + 0.05 * dependency_count
//!
//! The dependency term is unbounded: a task blocking many others can outrank
//! everything else through fan-in alone.

use chrono::NaiveDate;

use crate::graph::TaskGraph;
use crate::log_checks;
use crate::models::{ScoredTask, Task};

pub const URGENCY_WEIGHT: f64 = 0.40;
pub const IMPORTANCE_WEIGHT: f64 = 0.40;
pub const EFFORT_WEIGHT: f64 = 0.15;
pub const DEPENDENCY_WEIGHT: f64 = 0.05;

/// Whole days from `today` until `due_date` (negative when overdue).
pub fn days_left(due_date: NaiveDate, today: NaiveDate) -> i64 {
    (due_date - today).num_days()
}

/// Urgency band for a number of days remaining.
///
/// Overdue 10, today 9, 1-3 days 7, 4-7 days 5, later 3.
pub fn urgency_score(days_left: i64) -> f64 {
    match days_left {
        d if d < 0 => 10.0,
        0 => 9.0,
        1..=3 => 7.0,
        4..=7 => 5.0,
        _ => 3.0,
    }
}

/// Quick-win score: `10 / (hours + 1)`. Equals 10 at zero hours and decreases
/// strictly as effort grows.
pub fn effort_score(estimated_hours: f64) -> f64 {
    10.0 / (estimated_hours.max(0.0) + 1.0)
}

/// Round a score to 2 decimal places.
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// The four sub-scores behind a task's final score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreBreakdown {
    pub urgency: f64,
    pub importance: f64,
    pub effort: f64,
    pub dependency_count: usize,
}

impl ScoreBreakdown {
    pub fn compute(task: &Task, dependency_count: usize, today: NaiveDate) -> Self {
        Self {
            urgency: urgency_score(days_left(task.due_date, today)),
            importance: f64::from(task.importance),
            effort: effort_score(task.estimated_hours),
            dependency_count,
        }
    }

    /// Weighted sum, unrounded.
    pub fn total(&self) -> f64 {
        URGENCY_WEIGHT * self.urgency
            + IMPORTANCE_WEIGHT * self.importance
            + EFFORT_WEIGHT * self.effort
            + DEPENDENCY_WEIGHT * self.dependency_count as f64
    }
}

/// Score every task in a batch that is known to be acyclic.
///
/// Output is in input order; ranking is a separate step.
pub fn score_tasks(tasks: &[Task], today: NaiveDate, verbosity: u8) -> Vec<ScoredTask> {
    let graph = TaskGraph::build(tasks);
    let counts = graph.dependent_counts();

    tasks
        .iter()
        .map(|task| {
            let dependency_count = graph
                .node(task.id)
                .map_or(0, |node| counts[node as usize]);
            let breakdown = ScoreBreakdown::compute(task, dependency_count, today);
            let score = round_score(breakdown.total());
            log_checks!(
                verbosity,
                "Task {}: urgency={} importance={} effort={:.2} blocks={} -> score={}",
                task.id,
                breakdown.urgency,
                breakdown.importance,
                breakdown.effort,
                dependency_count,
                score
            );
            ScoredTask {
                task: task.clone(),
                score,
                dependency_count,
                explanation: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskId;
    use proptest::prelude::*;
    use rstest::rstest;

    fn make_date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn make_task(
        id: TaskId,
        due: NaiveDate,
        hours: f64,
        importance: u8,
        deps: Vec<TaskId>,
    ) -> Task {
        Task {
            id,
            title: format!("Task {id}"),
            due_date: due,
            estimated_hours: hours,
            importance,
            dependencies: deps,
        }
    }

    #[rstest]
    #[case(-30, 10.0)]
    #[case(-1, 10.0)]
    #[case(0, 9.0)]
    #[case(1, 7.0)]
    #[case(3, 7.0)]
    #[case(4, 5.0)]
    #[case(7, 5.0)]
    #[case(8, 3.0)]
    #[case(365, 3.0)]
    fn test_urgency_bands(#[case] days: i64, #[case] expected: f64) {
        assert_eq!(urgency_score(days), expected);
    }

    #[test]
    fn test_days_left_counts_whole_days() {
        let today = make_date(2025, 3, 1);
        assert_eq!(days_left(make_date(2025, 2, 28), today), -1);
        assert_eq!(days_left(today, today), 0);
        assert_eq!(days_left(make_date(2025, 3, 9), today), 8);
    }

    #[test]
    fn test_effort_score_values() {
        assert_eq!(effort_score(0.0), 10.0);
        assert_eq!(effort_score(1.0), 5.0);
        assert_eq!(effort_score(4.0), 2.0);
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(4.1234), 4.12);
        assert_eq!(round_score(8.0), 8.0);
    }

    #[test]
    fn test_final_score_formula() {
        let today = make_date(2025, 3, 1);
        // Overdue (10), importance 8, 1h (effort 5), blocks 2
        // 4.0 + 3.2 + 0.75 + 0.1 = 8.05
        let task = make_task(1, make_date(2025, 2, 20), 1.0, 8, vec![]);
        let breakdown = ScoreBreakdown::compute(&task, 2, today);
        assert_eq!(breakdown.urgency, 10.0);
        assert_eq!(breakdown.importance, 8.0);
        assert_eq!(breakdown.effort, 5.0);
        assert!((breakdown.total() - 8.05).abs() < 1e-9);
    }

    #[test]
    fn test_dependency_count_is_fan_in_not_own_dependencies() {
        let today = make_date(2025, 3, 1);
        let due = make_date(2025, 3, 20);
        // Task 1 blocks 2, 3 and 4; task 4 itself depends on three tasks.
        let tasks = vec![
            make_task(1, due, 4.0, 5, vec![]),
            make_task(2, due, 4.0, 5, vec![1]),
            make_task(3, due, 4.0, 5, vec![1, 2]),
            make_task(4, due, 4.0, 5, vec![1, 2, 3]),
        ];
        let scored = score_tasks(&tasks, today, 0);
        let counts: Vec<usize> = scored.iter().map(|s| s.dependency_count).collect();
        assert_eq!(counts, vec![3, 2, 1, 0]);

        // Identical except for fan-in: each blocked task adds 0.05.
        assert!((scored[0].score - scored[3].score - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_missing_dependency_does_not_count() {
        let today = make_date(2025, 3, 1);
        let due = make_date(2025, 3, 20);
        let tasks = vec![make_task(1, due, 1.0, 5, vec![77])];
        let scored = score_tasks(&tasks, today, 0);
        assert_eq!(scored[0].dependency_count, 0);
    }

    #[test]
    fn test_scores_are_rounded_and_in_input_order() {
        let today = make_date(2025, 3, 1);
        let tasks = vec![
            // due in 5 days (5), importance 5, 2h (effort 3.333...)
            // 2.0 + 2.0 + 0.5 = 4.5
            make_task(9, make_date(2025, 3, 6), 2.0, 5, vec![]),
            // due today (9), importance 10, 0h (effort 10)
            // 3.6 + 4.0 + 1.5 = 9.1
            make_task(3, today, 0.0, 10, vec![]),
        ];
        let scored = score_tasks(&tasks, today, 0);
        assert_eq!(scored[0].id(), 9);
        assert!((scored[0].score - 4.5).abs() < 1e-9);
        assert_eq!(scored[1].id(), 3);
        assert!((scored[1].score - 9.1).abs() < 1e-9);
        assert!(scored.iter().all(|s| s.explanation.is_none()));
    }

    #[test]
    fn test_overdue_outranks_future_same_task() {
        let today = make_date(2025, 3, 1);
        let overdue = make_task(1, make_date(2025, 2, 27), 3.0, 5, vec![]);
        let future = make_task(2, make_date(2025, 3, 6), 3.0, 5, vec![]);
        let scored = score_tasks(&[overdue, future], today, 0);
        assert!(scored[0].score > scored[1].score);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let today = make_date(2025, 3, 1);
        let tasks = vec![
            make_task(1, make_date(2025, 3, 2), 0.5, 3, vec![]),
            make_task(2, make_date(2025, 4, 2), 12.0, 9, vec![1]),
        ];
        assert_eq!(score_tasks(&tasks, today, 0), score_tasks(&tasks, today, 0));
    }

    proptest! {
        #[test]
        fn test_effort_strictly_decreasing(a in 0.0f64..10_000.0, delta in 0.001f64..100.0) {
            prop_assert!(effort_score(a + delta) < effort_score(a));
        }

        #[test]
        fn test_effort_bounded(hours in 0.0f64..1e9) {
            let score = effort_score(hours);
            prop_assert!(score > 0.0 && score <= 10.0);
        }
    }
}
