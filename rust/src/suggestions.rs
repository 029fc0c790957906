//! Top-N suggestions with short human-readable explanations.

use chrono::NaiveDate;

use crate::models::ScoredTask;
use crate::scoring::days_left;
use crate::sorting::rank_tasks;

/// Importance at or above which a task is called out as high importance.
pub const HIGH_IMPORTANCE: u8 = 8;
/// Estimated hours at or below which a task counts as a quick win.
pub const QUICK_WIN_HOURS: f64 = 2.0;

const SEPARATOR: &str = " · ";
const BALANCED: &str = "Balanced factors";

/// Explain why a scored task ranks where it does.
pub fn explain(task: &ScoredTask, today: NaiveDate) -> String {
    let mut parts: Vec<String> = Vec::new();

    match days_left(task.task.due_date, today) {
        d if d < 0 => parts.push("Overdue".to_string()),
        0 => parts.push("Due today".to_string()),
        d @ 1..=3 => parts.push(format!("Due in {d} day(s)")),
        _ => {}
    }

    if task.task.importance >= HIGH_IMPORTANCE {
        parts.push("High importance".to_string());
    }

    if task.task.estimated_hours <= QUICK_WIN_HOURS {
        parts.push("Quick win (low effort)".to_string());
    }

    let dependencies = task.task.dependencies.len();
    if dependencies > 0 {
        parts.push(format!("Blocks {dependencies} task(s)"));
    }

    if parts.is_empty() {
        BALANCED.to_string()
    } else {
        parts.join(SEPARATOR)
    }
}

/// Pick the `n` highest-scoring tasks (all of them if fewer) and attach explanations.
pub fn suggest_top(scored: Vec<ScoredTask>, n: usize, today: NaiveDate) -> Vec<ScoredTask> {
    rank_tasks(scored)
        .into_iter()
        .take(n)
        .map(|mut task| {
            task.explanation = Some(explain(&task, today));
            task
        })
        .collect()
}
