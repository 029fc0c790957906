//! Analysis pipeline: validate, detect cycles, score, rank.
//!
//! Every call is all-or-nothing. A batch either scores completely or is
//! rejected with a validation error or the full list of cycles.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::cycles::detect_cycles;
use crate::graph::{graph_view, GraphView};
use crate::log_changes;
use crate::models::{Cycle, RawTask, ScoredTask, Task};
use crate::scoring::score_tasks;
use crate::sorting::rank_tasks;
use crate::suggestions::suggest_top;
use crate::validation::{parse_raw_tasks, validate_tasks, ValidationError};

/// Error message reported alongside cycles.
pub const CYCLE_ERROR_MESSAGE: &str = "Circular dependencies detected";

/// Reasons a batch is rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Circular dependencies detected: {}", format_cycles(.cycles))]
    CircularDependencies { cycles: Vec<Cycle> },
}

fn format_cycles(cycles: &[Cycle]) -> String {
    cycles
        .iter()
        .map(|c| format!("{:?}", c.ids()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Score and rank an already-validated batch.
///
/// Cycle detection runs first; if any cycle exists no task is scored.
pub fn analyze_tasks(
    tasks: &[Task],
    today: NaiveDate,
    verbosity: u8,
) -> Result<Vec<ScoredTask>, AnalysisError> {
    let cycles = detect_cycles(tasks, verbosity);
    if !cycles.is_empty() {
        return Err(AnalysisError::CircularDependencies { cycles });
    }

    let ranked = rank_tasks(score_tasks(tasks, today, verbosity));
    log_changes!(
        verbosity,
        "Scored {} tasks relative to {}",
        ranked.len(),
        today
    );
    Ok(ranked)
}

/// Validate raw records, then score and rank them (highest score first).
pub fn analyze(raw: &[RawTask], config: &AnalysisConfig) -> Result<Vec<ScoredTask>, AnalysisError> {
    let tasks = validate_tasks(raw, config).inspect_err(|e| {
        log_changes!(config.verbosity, "Rejected batch: {}", e);
    })?;
    analyze_tasks(&tasks, config.resolve_today(), config.verbosity)
}

/// Run the full pipeline and return the top `config.suggestion_limit` tasks
/// with explanations.
pub fn suggest(raw: &[RawTask], config: &AnalysisConfig) -> Result<Vec<ScoredTask>, AnalysisError> {
    let today = config.resolve_today();
    let tasks = validate_tasks(raw, config)?;
    let ranked = analyze_tasks(&tasks, today, config.verbosity)?;
    Ok(suggest_top(ranked, config.suggestion_limit, today))
}

/// Validate raw records and lay them out for visualization.
///
/// Cycles do not fail this call; they are marked on the returned view.
pub fn visualize(raw: &[RawTask], config: &AnalysisConfig) -> Result<GraphView, ValidationError> {
    let tasks = validate_tasks(raw, config)?;
    let cycles = detect_cycles(&tasks, config.verbosity);
    Ok(graph_view(&tasks, &cycles))
}

/// Payload handed back to the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisReport {
    Scored {
        tasks: Vec<ScoredTask>,
    },
    Suggested {
        suggestions: Vec<ScoredTask>,
    },
    Cyclic {
        error: String,
        cycles: Vec<Cycle>,
    },
    Invalid {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
}

impl AnalysisReport {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Scored { .. } | Self::Suggested { .. })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<ValidationError> for AnalysisReport {
    fn from(err: ValidationError) -> Self {
        Self::Invalid {
            error: err.to_string(),
            field: err.field().map(str::to_string),
            index: err.index(),
        }
    }
}

impl From<AnalysisError> for AnalysisReport {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Validation(e) => e.into(),
            AnalysisError::CircularDependencies { cycles } => Self::Cyclic {
                error: CYCLE_ERROR_MESSAGE.to_string(),
                cycles,
            },
        }
    }
}

/// JSON entry point for `analyze`.
pub fn analyze_json(json: &str, config: &AnalysisConfig) -> AnalysisReport {
    let result = parse_raw_tasks(json)
        .map_err(AnalysisError::from)
        .and_then(|raw| analyze(&raw, config));
    match result {
        Ok(tasks) => AnalysisReport::Scored { tasks },
        Err(e) => e.into(),
    }
}

/// JSON entry point for `suggest`.
pub fn suggest_json(json: &str, config: &AnalysisConfig) -> AnalysisReport {
    let result = parse_raw_tasks(json)
        .map_err(AnalysisError::from)
        .and_then(|raw| suggest(&raw, config));
    match result {
        Ok(suggestions) => AnalysisReport::Suggested { suggestions },
        Err(e) => e.into(),
    }
}
