//! PyO3 bindings for the Python host.
//!
//! Tasks cross the boundary as JSON text in both directions, exactly as the
//! host's transport layer receives and returns them.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::prelude::*;

use crate::analysis::{analyze_json, suggest_json, visualize, AnalysisReport};
use crate::config::{AnalysisConfig, DEFAULT_SUGGESTION_LIMIT};
use crate::logging::VERBOSITY_SILENT;
use crate::validation::parse_raw_tasks;

/// Analysis configuration (PyO3 wrapper).
#[pyclass(name = "AnalysisConfig")]
#[derive(Clone, Debug)]
pub struct PyAnalysisConfig {
    /// Reference date for urgency; None means today's local date.
    #[pyo3(get, set)]
    pub today: Option<NaiveDate>,
    #[pyo3(get, set)]
    pub suggestion_limit: usize,
    #[pyo3(get, set)]
    pub assign_missing_ids: bool,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
}

#[pymethods]
impl PyAnalysisConfig {
    #[new]
    #[pyo3(signature = (
        today=None,
        suggestion_limit=DEFAULT_SUGGESTION_LIMIT,
        assign_missing_ids=false,
        verbosity=VERBOSITY_SILENT
    ))]
    fn new(
        today: Option<NaiveDate>,
        suggestion_limit: usize,
        assign_missing_ids: bool,
        verbosity: u8,
    ) -> Self {
        Self {
            today,
            suggestion_limit,
            assign_missing_ids,
            verbosity,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "AnalysisConfig(today={:?}, suggestion_limit={}, assign_missing_ids={}, verbosity={})",
            self.today, self.suggestion_limit, self.assign_missing_ids, self.verbosity
        )
    }
}

impl From<PyAnalysisConfig> for AnalysisConfig {
    fn from(config: PyAnalysisConfig) -> Self {
        Self {
            today: config.today,
            suggestion_limit: config.suggestion_limit,
            assign_missing_ids: config.assign_missing_ids,
            verbosity: config.verbosity,
        }
    }
}

fn resolve_config(config: Option<PyAnalysisConfig>) -> AnalysisConfig {
    config.map(AnalysisConfig::from).unwrap_or_default()
}

fn report_to_json(report: &AnalysisReport) -> PyResult<String> {
    report
        .to_json()
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

/// Validate, check for cycles, and score a JSON list of tasks.
///
/// Returns a JSON object: `{"tasks": [...]}` on success,
/// `{"error", "cycles"}` for circular dependencies, or
/// `{"error", "field", "index"}` for invalid input.
#[pyfunction]
#[pyo3(name = "analyze", signature = (tasks_json, config=None))]
fn py_analyze(tasks_json: &str, config: Option<PyAnalysisConfig>) -> PyResult<String> {
    report_to_json(&analyze_json(tasks_json, &resolve_config(config)))
}

/// Like `analyze`, but returns `{"suggestions": [...]}` with the top tasks and
/// an explanation for each.
#[pyfunction]
#[pyo3(name = "suggest", signature = (tasks_json, config=None))]
fn py_suggest(tasks_json: &str, config: Option<PyAnalysisConfig>) -> PyResult<String> {
    report_to_json(&suggest_json(tasks_json, &resolve_config(config)))
}

/// Nodes, edges and cycles for drawing the dependency graph.
///
/// Cycles are marked rather than rejected; invalid input yields the same
/// error object as `analyze`.
#[pyfunction]
#[pyo3(name = "graph_view", signature = (tasks_json, config=None))]
fn py_graph_view(tasks_json: &str, config: Option<PyAnalysisConfig>) -> PyResult<String> {
    let config = resolve_config(config);
    let view = parse_raw_tasks(tasks_json).and_then(|raw| visualize(&raw, &config));
    match view {
        Ok(view) => serde_json::to_string(&view)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string())),
        Err(e) => report_to_json(&AnalysisReport::from(e)),
    }
}

/// The taskrank_rust Python module.
#[pymodule]
fn taskrank_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyAnalysisConfig>()?;

    m.add_function(wrap_pyfunction!(py_analyze, m)?)?;
    m.add_function(wrap_pyfunction!(py_suggest, m)?)?;
    m.add_function(wrap_pyfunction!(py_graph_view, m)?)?;

    Ok(())
}
