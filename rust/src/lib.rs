//! Task prioritization engine.
//!
//! Validates a batch of user-submitted tasks, rejects batches with circular
//! dependencies, and ranks the rest by a deterministic priority score:
//!
//! 1. [`validation`] turns raw JSON-shaped records into typed [`Task`]s
//! 2. [`cycles`] finds every dependency cycle in canonical form
//! 3. [`scoring`] computes urgency/importance/effort/fan-in scores
//! 4. [`suggestions`] picks the top tasks and explains them
//!
//! The engine is synchronous and stateless; every call works on its own batch.

pub mod analysis;
mod config;
pub mod cycles;
pub mod graph;
mod interner;
pub mod logging;
mod models;
#[cfg(feature = "python")]
mod python;
pub mod scoring;
pub mod sorting;
pub mod suggestions;
pub mod validation;

pub use analysis::{
    analyze, analyze_json, analyze_tasks, suggest, suggest_json, visualize, AnalysisError,
    AnalysisReport, CYCLE_ERROR_MESSAGE,
};
pub use config::{AnalysisConfig, DEFAULT_SUGGESTION_LIMIT};
pub use cycles::detect_cycles;
pub use graph::{graph_view, GraphEdge, GraphNode, GraphView, TaskGraph};
pub use interner::{NodeIndex, TaskIndex};
pub use models::{Cycle, RawTask, ScoredTask, Task, TaskId};
pub use scoring::{score_tasks, ScoreBreakdown};
pub use sorting::rank_tasks;
pub use suggestions::{explain, suggest_top};
pub use validation::{parse_raw_tasks, validate_tasks, ValidationError};
