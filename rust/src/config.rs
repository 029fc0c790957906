//! Configuration for an analysis call.

use chrono::{Local, NaiveDate};

use crate::logging::VERBOSITY_SILENT;

/// Default number of tasks returned by the suggester.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 3;

/// Per-call analysis settings.
#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    /// Reference date for urgency. `None` reads the local date once per call.
    pub today: Option<NaiveDate>,
    /// How many tasks the suggester returns.
    pub suggestion_limit: usize,
    /// Give records without an `id` the ID `index + 1` instead of rejecting them.
    pub assign_missing_ids: bool,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    pub verbosity: u8,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            today: None,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            assign_missing_ids: false,
            verbosity: VERBOSITY_SILENT,
        }
    }
}

impl AnalysisConfig {
    /// Config pinned to a fixed reference date.
    pub fn at(today: NaiveDate) -> Self {
        Self {
            today: Some(today),
            ..Self::default()
        }
    }

    /// Resolve the reference date for this call.
    pub fn resolve_today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}
