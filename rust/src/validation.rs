//! Validation and coercion of raw task records.
//!
//! This is the only place untyped input is interpreted. A single bad record
//! rejects the whole batch.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;
use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::log_checks;
use crate::models::{RawTask, Task, TaskId};

/// Lowest accepted `importance`.
pub const MIN_IMPORTANCE: i64 = 1;
/// Highest accepted `importance`.
pub const MAX_IMPORTANCE: i64 = 10;

const REQUIRED: &str = "This field is required.";

/// Offset-free date-time layouts accepted for `due_date`.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Errors that reject a batch before any graph work happens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("Expected a list of tasks")]
    NotAList,
    #[error("Task at index {index}: {field}: {message}")]
    Field {
        index: usize,
        id: Option<TaskId>,
        field: &'static str,
        message: String,
    },
    #[error("Task at index {index}: id: duplicate id {id}")]
    DuplicateId { index: usize, id: TaskId },
}

impl ValidationError {
    /// Position of the offending record in the batch, if the error is record-specific.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Field { index, .. } | Self::DuplicateId { index, .. } => Some(*index),
            Self::InvalidJson(_) | Self::NotAList => None,
        }
    }

    /// Name of the offending field, if the error is field-specific.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Field { field, .. } => Some(*field),
            Self::DuplicateId { .. } => Some("id"),
            Self::InvalidJson(_) | Self::NotAList => None,
        }
    }

    fn field_error(index: usize, id: Option<TaskId>, field: &'static str, message: String) -> Self {
        Self::Field {
            index,
            id,
            field,
            message,
        }
    }
}

/// Parse a JSON document into raw task records.
///
/// The document must be an array of objects. Unknown keys are ignored and
/// `null` values count as absent.
pub fn parse_raw_tasks(json: &str) -> Result<Vec<RawTask>, ValidationError> {
    let document: Value =
        serde_json::from_str(json).map_err(|e| ValidationError::InvalidJson(e.to_string()))?;
    raw_tasks_from_value(document)
}

/// Convert an already-decoded JSON value into raw task records.
pub fn raw_tasks_from_value(document: Value) -> Result<Vec<RawTask>, ValidationError> {
    let Value::Array(items) = document else {
        return Err(ValidationError::NotAList);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(ValidationError::field_error(
                    index,
                    None,
                    "task",
                    format!("expected an object, got {}", kind(&item)),
                ));
            }
            serde_json::from_value::<RawTask>(item).map_err(|e| {
                ValidationError::field_error(index, None, "task", e.to_string())
            })
        })
        .collect()
}

/// Validate a batch of raw records into tasks.
///
/// Dependencies are deduplicated (first occurrence wins). Self-references are
/// kept so the cycle detector reports them.
pub fn validate_tasks(
    raw: &[RawTask],
    config: &AnalysisConfig,
) -> Result<Vec<Task>, ValidationError> {
    let mut tasks = Vec::with_capacity(raw.len());
    let mut seen: FxHashMap<TaskId, usize> =
        FxHashMap::with_capacity_and_hasher(raw.len(), Default::default());

    for (index, record) in raw.iter().enumerate() {
        let task = validate_task(index, record, config)?;
        if seen.insert(task.id, index).is_some() {
            return Err(ValidationError::DuplicateId { index, id: task.id });
        }
        log_checks!(
            config.verbosity,
            "Validated task {} ({:?}): due {}, {} dependencies",
            task.id,
            task.title,
            task.due_date,
            task.dependencies.len()
        );
        tasks.push(task);
    }

    Ok(tasks)
}

fn validate_task(
    index: usize,
    record: &RawTask,
    config: &AnalysisConfig,
) -> Result<Task, ValidationError> {
    let id = match &record.id {
        Some(value) => coerce_positive_id(value)
            .map_err(|message| ValidationError::field_error(index, None, "id", message))?,
        None if config.assign_missing_ids => index as TaskId + 1,
        None => {
            return Err(ValidationError::field_error(
                index,
                None,
                "id",
                REQUIRED.to_string(),
            ))
        }
    };
    let fail = |field: &'static str, message: String| {
        ValidationError::field_error(index, Some(id), field, message)
    };
    let required = |value: &Option<Value>, field: &'static str| -> Result<Value, ValidationError> {
        value.clone().ok_or_else(|| fail(field, REQUIRED.to_string()))
    };

    let title = coerce_title(&required(&record.title, "title")?).map_err(|m| fail("title", m))?;
    let due_date =
        coerce_date(&required(&record.due_date, "due_date")?).map_err(|m| fail("due_date", m))?;

    let estimated_hours = coerce_number(&required(&record.estimated_hours, "estimated_hours")?)
        .map_err(|m| fail("estimated_hours", m))?;
    if estimated_hours < 0.0 {
        return Err(fail(
            "estimated_hours",
            "Ensure this value is greater than or equal to 0.".to_string(),
        ));
    }

    let importance = coerce_integer(&required(&record.importance, "importance")?)
        .map_err(|m| fail("importance", m))?;
    if !(MIN_IMPORTANCE..=MAX_IMPORTANCE).contains(&importance) {
        return Err(fail(
            "importance",
            format!("Ensure this value is between {MIN_IMPORTANCE} and {MAX_IMPORTANCE}."),
        ));
    }

    let dependencies = match &record.dependencies {
        None => Vec::new(),
        Some(value) => coerce_dependencies(value).map_err(|m| fail("dependencies", m))?,
    };

    Ok(Task {
        id,
        title,
        due_date,
        estimated_hours,
        importance: importance as u8,
        dependencies,
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn coerce_integer(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(format!("{n} is not a valid integer.")),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("{s:?} is not a valid integer.")),
        other => Err(format!("Expected an integer, got {}.", kind(other))),
    }
}

fn coerce_positive_id(value: &Value) -> Result<TaskId, String> {
    let id = coerce_integer(value)?;
    if id < 1 {
        return Err(format!("{id} is not a positive integer."));
    }
    Ok(id as TaskId)
}

fn coerce_number(value: &Value) -> Result<f64, String> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        other => return Err(format!("Expected a number, got {}.", kind(other))),
    };
    match number {
        Some(f) if f.is_finite() => Ok(f),
        _ => Err(format!("{value} is not a valid number.")),
    }
}

fn coerce_title(value: &Value) -> Result<String, String> {
    let title = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => return Err(format!("Expected a string, got {}.", kind(other))),
    };
    if title.is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    Ok(title)
}

/// Accepts `YYYY-MM-DD` or a full ISO date-time; the time part is dropped.
/// An offset date-time keeps the calendar date written in its own offset.
fn coerce_date(value: &Value) -> Result<NaiveDate, String> {
    let Value::String(s) = value else {
        return Err(format!("Expected a date string, got {}.", kind(value)));
    };
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
        return Ok(datetime.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|datetime| datetime.date())
        .ok_or_else(|| format!("Invalid date {s:?}; expected YYYY-MM-DD."))
}

fn coerce_dependencies(value: &Value) -> Result<Vec<TaskId>, String> {
    let Value::Array(items) = value else {
        return Err(format!("Expected a list of task ids, got {}.", kind(value)));
    };
    let mut deps: Vec<TaskId> = Vec::with_capacity(items.len());
    let mut seen: FxHashSet<TaskId> = FxHashSet::default();
    for (pos, item) in items.iter().enumerate() {
        let dep = coerce_positive_id(item).map_err(|m| format!("item {pos}: {m}"))?;
        if seen.insert(dep) {
            deps.push(dep);
        }
    }
    Ok(deps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn raw(value: Value) -> RawTask {
        serde_json::from_value(value).unwrap()
    }

    fn valid() -> Value {
        json!({
            "id": 1,
            "title": "Fix login bug",
            "due_date": "2025-11-30",
            "estimated_hours": 3,
            "importance": 8,
            "dependencies": []
        })
    }

    fn with(field: &str, value: Value) -> RawTask {
        let mut record = valid();
        record[field] = value;
        raw(record)
    }

    fn validate_one(record: RawTask) -> Result<Task, ValidationError> {
        validate_tasks(&[record], &AnalysisConfig::default()).map(|mut t| t.remove(0))
    }

    #[test]
    fn test_valid_record() {
        let task = validate_one(raw(valid())).unwrap();
        assert_eq!(
            task,
            Task {
                id: 1,
                title: "Fix login bug".to_string(),
                due_date: NaiveDate::from_ymd_opt(2025, 11, 30).unwrap(),
                estimated_hours: 3.0,
                importance: 8,
                dependencies: vec![],
            }
        );
    }

    #[test]
    fn test_coerces_numeric_strings() {
        let mut record = valid();
        record["id"] = json!("12");
        record["estimated_hours"] = json!("2.5");
        record["importance"] = json!(" 4 ");
        record["dependencies"] = json!(["3", 5.0]);
        let task = validate_one(raw(record)).unwrap();
        assert_eq!(task.id, 12);
        assert_eq!(task.estimated_hours, 2.5);
        assert_eq!(task.importance, 4);
        assert_eq!(task.dependencies, vec![3, 5]);
    }

    #[rstest]
    #[case("2025-11-30T12:00:00")]
    #[case("2025-11-30 12:00:00")]
    #[case("2025-11-30T12:00:00.250")]
    #[case("2025-11-30T12:00")]
    #[case("2025-11-30T23:30:00+05:00")]
    #[case("2025-11-30T08:00:00Z")]
    fn test_datetime_due_date_drops_time(#[case] due: &str) {
        let task = validate_one(with("due_date", json!(due))).unwrap();
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 11, 30).unwrap());
    }

    #[test]
    fn test_dependencies_deduplicated_self_reference_kept() {
        let task = validate_one(with("dependencies", json!([2, 1, 2, 3, 1]))).unwrap();
        assert_eq!(task.dependencies, vec![2, 1, 3]);
    }

    #[test]
    fn test_long_dependency_list_deduplicated_in_order() {
        let ids: Vec<u64> = (1..=2000).chain((1..=2000).rev()).collect();
        let task = validate_one(with("dependencies", json!(ids))).unwrap();
        assert_eq!(task.dependencies, (1..=2000).collect::<Vec<TaskId>>());
    }

    #[test]
    fn test_missing_or_null_dependencies_are_empty() {
        let mut record = valid();
        record.as_object_mut().unwrap().remove("dependencies");
        assert!(validate_one(raw(record)).unwrap().dependencies.is_empty());
        assert!(validate_one(with("dependencies", Value::Null))
            .unwrap()
            .dependencies
            .is_empty());
    }

    #[rstest]
    #[case("id", json!(0))]
    #[case("id", json!(-4))]
    #[case("id", json!("abc"))]
    #[case("id", json!(1.5))]
    #[case("id", Value::Null)]
    #[case("title", json!(""))]
    #[case("title", json!("   "))]
    #[case("title", Value::Null)]
    #[case("title", json!(["x"]))]
    #[case("due_date", json!("tomorrow"))]
    #[case("due_date", json!("2025-02-30"))]
    #[case("due_date", json!("2025-11-30 garbage"))]
    #[case("due_date", json!("2025-11-30Tnonsense"))]
    #[case("due_date", json!("2025-11-30T25:00:00"))]
    #[case("due_date", json!(20251130))]
    #[case("estimated_hours", json!(-0.5))]
    #[case("estimated_hours", json!("lots"))]
    #[case("estimated_hours", json!(true))]
    #[case("importance", json!(0))]
    #[case("importance", json!(11))]
    #[case("importance", json!(7.5))]
    #[case("dependencies", json!("2,3"))]
    #[case("dependencies", json!([1, "x"]))]
    #[case("dependencies", json!([0]))]
    fn test_rejects_bad_field(#[case] field: &str, #[case] value: Value) {
        let err = validate_one(with(field, value)).unwrap_err();
        assert_eq!(err.field(), Some(field));
        assert_eq!(err.index(), Some(0));
    }

    #[rstest]
    #[case(1)]
    #[case(10)]
    fn test_importance_bounds_inclusive(#[case] importance: i64) {
        let task = validate_one(with("importance", json!(importance))).unwrap();
        assert_eq!(task.importance as i64, importance);
    }

    #[test]
    fn test_zero_hours_allowed() {
        let task = validate_one(with("estimated_hours", json!(0))).unwrap();
        assert_eq!(task.estimated_hours, 0.0);
    }

    #[test]
    fn test_duplicate_id_rejects_batch() {
        let mut second = valid();
        second["title"] = json!("Another");
        let err = validate_tasks(&[raw(valid()), raw(second)], &AnalysisConfig::default())
            .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateId { index: 1, id: 1 });
        assert_eq!(err.field(), Some("id"));
    }

    #[test]
    fn test_error_reports_offending_index_and_id() {
        let mut second = valid();
        second["id"] = json!(2);
        second["importance"] = json!(42);
        let err = validate_tasks(&[raw(valid()), raw(second)], &AnalysisConfig::default())
            .unwrap_err();
        match err {
            ValidationError::Field {
                index, id, field, ..
            } => {
                assert_eq!(index, 1);
                assert_eq!(id, Some(2));
                assert_eq!(field, "importance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_id_assignment() {
        let mut first = valid();
        first.as_object_mut().unwrap().remove("id");
        let records = [raw(first.clone()), raw(first)];

        let err = validate_tasks(&records, &AnalysisConfig::default()).unwrap_err();
        assert_eq!(err.field(), Some("id"));

        let config = AnalysisConfig {
            assign_missing_ids: true,
            ..AnalysisConfig::default()
        };
        let tasks = validate_tasks(&records, &config).unwrap();
        assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_parse_raw_tasks_shapes() {
        assert_eq!(parse_raw_tasks("{}"), Err(ValidationError::NotAList));
        assert!(matches!(
            parse_raw_tasks("[1, 2"),
            Err(ValidationError::InvalidJson(_))
        ));

        let err = parse_raw_tasks("[{}, 3]").unwrap_err();
        assert_eq!(err.index(), Some(1));
        assert_eq!(err.field(), Some("task"));

        let records = parse_raw_tasks(r#"[{"id": 1, "title": "A", "extra": true}]"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, Some(json!(1)));
        assert_eq!(records[0].due_date, None);
    }
}
