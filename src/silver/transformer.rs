//! Bronze to silver transformer

use super::coerce_event_time;
use crate::error::{PipelineError, Result};
use crate::etl::Transformer;
use crate::model::{REQUIRED_FIELDS, RawEvent, TaskEvent};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};

/// Counters describing one transformation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransformStats {
    pub input_rows: usize,
    /// Rows dropped because `event_time` could not be parsed
    pub corrupt_timestamps: usize,
    /// Rows dropped because `task_id` or `event_type` was null or absent
    pub missing_identifiers: usize,
    pub duplicates: usize,
    pub output_rows: usize,
}

/// Transformer producing the canonical silver record set
///
/// 1. Rejects the whole set when a required field is absent from every row
/// 2. Coerces `event_time`, dropping rows where it does not parse
/// 3. Derives `event_date` and `event_hour`
/// 4. Projects the canonical columns and removes exact duplicates
///
/// `event_id` is required on input but not part of the output, so raw events
/// that differ only by id collapse into one row.
///
/// # Example
/// ```
/// use medallion_etl::etl::Transformer;
/// use medallion_etl::silver::SilverTransformer;
/// use serde_json::json;
///
/// let raw = vec![
///     json!({"event_id": 1, "task_id": "t1", "event_type": "start", "event_time": "2024-01-01T10:00:00"}),
///     json!({"event_id": 2, "task_id": "t1", "event_type": "start", "event_time": "bad-date"}),
/// ]
/// .into_iter()
/// .map(|v| v.as_object().unwrap().clone())
/// .collect();
///
/// let clean = SilverTransformer::new().transform(raw).unwrap();
/// assert_eq!(clean.len(), 1);
/// assert_eq!(clean[0].event_hour, 10);
/// ```
#[derive(Debug, Default)]
pub struct SilverTransformer;

impl SilverTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Transform and report what was dropped along the way
    pub fn transform_with_stats(&self, raw: Vec<RawEvent>) -> Result<(Vec<TaskEvent>, TransformStats)> {
        validate_schema(&raw)?;

        let mut stats = TransformStats {
            input_rows: raw.len(),
            ..Default::default()
        };
        let mut seen = HashSet::new();
        let mut clean = Vec::new();

        for record in raw {
            let Some(event_time) = record.get("event_time").and_then(coerce_event_time) else {
                stats.corrupt_timestamps += 1;
                continue;
            };

            let (Some(task_id), Some(event_type)) = (
                identifier(record.get("task_id")),
                identifier(record.get("event_type")),
            ) else {
                stats.missing_identifiers += 1;
                continue;
            };

            let event = TaskEvent::new(task_id, event_type, event_time);
            if seen.insert(event.clone()) {
                clean.push(event);
            } else {
                stats.duplicates += 1;
            }
        }

        stats.output_rows = clean.len();
        Ok((clean, stats))
    }
}

impl Transformer for SilverTransformer {
    type Input = RawEvent;
    type Output = TaskEvent;

    fn transform(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>> {
        let (clean, stats) = self.transform_with_stats(inputs)?;

        if stats.corrupt_timestamps > 0 {
            log::warn!(
                "Dropped {} record(s) with an unparseable event_time",
                stats.corrupt_timestamps
            );
        }
        if stats.missing_identifiers > 0 {
            log::warn!(
                "Dropped {} record(s) without task_id or event_type",
                stats.missing_identifiers
            );
        }
        log::info!(
            "Silver transform: {} in, {} duplicate(s) removed, {} out",
            stats.input_rows,
            stats.duplicates,
            stats.output_rows
        );

        Ok(clean)
    }
}

/// Fields present anywhere in the set must cover every required field
fn validate_schema(raw: &[RawEvent]) -> Result<()> {
    let present: BTreeSet<&str> = raw
        .iter()
        .flat_map(|record| record.keys().map(String::as_str))
        .collect();

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !present.contains(*field))
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::SchemaValidation { missing })
    }
}

fn identifier(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use serde_json::json;

    fn raw(values: Vec<Value>) -> Vec<RawEvent> {
        values
            .into_iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_drops_corrupt_timestamp() {
        let input = raw(vec![
            json!({"event_id": 1, "task_id": "t1", "event_type": "start", "event_time": "2024-01-01T10:00:00"}),
            json!({"event_id": 2, "task_id": "t1", "event_type": "start", "event_time": "bad-date"}),
        ]);

        let (clean, stats) = SilverTransformer::new().transform_with_stats(input).unwrap();

        assert_eq!(clean.len(), 1);
        assert_eq!(clean[0].task_id, "t1");
        assert_eq!(clean[0].event_type, "start");
        assert_eq!(clean[0].event_time, at("2024-01-01T10:00:00"));
        assert_eq!(clean[0].event_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(clean[0].event_hour, 10);
        assert_eq!(stats.corrupt_timestamps, 1);
        assert_eq!(stats.output_rows, 1);
    }

    #[test]
    fn test_rows_differing_only_by_event_id_collapse() {
        let input = raw(vec![
            json!({"event_id": "a", "task_id": "t1", "event_type": "start", "event_time": "2024-01-01T10:00:00"}),
            json!({"event_id": "b", "task_id": "t1", "event_type": "start", "event_time": "2024-01-01T10:00:00"}),
            json!({"event_id": "c", "task_id": "t1", "event_type": "stop", "event_time": "2024-01-01T10:00:00"}),
        ]);

        let (clean, stats) = SilverTransformer::new().transform_with_stats(input).unwrap();

        assert_eq!(clean.len(), 2);
        assert_eq!(clean[0].event_type, "start");
        assert_eq!(clean[1].event_type, "stop");
        assert_eq!(stats.duplicates, 1);
    }

    #[test]
    fn test_sub_microsecond_differences_collapse() {
        let input = raw(vec![
            json!({"event_id": "a", "task_id": "t1", "event_type": "start", "event_time": "2024-01-01T10:00:00.0000001"}),
            json!({"event_id": "b", "task_id": "t1", "event_type": "start", "event_time": "2024-01-01T10:00:00.0000002"}),
        ]);

        let (clean, stats) = SilverTransformer::new().transform_with_stats(input).unwrap();

        assert_eq!(clean, vec![TaskEvent::new("t1", "start", at("2024-01-01T10:00:00"))]);
        assert_eq!(stats.duplicates, 1);
    }

    #[test]
    fn test_missing_task_id_everywhere_is_rejected() {
        let input = raw(vec![
            json!({"event_id": 1, "event_type": "start", "event_time": "2024-01-01T10:00:00"}),
            json!({"event_id": 2, "event_type": "stop", "event_time": "2024-01-01T11:00:00"}),
        ]);

        let err = SilverTransformer::new().transform(input).unwrap_err();
        match err {
            PipelineError::SchemaValidation { missing } => {
                assert_eq!(missing, vec!["task_id".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_schema_uses_fields_from_any_row() {
        let input = raw(vec![
            json!({"event_id": 1, "task_id": "t1", "event_type": "start", "event_time": "2024-01-01T10:00:00"}),
            json!({"event_id": 2, "event_type": "start", "event_time": "2024-01-01T11:00:00"}),
        ]);

        let (clean, stats) = SilverTransformer::new().transform_with_stats(input).unwrap();

        assert_eq!(clean.len(), 1);
        assert_eq!(stats.missing_identifiers, 1);
    }

    #[test]
    fn test_schema_error_lists_every_missing_field() {
        let input = raw(vec![json!({"task_id": "t1"})]);

        let err = SilverTransformer::new().transform(input).unwrap_err();
        match err {
            PipelineError::SchemaValidation { missing } => {
                assert_eq!(missing, vec!["event_id", "event_type", "event_time"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_numeric_identifiers_are_kept() {
        let input = raw(vec![
            json!({"event_id": 1, "task_id": 42, "event_type": "start", "event_time": "2024-01-01T10:00:00"}),
            json!({"event_id": 2, "task_id": null, "event_type": "start", "event_time": "2024-01-01T10:00:00"}),
        ]);

        let (clean, stats) = SilverTransformer::new().transform_with_stats(input).unwrap();

        assert_eq!(clean.len(), 1);
        assert_eq!(clean[0].task_id, "42");
        assert_eq!(stats.missing_identifiers, 1);
    }

    #[test]
    fn test_all_rows_corrupt_is_not_an_error() {
        let input = raw(vec![
            json!({"event_id": 1, "task_id": "t1", "event_type": "start", "event_time": "nope"}),
        ]);

        let clean = SilverTransformer::new().transform(input).unwrap();
        assert!(clean.is_empty());
    }
}
