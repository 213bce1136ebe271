//! Record shapes flowing through the bronze, silver and gold layers

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw event as found in the landing zone.
///
/// No projection happens at this stage: every field present in the source
/// object is kept as-is.
pub type RawEvent = Map<String, Value>;

/// Fields every raw record set must carry before any row-level processing.
pub const REQUIRED_FIELDS: [&str; 4] = ["event_id", "task_id", "event_type", "event_time"];

/// Canonical silver row.
///
/// `event_id` is intentionally absent: two raw events that agree on every
/// field below collapse into one row during deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskEvent {
    pub task_id: String,
    pub event_type: String,
    pub event_time: NaiveDateTime,
    pub event_date: NaiveDate,
    pub event_hour: u32,
}

impl TaskEvent {
    /// Build an event with `event_date` and `event_hour` derived from `event_time`
    pub fn new(
        task_id: impl Into<String>,
        event_type: impl Into<String>,
        event_time: NaiveDateTime,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            event_type: event_type.into(),
            event_time,
            event_date: event_time.date(),
            event_hour: event_time.hour(),
        }
    }

    /// Project the columns persisted in the analytical sink
    pub fn to_gold_row(&self) -> GoldRow {
        GoldRow {
            task_id: self.task_id.clone(),
            event_type: self.event_type.clone(),
            event_date: self.event_date,
            event_hour: self.event_hour,
        }
    }
}

/// Row appended to the gold table.
///
/// Field order is the sink's column order. `event_time` itself is not
/// persisted, only its derived date and hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldRow {
    pub task_id: String,
    pub event_type: String,
    pub event_date: NaiveDate,
    pub event_hour: u32,
}
