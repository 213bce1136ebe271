//! Parquet encoding/decoding for the silver layer
//!
//! The silver object carries the canonical [`TaskEvent`] columns:
//!
//! | column       | arrow type                     |
//! |--------------|--------------------------------|
//! | `task_id`    | `Utf8`                         |
//! | `event_type` | `Utf8`                         |
//! | `event_time` | `Timestamp(Microsecond, None)` |
//! | `event_date` | `Date32`                       |
//! | `event_hour` | `UInt32`                       |

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Date32Array, StringArray, TimestampMicrosecondArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::error::{PipelineError, Result};
use crate::model::TaskEvent;

/// Days between 0001-01-01 (CE day 1) and 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn silver_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("task_id", DataType::Utf8, false),
        Field::new("event_type", DataType::Utf8, false),
        Field::new(
            "event_time",
            DataType::Timestamp(TimeUnit::Microsecond, None),
            false,
        ),
        Field::new("event_date", DataType::Date32, false),
        Field::new("event_hour", DataType::UInt32, false),
    ]))
}

/// Encode events as a single Parquet file
pub fn encode_events(events: &[TaskEvent]) -> Result<Vec<u8>> {
    let schema = silver_schema();

    let task_ids = StringArray::from_iter_values(events.iter().map(|e| e.task_id.as_str()));
    let event_types = StringArray::from_iter_values(events.iter().map(|e| e.event_type.as_str()));
    let event_times = TimestampMicrosecondArray::from(
        events
            .iter()
            .map(|e| e.event_time.and_utc().timestamp_micros())
            .collect::<Vec<_>>(),
    );
    let event_dates = Date32Array::from(
        events
            .iter()
            .map(|e| date_to_days(e.event_date))
            .collect::<Vec<_>>(),
    );
    let event_hours = UInt32Array::from(events.iter().map(|e| e.event_hour).collect::<Vec<_>>());

    let columns: Vec<ArrayRef> = vec![
        Arc::new(task_ids),
        Arc::new(event_types),
        Arc::new(event_times),
        Arc::new(event_dates),
        Arc::new(event_hours),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(buffer)
}

/// Decode events from a Parquet file written by [`encode_events`]
pub fn decode_events(data: Vec<u8>) -> Result<Vec<TaskEvent>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(data))?.build()?;

    let mut events = Vec::new();
    for batch in reader {
        let batch = batch?;

        let task_ids = column::<StringArray>(&batch, "task_id")?;
        let event_types = column::<StringArray>(&batch, "event_type")?;
        let event_times = column::<TimestampMicrosecondArray>(&batch, "event_time")?;
        let event_dates = column::<Date32Array>(&batch, "event_date")?;
        let event_hours = column::<UInt32Array>(&batch, "event_hour")?;

        for row in 0..batch.num_rows() {
            let micros = event_times.value(row);
            let event_time = DateTime::from_timestamp_micros(micros)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| invalid(format!("event_time {} out of range", micros)))?;
            let days = event_dates.value(row);
            let event_date = days_to_date(days)
                .ok_or_else(|| invalid(format!("event_date {} out of range", days)))?;

            events.push(TaskEvent {
                task_id: task_ids.value(row).to_string(),
                event_type: event_types.value(row).to_string(),
                event_time,
                event_date,
                event_hour: event_hours.value(row),
            });
        }
    }

    Ok(events)
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    let array = batch
        .column_by_name(name)
        .ok_or_else(|| invalid(format!("missing column '{}'", name)))?;
    if array.null_count() > 0 {
        return Err(invalid(format!("column '{}' contains nulls", name)));
    }
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| invalid(format!("column '{}' has type {}", name, array.data_type())))
}

fn invalid(message: String) -> PipelineError {
    PipelineError::Parquet(parquet::errors::ParquetError::General(format!(
        "invalid silver file: {}",
        message
    )))
}

fn date_to_days(date: NaiveDate) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}
