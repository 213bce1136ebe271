//! Error taxonomy for the pipeline stages
//!
//! Structural and connectivity failures are surfaced as [`PipelineError`] and
//! stop the run. Row-level data-quality problems never become errors; the
//! transformer drops those rows and counts them instead.

use std::path::PathBuf;
use thiserror::Error;

/// Enumeration of errors a pipeline run can stop with.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No raw records were found across every object matching the prefix.
    #[error("no raw events found in container '{container}' with prefix '{prefix}'")]
    EmptySource { container: String, prefix: String },

    /// The raw record set lacks one or more required fields.
    #[error("missing required fields in raw data: {}", missing.join(", "))]
    SchemaValidation { missing: Vec<String> },

    /// The watermark row for a pipeline has never been bootstrapped.
    #[error("no watermark found for pipeline '{0}', initialize it before loading")]
    WatermarkNotFound(String),

    /// Appending to the analytical sink failed.
    #[error("failed to append {rows} row(s) to table '{table}': {reason}")]
    Sink {
        table: String,
        rows: usize,
        reason: String,
    },

    #[error("container '{0}' does not exist")]
    ContainerNotFound(String),

    #[error("object '{name}' not found in container '{container}'")]
    ObjectNotFound { container: String, name: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON from {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_names_missing_fields() {
        let err = PipelineError::SchemaValidation {
            missing: vec!["event_time".to_string(), "task_id".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "missing required fields in raw data: event_time, task_id"
        );
    }

    #[test]
    fn test_watermark_not_found_message() {
        let err = PipelineError::WatermarkNotFound("gold_task_events".to_string());
        assert!(err.to_string().contains("gold_task_events"));
    }
}
