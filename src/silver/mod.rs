//! Silver layer: validated, enriched and deduplicated events
//!
//! The [`SilverTransformer`] turns raw bronze records into canonical
//! [`TaskEvent`](crate::model::TaskEvent) rows, which [`SilverWriter`] stores as
//! a single Parquet object and [`SilverReader`] reads back for the gold job.

mod reader;
mod timestamp;
mod transformer;
mod writer;

pub use reader::SilverReader;
pub use timestamp::{coerce_event_time, parse_timestamp};
pub use transformer::{SilverTransformer, TransformStats};
pub use writer::SilverWriter;
