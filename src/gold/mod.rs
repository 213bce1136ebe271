//! Gold layer: incremental, watermark-guarded loads into the analytical sink
//!
//! A run reads the pipeline's watermark once, appends every silver event
//! strictly newer than it, then advances the watermark to the newest event
//! appended. The watermark is only written after the append has returned,
//! so a failure in between makes the next run reload the same window
//! (at-least-once).

mod loader;
mod sink;
mod watermark;

pub use loader::{IncrementalLoader, LoadResult};
pub use sink::{EventSink, MemorySink, NdjsonSink};
pub use watermark::{JsonWatermarkStore, MemoryWatermarkStore, WatermarkStore};
