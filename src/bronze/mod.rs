//! Bronze layer: untyped raw events in the landing container

mod extractor;

pub use extractor::RawEventsExtractor;
