//! Storage capabilities and file formats
//!
//! This module handles all layer I/O including:
//! - The object store capability (list, read, ensure container, write)
//! - Directory-backed and in-memory object stores
//! - NDJSON row files for the analytical sink
//! - Parquet encoding for the silver layer
//! - Resolving storage locations from configuration

mod directory;
mod location;
mod memory;
mod ndjson;
mod object_store;
pub mod parquet_util;

pub use directory::LocalObjectStore;
pub(crate) use directory::sync_dir;
pub use location::resolve_location;
pub use memory::MemoryObjectStore;
pub use ndjson::{NdjsonReader, NdjsonWriter};
pub use object_store::ObjectStore;
