//! NDJSON (Newline Delimited JSON) file operations

use crate::error::{PipelineError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Read NDJSON rows from a file
pub struct NdjsonReader {
    path: PathBuf,
}

impl NdjsonReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read all lines as rows; a missing file reads as empty
    pub fn read<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PipelineError::io(&self.path, e)),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .map_err(|e| PipelineError::json(format!("line in {}", self.path.display()), e))
            })
            .collect()
    }
}

/// Write NDJSON rows to a file
pub struct NdjsonWriter {
    path: PathBuf,
}

impl NdjsonWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Append rows to the file, creating it if needed
    ///
    /// Rows are serialized up front so a serialization failure appends
    /// nothing. Returns only after the data has been flushed to disk.
    pub fn append<T: Serialize>(&self, rows: &[T]) -> Result<usize> {
        let mut buffer = String::new();
        for row in rows {
            let line = serde_json::to_string(row)
                .map_err(|e| PipelineError::json(format!("row for {}", self.path.display()), e))?;
            buffer.push_str(&line);
            buffer.push('\n');
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PipelineError::io(&self.path, e))?;

        file.write_all(buffer.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| PipelineError::io(&self.path, e))?;

        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    #[test]
    fn test_append_accumulates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("table.ndjson");
        let writer = NdjsonWriter::new(&path);

        writer.append(&[json!({"a": 1})]).unwrap();
        writer.append(&[json!({"b": 2}), json!({"c": 3})]).unwrap();

        let reader = NdjsonReader::new(&path);
        let data: Vec<Value> = reader.read().unwrap();

        assert_eq!(data, vec![json!({"a": 1}), json!({"b": 2}), json!({"c": 3})]);
    }

    #[test]
    fn test_append_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("warehouse").join("table.ndjson");

        NdjsonWriter::new(&path).append(&[json!({"a": 1})]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let temp = TempDir::new().unwrap();
        let reader = NdjsonReader::new(temp.path().join("nope.ndjson"));
        let data: Vec<Value> = reader.read().unwrap();
        assert!(data.is_empty());
    }
}
